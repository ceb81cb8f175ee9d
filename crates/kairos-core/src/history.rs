//! Consultation history: date-range and text filtering with summary stats.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use kairos_types::history::ConsultationRecord;

/// Rows shown per history query
pub const HISTORY_LIMIT: usize = 100;

/// Days covered by the history filter when the admin has not chosen a range
pub const DEFAULT_RANGE_DAYS: i64 = 30;

pub const ERR_DATE_FORMAT: &str = "Las fechas deben tener el formato AAAA-MM-DD";
pub const ERR_DATE_ORDER: &str = "La fecha inicial no puede ser posterior a la final";

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryFilter {
    /// Inclusive
    pub desde: NaiveDate,
    /// Inclusive
    pub hasta: NaiveDate,
    /// Case-insensitive match against patient name, DNI or main symptom
    pub buscar: String,
}

impl HistoryFilter {
    /// The last thirty days up to `today`, no search text.
    pub fn recent(today: NaiveDate) -> Self {
        Self {
            desde: today - Duration::days(DEFAULT_RANGE_DAYS),
            hasta: today,
            buscar: String::new(),
        }
    }

    /// Build a filter from the admin's text fields.
    pub fn parse(desde: &str, hasta: &str, buscar: &str) -> Result<Self, Vec<String>> {
        let parse_date = |raw: &str| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok();
        let (Some(desde), Some(hasta)) = (parse_date(desde), parse_date(hasta)) else {
            return Err(vec![ERR_DATE_FORMAT.to_string()]);
        };
        if desde > hasta {
            return Err(vec![ERR_DATE_ORDER.to_string()]);
        }
        Ok(Self {
            desde,
            hasta,
            buscar: buscar.trim().to_string(),
        })
    }

    pub fn matches(&self, record: &ConsultationRecord) -> bool {
        let day = record.fecha.date();
        if day < self.desde || day > self.hasta {
            return false;
        }
        if self.buscar.is_empty() {
            return true;
        }
        let needle = self.buscar.to_lowercase();
        [
            record.paciente.as_deref(),
            record.dni.as_deref(),
            Some(record.sintoma_principal.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryStats {
    pub total: usize,
    /// Distinct DNIs; consultations without a DNI are not counted
    pub pacientes_unicos: usize,
    /// Mean diagnosis confidence (ratio), `None` when no row has one
    pub confianza_promedio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryView {
    /// Newest first, at most `HISTORY_LIMIT`
    pub rows: Vec<ConsultationRecord>,
    /// Over the whole date range; the search text does not narrow it
    pub stats: HistoryStats,
}

impl HistoryView {
    pub fn build(records: &[ConsultationRecord], filter: &HistoryFilter) -> Self {
        let in_range: Vec<&ConsultationRecord> = records
            .iter()
            .filter(|r| {
                let day = r.fecha.date();
                day >= filter.desde && day <= filter.hasta
            })
            .collect();

        let patients: HashSet<&str> = in_range
            .iter()
            .filter_map(|r| r.dni.as_deref())
            .filter(|dni| !dni.is_empty())
            .collect();
        let confidences: Vec<f64> = in_range.iter().filter_map(|r| r.confianza).collect();
        let stats = HistoryStats {
            total: in_range.len(),
            pacientes_unicos: patients.len(),
            confianza_promedio: mean(&confidences),
        };

        let mut rows: Vec<ConsultationRecord> = in_range
            .into_iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.fecha.cmp(&a.fecha).then_with(|| b.id.cmp(&a.id)));
        rows.truncate(HISTORY_LIMIT);

        Self { rows, stats }
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}
