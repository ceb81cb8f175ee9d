//! Admin landing page counters.

use chrono::{Duration, NaiveDate};
use kairos_types::history::ConsultationRecord;

/// Consultations listed under "latest"
pub const LATEST_LIMIT: usize = 5;
/// Days in the per-day chart, today included
pub const WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub total_consultas: usize,
    pub consultas_hoy: usize,
    pub total_patrones: usize,
    pub productos_activos: usize,
    /// Oldest day first; days without consultations read zero
    pub semana: Vec<(NaiveDate, usize)>,
    /// Newest first
    pub recientes: Vec<ConsultationRecord>,
}

impl Dashboard {
    pub fn build(
        consultations: &[ConsultationRecord],
        total_patrones: usize,
        productos_activos: usize,
        today: NaiveDate,
    ) -> Self {
        let on = |day: NaiveDate| consultations.iter().filter(|c| c.fecha.date() == day).count();

        let semana = (0..WEEK_DAYS)
            .rev()
            .map(|back| today - Duration::days(back))
            .map(|day| (day, on(day)))
            .collect();

        let mut recientes = consultations.to_vec();
        recientes.sort_by(|a, b| b.fecha.cmp(&a.fecha).then_with(|| b.id.cmp(&a.id)));
        recientes.truncate(LATEST_LIMIT);

        Self {
            total_consultas: consultations.len(),
            consultas_hoy: on(today),
            total_patrones,
            productos_activos,
            semana,
            recientes,
        }
    }

    /// Tallest bar in the weekly chart, at least one so bars can be scaled.
    pub fn week_peak(&self) -> usize {
        self.semana.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1)
    }
}
