//! AI usage aggregates for the admin dashboard.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use kairos_types::usage::UsageLogEntry;

/// Entries kept in `UsageReport::recent`
pub const RECENT_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodStats {
    pub calls: usize,
    pub tokens: u64,
    pub cost: f64,
    /// Mean response time; zero when there were no calls
    pub avg_latency_ms: f64,
}

impl PeriodStats {
    fn from_entries<'a>(entries: impl Iterator<Item = &'a UsageLogEntry>) -> Self {
        let mut stats = Self::default();
        let mut latency_total: u64 = 0;
        for e in entries {
            stats.calls += 1;
            stats.tokens += e.tokens_usados;
            stats.cost += e.costo_estimado;
            latency_total += e.tiempo_respuesta_ms;
        }
        if stats.calls > 0 {
            stats.avg_latency_ms = latency_total as f64 / stats.calls as f64;
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelUsage {
    pub modelo: String,
    pub calls: usize,
    pub tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageReport {
    pub today: PeriodStats,
    pub month: PeriodStats,
    /// Current month, most-called model first
    pub by_model: Vec<ModelUsage>,
    /// Percentage of successful calls this month, `None` without calls
    pub success_rate: Option<f64>,
    /// Newest first
    pub recent: Vec<UsageLogEntry>,
}

impl UsageReport {
    pub fn build(entries: &[UsageLogEntry], today: NaiveDate) -> Self {
        let is_today = |e: &&UsageLogEntry| e.fecha_consulta.date() == today;
        let in_month = |e: &&UsageLogEntry| {
            let d = e.fecha_consulta.date();
            d.year() == today.year() && d.month() == today.month()
        };

        let today_stats = PeriodStats::from_entries(entries.iter().filter(is_today));
        let month_stats = PeriodStats::from_entries(entries.iter().filter(in_month));

        let mut models: HashMap<&str, ModelUsage> = HashMap::new();
        let mut successes = 0usize;
        for e in entries.iter().filter(in_month) {
            let m = models.entry(e.modelo.as_str()).or_insert_with(|| ModelUsage {
                modelo: e.modelo.clone(),
                calls: 0,
                tokens: 0,
                cost: 0.0,
            });
            m.calls += 1;
            m.tokens += e.tokens_usados;
            m.cost += e.costo_estimado;
            if e.exitosa {
                successes += 1;
            }
        }
        let mut by_model: Vec<ModelUsage> = models.into_values().collect();
        by_model.sort_by(|a, b| b.calls.cmp(&a.calls).then_with(|| a.modelo.cmp(&b.modelo)));

        let success_rate = (month_stats.calls > 0)
            .then(|| successes as f64 * 100.0 / month_stats.calls as f64);

        let mut recent = entries.to_vec();
        recent.sort_by(|a, b| b.fecha_consulta.cmp(&a.fecha_consulta));
        recent.truncate(RECENT_LIMIT);

        Self {
            today: today_stats,
            month: month_stats,
            by_model,
            success_rate,
            recent,
        }
    }
}
