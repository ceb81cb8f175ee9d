//! Browsing what the backend learned: intent patterns by page, training
//! runs, and the GPT knowledge cache.

use std::collections::BTreeSet;

use kairos_types::learning::{CachedKnowledge, LearnedPattern, LearningExport, TrainingRun};

use crate::history::mean;

pub const PATTERNS_PER_PAGE: usize = 20;
pub const TRAINING_LIMIT: usize = 10;
pub const KNOWLEDGE_LIMIT: usize = 100;

/// How a confidence ratio is colored in the listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn of(ratio: f64) -> Self {
        if ratio >= 0.8 {
            Self::High
        } else if ratio >= 0.6 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternStats {
    pub total_patrones: usize,
    /// Sum of `veces_visto`
    pub total_veces: u64,
    pub confianza_promedio: Option<f64>,
}

/// One page of patterns, optionally narrowed to a single intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternPage {
    /// Most seen first, then newest
    pub rows: Vec<LearnedPattern>,
    /// 1-based, clamped into `1..=total_pages`
    pub page: usize,
    pub total_pages: usize,
    /// Patterns matching the intent filter
    pub matching: usize,
    /// Over every pattern, ignoring the filter
    pub stats: PatternStats,
    /// Distinct intents for the filter dropdown, sorted
    pub intenciones: Vec<String>,
    /// Newest first, at most `TRAINING_LIMIT`
    pub entrenamientos: Vec<TrainingRun>,
}

impl PatternPage {
    pub fn build(export: &LearningExport, intencion: Option<&str>, page: usize) -> Self {
        let patterns = &export.patrones;
        let confidences: Vec<f64> = patterns.iter().map(|p| p.confianza).collect();
        let stats = PatternStats {
            total_patrones: patterns.len(),
            total_veces: patterns.iter().map(|p| p.veces_visto).sum(),
            confianza_promedio: mean(&confidences),
        };

        let intenciones: Vec<String> = patterns
            .iter()
            .map(|p| p.intencion_detectada.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let intencion = intencion.filter(|i| !i.is_empty());
        let mut matching: Vec<&LearnedPattern> = patterns
            .iter()
            .filter(|p| intencion.is_none_or(|i| p.intencion_detectada == i))
            .collect();
        matching.sort_by(|a, b| {
            b.veces_visto
                .cmp(&a.veces_visto)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total_pages = matching.len().div_ceil(PATTERNS_PER_PAGE).max(1);
        let page = page.clamp(1, total_pages);
        let rows = matching
            .iter()
            .skip((page - 1) * PATTERNS_PER_PAGE)
            .take(PATTERNS_PER_PAGE)
            .map(|p| (*p).clone())
            .collect();

        let mut entrenamientos = export.entrenamientos.clone();
        entrenamientos.sort_by(|a, b| b.fecha.cmp(&a.fecha));
        entrenamientos.truncate(TRAINING_LIMIT);

        Self {
            rows,
            page,
            total_pages,
            matching: matching.len(),
            stats,
            intenciones,
            entrenamientos,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeView {
    /// Newest first, at most `KNOWLEDGE_LIMIT`
    pub rows: Vec<CachedKnowledge>,
    pub total: usize,
    /// Sum of `veces_usado`
    pub total_usos: u64,
    /// Mean token cost per cached answer, in USD
    pub costo_promedio: Option<f64>,
}

impl KnowledgeView {
    pub fn build(entries: &[CachedKnowledge]) -> Self {
        let costs: Vec<f64> = entries.iter().map(|k| k.costo_tokens).collect();
        let mut rows = entries.to_vec();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        rows.truncate(KNOWLEDGE_LIMIT);
        Self {
            rows,
            total: entries.len(),
            total_usos: entries.iter().map(|k| k.veces_usado).sum(),
            costo_promedio: mean(&costs),
        }
    }
}
