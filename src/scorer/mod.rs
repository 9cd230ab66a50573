pub mod diagnostics;
pub mod engine;

pub use diagnostics::{BigramBreakdown, EffortDiagnostics};

use crate::config::MetricsConfig;
use crate::corpus::CorpusStats;
use crate::error::{KeyvolveError, KvResult};
use crate::layout::Layout;
use tracing::debug;

/// Scores candidate layouts against one corpus under one metrics config.
///
/// Construction freezes the corpus statistics into a deterministic iteration
/// order, so repeated evaluation of the same layout always accumulates in
/// the same sequence and returns the same value.
#[derive(Debug)]
pub struct Evaluator {
    metrics: MetricsConfig,
    char_freqs: std::collections::HashMap<char, f64>,
    /// (first, second, frequency), sorted by descending frequency.
    bigrams: Vec<(char, char, f64)>,
}

impl Evaluator {
    pub fn new(stats: &CorpusStats, metrics: MetricsConfig) -> KvResult<Self> {
        if stats.is_empty() {
            return Err(KeyvolveError::InvalidState(
                "corpus statistics are empty; analyze a corpus before evaluating".into(),
            ));
        }

        let char_freqs = stats
            .char_freqs
            .iter()
            .map(|(&c, &n)| (c, n as f64))
            .collect();

        let mut bigrams: Vec<(char, char, f64)> = stats
            .bigram_freqs
            .iter()
            .map(|(&(a, b), &n)| (a, b, n as f64))
            .collect();
        bigrams.sort_by(|x, y| {
            y.2.partial_cmp(&x.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then((x.0, x.1).cmp(&(y.0, y.1)))
        });

        debug!(bigrams = bigrams.len(), "evaluator ready");
        Ok(Self {
            metrics,
            char_freqs,
            bigrams,
        })
    }

    /// Fast path: total effort only. Used inside the generational loop.
    pub fn evaluate(&self, layout: &Layout) -> f64 {
        engine::score_full(self, layout)
    }

    /// Detailed path: total effort plus the top-10 bigram breakdowns.
    /// The returned total is identical to [`Evaluator::evaluate`].
    pub fn evaluate_detailed(&self, layout: &Layout) -> (f64, EffortDiagnostics) {
        engine::score_detailed(self, layout)
    }

    pub fn metrics(&self) -> &MetricsConfig {
        &self.metrics
    }

    pub(crate) fn char_freq(&self, c: char) -> f64 {
        self.char_freqs.get(&c).copied().unwrap_or(0.0)
    }

    pub(crate) fn bigrams(&self) -> &[(char, char, f64)] {
        &self.bigrams
    }
}
