//! Per-bigram effort breakdowns, for observability only.

use serde::Serialize;

const TOP_N: usize = 10;

/// One bigram's contribution to the total effort.
#[derive(Debug, Clone, Serialize)]
pub struct BigramBreakdown {
    pub bigram: String,
    pub frequency: u64,
    /// Same-finger distance contribution (>= 0).
    pub penalty: f64,
    /// Hand-alternation contribution (<= 0).
    pub reward: f64,
    /// Row-switch contribution (>= 0).
    pub row_switch: f64,
}

/// Top-10 bigrams by each contribution class, plus the hand-balance
/// multiplier that was applied. Never feeds back into the effort value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EffortDiagnostics {
    pub top_penalties: Vec<BigramBreakdown>,
    pub top_rewards: Vec<BigramBreakdown>,
    pub top_row_switches: Vec<BigramBreakdown>,
    pub hand_balance_multiplier: f64,
}

impl EffortDiagnostics {
    pub fn from_records(records: Vec<BigramBreakdown>, hand_balance_multiplier: f64) -> Self {
        let top_by = |key: fn(&BigramBreakdown) -> f64, ascending: bool| {
            let mut sorted = records.clone();
            sorted.sort_by(|a, b| {
                let ord = key(a)
                    .partial_cmp(&key(b))
                    .unwrap_or(std::cmp::Ordering::Equal);
                if ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
            sorted.truncate(TOP_N);
            sorted
        };

        Self {
            top_penalties: top_by(|r| r.penalty, false),
            // Rewards are negative; ascending order puts the strongest first.
            top_rewards: top_by(|r| r.reward, true),
            top_row_switches: top_by(|r| r.row_switch, false),
            hand_balance_multiplier,
        }
    }
}
