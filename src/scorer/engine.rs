//! Effort computation passes.
//!
//! `score_full` is the optimizer's fast path, `score_detailed` the reporting
//! path; both accumulate the identical terms in the identical order.

use super::diagnostics::{BigramBreakdown, EffortDiagnostics};
use super::Evaluator;
use crate::config::PreferredPattern;
use crate::layout::{Layout, COLS, ROWS};

/// Base effort cost per grid position. Process-lifetime constant.
pub const EFFORT_MATRIX: [[f64; COLS]; ROWS] = [
    [4.0, 2.0, 2.0, 3.0, 4.0, 5.0, 3.0, 2.0, 2.0, 4.0],
    [1.5, 1.0, 1.0, 1.0, 3.0, 3.0, 1.0, 1.0, 1.0, 1.5],
    [4.0, 4.0, 3.0, 2.0, 5.0, 3.0, 2.0, 3.0, 4.0, 4.0],
];

/// Finger zone per column, identical for all rows. Index columns 3/4 and
/// 5/6 share a finger (index-finger reach columns).
pub const FINGER_ZONES: [u8; COLS] = [0, 1, 2, 3, 3, 4, 4, 5, 6, 7];

/// Row-switch penalty by absolute row difference.
const ROW_SWITCH_PENALTY: [f64; ROWS] = [0.0, 0.05, 0.10];

const SAME_FINGER_CAP: f64 = 3.0;

/// Effort-matrix lookup. Out-of-range rows/columns are a programming
/// defect, not input data; the slice index panics accordingly.
#[inline]
pub fn effort_at(row: usize, col: usize) -> f64 {
    EFFORT_MATRIX[row][col]
}

#[inline]
fn row_col(flat: usize) -> (usize, usize) {
    (flat / COLS, flat % COLS)
}

#[inline]
fn is_left_hand(col: usize) -> bool {
    col < COLS / 2
}

#[inline]
fn pos_of(map: &[u8; 256], c: char) -> Option<usize> {
    let code = c as u32;
    if code < 256 {
        let p = map[code as usize];
        if p != 255 {
            return Some(p as usize);
        }
    }
    None
}

/// Same-finger distance penalty for one bigram occurrence:
/// `min(1 + dist/10, 3)` when both symbols sit in the same finger zone.
fn same_finger_penalty(p1: usize, p2: usize) -> f64 {
    let (r1, c1) = row_col(p1);
    let (r2, c2) = row_col(p2);
    if FINGER_ZONES[c1] != FINGER_ZONES[c2] {
        return 0.0;
    }
    let dr = r1 as f64 - r2 as f64;
    let dc = c1 as f64 - c2 as f64;
    let dist = (dr * dr + dc * dc).sqrt();
    (1.0 + dist / 10.0).min(SAME_FINGER_CAP)
}

/// Hand-alternation reward for one bigram occurrence (negative: it reduces
/// the total). Mean of the two position efforts, scaled down by 25.
fn alternation_reward(p1: usize, p2: usize) -> f64 {
    let (r1, c1) = row_col(p1);
    let (r2, c2) = row_col(p2);
    if is_left_hand(c1) == is_left_hand(c2) {
        return 0.0;
    }
    -((effort_at(r1, c1) + effort_at(r2, c2)) / 2.0 / 25.0)
}

fn row_switch_penalty(p1: usize, p2: usize) -> f64 {
    let (r1, _) = row_col(p1);
    let (r2, _) = row_col(p2);
    ROW_SWITCH_PENALTY[r1.abs_diff(r2)]
}

/// `1 + 0.5 * |left - right| / (left + right)` over per-hand frequency
/// totals; 1.0 for an empty total.
fn hand_balance_multiplier(ev: &Evaluator, layout: &Layout) -> f64 {
    let mut left = 0.0;
    let mut right = 0.0;
    for row in 0..ROWS {
        for col in 0..COLS {
            let freq = ev.char_freq(layout.symbol_at(row, col) as char);
            if is_left_hand(col) {
                left += freq;
            } else {
                right += freq;
            }
        }
    }
    let total = left + right;
    if total == 0.0 {
        return 1.0;
    }
    1.0 + 0.5 * ((left - right).abs() / total)
}

fn base_effort(ev: &Evaluator, layout: &Layout) -> f64 {
    let mut total = 0.0;
    for row in 0..ROWS {
        for col in 0..COLS {
            total += effort_at(row, col) * ev.char_freq(layout.symbol_at(row, col) as char);
        }
    }
    total
}

pub fn score_full(ev: &Evaluator, layout: &Layout) -> f64 {
    let metrics = ev.metrics();
    let pos_map = layout.pos_map();
    let mut total = base_effort(ev, layout);

    // Bigram terms. A symbol absent from the grid contributes zero.
    for &(a, b, freq) in ev.bigrams() {
        let (Some(p1), Some(p2)) = (pos_of(&pos_map, a), pos_of(&pos_map, b)) else {
            continue;
        };
        if metrics.distance_penalty {
            total += same_finger_penalty(p1, p2) * freq;
        }
        if metrics.pattern == PreferredPattern::PreferAlternations {
            total += alternation_reward(p1, p2) * freq;
        }
        if metrics.row_switch_penalty {
            total += row_switch_penalty(p1, p2) * freq;
        }
    }

    if metrics.hand_balance_penalty {
        total *= hand_balance_multiplier(ev, layout);
    }
    total
}

pub fn score_detailed(ev: &Evaluator, layout: &Layout) -> (f64, EffortDiagnostics) {
    let metrics = ev.metrics();
    let pos_map = layout.pos_map();
    let mut total = base_effort(ev, layout);
    let mut records = Vec::with_capacity(ev.bigrams().len());

    for &(a, b, freq) in ev.bigrams() {
        let (Some(p1), Some(p2)) = (pos_of(&pos_map, a), pos_of(&pos_map, b)) else {
            continue;
        };
        let penalty = if metrics.distance_penalty {
            same_finger_penalty(p1, p2) * freq
        } else {
            0.0
        };
        let reward = if metrics.pattern == PreferredPattern::PreferAlternations {
            alternation_reward(p1, p2) * freq
        } else {
            0.0
        };
        let row_switch = if metrics.row_switch_penalty {
            row_switch_penalty(p1, p2) * freq
        } else {
            0.0
        };

        total += penalty;
        total += reward;
        total += row_switch;

        records.push(BigramBreakdown {
            bigram: format!("{}{}", a, b),
            frequency: freq as u64,
            penalty,
            reward,
            row_switch,
        });
    }

    let multiplier = if metrics.hand_balance_penalty {
        let m = hand_balance_multiplier(ev, layout);
        total *= m;
        m
    } else {
        1.0
    };

    (total, EffortDiagnostics::from_records(records, multiplier))
}
