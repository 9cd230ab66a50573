use keyvolve::config::{MetricsConfig, PreferredPattern};
use keyvolve::corpus::CorpusStats;
use keyvolve::error::KeyvolveError;
use keyvolve::layout::Layout;
use keyvolve::scorer::Evaluator;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn empty_corpus_is_rejected() {
    let stats = CorpusStats::analyze("   \n\t ");
    let err = Evaluator::new(&stats, MetricsConfig::default()).unwrap_err();
    assert!(matches!(err, KeyvolveError::InvalidState(_)));
}

// Corpus "ab" on QWERTY: A sits at row 1 col 0 (effort 1.5), B at row 2
// col 4 (effort 5.0). The single bigram AB stays on the left hand, changes
// row by one and uses two different fingers, and the whole load is on the
// left hand.
#[test]
fn hand_computed_total_for_a_two_key_corpus() {
    let stats = CorpusStats::analyze("ab");
    let qwerty = Layout::qwerty();

    let ev = Evaluator::new(&stats, MetricsConfig::default()).unwrap();
    // (1.5 + 5.0 + 0.05) * 1.5 hand-balance multiplier.
    assert!(close(ev.evaluate(&qwerty), 6.55 * 1.5));

    let base_only = MetricsConfig {
        distance_penalty: false,
        row_switch_penalty: false,
        hand_balance_penalty: false,
        pattern: PreferredPattern::NoPreference,
    };
    let ev = Evaluator::new(&stats, base_only).unwrap();
    assert!(close(ev.evaluate(&qwerty), 6.5));
}

#[test]
fn alternation_reward_lowers_cross_hand_bigrams() {
    // A (row 1 col 0, effort 1.5) and J (row 1 col 6, effort 1.0) are on
    // opposite hands, so the reward is -(1.5 + 1.0) / 2 / 25 = -0.05.
    let stats = CorpusStats::analyze("aj");
    let qwerty = Layout::qwerty();

    let plain = MetricsConfig {
        hand_balance_penalty: false,
        ..Default::default()
    };
    let rewarded = MetricsConfig {
        hand_balance_penalty: false,
        pattern: PreferredPattern::PreferAlternations,
        ..Default::default()
    };
    let without = Evaluator::new(&stats, plain).unwrap().evaluate(&qwerty);
    let with = Evaluator::new(&stats, rewarded).unwrap().evaluate(&qwerty);
    assert!(close(without - with, 0.05));
}

#[test]
fn whitespace_breaks_bigram_adjacency() {
    let split = CorpusStats::analyze("a b");
    let joined = CorpusStats::analyze("ab");
    assert!(split.bigram_freqs.is_empty());
    assert_eq!(joined.bigram_freqs.len(), 1);
}

#[test]
fn detailed_total_matches_fast_path() {
    let stats = CorpusStats::analyze(
        "the quick brown fox jumps over the lazy dog; pack my box with five dozen jugs.",
    );
    let ev = Evaluator::new(&stats, MetricsConfig::default()).unwrap();
    let mut rng = fastrand::Rng::with_seed(71);
    for _ in 0..20 {
        let layout = Layout::random(&mut rng);
        let fast = ev.evaluate(&layout);
        let (detailed, _) = ev.evaluate_detailed(&layout);
        assert!(close(fast, detailed));
    }
}

#[test]
fn evaluation_is_deterministic_across_evaluators() {
    let text = "lorem ipsum dolor sit amet, consectetur adipiscing elit";
    let layout = Layout::qwerty();
    let a = Evaluator::new(&CorpusStats::analyze(text), MetricsConfig::default())
        .unwrap()
        .evaluate(&layout);
    let b = Evaluator::new(&CorpusStats::analyze(text), MetricsConfig::default())
        .unwrap()
        .evaluate(&layout);
    assert_eq!(a, b);
}

#[test]
fn diagnostics_surface_the_worst_same_finger_bigram() {
    // ED is a classic QWERTY same-finger bigram (column 2, rows 0 and 1).
    let stats = CorpusStats::analyze("ededededed");
    let ev = Evaluator::new(&stats, MetricsConfig::default()).unwrap();
    let (_, diagnostics) = ev.evaluate_detailed(&Layout::qwerty());
    assert!(!diagnostics.top_penalties.is_empty());
    let top = &diagnostics.top_penalties[0];
    assert!(top.bigram == "ED" || top.bigram == "DE");
    assert!(top.penalty > 0.0);
}

#[test]
fn symbols_missing_from_the_grid_contribute_nothing() {
    // Digits are counted by the analyzer but have no key to land on.
    let with_digits = CorpusStats::analyze("ab12345");
    let without = CorpusStats::analyze("ab");
    let qwerty = Layout::qwerty();
    let base_only = MetricsConfig {
        hand_balance_penalty: false,
        ..Default::default()
    };
    let a = Evaluator::new(&with_digits, base_only.clone()).unwrap().evaluate(&qwerty);
    let b = Evaluator::new(&without, base_only).unwrap().evaluate(&qwerty);
    assert!(close(a, b));
}
