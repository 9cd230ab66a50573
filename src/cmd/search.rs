use clap::Args;
use std::sync::Arc;
use tracing::info;

use keyvolve::config::{MetricsOptions, SearchOptions};
use keyvolve::corpus::CorpusStats;
use keyvolve::error::KvResult;
use keyvolve::optimizer::runner;
use keyvolve::scorer::Evaluator;

use crate::reports;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub search: SearchOptions,

    #[command(flatten)]
    pub metrics: MetricsOptions,

    /// Print the corpus character frequency table before searching
    #[arg(long, default_value_t = false)]
    pub report_corpus: bool,
}

pub fn run(args: SearchArgs, stats: CorpusStats, json: bool) -> KvResult<()> {
    let metrics = args.metrics.resolve()?;
    let params = args.search.resolve()?;
    let evaluator = Arc::new(Evaluator::new(&stats, metrics)?);

    if args.report_corpus && !json {
        reports::print_corpus_report(&stats);
    }

    let handle = runner::spawn(Arc::clone(&evaluator), params);
    for snapshot in &handle.snapshots {
        info!("{}", snapshot.status);
    }
    let outcome = handle.join()?;

    if json {
        let (_, diagnostics) = evaluator.evaluate_detailed(&outcome.best_layout);
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "outcome": outcome,
                "diagnostics": diagnostics,
            }))?
        );
    } else {
        let (_, diagnostics) = evaluator.evaluate_detailed(&outcome.best_layout);
        reports::print_layout_grid("Best layout", &outcome.best_layout);
        reports::print_search_summary(&outcome);
        reports::print_history(&outcome.effort_history);
        reports::print_diagnostics(&diagnostics);
    }
    Ok(())
}
