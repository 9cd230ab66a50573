use clap::Args;

use keyvolve::config::MetricsOptions;
use keyvolve::corpus::CorpusStats;
use keyvolve::error::KvResult;
use keyvolve::layout::Layout;
use keyvolve::scorer::Evaluator;

use crate::reports;

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// The 30 symbols of the layout, rows left to right, top to bottom.
    /// Defaults to QWERTY.
    #[arg(long, default_value = "QWERTYUIOPASDFGHJKL;ZXCVBNM,./")]
    pub layout: String,

    #[command(flatten)]
    pub metrics: MetricsOptions,
}

pub fn run(args: EvaluateArgs, stats: CorpusStats, json: bool) -> KvResult<()> {
    let layout = Layout::parse(&args.layout)?;
    let evaluator = Evaluator::new(&stats, args.metrics.resolve()?)?;
    let (effort, diagnostics) = evaluator.evaluate_detailed(&layout);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "layout": layout,
                "effort": effort,
                "diagnostics": diagnostics,
            }))?
        );
    } else {
        reports::print_layout_grid("Layout", &layout);
        println!("\nTotal effort: {effort:.4}");
        reports::print_diagnostics(&diagnostics);
        reports::print_corpus_report(&stats);
    }
    Ok(())
}
