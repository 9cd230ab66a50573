use clap::{Parser, Subcommand};
use std::fs;
use std::process;

use keyvolve::corpus::CorpusStats;
use keyvolve::error::KvResult;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the corpus text the layouts are scored against
    #[arg(global = true, short, long, default_value = "data/corpus.txt")]
    corpus: String,

    /// Emit machine-readable JSON instead of tables
    #[arg(global = true, long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve a layout against the corpus
    Search(cmd::search::SearchArgs),
    /// Score one layout and show its effort breakdown
    Evaluate(cmd::evaluate::EvaluateArgs),
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn dispatch(cli: Cli) -> KvResult<()> {
    let text = fs::read_to_string(&cli.corpus)?;
    let stats = CorpusStats::analyze(&text);

    match cli.command {
        Commands::Search(args) => cmd::search::run(args, stats, cli.json),
        Commands::Evaluate(args) => cmd::evaluate::run(args, stats, cli.json),
    }
}
