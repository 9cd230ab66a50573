use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use keyvolve::corpus::CorpusStats;
use keyvolve::layout::Layout;
use keyvolve::optimizer::EvolutionOutcome;
use keyvolve::scorer::{BigramBreakdown, EffortDiagnostics};

pub fn print_layout_grid(title: &str, layout: &Layout) {
    println!("\n{}: {}", title, layout);
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    for row in layout.rows() {
        let cells: Vec<Cell> = row
            .iter()
            .map(|&b| Cell::new((b as char).to_string()).set_alignment(CellAlignment::Center))
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

pub fn print_search_summary(outcome: &EvolutionOutcome) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Best effort").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.4}", outcome.best_effort)).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("Generations run"),
        Cell::new(outcome.generations_run.to_string()),
    ]);
    table.add_row(vec![Cell::new("Seed"), Cell::new(outcome.seed.to_string())]);
    println!("\n{}", table);
}

/// Best-effort progression, thinned to at most 20 rows for long runs.
pub fn print_history(history: &[f64]) {
    if history.is_empty() {
        return;
    }
    let step = (history.len() / 20).max(1);
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![
        Cell::new("Generation").add_attribute(Attribute::Bold),
        Cell::new("Best effort").add_attribute(Attribute::Bold),
    ]);
    for (i, effort) in history.iter().enumerate() {
        if i % step == 0 || i == history.len() - 1 {
            table.add_row(vec![
                Cell::new((i + 1).to_string()).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.4}", effort)).set_alignment(CellAlignment::Right),
            ]);
        }
    }
    println!("\n{}", table);
}

pub fn print_diagnostics(diagnostics: &EffortDiagnostics) {
    print_bigram_table(
        "Worst same-finger bigrams",
        &diagnostics.top_penalties,
        |r| r.penalty,
        Color::Red,
    );
    print_bigram_table(
        "Best hand alternations",
        &diagnostics.top_rewards,
        |r| r.reward,
        Color::Green,
    );
    print_bigram_table(
        "Worst row switches",
        &diagnostics.top_row_switches,
        |r| r.row_switch,
        Color::Yellow,
    );
    println!(
        "\nHand balance multiplier: {:.4}",
        diagnostics.hand_balance_multiplier
    );
}

fn print_bigram_table(
    title: &str,
    rows: &[BigramBreakdown],
    value: fn(&BigramBreakdown) -> f64,
    color: Color,
) {
    if rows.is_empty() {
        return;
    }
    println!("\n{}", title);
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![
        Cell::new("Bigram").add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
        Cell::new("Contribution").add_attribute(Attribute::Bold),
    ]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.bigram).set_alignment(CellAlignment::Center),
            Cell::new(row.frequency.to_string()).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", value(row)))
                .set_alignment(CellAlignment::Right)
                .fg(color),
        ]);
    }
    println!("{}", table);
}

/// Character frequencies, most common first.
pub fn print_corpus_report(stats: &CorpusStats) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![
        Cell::new("Symbol").add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
        Cell::new("%").add_attribute(Attribute::Bold),
    ]);
    for (symbol, count, pct) in stats.frequency_rows() {
        table.add_row(vec![
            Cell::new(symbol.to_string()).set_alignment(CellAlignment::Center),
            Cell::new(count.to_string()).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", pct)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\nCorpus: {} scored characters", stats.total_chars());
    println!("{}", table);
}
