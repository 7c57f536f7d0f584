//! Terminal rendering for normalized series.
//!
//! Consumes only the plain symbol -> points mapping, so it can be swapped for
//! any other chart surface without touching the pipeline.

use crate::series::{NormalizedSeries, PricePoint};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

const SPARK_TICKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const COMBINED_SPARK_WIDTH: usize = 40;
const PER_SYMBOL_SPARK_WIDTH: usize = 100;

/// How the rendering collaborator lays out the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    /// One table covering every selected symbol.
    Combined,
    /// One section per selected symbol.
    PerSymbol,
}

/// Renders the selected symbols to stdout. An empty selection prints a
/// notice and draws nothing.
pub fn display(
    series: &NormalizedSeries,
    mode: ChartMode,
    selection: &[String],
    currency: &str,
) {
    let selected = select(series, selection);
    if selected.is_empty() {
        println!(
            "{}",
            style("No symbols selected; nothing to plot.").yellow()
        );
        return;
    }

    match mode {
        ChartMode::Combined => println!("{}", combined_table(&selected, currency)),
        ChartMode::PerSymbol => {
            for (symbol, points) in &selected {
                println!("{}", symbol_section(symbol, points, currency));
            }
        }
    }
}

/// Applies the caller's symbol filter; an empty filter selects everything.
fn select<'a>(
    series: &'a NormalizedSeries,
    selection: &[String],
) -> Vec<(&'a String, &'a Vec<PricePoint>)> {
    series
        .iter()
        .filter(|(symbol, _)| selection.is_empty() || selection.contains(*symbol))
        .collect()
}

fn combined_table(selected: &[(&String, &Vec<PricePoint>)], currency: &str) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Symbol"),
        header_cell("Days"),
        header_cell(&format!("First ({currency})")),
        header_cell(&format!("Last ({currency})")),
        header_cell("Change"),
        header_cell("Trend"),
    ]);

    for (symbol, points) in selected {
        table.add_row(symbol_row(symbol, points));
    }

    format!(
        "{}\n\n{}",
        style(&format!("Daily closes in {currency}")).bold().underlined(),
        table
    )
}

fn symbol_row(symbol: &str, points: &[PricePoint]) -> Vec<Cell> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return vec![
            Cell::new(symbol),
            Cell::new("0").set_alignment(CellAlignment::Right),
            na_cell(),
            na_cell(),
            na_cell(),
            Cell::new(""),
        ];
    };

    let change_pct = if first.close > 0.0 {
        Some((last.close - first.close) / first.close * 100.0)
    } else {
        None
    };

    vec![
        Cell::new(symbol),
        Cell::new(points.len()).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2}", first.close)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2}", last.close)).set_alignment(CellAlignment::Right),
        change_pct.map_or_else(na_cell, change_cell),
        Cell::new(sparkline(points, COMBINED_SPARK_WIDTH)),
    ]
}

fn symbol_section(symbol: &str, points: &[PricePoint], currency: &str) -> String {
    let title = style(symbol).bold().underlined().to_string();
    let Some(first) = points.first() else {
        return format!("{title}\n  (no data)\n");
    };
    // points is non-empty here, so last() is too.
    let last = points.last().unwrap_or(first);
    let min = points.iter().map(|p| p.close).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|p| p.close)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("From"),
        header_cell("To"),
        header_cell(&format!("First ({currency})")),
        header_cell(&format!("Last ({currency})")),
        header_cell("Min"),
        header_cell("Max"),
    ]);
    table.add_row(vec![
        Cell::new(first.date),
        Cell::new(last.date),
        Cell::new(format!("{:.2}", first.close)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2}", last.close)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{min:.2}")).set_alignment(CellAlignment::Right),
        Cell::new(format!("{max:.2}")).set_alignment(CellAlignment::Right),
    ]);

    format!(
        "{title}\n\n{table}\n{}\n",
        sparkline(points, PER_SYMBOL_SPARK_WIDTH)
    )
}

/// Downsamples the series to at most `width` buckets and maps each bucket's
/// mean close onto eight vertical tick levels.
fn sparkline(points: &[PricePoint], width: usize) -> String {
    if points.is_empty() || width == 0 {
        return String::new();
    }

    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    let buckets = bucket_means(&closes, width);

    let min = buckets.iter().copied().fold(f64::INFINITY, f64::min);
    let max = buckets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    buckets
        .iter()
        .map(|&value| {
            let level = if span > 0.0 {
                (((value - min) / span) * (SPARK_TICKS.len() - 1) as f64).round() as usize
            } else {
                0
            };
            SPARK_TICKS[level.min(SPARK_TICKS.len() - 1)]
        })
        .collect()
}

fn bucket_means(values: &[f64], width: usize) -> Vec<f64> {
    if values.len() <= width {
        return values.to_vec();
    }
    (0..width)
        .map(|i| {
            let start = i * values.len() / width;
            let end = ((i + 1) * values.len() / width).max(start + 1);
            let bucket = &values[start..end];
            bucket.iter().sum::<f64>() / bucket.len() as f64
        })
        .collect()
}

fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn change_cell(change: f64) -> Cell {
    let text = format!("{change:+.2}%");
    let color = if change >= 0.0 { Color::Green } else { Color::Red };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}
