use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::AssetMetricRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// `$1,234.56`. Negative values render as `$-1,234.56`.
pub fn format_currency(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("${sign}{grouped}.{f}"),
        None => format!("${sign}{grouped}"),
    }
}

// ── Writers ──────────────────────────────────────────────────────────

pub fn write_csv<T: Serialize, W: Write>(out: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, W: Write>(mut out: W, rows: &[T]) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, rows)?;
    writeln!(out)?;
    Ok(())
}

const COLUMNS: [&str; 10] = [
    "PROTOCOL", "NETWORK", "SYMBOL", "TVL", "DEBT", "UTIL%", "LEND APY%", "BORROW APY%", "SPREAD%",
    "LTV%",
];

pub fn write_table<W: Write>(mut out: W, records: &[AssetMetricRecord]) -> Result<()> {
    let rows: Vec<[String; 10]> = records
        .iter()
        .map(|r| {
            [
                r.protocol.to_string(),
                r.network.clone(),
                r.symbol.clone(),
                format!("{:.2}", r.tvl),
                format!("{:.2}", r.total_variable_debt),
                format!("{:.2}", r.utilization_rate_percent),
                format!("{:.2}", r.lending_apy_percent),
                format!("{:.2}", r.variable_borrow_apy_percent),
                format!("{:.2}", r.spread_percent),
                format!("{:.2}", r.ltv_percent),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let header: Vec<String> = COLUMNS
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (c, w))| pad(c, w, i >= 3))
        .collect();
    writeln!(out, "{}", header.join("  "))?;
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (c, w))| pad(c, w, i >= 3))
            .collect();
        writeln!(out, "{}", line.join("  "))?;
    }
    Ok(())
}

fn pad(s: &str, width: usize, right: bool) -> String {
    if right {
        format!("{s:>width$}")
    } else {
        format!("{s:<width$}")
    }
}

/// Write `records` in `format` to `path`, or stdout when `path` is `None`.
pub fn emit(records: &[AssetMetricRecord], format: OutputFormat, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            write_to(std::io::BufWriter::new(file), records, format)
        }
        None => write_to(std::io::stdout().lock(), records, format),
    }
}

fn write_to<W: Write>(out: W, records: &[AssetMetricRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(out, records),
        OutputFormat::Csv => write_csv(out, records),
        OutputFormat::Json => write_json(out, records),
    }
}
