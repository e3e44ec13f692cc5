//! Human-readable and serialized renderings of a [`Report`].

use std::{
    fmt::Write as _,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    correlation::CorrelationMatrix,
    data::format_number,
    insights::Insight,
    profile::Report,
    recommend::Recommendation,
    stats::{ColumnProfile, ColumnSummary},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

pub fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut rendered =
                serde_json::to_string_pretty(value).context("Serializing output as JSON")?;
            rendered.push('\n');
            Ok(rendered)
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Serializing output as YAML"),
        OutputFormat::Table => anyhow::bail!("Table output is only available for reports"),
    }
}

/// Writes to `path`, or stdout when no path (or `-`) is given.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(p) if p != Path::new("-") => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout().lock()),
    };
    writer
        .write_all(contents.as_bytes())
        .context("Writing output")?;
    writer.flush().context("Flushing output")
}

pub fn render_report(report: &Report) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Rows: {}  Columns: {}",
        report.row_count, report.column_count
    );
    if report.columns.is_empty() {
        return output;
    }
    let _ = writeln!(output, "\n{}", render_columns(&report.columns));
    if let Some(matrix) = &report.correlation_matrix {
        let _ = writeln!(output, "Correlation matrix\n{}", render_matrix(matrix));
    }
    let _ = writeln!(output, "Insights\n{}", render_insights(&report.insights));
    let _ = write!(
        output,
        "Recommendations\n{}",
        render_recommendations(&report.recommendations)
    );
    output
}

pub fn render_columns(columns: &[ColumnProfile]) -> String {
    let rows = columns
        .iter()
        .map(|column| {
            vec![
                column.name.clone(),
                column.inferred_type().to_string(),
                column.missing_count.to_string(),
                describe_summary(&column.summary),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&["column", "type", "missing", "summary"], &rows)
}

fn describe_summary(summary: &ColumnSummary) -> String {
    match summary {
        ColumnSummary::Numeric(s) => {
            let mut parts = vec![
                format!("min={}", format_metric(s.min)),
                format!("max={}", format_metric(s.max)),
                format!("mean={}", format_metric(s.mean)),
                format!("median={}", format_metric(s.median)),
                format!("unique={}", s.unique_count),
            ];
            if let Some(std) = s.std {
                parts.push(format!("std={}", format_metric(std)));
            }
            if let Some(distribution) = &s.distribution {
                parts.push(format!(
                    "skew={:.2} kurt={:.2}",
                    distribution.skewness, distribution.kurtosis
                ));
            }
            parts.join(" ")
        }
        ColumnSummary::Categorical(s) => {
            let top = s
                .top_values
                .iter()
                .map(|vc| format!("{} ({})", vc.value, vc.count))
                .join(", ");
            format!("unique={} top: {top}", s.unique_count)
        }
        ColumnSummary::Date(s) => format!(
            "{} .. {}{}",
            s.min.format("%Y-%m-%d %H:%M:%S"),
            s.max.format("%Y-%m-%d %H:%M:%S"),
            if s.sequence.has_gaps { " (gaps)" } else { "" }
        ),
        ColumnSummary::Empty => String::new(),
    }
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value)
    } else {
        format!("{value:.4}")
    }
}

pub fn render_insights(insights: &[Insight]) -> String {
    let rows = insights
        .iter()
        .map(|insight| {
            vec![
                insight.kind().to_string(),
                insight.column().unwrap_or("-").to_string(),
                insight.message().to_string(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&["insight", "column", "message"], &rows)
}

pub fn render_recommendations(recommendations: &[Recommendation]) -> String {
    let rows = recommendations
        .iter()
        .map(|rec| {
            let bindings = &rec.suggested_bindings;
            vec![
                rec.chart_type.to_string(),
                rec.suitability.to_string(),
                bindings.x.clone().unwrap_or_default(),
                bindings.y.clone().unwrap_or_default(),
                bindings
                    .columns
                    .as_ref()
                    .map(|columns| columns.join(","))
                    .unwrap_or_default(),
                rec.message.clone(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&["chart", "suitability", "x", "y", "columns", "message"], &rows)
}

pub fn render_matrix(matrix: &CorrelationMatrix) -> String {
    let headers = std::iter::once("")
        .chain(matrix.columns.iter().map(String::as_str))
        .collect::<Vec<_>>();
    let rows = matrix
        .columns
        .iter()
        .zip(&matrix.values)
        .map(|(name, values)| {
            std::iter::once(name.clone())
                .chain(values.iter().map(|v| format!("{v:.2}")))
                .collect()
        })
        .collect::<Vec<Vec<String>>>();
    render_table(&headers, &rows)
}

/// Renders an aligned plain-text table with a dashed separator under the header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(&flatten_cell(cell)));
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    push_line(&mut output, &header_cells, &widths);
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    push_line(&mut output, &separator, &widths);
    for row in rows {
        push_line(&mut output, row, &widths);
    }
    output
}

fn push_line(output: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let mut cell = flatten_cell(cell);
            let padding = width.saturating_sub(display_width(&cell));
            cell.push_str(&" ".repeat(padding));
            cell
        })
        .join("  ");
    let _ = writeln!(output, "{}", line.trim_end());
}

/// Visible width in characters; ANSI colour sequences (`\x1b[...m`) take no space.
fn display_width(value: &str) -> usize {
    let mut width = 0;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn flatten_cell(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}
