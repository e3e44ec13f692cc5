//! Chart recommendations driven purely by the inferred column types.
//!
//! Rules are evaluated in a fixed priority order and each one is gated on its
//! own, so several charts usually fire for the same dataset. "First" always
//! means earliest in the dataset's column order.

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    config::ProfileOptions,
    data::Dataset,
    inference::{InferredType, TypeMap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Scatter,
    Pie,
    Donut,
    Area,
    Histogram,
    Boxplot,
    Violin,
    Heatmap,
}

impl ChartType {
    /// Every chart the dashboard can render.
    pub const ALL: [ChartType; 10] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Scatter,
        ChartType::Pie,
        ChartType::Donut,
        ChartType::Area,
        ChartType::Histogram,
        ChartType::Boxplot,
        ChartType::Violin,
        ChartType::Heatmap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Scatter => "scatter",
            ChartType::Pie => "pie",
            ChartType::Donut => "donut",
            ChartType::Area => "area",
            ChartType::Histogram => "histogram",
            ChartType::Boxplot => "boxplot",
            ChartType::Violin => "violin",
            ChartType::Heatmap => "heatmap",
        }
    }

    /// Charts plotted from a single column need no y binding.
    pub fn is_single_axis(&self) -> bool {
        matches!(self, ChartType::Histogram)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        ChartType::ALL
            .into_iter()
            .find(|chart| chart.as_str() == lowered || (lowered == "box" && *chart == ChartType::Boxplot))
            .ok_or_else(|| format!("Unknown chart type '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suitability {
    High,
    Medium,
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Suitability::High => "high",
            Suitability::Medium => "medium",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl Bindings {
    fn xy(x: &str, y: &str) -> Self {
        Self {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            columns: None,
        }
    }

    fn x_only(x: &str) -> Self {
        Self {
            x: Some(x.to_string()),
            ..Self::default()
        }
    }

    fn columns(columns: &[&str]) -> Self {
        Self {
            columns: Some(columns.iter().map(|c| c.to_string()).collect()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub chart_type: ChartType,
    pub suitability: Suitability,
    pub suggested_bindings: Bindings,
    pub message: String,
}

impl Recommendation {
    fn new(chart_type: ChartType, suitability: Suitability, bindings: Bindings, message: String) -> Self {
        Self {
            chart_type,
            suitability,
            suggested_bindings: bindings,
            message,
        }
    }
}

fn distinct_values(dataset: &Dataset, column: &str) -> usize {
    dataset
        .column_values(column)
        .into_iter()
        .filter(|cell| !cell.is_blank())
        .map(|cell| cell.as_display())
        .collect::<HashSet<_>>()
        .len()
}

pub fn recommend(dataset: &Dataset, types: &TypeMap, options: &ProfileOptions) -> Vec<Recommendation> {
    let numeric = types.columns_of(InferredType::Numeric);
    let categorical = types.columns_of(InferredType::Categorical);
    let first_date = types.first_of(InferredType::Date);
    let mut recommendations = Vec::new();

    let Some(&first_numeric) = numeric.first() else {
        return recommendations;
    };

    if let Some(&x) = categorical.first() {
        recommendations.push(Recommendation::new(
            ChartType::Bar,
            Suitability::High,
            Bindings::xy(x, first_numeric),
            format!("Bar chart comparing '{first_numeric}' across '{x}' categories"),
        ));
    }

    let pie_column = categorical.iter().find_map(|&column| {
        let distinct = distinct_values(dataset, column);
        (distinct <= options.pie_max_categories).then_some((column, distinct))
    });
    if let Some((x, distinct)) = pie_column {
        recommendations.push(Recommendation::new(
            ChartType::Pie,
            Suitability::Medium,
            Bindings::xy(x, first_numeric),
            format!("Pie chart showing the share of '{first_numeric}' across {distinct} '{x}' categories"),
        ));
    }

    if let Some(x) = first_date {
        recommendations.push(Recommendation::new(
            ChartType::Line,
            Suitability::High,
            Bindings::xy(x, first_numeric),
            format!("Line chart tracking '{first_numeric}' over '{x}'"),
        ));
    }

    if let [x, y, ..] = numeric.as_slice() {
        recommendations.push(Recommendation::new(
            ChartType::Scatter,
            Suitability::High,
            Bindings::xy(x, y),
            format!("Scatter plot exploring the relationship between '{x}' and '{y}'"),
        ));
    }

    recommendations.push(Recommendation::new(
        ChartType::Histogram,
        Suitability::High,
        Bindings::x_only(first_numeric),
        format!("Histogram showing the distribution of '{first_numeric}'"),
    ));

    if let Some(&x) = categorical.first() {
        recommendations.push(Recommendation::new(
            ChartType::Boxplot,
            Suitability::Medium,
            Bindings::xy(x, first_numeric),
            format!("Box plot comparing the spread of '{first_numeric}' across '{x}'"),
        ));
    }

    if numeric.len() >= 3 {
        let columns = &numeric[..numeric.len().min(options.heatmap_max_columns)];
        recommendations.push(Recommendation::new(
            ChartType::Heatmap,
            Suitability::Medium,
            Bindings::columns(columns),
            format!("Heatmap of correlations between {} numeric columns", columns.len()),
        ));
    }

    recommendations
}
