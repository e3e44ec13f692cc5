//! Qualitative findings derived from the column profiles.
//!
//! Rules run per column in column order; the correlation insight, when any
//! pair qualifies, is always appended last.

use serde::{Deserialize, Serialize};

use crate::{
    config::ProfileOptions,
    correlation::CorrelationPair,
    stats::{ColumnProfile, ColumnSummary},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Insight {
    Outliers {
        column: String,
        count: usize,
        message: String,
    },
    Constant {
        column: String,
        value: String,
        message: String,
    },
    CategoricalGroupable {
        column: String,
        unique_count: usize,
        message: String,
    },
    TimeSeries {
        column: String,
        has_gaps: bool,
        message: String,
    },
    Correlation {
        pairs: Vec<CorrelationPair>,
        message: String,
    },
}

impl Insight {
    pub fn kind(&self) -> &'static str {
        match self {
            Insight::Outliers { .. } => "outliers",
            Insight::Constant { .. } => "constant",
            Insight::CategoricalGroupable { .. } => "categorical_groupable",
            Insight::TimeSeries { .. } => "time_series",
            Insight::Correlation { .. } => "correlation",
        }
    }

    /// The column an insight is about; `None` for cross-column insights.
    pub fn column(&self) -> Option<&str> {
        match self {
            Insight::Outliers { column, .. }
            | Insight::Constant { column, .. }
            | Insight::CategoricalGroupable { column, .. }
            | Insight::TimeSeries { column, .. } => Some(column),
            Insight::Correlation { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Insight::Outliers { message, .. }
            | Insight::Constant { message, .. }
            | Insight::CategoricalGroupable { message, .. }
            | Insight::TimeSeries { message, .. }
            | Insight::Correlation { message, .. } => message,
        }
    }
}

fn column_insight(profile: &ColumnProfile, options: &ProfileOptions) -> Option<Insight> {
    let column = profile.name.clone();
    match &profile.summary {
        ColumnSummary::Numeric(summary) => {
            let count = summary.outliers.as_ref()?.count;
            (count > 0).then(|| Insight::Outliers {
                message: format!(
                    "Column '{column}' has {count} potential {}",
                    if count == 1 { "outlier" } else { "outliers" }
                ),
                column,
                count,
            })
        }
        ColumnSummary::Categorical(summary) => match summary.unique_count {
            1 => {
                let value = summary.top_values.first()?.value.clone();
                Some(Insight::Constant {
                    message: format!("Column '{column}' has a constant value: {value}"),
                    column,
                    value,
                })
            }
            unique if unique > 1 && unique <= options.groupable_max_unique => {
                Some(Insight::CategoricalGroupable {
                    message: format!(
                        "Column '{column}' has {unique} unique values and can be used for grouping"
                    ),
                    column,
                    unique_count: unique,
                })
            }
            _ => None,
        },
        ColumnSummary::Date(summary) => {
            let has_gaps = summary.sequence.has_gaps;
            summary.sequence.is_sequential.then(|| Insight::TimeSeries {
                message: if has_gaps {
                    format!("Column '{column}' contains time series data with irregular gaps")
                } else {
                    format!("Column '{column}' contains time series data")
                },
                column,
                has_gaps,
            })
        }
        ColumnSummary::Empty => None,
    }
}

pub fn generate_insights(
    profiles: &[ColumnProfile],
    strong_pairs: &[CorrelationPair],
    options: &ProfileOptions,
) -> Vec<Insight> {
    let mut insights = profiles
        .iter()
        .filter_map(|profile| column_insight(profile, options))
        .collect::<Vec<_>>();
    if !strong_pairs.is_empty() {
        let count = strong_pairs.len();
        insights.push(Insight::Correlation {
            pairs: strong_pairs.to_vec(),
            message: format!(
                "Found {count} strong {} between numeric columns",
                if count == 1 { "correlation" } else { "correlations" }
            ),
        });
    }
    insights
}
