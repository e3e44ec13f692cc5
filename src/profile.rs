//! Report assembly.
//!
//! Runs type inference once, then fans out to statistics, correlation and the
//! recommender. Column profiles are computed in parallel but collected back in
//! column order, so two runs over the same dataset serialize identically.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::ProfileOptions,
    correlation::{CorrelationMatrix, analyze_correlations},
    data::Dataset,
    inference::infer_types,
    insights::{Insight, generate_insights},
    recommend::{Recommendation, recommend},
    stats::{ColumnProfile, summarize_column},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnProfile>,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_matrix: Option<CorrelationMatrix>,
}

impl Report {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

/// Profiles a dataset with the default thresholds.
pub fn profile(dataset: &Dataset) -> Report {
    profile_with(dataset, &ProfileOptions::default())
}

pub fn profile_with(dataset: &Dataset, options: &ProfileOptions) -> Report {
    if dataset.is_empty() {
        return Report::default();
    }

    let types = infer_types(dataset);
    let entries = types.iter().collect::<Vec<_>>();
    let columns = entries
        .par_iter()
        .map(|&(name, ty)| summarize_column(name, &dataset.column_values(name), ty, options))
        .collect::<Vec<_>>();

    let correlations = analyze_correlations(dataset, &types, options);
    let insights = generate_insights(&columns, &correlations.strong_pairs, options);
    let recommendations = recommend(dataset, &types, options);
    debug!(
        "Profiled {} row(s): {} insight(s), {} recommendation(s)",
        dataset.len(),
        insights.len(),
        recommendations.len()
    );

    Report {
        row_count: dataset.len(),
        column_count: dataset.columns().len(),
        columns,
        insights,
        recommendations,
        correlation_matrix: correlations.matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Cell, inference::InferredType, stats::ColumnSummary};

    #[test]
    fn empty_dataset_yields_zeroed_report() {
        let report = profile(&Dataset::default());
        assert_eq!(report, Report::default());
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["rowCount"], 0);
        assert_eq!(json["columns"].as_array().map(Vec::len), Some(0));
        assert!(json.get("correlationMatrix").is_none());
    }

    #[test]
    fn blank_column_is_empty_and_quiet() {
        let dataset = Dataset::from_rows(
            &["notes", "n"],
            vec![
                vec![Cell::Null, Cell::Number(1.0)],
                vec![Cell::text(""), Cell::Number(2.0)],
            ],
        );
        let report = profile(&dataset);
        let notes = report.column("notes").expect("notes column");
        assert_eq!(notes.inferred_type(), InferredType::Empty);
        assert_eq!(notes.summary, ColumnSummary::Empty);
        assert_eq!(notes.missing_count, 2);
        assert!(report.insights.iter().all(|i| i.column() != Some("notes")));
    }

    #[test]
    fn report_keeps_column_order() {
        let dataset = Dataset::from_rows(
            &["z", "a", "m"],
            vec![vec![Cell::text("x"), Cell::Number(1.0), Cell::text("2024-01-01")]],
        );
        let report = profile(&dataset);
        assert_eq!(report.column_names().collect::<Vec<_>>(), ["z", "a", "m"]);
        assert_eq!(report.column_count, 3);
        assert_eq!(report.row_count, 1);
    }
}
