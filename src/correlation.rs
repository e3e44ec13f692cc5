//! Pairwise Pearson correlation across numeric columns.
//!
//! Pairs are visited as `(i, j)` with `i < j` over the numeric columns in
//! column order. Rows where either side is blank are skipped for that pair.

use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::ProfileOptions,
    data::{Dataset, try_parse_number},
    inference::{InferredType, TypeMap},
    stats::round2,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationPair {
    pub column1: String,
    pub column2: String,
    pub correlation: f64,
    pub message: String,
}

impl CorrelationPair {
    fn new(column1: &str, column2: &str, correlation: f64) -> Self {
        let direction = if correlation >= 0.0 {
            "positive"
        } else {
            "negative"
        };
        Self {
            column1: column1.to_string(),
            column2: column2.to_string(),
            correlation,
            message: format!(
                "Strong {direction} correlation ({correlation:.2}) between '{column1}' and '{column2}'"
            ),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.correlation >= 0.0
    }
}

/// Symmetric matrix of coefficients rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationAnalysis {
    pub matrix: Option<CorrelationMatrix>,
    pub strong_pairs: Vec<CorrelationPair>,
}

/// Pearson coefficient of two equally long series. A series without variance
/// correlates with nothing, so the result is 0 in that case.
///
/// Deviations are scaled by their largest magnitude before any product is
/// formed, so finite inputs of any size stay finite.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let (Some(dx), Some(dy)) = (scaled_deviations(&xs[..n]), scaled_deviations(&ys[..n])) else {
        return 0.0;
    };
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in dx.iter().zip(&dy) {
        sxy += x * y;
        sxx += x * x;
        syy += y * y;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Deviations from the mean divided by the largest absolute deviation, so
/// every value lies in `[-1, 1]`. `None` when the series has no spread.
fn scaled_deviations(values: &[f64]) -> Option<Vec<f64>> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if min == max {
        return None;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    let mean = if sum.is_finite() {
        sum / n
    } else {
        values.iter().map(|v| v / n).sum::<f64>()
    };
    let deviations = values.iter().map(|v| v - mean).collect::<Vec<_>>();
    let scale = deviations.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    Some(deviations.into_iter().map(|d| d / scale).collect())
}

fn paired_values(xs: &[Option<f64>], ys: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip()
}

pub fn analyze_correlations(
    dataset: &Dataset,
    types: &TypeMap,
    options: &ProfileOptions,
) -> CorrelationAnalysis {
    let numeric = types.columns_of(InferredType::Numeric);
    if numeric.len() < 2 {
        return CorrelationAnalysis::default();
    }

    let series = numeric
        .iter()
        .map(|name| {
            dataset
                .column_values(name)
                .into_iter()
                .map(try_parse_number)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let pairs = (0..numeric.len()).tuple_combinations::<(usize, usize)>().collect::<Vec<_>>();
    let coefficients = pairs
        .par_iter()
        .map(|&(i, j)| {
            let (xs, ys) = paired_values(&series[i], &series[j]);
            pearson(&xs, &ys)
        })
        .collect::<Vec<_>>();
    debug!(
        "Computed {} correlation pair(s) across {} numeric column(s)",
        pairs.len(),
        numeric.len()
    );

    let k = numeric.len();
    let mut values = vec![vec![0.0; k]; k];
    for (idx, column) in series.iter().enumerate() {
        let own = column.iter().flatten().copied().collect::<Vec<_>>();
        values[idx][idx] = round2(pearson(&own, &own));
    }
    let mut strong_pairs = Vec::new();
    for (&(i, j), &r) in pairs.iter().zip(&coefficients) {
        values[i][j] = round2(r);
        values[j][i] = round2(r);
        if r.abs() > options.correlation_threshold {
            strong_pairs.push(CorrelationPair::new(numeric[i], numeric[j], r));
        }
    }

    CorrelationAnalysis {
        matrix: Some(CorrelationMatrix {
            columns: numeric.iter().map(|name| name.to_string()).collect(),
            values,
        }),
        strong_pairs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Cell, inference::infer_types};

    fn dataset(headers: &[&str], columns: &[Vec<f64>]) -> Dataset {
        let rows = (0..columns[0].len())
            .map(|row| columns.iter().map(|col| Cell::Number(col[row])).collect())
            .collect();
        Dataset::from_rows(headers, rows)
    }

    fn analyze(dataset: &Dataset) -> CorrelationAnalysis {
        analyze_correlations(dataset, &infer_types(dataset), &ProfileOptions::default())
    }

    #[test]
    fn identical_series_correlate_perfectly() {
        let xs = [1.0, 3.0, 2.0, 8.0, 5.0];
        assert!((pearson(&xs, &xs) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn huge_magnitudes_stay_within_bounds() {
        let xs = [1e160, 2e160, 3e160, 4e160];
        assert!((pearson(&xs, &xs) - 1.0).abs() < 1e-12);
        let ys = [4e160, 3e160, 2e160, 1e160];
        assert!((pearson(&xs, &ys) + 1.0).abs() < 1e-12);

        let analysis = analyze(&dataset(&["a", "b"], &[xs.to_vec(), xs.to_vec()]));
        let matrix = analysis.matrix.expect("matrix");
        assert_eq!(matrix.values, vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
        assert_eq!(analysis.strong_pairs.len(), 1);
    }

    #[test]
    fn threshold_is_strict() {
        let xs = (1..=8).map(f64::from).collect::<Vec<_>>();
        let data = dataset(&["a", "b"], &[xs.clone(), xs]);
        let at = |threshold: f64| {
            analyze_correlations(
                &data,
                &infer_types(&data),
                &ProfileOptions {
                    correlation_threshold: threshold,
                    ..ProfileOptions::default()
                },
            )
        };
        assert!(at(1.0).strong_pairs.is_empty());
        assert_eq!(at(0.99).strong_pairs.len(), 1);
    }

    #[test]
    fn constant_series_has_zero_correlation() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]), 0.0);
        assert_eq!(pearson(&[0.1; 8], &[0.1; 8]), 0.0);
    }

    #[test]
    fn doubled_series_is_strong_positive() {
        let x = (1..=50).map(f64::from).collect::<Vec<_>>();
        let y = x.iter().map(|v| v * 2.0).collect::<Vec<_>>();
        let analysis = analyze(&dataset(&["x", "y"], &[x, y]));
        assert_eq!(analysis.strong_pairs.len(), 1);
        let pair = &analysis.strong_pairs[0];
        assert!(pair.is_positive());
        assert!(pair.message.contains("positive"));
        assert!(pair.message.contains("(1.00)"));
        assert_eq!((pair.column1.as_str(), pair.column2.as_str()), ("x", "y"));
    }

    #[test]
    fn inverse_series_is_strong_negative() {
        let x = (1..=10).map(f64::from).collect::<Vec<_>>();
        let y = x.iter().map(|v| 100.0 - 3.0 * v).collect::<Vec<_>>();
        let analysis = analyze(&dataset(&["x", "y"], &[x, y]));
        assert!(analysis.strong_pairs[0].message.contains("negative"));
        assert!(analysis.strong_pairs[0].correlation < -0.99);
    }

    #[test]
    fn pairs_follow_nested_loop_order() {
        let a = (1..=10).map(f64::from).collect::<Vec<_>>();
        let b = a.iter().map(|v| v * 3.0).collect::<Vec<_>>();
        let c = a.iter().map(|v| v + 1.0).collect::<Vec<_>>();
        let analysis = analyze(&dataset(&["a", "b", "c"], &[a, b, c]));
        let order = analysis
            .strong_pairs
            .iter()
            .map(|p| (p.column1.as_str(), p.column2.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(order, [("a", "b"), ("a", "c"), ("b", "c")]);
        let matrix = analysis.matrix.expect("matrix");
        assert_eq!(matrix.get("a", "a"), Some(1.0));
        assert_eq!(matrix.get("c", "b"), matrix.get("b", "c"));
    }

    #[test]
    fn single_numeric_column_skips_analysis() {
        let analysis = analyze(&dataset(&["only"], &[vec![1.0, 2.0, 3.0]]));
        assert!(analysis.matrix.is_none());
        assert!(analysis.strong_pairs.is_empty());
    }

    #[test]
    fn blank_cells_drop_out_pairwise() {
        let data = Dataset::from_rows(
            &["x", "y"],
            vec![
                vec![Cell::Number(1.0), Cell::Number(2.0)],
                vec![Cell::Number(2.0), Cell::Null],
                vec![Cell::Number(3.0), Cell::Number(6.0)],
                vec![Cell::Number(4.0), Cell::Number(8.0)],
            ],
        );
        let analysis = analyze(&data);
        assert!((analysis.strong_pairs[0].correlation - 1.0).abs() < 1e-12);
    }
}
