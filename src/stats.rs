//! Per-column summary statistics.
//!
//! Each inferred type gets its own summary struct, so a field only exists on
//! the columns it is meaningful for. Spread measures (population std,
//! distribution shape, IQR outlier bounds) are only computed once a numeric
//! column has more values than [`ProfileOptions::spread_min_values`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    config::ProfileOptions,
    data::{Cell, cell_date_instant, try_parse_number},
    frequency::{FrequencyTable, ValueCount},
    inference::InferredType,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    pub missing_count: usize,
    #[serde(flatten)]
    pub summary: ColumnSummary,
}

impl ColumnProfile {
    pub fn inferred_type(&self) -> InferredType {
        self.summary.inferred_type()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "inferredType", rename_all = "lowercase")]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Date(DateSummary),
    Categorical(CategoricalSummary),
    Empty,
}

impl ColumnSummary {
    pub fn inferred_type(&self) -> InferredType {
        match self {
            ColumnSummary::Numeric(_) => InferredType::Numeric,
            ColumnSummary::Date(_) => InferredType::Date,
            ColumnSummary::Categorical(_) => InferredType::Categorical,
            ColumnSummary::Empty => InferredType::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<OutlierBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub count: usize,
}

impl OutlierBounds {
    /// Index-based quartiles over an ascending slice: `Q1 = sorted[n/4]`,
    /// `Q3 = sorted[3n/4]`, no interpolation.
    pub fn detect(sorted: &[f64], multiplier: f64) -> Option<Self> {
        let n = sorted.len();
        if n == 0 {
            return None;
        }
        let q1 = sorted[n / 4];
        let q3 = sorted[(3 * n / 4).min(n - 1)];
        let iqr = q3 - q1;
        let lower_bound = q1 - multiplier * iqr;
        let upper_bound = q3 + multiplier * iqr;
        let count = sorted
            .iter()
            .filter(|value| **value < lower_bound || **value > upper_bound)
            .count();
        Some(Self {
            q1,
            q3,
            lower_bound,
            upper_bound,
            count,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub skewness: f64,
    pub kurtosis: f64,
    pub is_normal: bool,
}

impl Distribution {
    /// Sample-adjusted skewness (G1) and excess kurtosis (G2), the estimators
    /// pandas reports. `None` without spread or with fewer than four values.
    fn from_values(values: &[f64], mean: f64) -> Option<Self> {
        if values.len() < 4 {
            return None;
        }
        let n = values.len() as f64;
        let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), value| {
            let d = value - mean;
            let d2 = d * d;
            (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
        });
        let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);
        if m2 <= 0.0 {
            return None;
        }
        let g1 = m3 / m2.powf(1.5);
        let g2 = m4 / (m2 * m2) - 3.0;
        let skewness = g1 * (n * (n - 1.0)).sqrt() / (n - 2.0);
        let kurtosis = ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0));
        if !(skewness.is_finite() && kurtosis.is_finite()) {
            return None;
        }
        let (skewness, kurtosis) = (round2(skewness), round2(kurtosis));
        Some(Self {
            skewness,
            kurtosis,
            is_normal: skewness.abs() < 0.5 && kurtosis.abs() < 0.5,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSummary {
    pub count: usize,
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
    pub sequence: SequenceCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceCheck {
    pub is_sequential: bool,
    pub has_gaps: bool,
}

impl SequenceCheck {
    /// Repeated instants break the sequence. A gap is flagged when, from the
    /// third instant on, the step exceeds twice the step before it.
    pub fn from_sorted(sorted: &[NaiveDateTime]) -> Self {
        let is_sequential = sorted.windows(2).all(|pair| pair[0] != pair[1]);
        let steps = sorted
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_milliseconds())
            .collect::<Vec<_>>();
        let has_gaps = steps
            .windows(2)
            .any(|pair| pair[1] > pair[0].saturating_mul(2));
        Self {
            is_sequential,
            has_gaps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique_count: usize,
    pub top_values: Vec<ValueCount>,
}

/// Builds the profile of one column whose type has already been inferred.
pub fn summarize_column(
    name: &str,
    cells: &[&Cell],
    ty: InferredType,
    options: &ProfileOptions,
) -> ColumnProfile {
    let missing_count = cells.iter().filter(|cell| cell.is_blank()).count();
    let present = cells.iter().copied().filter(|cell| !cell.is_blank());
    let summary = match ty {
        InferredType::Numeric => {
            let values = present.filter_map(try_parse_number).collect::<Vec<_>>();
            numeric_summary(values, options).map_or(ColumnSummary::Empty, ColumnSummary::Numeric)
        }
        InferredType::Date => {
            let instants = present.filter_map(cell_date_instant).collect::<Vec<_>>();
            date_summary(instants).map_or(ColumnSummary::Empty, ColumnSummary::Date)
        }
        InferredType::Categorical => {
            ColumnSummary::Categorical(categorical_summary(present, options))
        }
        InferredType::Empty => ColumnSummary::Empty,
    };
    ColumnProfile {
        name: name.to_string(),
        missing_count,
        summary,
    }
}

pub fn numeric_summary(mut values: Vec<f64>, options: &ProfileOptions) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let min = values[0];
    let max = values[count - 1];
    let mean = values.iter().sum::<f64>() / count as f64;
    let median = median_of_sorted(&values);
    let unique_count = 1 + values.windows(2).filter(|pair| pair[0] != pair[1]).count();

    let (std, outliers, distribution) = if count > options.spread_min_values {
        let std = if min == max {
            0.0
        } else {
            population_std(&values, mean)
        };
        (
            Some(std),
            OutlierBounds::detect(&values, options.outlier_iqr_multiplier),
            Distribution::from_values(&values, mean).filter(|_| std > 0.0),
        )
    } else {
        (None, None, None)
    };

    Some(NumericSummary {
        count,
        min,
        max,
        mean,
        median,
        unique_count,
        std,
        outliers,
        distribution,
    })
}

/// Deviations are scaled by the widest one first so the squares cannot overflow.
fn population_std(values: &[f64], mean: f64) -> f64 {
    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max((v - mean).abs()));
    if scale == 0.0 || !scale.is_finite() {
        return 0.0;
    }
    let squares = values
        .iter()
        .map(|v| {
            let d = (v - mean) / scale;
            d * d
        })
        .sum::<f64>();
    scale * (squares / values.len() as f64).sqrt()
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn date_summary(mut instants: Vec<NaiveDateTime>) -> Option<DateSummary> {
    instants.sort();
    let min = *instants.first()?;
    let max = *instants.last()?;
    Some(DateSummary {
        count: instants.len(),
        min,
        max,
        sequence: SequenceCheck::from_sorted(&instants),
    })
}

fn categorical_summary<'a, I>(cells: I, options: &ProfileOptions) -> CategoricalSummary
where
    I: IntoIterator<Item = &'a Cell>,
{
    let table = FrequencyTable::from_cells(cells);
    CategoricalSummary {
        count: table.total(),
        unique_count: table.unique_count(),
        top_values: table.top(options.top_values),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
