//! Column type inference.
//!
//! Classification is all-or-nothing over a column's non-empty cells: a single
//! value that fails to coerce rules a type out for the whole column. Numeric
//! takes precedence over date, and anything else is categorical.

use std::fmt;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{Cell, Dataset, cell_date_instant, try_parse_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Numeric,
    Date,
    Categorical,
    Empty,
}

impl InferredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferredType::Numeric => "numeric",
            InferredType::Date => "date",
            InferredType::Categorical => "categorical",
            InferredType::Empty => "empty",
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct TypeCandidate {
    non_empty: usize,
    possible_numeric: bool,
    possible_date: bool,
}

impl TypeCandidate {
    fn new() -> Self {
        Self {
            non_empty: 0,
            possible_numeric: true,
            possible_date: true,
        }
    }

    fn update(&mut self, cell: &Cell) {
        if cell.is_blank() {
            return;
        }
        self.non_empty += 1;
        if self.possible_numeric && try_parse_number(cell).is_none() {
            self.possible_numeric = false;
        }
        if self.possible_date && cell_date_instant(cell).is_none() {
            self.possible_date = false;
        }
    }

    fn decide(&self) -> InferredType {
        if self.non_empty == 0 {
            InferredType::Empty
        } else if self.possible_numeric {
            InferredType::Numeric
        } else if self.possible_date {
            InferredType::Date
        } else {
            InferredType::Categorical
        }
    }
}

/// Classifies one column from its cells.
pub fn classify<'a, I>(values: I) -> InferredType
where
    I: IntoIterator<Item = &'a Cell>,
{
    let mut candidate = TypeCandidate::new();
    for cell in values {
        candidate.update(cell);
    }
    candidate.decide()
}

/// Inferred type per column, kept in the dataset's column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeMap {
    entries: Vec<(String, InferredType)>,
}

impl TypeMap {
    pub fn get(&self, column: &str) -> Option<InferredType> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, ty)| *ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, InferredType)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Columns of the given type, in column order.
    pub fn columns_of(&self, ty: InferredType) -> Vec<&str> {
        self.iter()
            .filter(|(_, column_ty)| *column_ty == ty)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn first_of(&self, ty: InferredType) -> Option<&str> {
        self.iter()
            .find(|(_, column_ty)| *column_ty == ty)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, InferredType)> for TypeMap {
    fn from_iter<I: IntoIterator<Item = (String, InferredType)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

pub fn infer_types(dataset: &Dataset) -> TypeMap {
    let types: TypeMap = dataset
        .columns()
        .par_iter()
        .map(|name| (name.clone(), classify(dataset.column_values(name))))
        .collect::<Vec<_>>()
        .into_iter()
        .collect();
    for (name, ty) in types.iter() {
        debug!("Column '{name}' classified as {ty}");
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| if v.is_empty() { Cell::Null } else { Cell::text(*v) })
            .collect()
    }

    #[test]
    fn blank_column_is_empty() {
        let values = vec![Cell::Null, Cell::text(""), Cell::text("  ")];
        assert_eq!(classify(&values), InferredType::Empty);
        assert_eq!(classify(&Vec::<Cell>::new()), InferredType::Empty);
    }

    #[test]
    fn numeric_takes_precedence_and_ignores_blanks() {
        let mut values = cells(&["1", "2.5", "", "-4"]);
        values.push(Cell::Number(7.0));
        assert_eq!(classify(&values), InferredType::Numeric);
    }

    #[test]
    fn single_text_value_downgrades_numeric_column() {
        assert_eq!(classify(&cells(&["1", "2", "three"])), InferredType::Categorical);
    }

    #[test]
    fn all_parseable_dates_classify_as_date() {
        let values = cells(&["2024-01-01", "2024-01-02T10:00:00", ""]);
        assert_eq!(classify(&values), InferredType::Date);
    }

    #[test]
    fn one_unparseable_date_forces_categorical() {
        let values = cells(&["2024-01-01", "2024-01-02", "soon"]);
        assert_eq!(classify(&values), InferredType::Categorical);
    }

    #[test]
    fn numbers_mixed_with_dates_are_categorical() {
        let mut values = cells(&["2024-01-01"]);
        values.push(Cell::Number(3.0));
        assert_eq!(classify(&values), InferredType::Categorical);
    }

    #[test]
    fn type_map_reports_columns_in_order() {
        let dataset = Dataset::from_rows(
            &["city", "amount", "day", "score"],
            vec![vec![
                Cell::text("Oslo"),
                Cell::Number(1.0),
                Cell::text("2024-01-01"),
                Cell::text("3"),
            ]],
        );
        let types = infer_types(&dataset);
        assert_eq!(types.columns_of(InferredType::Numeric), ["amount", "score"]);
        assert_eq!(types.first_of(InferredType::Date), Some("day"));
        assert_eq!(types.get("city"), Some(InferredType::Categorical));
        assert_eq!(types.get("missing"), None);
    }
}
