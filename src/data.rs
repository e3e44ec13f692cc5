use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single loosely typed field as produced by the data loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Null,
}

static NULL_CELL: Cell = Cell::Null;

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Null cells and empty (or whitespace-only) strings carry no value.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
            Cell::Null => String::new(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// Explicit numeric coercion: finite numbers and text holding a finite number.
pub fn try_parse_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %b %Y",
];

/// Parses a text value into a date instant. Offsets are normalized to UTC and
/// plain dates resolve to midnight.
pub fn parse_date_instant(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Date instants only come from text cells; numbers never parse as dates.
pub fn cell_date_instant(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::Text(s) => parse_date_instant(s),
        _ => None,
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// One row: an ordered mapping from column name to cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, Cell)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing an earlier value for the same key in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Cell>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, cell)| cell)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Cell>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// Ordered, immutable sequence of records. The column set is taken from the
/// first record's keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        let columns = records
            .first()
            .map(|first| first.keys().map(str::to_string).collect())
            .unwrap_or_default();
        Self { columns, records }
    }

    /// Builds a dataset from a header and positional rows. Short rows are
    /// padded with nulls; surplus cells are dropped.
    pub fn from_rows<S: AsRef<str>>(headers: &[S], rows: Vec<Vec<Cell>>) -> Self {
        let records = rows
            .into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                headers
                    .iter()
                    .map(|name| (name.as_ref().to_string(), cells.next().unwrap_or(Cell::Null)))
                    .collect::<Record>()
            })
            .collect();
        Self::new(records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cells of one column in row order; absent keys read as null.
    pub fn column_values(&self, name: &str) -> Vec<&Cell> {
        self.records
            .iter()
            .map(|record| record.get(name).unwrap_or(&NULL_CELL))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_parse_number_accepts_finite_text_and_numbers() {
        assert_eq!(try_parse_number(&Cell::Number(4.5)), Some(4.5));
        assert_eq!(try_parse_number(&Cell::text(" 12 ")), Some(12.0));
        assert_eq!(try_parse_number(&Cell::text("-3.25e2")), Some(-325.0));
        assert_eq!(try_parse_number(&Cell::text("abc")), None);
        assert_eq!(try_parse_number(&Cell::text("inf")), None);
        assert_eq!(try_parse_number(&Cell::text("NaN")), None);
        assert_eq!(try_parse_number(&Cell::Number(f64::NAN)), None);
        assert_eq!(try_parse_number(&Cell::Null), None);
    }

    #[test]
    fn parse_date_instant_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date_instant("2024-05-06"), Some(expected));
        assert_eq!(parse_date_instant("2024/05/06"), Some(expected));
        assert_eq!(parse_date_instant("May 06, 2024"), Some(expected));
        assert_eq!(
            parse_date_instant("2024-05-06T14:30:00Z"),
            Some(expected + chrono::Duration::minutes(14 * 60 + 30))
        );
        assert_eq!(parse_date_instant("not a date"), None);
        assert_eq!(parse_date_instant("2024-13-40"), None);
    }

    #[test]
    fn numbers_never_parse_as_dates() {
        assert_eq!(cell_date_instant(&Cell::Number(20240506.0)), None);
    }

    #[test]
    fn blank_cells_include_whitespace_text() {
        assert!(Cell::Null.is_blank());
        assert!(Cell::text("   ").is_blank());
        assert!(!Cell::text("x").is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    #[test]
    fn dataset_columns_follow_first_record() {
        let first: Record = [("b", Cell::from(1.0)), ("a", Cell::from("x"))]
            .into_iter()
            .collect();
        let second: Record = [("a", Cell::from("y"))].into_iter().collect();
        let dataset = Dataset::new(vec![first, second]);
        assert_eq!(dataset.columns(), ["b", "a"]);
        assert_eq!(dataset.column_values("b"), vec![&Cell::Number(1.0), &Cell::Null]);
    }

    #[test]
    fn from_rows_pads_short_rows_with_nulls() {
        let dataset = Dataset::from_rows(&["a", "b"], vec![vec![Cell::from(1.0)]]);
        assert_eq!(dataset.column_values("b"), vec![&Cell::Null]);
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
    }
}
