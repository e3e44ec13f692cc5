use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::Cell;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Value counts kept in first-occurrence order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<ValueCount>,
    positions: HashMap<String, usize>,
    total: usize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the display value of every non-blank cell.
    pub fn from_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut table = Self::new();
        for cell in cells.into_iter().filter(|cell| !cell.is_blank()) {
            table.record(cell.as_display());
        }
        table
    }

    pub fn record(&mut self, value: String) {
        self.total += 1;
        if let Some(&idx) = self.positions.get(&value) {
            self.entries[idx].count += 1;
            return;
        }
        self.positions.insert(value.clone(), self.entries.len());
        self.entries.push(ValueCount { value, count: 1 });
    }

    pub fn unique_count(&self) -> usize {
        self.entries.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// The only value when the table holds exactly one distinct value.
    pub fn single_value(&self) -> Option<&str> {
        match self.entries.as_slice() {
            [only] => Some(only.value.as_str()),
            _ => None,
        }
    }

    /// Most frequent values first. The sort is stable, so equal counts keep
    /// the order in which the values first appeared.
    pub fn top(&self, limit: usize) -> Vec<ValueCount> {
        let mut items = self.entries.clone();
        items.sort_by(|a, b| b.count.cmp(&a.count));
        items.truncate(limit);
        items
    }
}
