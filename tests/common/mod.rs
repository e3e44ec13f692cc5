#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_insight::{Cell, Dataset};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds a dataset from named numeric columns of equal length.
pub fn numeric_dataset(columns: &[(&str, Vec<f64>)]) -> Dataset {
    let headers = columns.iter().map(|(name, _)| *name).collect::<Vec<_>>();
    let len = columns.first().map_or(0, |(_, values)| values.len());
    let rows = (0..len)
        .map(|row| {
            columns
                .iter()
                .map(|(_, values)| Cell::Number(values[row]))
                .collect()
        })
        .collect();
    Dataset::from_rows(&headers, rows)
}

/// Small sales table: region (4 values), amount, units, and an order date.
pub const SALES_CSV: &str = "\
region,amount,units,ordered_at,channel
north,120.5,3,2024-01-01,web
south,80,2,2024-01-02,web
east,200,5,2024-01-03,web
west,95.25,2,2024-01-04,web
north,130,3,2024-01-05,web
south,70,2,2024-01-06,web
east,210,5,2024-01-07,web
west,2000,50,2024-01-08,web
";
