//! Typed errors for the fallible edges of the crate.
//!
//! The profiling engine itself is total and never returns these; they cover
//! loading input files, reading configuration, and editing dashboard charts.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("opening input file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("reading CSV row {row}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("parsing JSON input")]
    Json(#[from] serde_json::Error),
    #[error("unexpected JSON layout: {0}")]
    JsonShape(String),
    #[error("failed to decode text with encoding {0}")]
    Decode(&'static str),
    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),
    #[error("cannot determine input format for {0:?}; pass --input-format")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading configuration file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing configuration YAML")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid option '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("no chart with id {0}")]
    UnknownChart(String),
    #[error("column '{0}' is not part of the profiled dataset")]
    UnknownColumn(String),
    #[error("{chart} charts need a {axis}-axis column")]
    MissingAxis {
        chart: &'static str,
        axis: &'static str,
    },
    #[error("chart {0} has no earlier version to restore")]
    NothingToUndo(String),
    #[error("chart height must be positive")]
    InvalidHeight,
}
