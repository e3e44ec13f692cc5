//! Engine thresholds and their YAML representation.
//!
//! Every field defaults to the value the profiling rules are defined with, so
//! a config file only needs to list the knobs it changes.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileOptions {
    /// Multiplier applied to the IQR when bounding outliers.
    pub outlier_iqr_multiplier: f64,
    /// Std and outlier detection run when a column has more non-empty values than this.
    pub spread_min_values: usize,
    /// A correlation is strong when `|r|` is strictly greater than this.
    pub correlation_threshold: f64,
    pub top_values: usize,
    pub groupable_max_unique: usize,
    pub pie_max_categories: usize,
    pub heatmap_max_columns: usize,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            outlier_iqr_multiplier: 1.5,
            spread_min_values: 5,
            correlation_threshold: 0.7,
            top_values: 5,
            groupable_max_unique: 5,
            pie_max_categories: 7,
            heatmap_max_columns: 5,
        }
    }
}

impl ProfileOptions {
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        let options: ProfileOptions = serde_yaml::from_str(input)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.outlier_iqr_multiplier.is_finite() && self.outlier_iqr_multiplier > 0.0) {
            return Err(ConfigError::Invalid {
                field: "outlierIqrMultiplier",
                reason: format!("expected a positive number, got {}", self.outlier_iqr_multiplier),
            });
        }
        if !(self.correlation_threshold > 0.0 && self.correlation_threshold <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "correlationThreshold",
                reason: format!("expected a value in (0, 1], got {}", self.correlation_threshold),
            });
        }
        let caps = [
            ("topValues", self.top_values),
            ("groupableMaxUnique", self.groupable_max_unique),
            ("pieMaxCategories", self.pie_max_categories),
            ("heatmapMaxColumns", self.heatmap_max_columns),
        ];
        if let Some(&(field, _)) = caps.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid {
                field,
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
