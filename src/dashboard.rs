//! Versioned chart specifications for dashboards.
//!
//! Charts live in an arena keyed by opaque [`ChartId`]s. An edit never touches
//! a stored specification: it validates against the profiled columns, appends
//! a new version, and leaves the previous one available for [`undo`].
//!
//! [`undo`]: ChartRegistry::undo

use std::{collections::HashMap, fmt};

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::DashboardError,
    profile::Report,
    recommend::{ChartType, Recommendation},
};

pub const DEFAULT_CHART_HEIGHT: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(Uuid);

impl ChartId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    pub height: u32,
    pub use_color: bool,
    pub show_grid: bool,
}

impl ChartSpec {
    pub fn new(chart_type: ChartType, x: Option<String>, y: Option<String>) -> Self {
        let mut spec = Self {
            chart_type,
            title: String::new(),
            x,
            y,
            columns: Vec::new(),
            height: DEFAULT_CHART_HEIGHT,
            use_color: true,
            show_grid: true,
        };
        spec.title = spec.default_title();
        spec
    }

    pub fn from_recommendation(recommendation: &Recommendation) -> Self {
        let bindings = &recommendation.suggested_bindings;
        let mut spec = Self::new(
            recommendation.chart_type,
            bindings.x.clone(),
            bindings.y.clone(),
        );
        spec.columns = bindings.columns.clone().unwrap_or_default();
        spec.title = spec.default_title();
        spec
    }

    pub fn default_title(&self) -> String {
        match (self.chart_type, &self.x, &self.y) {
            (ChartType::Heatmap, _, _) => "Correlation heatmap".to_string(),
            (_, Some(x), Some(y)) => format!("{y} by {x}"),
            (_, Some(x), None) => format!("Distribution of {x}"),
            (chart, None, _) => format!("{chart} chart"),
        }
    }

    fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        self.x
            .iter()
            .chain(self.y.iter())
            .chain(self.columns.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum ChartEdit {
    SetTitle { title: String },
    SetChartType { chart_type: ChartType },
    SetAxes { x: Option<String>, y: Option<String> },
    SetHeight { height: u32 },
    SetUseColor { enabled: bool },
    SetShowGrid { enabled: bool },
}

impl ChartEdit {
    fn apply_to(&self, spec: &ChartSpec) -> ChartSpec {
        let mut next = spec.clone();
        match self {
            ChartEdit::SetTitle { title } => next.title = title.clone(),
            ChartEdit::SetChartType { chart_type } => next.chart_type = *chart_type,
            ChartEdit::SetAxes { x, y } => {
                next.x = x.clone();
                next.y = y.clone();
            }
            ChartEdit::SetHeight { height } => next.height = *height,
            ChartEdit::SetUseColor { enabled } => next.use_color = *enabled,
            ChartEdit::SetShowGrid { enabled } => next.show_grid = *enabled,
        }
        next
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry<'a> {
    pub id: ChartId,
    pub version: usize,
    #[serde(flatten)]
    pub spec: &'a ChartSpec,
}

/// Arena of chart specifications. Each id maps to its full version history;
/// the last entry is the current specification.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    columns: Vec<String>,
    order: Vec<ChartId>,
    versions: HashMap<ChartId, Vec<ChartSpec>>,
}

impl ChartRegistry {
    /// An empty registry whose charts may reference `columns`.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Auto-generated dashboard: one chart per recommendation, in report order.
    pub fn from_report(report: &Report) -> Result<Self, DashboardError> {
        let mut registry = Self::new(report.column_names().map(str::to_string).collect());
        for recommendation in &report.recommendations {
            registry.insert(ChartSpec::from_recommendation(recommendation))?;
        }
        debug!("Built dashboard with {} chart(s)", registry.len());
        Ok(registry)
    }

    pub fn insert(&mut self, spec: ChartSpec) -> Result<ChartId, DashboardError> {
        self.validate(&spec)?;
        let id = ChartId::new();
        self.order.push(id);
        self.versions.insert(id, vec![spec]);
        Ok(id)
    }

    pub fn current(&self, id: ChartId) -> Option<&ChartSpec> {
        self.versions.get(&id).and_then(|history| history.last())
    }

    /// Zero-based version of the current specification.
    pub fn version(&self, id: ChartId) -> Option<usize> {
        self.versions.get(&id).map(|history| history.len() - 1)
    }

    pub fn history(&self, id: ChartId) -> Option<&[ChartSpec]> {
        self.versions.get(&id).map(Vec::as_slice)
    }

    /// Applies an edit as a new version and returns that version number.
    pub fn apply(&mut self, id: ChartId, edit: &ChartEdit) -> Result<usize, DashboardError> {
        let current = self
            .current(id)
            .ok_or_else(|| DashboardError::UnknownChart(id.to_string()))?;
        let next = edit.apply_to(current);
        self.validate(&next)?;
        let history = self
            .versions
            .get_mut(&id)
            .ok_or_else(|| DashboardError::UnknownChart(id.to_string()))?;
        history.push(next);
        Ok(history.len() - 1)
    }

    /// Drops the current version and returns the restored one.
    pub fn undo(&mut self, id: ChartId) -> Result<&ChartSpec, DashboardError> {
        let history = self
            .versions
            .get_mut(&id)
            .ok_or_else(|| DashboardError::UnknownChart(id.to_string()))?;
        if history.len() < 2 {
            return Err(DashboardError::NothingToUndo(id.to_string()));
        }
        history.pop();
        history
            .last()
            .ok_or_else(|| DashboardError::NothingToUndo(id.to_string()))
    }

    pub fn remove(&mut self, id: ChartId) -> Option<Vec<ChartSpec>> {
        self.order.retain(|existing| *existing != id);
        self.versions.remove(&id)
    }

    pub fn charts(&self) -> Vec<ChartEntry<'_>> {
        self.order
            .iter()
            .filter_map(|id| {
                let history = self.versions.get(id)?;
                Some(ChartEntry {
                    id: *id,
                    version: history.len() - 1,
                    spec: history.last()?,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn validate(&self, spec: &ChartSpec) -> Result<(), DashboardError> {
        if spec.height == 0 {
            return Err(DashboardError::InvalidHeight);
        }
        if spec.chart_type != ChartType::Heatmap {
            let missing = if spec.x.is_none() {
                Some("x")
            } else if spec.y.is_none() && !spec.chart_type.is_single_axis() {
                Some("y")
            } else {
                None
            };
            if let Some(axis) = missing {
                return Err(DashboardError::MissingAxis {
                    chart: spec.chart_type.as_str(),
                    axis,
                });
            }
        }
        if let Some(unknown) = spec
            .referenced_columns()
            .find(|column| !self.columns.iter().any(|known| known == column))
        {
            return Err(DashboardError::UnknownColumn(unknown.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ChartRegistry {
        ChartRegistry::new(vec!["region".to_string(), "sales".to_string()])
    }

    fn bar() -> ChartSpec {
        ChartSpec::new(
            ChartType::Bar,
            Some("region".to_string()),
            Some("sales".to_string()),
        )
    }

    #[test]
    fn new_spec_uses_chart_defaults() {
        let spec = bar();
        assert_eq!(spec.title, "sales by region");
        assert_eq!(spec.height, DEFAULT_CHART_HEIGHT);
        assert!(spec.use_color && spec.show_grid);
        let histogram = ChartSpec::new(ChartType::Histogram, Some("sales".to_string()), None);
        assert_eq!(histogram.title, "Distribution of sales");
    }

    #[test]
    fn edits_append_versions_and_undo_restores() {
        let mut registry = registry();
        let id = registry.insert(bar()).expect("insert");
        assert_eq!(registry.version(id), Some(0));

        let version = registry
            .apply(
                id,
                &ChartEdit::SetTitle {
                    title: "Revenue".to_string(),
                },
            )
            .expect("edit");
        assert_eq!(version, 1);
        assert_eq!(registry.current(id).map(|s| s.title.as_str()), Some("Revenue"));
        assert_eq!(registry.history(id).map(|h| h[0].title.as_str()), Some("sales by region"));

        let restored = registry.undo(id).expect("undo");
        assert_eq!(restored.title, "sales by region");
        assert_eq!(
            registry.undo(id).unwrap_err(),
            DashboardError::NothingToUndo(id.to_string())
        );
    }

    #[test]
    fn edits_referencing_unknown_columns_are_rejected() {
        let mut registry = registry();
        let id = registry.insert(bar()).expect("insert");
        let err = registry
            .apply(
                id,
                &ChartEdit::SetAxes {
                    x: Some("country".to_string()),
                    y: None,
                },
            )
            .unwrap_err();
        assert_eq!(err, DashboardError::UnknownColumn("country".to_string()));
        assert_eq!(registry.version(id), Some(0));
    }

    #[test]
    fn zero_height_and_missing_axis_are_invalid() {
        let mut registry = registry();
        let id = registry.insert(bar()).expect("insert");
        assert_eq!(
            registry.apply(id, &ChartEdit::SetHeight { height: 0 }),
            Err(DashboardError::InvalidHeight)
        );
        let axisless = ChartSpec::new(ChartType::Line, None, None);
        assert_eq!(
            registry.insert(axisless),
            Err(DashboardError::MissingAxis {
                chart: "line",
                axis: "x"
            })
        );
        assert_eq!(
            registry.apply(id, &ChartEdit::SetAxes {
                x: Some("region".to_string()),
                y: None,
            }),
            Err(DashboardError::MissingAxis {
                chart: "bar",
                axis: "y"
            })
        );
        let histogram = ChartSpec::new(ChartType::Histogram, Some("sales".to_string()), None);
        assert!(registry.insert(histogram).is_ok());
    }

    #[test]
    fn unknown_chart_and_removal() {
        let mut registry = registry();
        let id = registry.insert(bar()).expect("insert");
        assert!(registry.remove(id).is_some());
        assert!(registry.is_empty());
        assert_eq!(
            registry.apply(id, &ChartEdit::SetShowGrid { enabled: false }),
            Err(DashboardError::UnknownChart(id.to_string()))
        );
    }

    #[test]
    fn chart_edit_deserializes_from_tagged_json() {
        let edit: ChartEdit =
            serde_json::from_str(r#"{"edit":"set_chart_type","chart_type":"pie"}"#).expect("parse");
        assert_eq!(
            edit,
            ChartEdit::SetChartType {
                chart_type: ChartType::Pie
            }
        );
    }
}
