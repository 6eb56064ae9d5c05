//! Grid tuning and widget placement configuration.
//!
//! [`DashboardConfig`] groups the grid metrics and the configured widget
//! families. It loads from TOML or JSON; every field has a default, so an
//! empty file is a valid configuration.
//!
//! ```toml
//! [grid]
//! target_cell_width_px = 70.0
//! margin_px = 8.0
//!
//! [[widgets]]
//! kind = "weather"
//! instances = { id = "weather", x = 0, y = 0, col_span = 3, row_span = 2 }
//!
//! [[widgets]]
//! kind = "rss"
//! instances = [
//!     { id = "news", enabled = false },
//!     { id = "tech", x = 3, col_span = 3, row_span = 4 },
//! ]
//! ```
//!
//! A family's `instances` may be one table or a list; [`OneOrMany::normalize`]
//! turns both into an ordered sequence and the first enabled entry becomes
//! the family's widget.

use std::path::Path;

use serde::{Deserialize, Serialize};

use dashgrid_layout::{Breakpoints, GridMetrics, WidgetDescriptor, WidgetKind};

// ---------------------------------------------------------------------------
// Grid configuration
// ---------------------------------------------------------------------------

/// Pixel metrics and breakpoint conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Widths strictly above this are desktop (`lg`).
    pub lg_min_width_px: u32,
    /// Fixed mobile (`sm`) column count.
    pub sm_columns: u32,
    /// Lower bound for the desktop column count.
    pub min_lg_columns: u32,
    pub target_cell_width_px: f64,
    pub margin_px: f64,
    /// Total horizontal container padding.
    pub padding_px: f64,
    /// Width used until the first real measurement arrives.
    pub fallback_window_width_px: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        let m = GridMetrics::DEFAULT;
        Self {
            lg_min_width_px: m.breakpoints.lg_min_width_px,
            sm_columns: m.breakpoints.sm_columns,
            min_lg_columns: m.min_lg_columns,
            target_cell_width_px: m.target_cell_width_px,
            margin_px: m.margin_px,
            padding_px: m.padding_px,
            fallback_window_width_px: 1280.0,
        }
    }
}

impl GridConfig {
    #[must_use]
    pub fn metrics(&self) -> GridMetrics {
        GridMetrics {
            breakpoints: Breakpoints {
                lg_min_width_px: self.lg_min_width_px,
                sm_columns: self.sm_columns,
            },
            margin_px: self.margin_px,
            padding_px: self.padding_px,
            target_cell_width_px: self.target_cell_width_px,
            min_lg_columns: self.min_lg_columns,
        }
    }

    /// Range problems, one message each. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.sm_columns == 0 {
            errors.push("grid.sm_columns must be > 0".into());
        }
        if self.min_lg_columns == 0 {
            errors.push("grid.min_lg_columns must be > 0".into());
        }
        if !(self.target_cell_width_px.is_finite() && self.target_cell_width_px > 0.0) {
            errors.push(format!(
                "grid.target_cell_width_px must be > 0, got {}",
                self.target_cell_width_px
            ));
        }
        if !(self.margin_px.is_finite() && self.margin_px >= 0.0) {
            errors.push(format!("grid.margin_px must be >= 0, got {}", self.margin_px));
        }
        if !(self.padding_px.is_finite() && self.padding_px >= 0.0) {
            errors.push(format!("grid.padding_px must be >= 0, got {}", self.padding_px));
        }
        if !(self.fallback_window_width_px.is_finite() && self.fallback_window_width_px > 0.0) {
            errors.push(format!(
                "grid.fallback_window_width_px must be > 0, got {}",
                self.fallback_window_width_px
            ));
        }
        errors
    }
}

// ---------------------------------------------------------------------------
// Widget families
// ---------------------------------------------------------------------------

/// A value written either as a single item or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Ordered sequence view; a single item becomes a one-element list.
    #[must_use]
    pub fn normalize(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(item) => std::slice::from_ref(item),
            Self::Many(items) => items,
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// One configured instance of a widget family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetEntry {
    /// Defaults to the family kind's name.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default = "span_default", alias = "colSpan")]
    pub col_span: u32,
    #[serde(default = "span_default", alias = "rowSpan")]
    pub row_span: u32,
}

fn enabled_default() -> bool {
    true
}

fn span_default() -> u32 {
    1
}

/// All configured instances of one widget kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetFamilyConfig {
    pub kind: WidgetKind,
    #[serde(default)]
    pub instances: OneOrMany<WidgetEntry>,
}

impl WidgetFamilyConfig {
    /// First enabled instance, if any.
    #[must_use]
    pub fn first_enabled(&self) -> Option<&WidgetEntry> {
        self.instances.as_slice().iter().find(|entry| entry.enabled)
    }

    /// Descriptor for the first enabled instance.
    #[must_use]
    pub fn descriptor(&self) -> Option<WidgetDescriptor> {
        let entry = self.first_enabled()?;
        let id = entry.id.clone().unwrap_or_else(|| kind_name(self.kind));
        Some(
            WidgetDescriptor::new(id, self.kind)
                .at(entry.x, entry.y)
                .span(entry.col_span, entry.row_span),
        )
    }
}

fn kind_name(kind: WidgetKind) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{kind:?}").to_lowercase())
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

/// Grid metrics plus widget families, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub grid: GridConfig,
    pub widgets: Vec<WidgetFamilyConfig>,
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Descriptors of every family's first enabled instance, in order.
    ///
    /// Families with no enabled instance are skipped; a repeated id keeps
    /// its first occurrence.
    #[must_use]
    pub fn descriptors(&self) -> Vec<WidgetDescriptor> {
        let mut out: Vec<WidgetDescriptor> = Vec::new();
        for family in &self.widgets {
            let Some(descriptor) = family.descriptor() else {
                tracing::debug!(target: "dashgrid.config", kind = ?family.kind, "no enabled instance");
                continue;
            };
            if out.iter().any(|d| d.id == descriptor.id) {
                tracing::warn!(
                    target: "dashgrid.config",
                    widget = %descriptor.id,
                    "duplicate widget id in configuration ignored"
                );
                continue;
            }
            out.push(descriptor);
        }
        out
    }

    /// Range and consistency problems. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.grid.validate();
        let mut seen: Vec<String> = Vec::new();
        for (index, family) in self.widgets.iter().enumerate() {
            for entry in family.instances.as_slice() {
                if entry.col_span == 0 || entry.row_span == 0 {
                    errors.push(format!(
                        "widgets[{index}] ({:?}): col_span and row_span must be >= 1",
                        family.kind
                    ));
                }
                if entry.id.as_deref() == Some("") {
                    errors.push(format!("widgets[{index}] ({:?}): empty id", family.kind));
                }
            }
            if let Some(descriptor) = family.descriptor() {
                if seen.contains(&descriptor.id) {
                    errors.push(format!("duplicate widget id {:?}", descriptor.id));
                } else {
                    seen.push(descriptor.id);
                }
            }
        }
        errors
    }

    /// Fail with [`ConfigError::Validation`] when [`validate`](Self::validate)
    /// reports anything.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[grid]
target_cell_width_px = 80.0
sm_columns = 4

[[widgets]]
kind = "weather"
instances = { id = "weather", x = 0, y = 0, col_span = 3, row_span = 2 }

[[widgets]]
kind = "rss"
instances = [
    { id = "news", enabled = false },
    { id = "tech", x = 3, col_span = 3, row_span = 4 },
]

[[widgets]]
kind = "sports"
instances = [{ id = "nba", enabled = false }]

[[widgets]]
kind = "clock"
"#;

    #[test]
    fn toml_round_trip_of_families() {
        let config = DashboardConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.grid.target_cell_width_px, 80.0);
        assert_eq!(config.grid.margin_px, 8.0);
        assert_eq!(config.grid.sm_columns, 4);
        assert_eq!(config.widgets.len(), 4);
        assert!(config.validate().is_empty());

        let descriptors = config.descriptors();
        let ids: Vec<_> = descriptors.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["weather", "tech"]);
        assert_eq!(descriptors[1].kind, WidgetKind::Rss);
        assert_eq!((descriptors[1].x, descriptors[1].row_span), (3, 4));
    }

    #[test]
    fn single_and_list_normalize_alike() {
        let entry = WidgetEntry {
            id: Some("a".into()),
            enabled: true,
            x: 0,
            y: 0,
            col_span: 1,
            row_span: 1,
        };
        assert_eq!(
            OneOrMany::One(entry.clone()).normalize(),
            OneOrMany::Many(vec![entry]).normalize()
        );
        assert!(OneOrMany::<WidgetEntry>::default().normalize().is_empty());
    }

    #[test]
    fn id_defaults_to_kind_name() {
        let config = DashboardConfig::from_json_str(
            r#"{"widgets": [{"kind": "service_status", "instances": {"colSpan": 2}}]}"#,
        )
        .unwrap();
        let descriptors = config.descriptors();
        assert_eq!(descriptors[0].id, "service_status");
        assert_eq!(descriptors[0].col_span, 2);
    }

    #[test]
    fn validation_reports_problems() {
        let mut config = DashboardConfig::from_toml_str(
            r#"
[[widgets]]
kind = "tasks"
instances = { id = "todo", col_span = 0 }

[[widgets]]
kind = "calendar"
instances = { id = "todo" }
"#,
        )
        .unwrap();
        config.grid.target_cell_width_px = 0.0;
        let errors = config.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(matches!(config.validated(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let config = DashboardConfig::from_toml_str(
            r#"
[[widgets]]
kind = "tasks"
instances = { id = "x" }

[[widgets]]
kind = "media"
instances = { id = "x" }
"#,
        )
        .unwrap();
        let descriptors = config.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].kind, WidgetKind::Tasks);
    }

    #[test]
    fn parse_errors_are_typed() {
        assert!(matches!(
            DashboardConfig::from_toml_str("grid = 3"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
        let err = DashboardConfig::from_toml_file("/definitely/missing.toml").unwrap_err();
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn metrics_follow_grid_config() {
        let grid = GridConfig {
            lg_min_width_px: 1000,
            ..GridConfig::default()
        };
        let m = grid.metrics();
        assert_eq!(m.breakpoints.lg_min_width_px, 1000);
        assert_eq!(m.target_cell_width_px, 70.0);
    }
}
