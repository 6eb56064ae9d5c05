#![forbid(unsafe_code)]

//! Layout primitives for the dashgrid widget grid.
//!
//! Everything in this crate is pure: no storage, no logging, no clocks.
//! The runtime crate composes these pieces into an event-driven engine.
//!
//! - [`Breakpoint`] / [`Breakpoints`]: viewport tiers and width classification.
//! - [`model`]: widget descriptors, layout items, and layout documents.
//! - [`dimensions`]: column count and cell size solver.
//! - [`migrate`]: upgrade of persisted legacy layout documents.
//! - [`interaction`]: drag/resize lifecycle tracking.

pub mod dimensions;
pub mod interaction;
pub mod migrate;
pub mod model;

pub use dimensions::{GridDimensions, GridMetrics, compute_cell_width, compute_columns};
pub use interaction::{
    InteractionEffect, InteractionEvent, InteractionMode, InteractionNoopReason, InteractionState,
    InteractionTracker, InteractionTransition,
};
pub use migrate::{
    LAYOUT_SCHEMA_VERSION, LEGACY_COLUMN_LIMIT, LEGACY_SCALE, MigrationReport, migrate,
    migrate_str, migrate_with_report,
};
pub use model::{LayoutDocument, LayoutItem, WidgetDescriptor, WidgetKind};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Breakpoints
// ---------------------------------------------------------------------------

/// A named viewport-width tier.
///
/// `Lg` is the desktop tier with a dynamically computed column count;
/// `Sm` is the mobile tier with a fixed column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Sm,
    Lg,
}

impl Breakpoint {
    /// All breakpoints in ascending width order.
    pub const ALL: [Breakpoint; 2] = [Breakpoint::Sm, Breakpoint::Lg];

    /// Persisted key for this breakpoint.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Lg => "lg",
        }
    }

    /// Key used by documents written before the `lg`/`sm` rename.
    #[must_use]
    pub const fn legacy_name(self) -> &'static str {
        match self {
            Self::Sm => "mobile",
            Self::Lg => "desktop",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized breakpoint name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBreakpoint(pub String);

impl fmt::Display for UnknownBreakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown breakpoint {:?} (expected \"lg\" or \"sm\")", self.0)
    }
}

impl std::error::Error for UnknownBreakpoint {}

impl FromStr for Breakpoint {
    type Err = UnknownBreakpoint;

    /// Accepts current names and their legacy aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lg" | "desktop" => Ok(Self::Lg),
            "sm" | "mobile" => Ok(Self::Sm),
            other => Err(UnknownBreakpoint(other.to_string())),
        }
    }
}

/// Column convention of a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSpec {
    /// Columns derived from the container width.
    Dynamic,
    /// A fixed column count.
    Fixed(u32),
}

/// Width thresholds and column conventions for both tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoints {
    /// Widths strictly above this many pixels classify as `Lg`.
    pub lg_min_width_px: u32,
    /// Fixed column count used at `Sm`.
    pub sm_columns: u32,
}

impl Breakpoints {
    /// 768 px desktop threshold, two mobile columns.
    pub const DEFAULT: Self = Self {
        lg_min_width_px: 768,
        sm_columns: 2,
    };

    /// Classify a container width into a breakpoint.
    #[must_use]
    pub fn classify(&self, width_px: f64) -> Breakpoint {
        if width_px > f64::from(self.lg_min_width_px) {
            Breakpoint::Lg
        } else {
            Breakpoint::Sm
        }
    }

    /// Minimum width (inclusive lower bound used for classification) of a tier.
    #[must_use]
    pub const fn min_width_px(&self, bp: Breakpoint) -> u32 {
        match bp {
            Breakpoint::Sm => 0,
            Breakpoint::Lg => self.lg_min_width_px,
        }
    }

    /// Column convention of a tier.
    #[must_use]
    pub const fn columns(&self, bp: Breakpoint) -> ColumnSpec {
        match bp {
            Breakpoint::Sm => ColumnSpec::Fixed(self.sm_columns),
            Breakpoint::Lg => ColumnSpec::Dynamic,
        }
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
