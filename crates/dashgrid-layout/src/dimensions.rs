//! Column count and cell size solver.
//!
//! Turns a container width in pixels plus the active [`Breakpoint`] into the
//! column count, cell width, and row height the grid primitive needs.
//!
//! # Invariants
//!
//! 1. `Sm` always yields the fixed configured column count.
//! 2. `Lg` yields `max(min_lg_columns, floor((W - padding + margin) / (target + margin)))`.
//! 3. `columns * cell_width + margin * (columns - 1) + padding == W` up to
//!    floating-point error.
//! 4. `row_height == cell_width` (square cells).
//!
//! # Failure Modes
//!
//! - Zero or non-finite widths are never solved directly; callers substitute
//!   a fallback width first (see [`GridMetrics::effective_width`]).
//! - A column count of zero is treated as one to avoid division by zero.

use serde::{Deserialize, Serialize};

use crate::{Breakpoint, Breakpoints, ColumnSpec};

/// Pixel metrics shared by every solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub breakpoints: Breakpoints,
    /// Gap between adjacent cells.
    pub margin_px: f64,
    /// Total horizontal container padding.
    pub padding_px: f64,
    /// Desired cell width the `Lg` column count aims for.
    pub target_cell_width_px: f64,
    /// Lower bound for the `Lg` column count.
    pub min_lg_columns: u32,
}

impl GridMetrics {
    pub const DEFAULT: Self = Self {
        breakpoints: Breakpoints::DEFAULT,
        margin_px: 8.0,
        padding_px: 20.0,
        target_cell_width_px: 70.0,
        min_lg_columns: 10,
    };

    /// Replace an unusable measured width with `fallback_px`.
    ///
    /// A container that has not been laid out yet reports `0`.
    #[must_use]
    pub fn effective_width(measured_px: f64, fallback_px: f64) -> f64 {
        if measured_px.is_finite() && measured_px > 0.0 {
            measured_px
        } else {
            fallback_px
        }
    }
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Resolved grid geometry for one container width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDimensions {
    pub breakpoint: Breakpoint,
    pub width_px: f64,
    pub columns: u32,
    pub cell_width: f64,
    pub row_height: f64,
}

impl GridDimensions {
    /// Solve columns and cell size for `width_px` at `bp`.
    #[must_use]
    pub fn solve(width_px: f64, bp: Breakpoint, metrics: &GridMetrics) -> Self {
        let columns = compute_columns(width_px, bp, metrics);
        let cell_width =
            compute_cell_width(width_px, metrics.padding_px, metrics.margin_px, columns);
        Self {
            breakpoint: bp,
            width_px,
            columns,
            cell_width,
            row_height: cell_width,
        }
    }
}

/// Column count for a container width at a breakpoint.
#[must_use]
pub fn compute_columns(container_width_px: f64, bp: Breakpoint, metrics: &GridMetrics) -> u32 {
    match metrics.breakpoints.columns(bp) {
        ColumnSpec::Fixed(n) => n.max(1),
        ColumnSpec::Dynamic => {
            let raw = ((container_width_px - metrics.padding_px + metrics.margin_px)
                / (metrics.target_cell_width_px + metrics.margin_px))
                .floor();
            let fitted = if raw.is_finite() && raw > 0.0 {
                raw.min(f64::from(u32::MAX)) as u32
            } else {
                0
            };
            fitted.max(metrics.min_lg_columns).max(1)
        }
    }
}

/// Exact cell width tiling `container_width_px` with `columns` cells and
/// `columns - 1` gaps.
#[must_use]
pub fn compute_cell_width(
    container_width_px: f64,
    padding_px: f64,
    margin_px: f64,
    columns: u32,
) -> f64 {
    let columns = columns.max(1);
    let gaps = f64::from(columns - 1);
    (container_width_px - padding_px - margin_px * gaps) / f64::from(columns)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
