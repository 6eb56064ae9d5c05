//! Event-driven layout engine: the one component the rendering layer talks to.
//!
//! The engine is a reducer over [`GridEvent`]s from the grid primitive and
//! the window. Each event updates some of: grid dimensions, the persisted
//! layout, the visible set, the interaction state. The rendering layer reads
//! the result through [`LayoutEngine::render_model`] on every paint.
//!
//! # Invariants
//!
//! 1. Dimensions are always solved from a positive width: a zero measurement
//!    is replaced by the last window width (or the configured fallback).
//! 2. Re-applying the same viewport width is a no-op.
//! 3. Every visible widget has a layout item at the active breakpoint.
//! 4. Interaction state never reaches storage.
//!
//! # Failure Modes
//!
//! None propagate. Unknown breakpoint names and unknown widget ids are
//! logged and ignored; storage problems are logged by the store and
//! visibility controller.

use std::sync::Arc;

use serde::Serialize;

use dashgrid_layout::{
    Breakpoint, GridDimensions, GridMetrics, InteractionEvent, InteractionMode, InteractionTracker,
    LayoutDocument, LayoutItem, WidgetDescriptor,
};

use crate::catalog::WidgetCatalog;
use crate::config::{DashboardConfig, GridConfig};
use crate::storage::{SHOW_DEBUG_KEY, StorageBackend};
use crate::store::LayoutStore;
use crate::visibility::{ToggleOutcome, VisibilityController};

// ---------------------------------------------------------------------------
// Events and results
// ---------------------------------------------------------------------------

/// Everything the engine reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Measured container width changed.
    ViewportResized { width_px: f64 },
    /// Window width changed; used when the container measures zero.
    WindowResized { width_px: f64 },
    /// The grid primitive switched breakpoint.
    BreakpointChanged { name: String },
    /// A drag or resize finished with these positions.
    LayoutCommitted {
        breakpoint: Breakpoint,
        items: Vec<LayoutItem>,
    },
    DragStarted { widget: String },
    DragStopped { widget: String },
    ResizeStarted { widget: String },
    ResizeStopped { widget: String },
    WidgetToggled { widget: String },
    DebugOverlayToggled,
}

/// What an event changed; the rendering layer repaints when non-empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub dimensions: bool,
    pub layout: bool,
    pub visibility: bool,
    pub interaction: bool,
    pub debug: bool,
}

impl Changes {
    pub const NONE: Self = Self {
        dimensions: false,
        layout: false,
        visibility: false,
        interaction: false,
        debug: false,
    };

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

/// Interaction summary for visual feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionView {
    pub active_widget_id: Option<String>,
    pub mode: InteractionMode,
}

/// The read model the rendering layer needs for one paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub breakpoint: Breakpoint,
    pub columns: u32,
    pub cell_width: f64,
    pub row_height: f64,
    /// Items of visible widgets, per breakpoint.
    pub layouts: LayoutDocument,
    /// Visible widget ids in configuration order.
    pub visible_widget_ids: Vec<String>,
    pub interaction: InteractionView,
    pub is_grid_active: bool,
    pub show_debug: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Composes the dimension solver, store, visibility, and interaction tracker.
pub struct LayoutEngine {
    metrics: GridMetrics,
    catalog: WidgetCatalog,
    storage: Arc<dyn StorageBackend>,
    store: LayoutStore,
    visibility: VisibilityController,
    tracker: InteractionTracker,
    dimensions: GridDimensions,
    window_width_px: f64,
    show_debug: bool,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("dimensions", &self.dimensions)
            .field("store", &self.store)
            .field("visibility", &self.visibility)
            .field("interaction", self.tracker.state())
            .field("show_debug", &self.show_debug)
            .finish()
    }
}

impl LayoutEngine {
    /// Start an engine: load persisted state and solve dimensions for the
    /// fallback window width.
    pub fn new(
        grid: &GridConfig,
        descriptors: impl IntoIterator<Item = WidgetDescriptor>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let metrics = grid.metrics();
        let catalog = WidgetCatalog::new(descriptors);
        let store = LayoutStore::load(
            storage.clone(),
            catalog.descriptors(),
            metrics.breakpoints.sm_columns,
        );
        let visibility = VisibilityController::load(storage.clone(), &catalog);
        let show_debug = load_debug_flag(storage.as_ref());

        let window_width_px = grid.fallback_window_width_px;
        let breakpoint = metrics.breakpoints.classify(window_width_px);
        let dimensions = GridDimensions::solve(window_width_px, breakpoint, &metrics);

        let mut engine = Self {
            metrics,
            catalog,
            storage,
            store,
            visibility,
            tracker: InteractionTracker::new(),
            dimensions,
            window_width_px,
            show_debug,
        };
        engine.place_visible(breakpoint);
        tracing::info!(
            target: "dashgrid.engine",
            widgets = engine.catalog.len(),
            visible = engine.visibility.visible_set().len(),
            layout_source = ?engine.store.source(),
            breakpoint = %breakpoint,
            columns = engine.dimensions.columns,
            "layout engine started"
        );
        engine
    }

    /// Start from a loaded [`DashboardConfig`].
    pub fn from_config(config: &DashboardConfig, storage: Arc<dyn StorageBackend>) -> Self {
        Self::new(&config.grid, config.descriptors(), storage)
    }

    // --- accessors -------------------------------------------------------

    #[must_use]
    pub fn dimensions(&self) -> &GridDimensions {
        &self.dimensions
    }

    #[must_use]
    pub fn breakpoint(&self) -> Breakpoint {
        self.dimensions.breakpoint
    }

    #[must_use]
    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    #[must_use]
    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.visibility.is_visible(id)
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionTracker {
        &self.tracker
    }

    #[must_use]
    pub fn show_debug(&self) -> bool {
        self.show_debug
    }

    // --- reducer ---------------------------------------------------------

    /// Apply one event.
    pub fn apply(&mut self, event: GridEvent) -> Changes {
        match event {
            GridEvent::ViewportResized { width_px } => {
                let width = GridMetrics::effective_width(width_px, self.window_width_px);
                if width_px != width {
                    tracing::debug!(
                        target: "dashgrid.engine",
                        measured = width_px,
                        substituted = width,
                        "unusable container width; using window width"
                    );
                }
                let bp = self.metrics.breakpoints.classify(width);
                self.resolve(width, bp)
            }
            GridEvent::WindowResized { width_px } => {
                if width_px.is_finite() && width_px > 0.0 {
                    self.window_width_px = width_px;
                }
                Changes::NONE
            }
            GridEvent::BreakpointChanged { name } => match name.parse::<Breakpoint>() {
                Ok(bp) => self.resolve(self.dimensions.width_px, bp),
                Err(err) => {
                    tracing::warn!(target: "dashgrid.engine", error = %err, "breakpoint change ignored");
                    Changes::NONE
                }
            },
            GridEvent::LayoutCommitted { breakpoint, items } => {
                let changed = self.store.set_breakpoint_layout(breakpoint, items);
                Changes {
                    layout: changed > 0,
                    ..Changes::NONE
                }
            }
            GridEvent::DragStarted { widget } => self.interact(InteractionEvent::DragStart(widget)),
            GridEvent::DragStopped { widget } => self.interact(InteractionEvent::DragStop(widget)),
            GridEvent::ResizeStarted { widget } => {
                self.interact(InteractionEvent::ResizeStart(widget))
            }
            GridEvent::ResizeStopped { widget } => {
                self.interact(InteractionEvent::ResizeStop(widget))
            }
            GridEvent::WidgetToggled { widget } => {
                let bp = self.breakpoint();
                match self
                    .visibility
                    .toggle(&widget, bp, &self.catalog, &mut self.store)
                {
                    ToggleOutcome::UnknownWidget => Changes::NONE,
                    ToggleOutcome::Hidden => Changes {
                        visibility: true,
                        ..Changes::NONE
                    },
                    ToggleOutcome::Shown { synthesized } => Changes {
                        visibility: true,
                        layout: synthesized,
                        ..Changes::NONE
                    },
                }
            }
            GridEvent::DebugOverlayToggled => {
                self.show_debug = !self.show_debug;
                let value = if self.show_debug { "true" } else { "false" };
                if let Err(err) = self.storage.save(SHOW_DEBUG_KEY, value) {
                    tracing::warn!(target: "dashgrid.engine", error = %err, "failed to persist debug flag");
                }
                Changes {
                    debug: true,
                    ..Changes::NONE
                }
            }
        }
    }

    // --- rendering-layer conveniences ------------------------------------

    pub fn on_viewport_resize(&mut self, width_px: f64) -> Changes {
        self.apply(GridEvent::ViewportResized { width_px })
    }

    pub fn on_window_resize(&mut self, width_px: f64) -> Changes {
        self.apply(GridEvent::WindowResized { width_px })
    }

    pub fn on_breakpoint_change(&mut self, name: &str) -> Changes {
        self.apply(GridEvent::BreakpointChanged {
            name: name.to_string(),
        })
    }

    pub fn on_layout_commit(
        &mut self,
        breakpoint: Breakpoint,
        items: impl IntoIterator<Item = LayoutItem>,
    ) -> Changes {
        self.apply(GridEvent::LayoutCommitted {
            breakpoint,
            items: items.into_iter().collect(),
        })
    }

    pub fn on_drag_start(&mut self, widget: &str) -> Changes {
        self.apply(GridEvent::DragStarted {
            widget: widget.to_string(),
        })
    }

    pub fn on_drag_stop(&mut self, widget: &str) -> Changes {
        self.apply(GridEvent::DragStopped {
            widget: widget.to_string(),
        })
    }

    pub fn on_resize_start(&mut self, widget: &str) -> Changes {
        self.apply(GridEvent::ResizeStarted {
            widget: widget.to_string(),
        })
    }

    pub fn on_resize_stop(&mut self, widget: &str) -> Changes {
        self.apply(GridEvent::ResizeStopped {
            widget: widget.to_string(),
        })
    }

    pub fn on_toggle_widget(&mut self, widget: &str) -> Changes {
        self.apply(GridEvent::WidgetToggled {
            widget: widget.to_string(),
        })
    }

    pub fn toggle_debug_overlay(&mut self) -> Changes {
        self.apply(GridEvent::DebugOverlayToggled)
    }

    /// Throw away custom positions and rebuild from configuration.
    pub fn reset_layout(&mut self) -> Changes {
        self.store.reset(self.catalog.descriptors());
        self.place_visible(self.breakpoint());
        tracing::info!(target: "dashgrid.engine", "layout reset to configuration defaults");
        Changes {
            layout: true,
            ..Changes::NONE
        }
    }

    /// Everything the rendering layer needs for the next paint.
    #[must_use]
    pub fn render_model(&self) -> RenderModel {
        let state = self.tracker.state();
        RenderModel {
            breakpoint: self.dimensions.breakpoint,
            columns: self.dimensions.columns,
            cell_width: self.dimensions.cell_width,
            row_height: self.dimensions.row_height,
            layouts: self
                .store
                .document()
                .filtered(|id| self.visibility.is_visible(id)),
            visible_widget_ids: self.visibility.visible_ids(&self.catalog),
            interaction: InteractionView {
                active_widget_id: state.active_widget_id().map(str::to_string),
                mode: state.mode(),
            },
            is_grid_active: self.tracker.is_grid_active(),
            show_debug: self.show_debug,
        }
    }

    // --- internals -------------------------------------------------------

    fn resolve(&mut self, width_px: f64, bp: Breakpoint) -> Changes {
        let next = GridDimensions::solve(width_px, bp, &self.metrics);
        if next == self.dimensions {
            return Changes::NONE;
        }
        let breakpoint_changed = next.breakpoint != self.dimensions.breakpoint;
        tracing::debug!(
            target: "dashgrid.engine",
            width_px,
            breakpoint = %bp,
            columns = next.columns,
            cell_width = next.cell_width,
            "grid dimensions recomputed"
        );
        self.dimensions = next;
        let placed = breakpoint_changed && self.place_visible(bp);
        Changes {
            dimensions: true,
            layout: placed,
            ..Changes::NONE
        }
    }

    /// Synthesize items for visible widgets missing at `bp`.
    fn place_visible(&mut self, bp: Breakpoint) -> bool {
        let mut placed = false;
        for descriptor in self.catalog.descriptors() {
            if self.visibility.is_visible(&descriptor.id) {
                placed |= self.store.ensure_item(bp, descriptor);
            }
        }
        placed
    }

    fn interact(&mut self, event: InteractionEvent) -> Changes {
        let transition = self.tracker.apply(&event);
        tracing::debug!(
            target: "dashgrid.engine",
            transition_id = transition.transition_id,
            effect = ?transition.effect,
            "interaction"
        );
        Changes {
            interaction: transition.from != transition.to,
            ..Changes::NONE
        }
    }
}

fn load_debug_flag(storage: &dyn StorageBackend) -> bool {
    match storage.load(SHOW_DEBUG_KEY) {
        Ok(Some(value)) => value.trim() == "true",
        Ok(None) => false,
        Err(err) => {
            tracing::warn!(target: "dashgrid.engine", error = %err, "failed to read debug flag");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
