//! Which configured widgets are shown.
//!
//! Hiding a widget only removes it from the visible set; its layout items
//! stay in the [`LayoutStore`] so showing it again restores its position.
//! Showing a widget that has no item at the current breakpoint synthesizes
//! one from its descriptor.
//!
//! # Invariants
//!
//! 1. The visible set only contains ids present in the [`WidgetCatalog`].
//! 2. The set is written under [`VISIBLE_WIDGETS_KEY`] after every change.
//! 3. With nothing persisted, every configured widget is visible.
//!
//! # Failure Modes
//!
//! - Toggling an unknown id is a logged no-op.
//! - An unreadable persisted set falls back to "all visible".

use std::collections::BTreeSet;
use std::sync::Arc;

use dashgrid_layout::Breakpoint;

use crate::catalog::WidgetCatalog;
use crate::storage::{StorageBackend, VISIBLE_WIDGETS_KEY};
use crate::store::LayoutStore;

/// Result of a visibility toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Hidden,
    Shown {
        /// A layout item had to be created for the current breakpoint.
        synthesized: bool,
    },
    /// No configured widget has this id; nothing changed.
    UnknownWidget,
}

/// Owner of the visible widget id set.
pub struct VisibilityController {
    storage: Arc<dyn StorageBackend>,
    visible: BTreeSet<String>,
}

impl std::fmt::Debug for VisibilityController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityController")
            .field("storage", &self.storage.name())
            .field("visible", &self.visible)
            .finish()
    }
}

impl VisibilityController {
    /// Load the persisted set, defaulting to every configured widget.
    pub fn load(storage: Arc<dyn StorageBackend>, catalog: &WidgetCatalog) -> Self {
        let persisted = match storage.load(VISIBLE_WIDGETS_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<Vec<String>>(&text) {
                Ok(ids) => Some(ids),
                Err(err) => {
                    tracing::warn!(
                        target: "dashgrid.visibility",
                        error = %err,
                        "persisted visible widgets unreadable; showing all"
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(
                    target: "dashgrid.visibility",
                    backend = storage.name(),
                    error = %err,
                    "failed to read visible widgets; showing all"
                );
                None
            }
        };

        let visible = match persisted {
            Some(ids) => ids
                .into_iter()
                .filter(|id| {
                    let known = catalog.contains(id);
                    if !known {
                        tracing::debug!(
                            target: "dashgrid.visibility",
                            widget = %id,
                            "dropping visible id with no configured widget"
                        );
                    }
                    known
                })
                .collect(),
            None => catalog.ids().map(str::to_string).collect(),
        };
        Self { storage, visible }
    }

    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    /// Visible ids in configuration order.
    #[must_use]
    pub fn visible_ids(&self, catalog: &WidgetCatalog) -> Vec<String> {
        catalog
            .ids()
            .filter(|id| self.visible.contains(*id))
            .map(str::to_string)
            .collect()
    }

    #[must_use]
    pub fn visible_set(&self) -> &BTreeSet<String> {
        &self.visible
    }

    /// Flip visibility of `id` at breakpoint `bp`.
    pub fn toggle(
        &mut self,
        id: &str,
        bp: Breakpoint,
        catalog: &WidgetCatalog,
        store: &mut LayoutStore,
    ) -> ToggleOutcome {
        let Some(descriptor) = catalog.get(id) else {
            tracing::warn!(target: "dashgrid.visibility", widget = %id, "toggle for unknown widget ignored");
            return ToggleOutcome::UnknownWidget;
        };

        let outcome = if self.visible.remove(id) {
            ToggleOutcome::Hidden
        } else {
            self.visible.insert(id.to_string());
            ToggleOutcome::Shown {
                synthesized: store.ensure_item(bp, descriptor),
            }
        };
        tracing::debug!(target: "dashgrid.visibility", widget = %id, ?outcome, "visibility toggled");
        self.persist();
        outcome
    }

    fn persist(&self) {
        let ids: Vec<&str> = self.visible.iter().map(String::as_str).collect();
        let result = serde_json::to_string(&ids)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage
                    .save(VISIBLE_WIDGETS_KEY, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = result {
            tracing::warn!(
                target: "dashgrid.visibility",
                backend = self.storage.name(),
                %error,
                "failed to persist visible widgets"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
