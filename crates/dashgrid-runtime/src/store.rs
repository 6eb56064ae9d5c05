//! Persisted layout document with write-through on every mutation.
//!
//! # Invariants
//!
//! 1. The in-memory document is always migrated to the current schema.
//! 2. Every mutation writes the whole document under [`LAYOUTS_KEY`].
//! 3. Ids stay unique per breakpoint (merges replace by id).
//!
//! # Failure Modes
//!
//! - Absent, unparseable, or empty persisted layouts fall back to a
//!   synthesized document, logged at `warn` when something was there.
//! - Storage failures are logged at `warn`; the in-memory document remains
//!   authoritative for the session.

use std::sync::Arc;

use dashgrid_layout::migrate::migrate_str;
use dashgrid_layout::{Breakpoint, LayoutDocument, LayoutItem, WidgetDescriptor};

use crate::storage::{LAYOUTS_KEY, StorageBackend, StorageError, StorageResult};

/// Where the document in a freshly loaded store came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSource {
    /// Persisted document, already current.
    Persisted,
    /// Persisted document upgraded from an older shape.
    Migrated,
    /// Built from descriptors.
    Synthesized,
}

/// Owner of the persisted [`LayoutDocument`].
pub struct LayoutStore {
    storage: Arc<dyn StorageBackend>,
    document: LayoutDocument,
    sm_columns: u32,
    source: LayoutSource,
}

impl std::fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStore")
            .field("storage", &self.storage.name())
            .field("document", &self.document)
            .field("sm_columns", &self.sm_columns)
            .field("source", &self.source)
            .finish()
    }
}

impl LayoutStore {
    /// Load, migrate, or synthesize the document.
    pub fn load(
        storage: Arc<dyn StorageBackend>,
        descriptors: &[WidgetDescriptor],
        sm_columns: u32,
    ) -> Self {
        let raw = match storage.load(LAYOUTS_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(
                    target: "dashgrid.store",
                    backend = storage.name(),
                    error = %err,
                    "failed to read persisted layouts"
                );
                None
            }
        };

        let (document, source) = match raw {
            None => {
                tracing::debug!(target: "dashgrid.store", "no persisted layouts");
                (
                    Self::synthesize(descriptors, sm_columns),
                    LayoutSource::Synthesized,
                )
            }
            Some(text) => {
                let report = migrate_str(&text);
                for warning in &report.warnings {
                    tracing::warn!(target: "dashgrid.store", %warning, "persisted layouts degraded");
                }
                if report.document.is_empty() {
                    tracing::warn!(
                        target: "dashgrid.store",
                        "persisted layouts empty or unusable; synthesizing from configuration"
                    );
                    (
                        Self::synthesize(descriptors, sm_columns),
                        LayoutSource::Synthesized,
                    )
                } else if report.changed() {
                    tracing::info!(
                        target: "dashgrid.store",
                        renamed_legacy_keys = report.renamed_legacy_keys,
                        scaled_legacy_columns = report.scaled_legacy_columns,
                        dropped_items = report.dropped_items,
                        "migrated persisted layouts"
                    );
                    (report.document, LayoutSource::Migrated)
                } else {
                    (report.document, LayoutSource::Persisted)
                }
            }
        };

        let store = Self {
            storage,
            document,
            sm_columns,
            source,
        };
        if source != LayoutSource::Persisted {
            store.write_through();
        }
        store
    }

    /// Fresh document from descriptors: scaled desktop placement, stacked
    /// full-width mobile blocks.
    #[must_use]
    pub fn synthesize(descriptors: &[WidgetDescriptor], sm_columns: u32) -> LayoutDocument {
        LayoutDocument::synthesize(descriptors, sm_columns)
    }

    #[must_use]
    pub fn document(&self) -> &LayoutDocument {
        &self.document
    }

    #[must_use]
    pub fn source(&self) -> LayoutSource {
        self.source
    }

    #[must_use]
    pub fn get_item(&self, bp: Breakpoint, id: &str) -> Option<&LayoutItem> {
        self.document.get(bp, id)
    }

    /// Merge `items` into `bp` by id and write through.
    ///
    /// Items not mentioned keep their position, including those of hidden
    /// widgets. Returns how many items changed.
    pub fn set_breakpoint_layout(
        &mut self,
        bp: Breakpoint,
        items: impl IntoIterator<Item = LayoutItem>,
    ) -> usize {
        let changed = self.document.merge(bp, items);
        if changed > 0 {
            tracing::debug!(target: "dashgrid.store", breakpoint = %bp, changed, "layout committed");
            self.write_through();
        }
        changed
    }

    /// Ensure `descriptor` has an item at `bp`, synthesizing one if missing.
    ///
    /// Desktop items use the scaled base placement; mobile items are
    /// appended as a full-width block below everything else. Returns `true`
    /// when an item was created.
    pub fn ensure_item(&mut self, bp: Breakpoint, descriptor: &WidgetDescriptor) -> bool {
        if self.document.get(bp, &descriptor.id).is_some() {
            return false;
        }
        let item = match bp {
            Breakpoint::Lg => LayoutItem::from_descriptor(descriptor),
            Breakpoint::Sm => {
                LayoutItem::stacked(descriptor, self.document.bottom(bp), self.sm_columns)
            }
        };
        tracing::debug!(
            target: "dashgrid.store",
            breakpoint = %bp,
            widget = %descriptor.id,
            x = item.x,
            y = item.y,
            w = item.w,
            h = item.h,
            "synthesized layout item"
        );
        self.set_breakpoint_layout(bp, [item]) > 0
    }

    /// Discard the document and rebuild it from descriptors.
    pub fn reset(&mut self, descriptors: &[WidgetDescriptor]) {
        self.document = Self::synthesize(descriptors, self.sm_columns);
        self.source = LayoutSource::Synthesized;
        self.write_through();
    }

    /// Serialize and save the whole document.
    pub fn persist(&self) -> StorageResult<()> {
        let json = serde_json::to_string(&self.document)
            .map_err(|e| StorageError::Unavailable(format!("layout serialization failed: {e}")))?;
        self.storage.save(LAYOUTS_KEY, &json)
    }

    fn write_through(&self) {
        if let Err(err) = self.persist() {
            tracing::warn!(
                target: "dashgrid.store",
                backend = self.storage.name(),
                error = %err,
                "failed to persist layouts"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
