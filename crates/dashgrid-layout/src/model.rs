//! Widget descriptors, layout items, and per-breakpoint layout documents.
//!
//! # Invariants
//!
//! 1. Within one breakpoint's item list, ids are unique. [`LayoutDocument::merge`]
//!    and [`LayoutDocument::upsert`] preserve this.
//! 2. Item order is insertion order, not positional order.
//! 3. `w` and `h` are at least 1 for every item built through this module.
//! 4. Synthesized `lg` items are the descriptor's base placement scaled by
//!    [`LEGACY_SCALE`]; synthesized `sm` items are full-width stacked blocks.

use serde::{Deserialize, Serialize};

use crate::Breakpoint;
use crate::migrate::{LAYOUT_SCHEMA_VERSION, LEGACY_SCALE};

// ---------------------------------------------------------------------------
// Widget descriptors
// ---------------------------------------------------------------------------

/// Kind of content a widget renders. Opaque to the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Weather,
    Calendar,
    ServiceStatus,
    Sports,
    Tasks,
    Rss,
    Media,
    Bookmarks,
    Clock,
    Custom,
}

/// Base placement of a configured widget, in base-grid (10-column) units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetDescriptor {
    pub id: String,
    pub kind: WidgetKind,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(alias = "colSpan", default = "one")]
    pub col_span: u32,
    #[serde(alias = "rowSpan", default = "one")]
    pub row_span: u32,
}

fn one() -> u32 {
    1
}

impl WidgetDescriptor {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: WidgetKind) -> Self {
        Self {
            id: id.into(),
            kind,
            x: 0,
            y: 0,
            col_span: 1,
            row_span: 1,
        }
    }

    #[must_use]
    pub fn at(mut self, x: u32, y: u32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    #[must_use]
    pub fn span(mut self, col_span: u32, row_span: u32) -> Self {
        self.col_span = col_span.max(1);
        self.row_span = row_span.max(1);
        self
    }
}

// ---------------------------------------------------------------------------
// Layout items
// ---------------------------------------------------------------------------

/// One widget's position and size, in grid units, for one breakpoint.
///
/// Serialized with `i` as the id key, which is what the grid primitive emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutItem {
    #[serde(rename = "i", alias = "id")]
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutItem {
    #[must_use]
    pub fn new(id: impl Into<String>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w: w.max(1),
            h: h.max(1),
        }
    }

    /// Desktop placement derived from a descriptor's base placement.
    #[must_use]
    pub fn from_descriptor(descriptor: &WidgetDescriptor) -> Self {
        Self::new(
            descriptor.id.clone(),
            descriptor.x.saturating_mul(LEGACY_SCALE),
            descriptor.y.saturating_mul(LEGACY_SCALE),
            descriptor.col_span.saturating_mul(LEGACY_SCALE),
            descriptor.row_span.saturating_mul(LEGACY_SCALE),
        )
    }

    /// Full-width mobile block at row `y`.
    #[must_use]
    pub fn stacked(descriptor: &WidgetDescriptor, y: u32, columns: u32) -> Self {
        Self::new(
            descriptor.id.clone(),
            0,
            y,
            columns,
            descriptor.row_span.saturating_mul(LEGACY_SCALE),
        )
    }

    /// Exclusive right edge (`x + w`).
    #[must_use]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge (`y + h`).
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
}

// ---------------------------------------------------------------------------
// Layout documents
// ---------------------------------------------------------------------------

/// Layout items for every breakpoint, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Schema stamp; absent on documents written before versioning.
    #[serde(default = "current_version")]
    pub version: u16,
    #[serde(default)]
    pub lg: Vec<LayoutItem>,
    #[serde(default)]
    pub sm: Vec<LayoutItem>,
}

fn current_version() -> u16 {
    LAYOUT_SCHEMA_VERSION
}

impl Default for LayoutDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl LayoutDocument {
    /// `{lg: [], sm: []}` at the current schema version.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: LAYOUT_SCHEMA_VERSION,
            lg: Vec::new(),
            sm: Vec::new(),
        }
    }

    /// Build a fresh document from configured descriptors.
    ///
    /// `lg` uses each descriptor's scaled base placement; `sm` stacks every
    /// widget as a full-width block in descriptor order.
    #[must_use]
    pub fn synthesize(descriptors: &[WidgetDescriptor], sm_columns: u32) -> Self {
        let mut doc = Self::empty();
        let mut next_y = 0u32;
        for descriptor in descriptors {
            if doc.get(Breakpoint::Lg, &descriptor.id).is_some() {
                continue;
            }
            doc.lg.push(LayoutItem::from_descriptor(descriptor));
            let block = LayoutItem::stacked(descriptor, next_y, sm_columns.max(1));
            next_y = block.bottom();
            doc.sm.push(block);
        }
        doc
    }

    #[must_use]
    pub fn items(&self, bp: Breakpoint) -> &[LayoutItem] {
        match bp {
            Breakpoint::Lg => &self.lg,
            Breakpoint::Sm => &self.sm,
        }
    }

    pub fn items_mut(&mut self, bp: Breakpoint) -> &mut Vec<LayoutItem> {
        match bp {
            Breakpoint::Lg => &mut self.lg,
            Breakpoint::Sm => &mut self.sm,
        }
    }

    #[must_use]
    pub fn get(&self, bp: Breakpoint, id: &str) -> Option<&LayoutItem> {
        self.items(bp).iter().find(|item| item.id == id)
    }

    /// Whether no breakpoint has any items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lg.is_empty() && self.sm.is_empty()
    }

    /// Largest `x + w` at a breakpoint, `0` when empty.
    #[must_use]
    pub fn max_right(&self, bp: Breakpoint) -> u32 {
        self.items(bp).iter().map(LayoutItem::right).max().unwrap_or(0)
    }

    /// Largest `y + h` at a breakpoint, `0` when empty.
    #[must_use]
    pub fn bottom(&self, bp: Breakpoint) -> u32 {
        self.items(bp).iter().map(LayoutItem::bottom).max().unwrap_or(0)
    }

    /// Replace the item with the same id in place, or append it.
    pub fn upsert(&mut self, bp: Breakpoint, item: LayoutItem) {
        let items = self.items_mut(bp);
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    /// Merge a batch of items into one breakpoint.
    ///
    /// Matching ids are replaced in place, unknown ids are appended in the
    /// order given, and items not mentioned keep their stored position.
    /// Other breakpoints are untouched. Returns how many items changed.
    pub fn merge(&mut self, bp: Breakpoint, items: impl IntoIterator<Item = LayoutItem>) -> usize {
        let mut changed = 0;
        for item in items {
            let item = LayoutItem::new(item.id, item.x, item.y, item.w, item.h);
            if self.get(bp, &item.id) != Some(&item) {
                changed += 1;
                self.upsert(bp, item);
            }
        }
        changed
    }

    /// Ids present at a breakpoint, in stored order.
    pub fn ids(&self, bp: Breakpoint) -> impl Iterator<Item = &str> {
        self.items(bp).iter().map(|item| item.id.as_str())
    }

    /// Copy of the document restricted to items accepted by `keep`.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            version: self.version,
            lg: self.lg.iter().filter(|i| keep(&i.id)).cloned().collect(),
            sm: self.sm.iter().filter(|i| keep(&i.id)).cloned().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
