//! Upgrade of persisted layout documents to the current schema.
//!
//! Persisted documents come in three historical shapes:
//!
//! - `desktop`/`mobile` keys instead of `lg`/`sm`;
//! - positions on a 10-column base grid instead of the current doubled grid;
//! - the current shape, stamped with `"version": 2`.
//!
//! # Migration Steps
//!
//! 1. Legacy keys are renamed (`desktop` → `lg`, `mobile` → `sm`) and the old
//!    keys dropped. When both spellings exist the current one wins.
//! 2. Unstamped documents whose `lg` items all end at or before column
//!    [`LEGACY_COLUMN_LIMIT`] are scaled by [`LEGACY_SCALE`] on every axis, in
//!    every breakpoint. There is no down-migration.
//! 3. Anything that is not a JSON object yields an empty document.
//!
//! # Invariants
//!
//! 1. `migrate(migrate(doc)) == migrate(doc)`: the output is always stamped,
//!    and stamped documents are never rescaled.
//! 2. Output ids are unique per breakpoint; `w`/`h` are at least 1.
//!
//! # Failure Modes
//!
//! None surface as errors. Malformed input degrades to dropped items or an
//! empty document, with a note in [`MigrationReport::warnings`].

use serde::Deserialize;
use serde_json::Value;

use crate::Breakpoint;
use crate::model::{LayoutDocument, LayoutItem};

/// Current layout schema version written into every migrated document.
pub const LAYOUT_SCHEMA_VERSION: u16 = 2;

/// Largest `lg` right edge that marks an unstamped document as 10-column.
pub const LEGACY_COLUMN_LIMIT: u32 = 10;

/// Factor between the 10-column base grid and the current grid.
pub const LEGACY_SCALE: u32 = 2;

/// Outcome of one migration, with what was changed along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// The migrated document.
    pub document: LayoutDocument,
    /// Version stamp found on the input, if any.
    pub from_version: Option<u16>,
    /// `desktop`/`mobile` keys were renamed.
    pub renamed_legacy_keys: bool,
    /// Items were scaled from the 10-column grid.
    pub scaled_legacy_columns: bool,
    /// Items discarded as malformed or duplicate.
    pub dropped_items: usize,
    /// Human-readable notes about degraded input.
    pub warnings: Vec<String>,
}

impl MigrationReport {
    fn empty_with(warning: impl Into<String>) -> Self {
        Self {
            document: LayoutDocument::empty(),
            from_version: None,
            renamed_legacy_keys: false,
            scaled_legacy_columns: false,
            dropped_items: 0,
            warnings: vec![warning.into()],
        }
    }

    /// Whether the migrated document differs in shape from its input.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.renamed_legacy_keys
            || self.scaled_legacy_columns
            || self.dropped_items > 0
            || self.from_version != Some(LAYOUT_SCHEMA_VERSION)
    }
}

/// Migrate a raw JSON value into a current [`LayoutDocument`].
#[must_use]
pub fn migrate(raw: &Value) -> LayoutDocument {
    migrate_with_report(raw).document
}

/// Parse and migrate persisted text. Unparseable text yields an empty document.
#[must_use]
pub fn migrate_str(raw: &str) -> MigrationReport {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => migrate_with_report(&value),
        Err(err) => MigrationReport::empty_with(format!("layout JSON did not parse: {err}")),
    }
}

/// Migrate a raw JSON value, reporting every step that ran.
#[must_use]
pub fn migrate_with_report(raw: &Value) -> MigrationReport {
    let Some(source) = raw.as_object() else {
        return MigrationReport::empty_with(format!(
            "layout document is not an object (found {})",
            json_kind(raw)
        ));
    };
    let mut obj = source.clone();
    let mut report = MigrationReport {
        document: LayoutDocument::empty(),
        from_version: None,
        renamed_legacy_keys: false,
        scaled_legacy_columns: false,
        dropped_items: 0,
        warnings: Vec::new(),
    };

    for bp in Breakpoint::ALL {
        if let Some(legacy) = obj.remove(bp.legacy_name()) {
            report.renamed_legacy_keys = true;
            if obj.contains_key(bp.name()) {
                report.warnings.push(format!(
                    "both {:?} and {:?} present; keeping {:?}",
                    bp.legacy_name(),
                    bp.name(),
                    bp.name()
                ));
            } else {
                obj.insert(bp.name().to_string(), legacy);
            }
        }
    }

    report.from_version = obj
        .get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u16::try_from(v).ok());
    if let Some(v) = report.from_version.filter(|v| *v > LAYOUT_SCHEMA_VERSION) {
        report.warnings.push(format!(
            "layout schema version {v} is newer than {LAYOUT_SCHEMA_VERSION}; reading as current"
        ));
    }

    let mut doc = LayoutDocument::empty();
    for bp in Breakpoint::ALL {
        let Some(value) = obj.get(bp.name()) else {
            continue;
        };
        let Some(entries) = value.as_array() else {
            report.warnings.push(format!(
                "breakpoint {bp} holds {} instead of a list",
                json_kind(value)
            ));
            continue;
        };
        for entry in entries {
            match parse_item(entry) {
                Some(item) if doc.get(bp, &item.id).is_none() => doc.items_mut(bp).push(item),
                Some(item) => {
                    report.dropped_items += 1;
                    report
                        .warnings
                        .push(format!("duplicate id {:?} at {bp} dropped", item.id));
                }
                None => {
                    report.dropped_items += 1;
                    report.warnings.push(format!("malformed item at {bp} dropped: {entry}"));
                }
            }
        }
    }

    let stamped = report
        .from_version
        .is_some_and(|v| v >= LAYOUT_SCHEMA_VERSION);
    if !stamped && !doc.lg.is_empty() && doc.max_right(Breakpoint::Lg) <= LEGACY_COLUMN_LIMIT {
        for bp in Breakpoint::ALL {
            for item in doc.items_mut(bp) {
                scale(item, LEGACY_SCALE);
            }
        }
        report.scaled_legacy_columns = true;
    }

    report.document = doc;
    report
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(alias = "id")]
    i: String,
    #[serde(default)]
    x: u32,
    #[serde(default)]
    y: u32,
    w: u32,
    h: u32,
}

fn parse_item(value: &Value) -> Option<LayoutItem> {
    let raw = RawItem::deserialize(value).ok()?;
    if raw.i.is_empty() {
        return None;
    }
    Some(LayoutItem::new(raw.i, raw.x, raw.y, raw.w, raw.h))
}

fn scale(item: &mut LayoutItem, factor: u32) {
    item.x = item.x.saturating_mul(factor);
    item.y = item.y.saturating_mul(factor);
    item.w = item.w.saturating_mul(factor);
    item.h = item.h.saturating_mul(factor);
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
