//! Property invariants for the column solver and the layout migrator.
//!
//! Columns and cell widths are checked against their closed forms for random
//! desktop widths; migration is checked for idempotence over random legacy
//! and current documents.

use dashgrid_layout::{
    Breakpoint, GridDimensions, GridMetrics, LayoutDocument, LayoutItem, compute_cell_width,
    compute_columns, migrate,
};
use proptest::prelude::*;
use serde_json::{Value, json};

fn expected_columns(width: f64, m: &GridMetrics) -> u32 {
    let raw = ((width - m.padding_px + m.margin_px) / (m.target_cell_width_px + m.margin_px)).floor();
    (raw as i64).max(i64::from(m.min_lg_columns)) as u32
}

fn raw_item() -> impl Strategy<Value = Value> {
    ("[a-e]", 0u32..12, 0u32..12, 0u32..8, 0u32..8)
        .prop_map(|(id, x, y, w, h)| json!({"i": id, "x": x, "y": y, "w": w, "h": h}))
}

fn raw_document() -> impl Strategy<Value = Value> {
    (
        prop::collection::vec(raw_item(), 0..6),
        prop::collection::vec(raw_item(), 0..6),
        any::<bool>(),
        prop::option::of(0u16..4),
    )
        .prop_map(|(large, small, legacy_keys, version)| {
            let (lg, sm) = if legacy_keys {
                ("desktop", "mobile")
            } else {
                ("lg", "sm")
            };
            let mut doc = serde_json::Map::new();
            doc.insert(lg.to_string(), Value::Array(large));
            doc.insert(sm.to_string(), Value::Array(small));
            if let Some(v) = version {
                doc.insert("version".to_string(), json!(v));
            }
            Value::Object(doc)
        })
}

proptest! {
    #[test]
    fn desktop_columns_follow_formula(width in 769.0f64..8000.0) {
        let m = GridMetrics::DEFAULT;
        prop_assert_eq!(compute_columns(width, Breakpoint::Lg, &m), expected_columns(width, &m));
    }

    #[test]
    fn desktop_columns_respect_custom_metrics(
        width in 769.0f64..5000.0,
        target in 20.0f64..200.0,
        margin in 0.0f64..24.0,
        padding in 0.0f64..64.0,
    ) {
        let m = GridMetrics {
            target_cell_width_px: target,
            margin_px: margin,
            padding_px: padding,
            ..GridMetrics::DEFAULT
        };
        let columns = compute_columns(width, Breakpoint::Lg, &m);
        prop_assert!(columns >= m.min_lg_columns);
        prop_assert_eq!(columns, expected_columns(width, &m));
    }

    #[test]
    fn cells_tile_the_container(width in 100.0f64..8000.0, columns in 1u32..64) {
        let m = GridMetrics::DEFAULT;
        let cell = compute_cell_width(width, m.padding_px, m.margin_px, columns);
        let total = f64::from(columns) * cell + m.margin_px * f64::from(columns - 1) + m.padding_px;
        prop_assert!((total - width).abs() < 1e-6 * width.max(1.0));
    }

    #[test]
    fn rows_are_square(width in 769.0f64..4000.0) {
        let dims = GridDimensions::solve(width, Breakpoint::Lg, &GridMetrics::DEFAULT);
        prop_assert_eq!(dims.row_height, dims.cell_width);
    }

    #[test]
    fn migration_is_idempotent(raw in raw_document()) {
        let once = migrate(&raw);
        let twice = migrate(&serde_json::to_value(&once).unwrap());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn migration_output_has_unique_ids(raw in raw_document()) {
        let doc = migrate(&raw);
        for bp in Breakpoint::ALL {
            let mut ids: Vec<_> = doc.ids(bp).collect();
            let len = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), len);
            prop_assert!(doc.items(bp).iter().all(|i| i.w >= 1 && i.h >= 1));
        }
    }
}

#[test]
fn end_to_end_desktop_scenario() {
    let dims = GridDimensions::solve(1200.0, Breakpoint::Lg, &GridMetrics::DEFAULT);
    assert_eq!(dims.columns, 15);
    assert!((dims.cell_width - 1068.0 / 15.0).abs() < 1e-9);
}

#[test]
fn legacy_example_document() {
    let out = migrate(&json!({"desktop": [{"i": "w1", "x": 1, "y": 1, "w": 2, "h": 2}]}));
    let mut expected = LayoutDocument::empty();
    expected.lg.push(LayoutItem::new("w1", 2, 2, 4, 4));
    assert_eq!(out, expected);
}
