//! End-to-end engine scenarios against real storage backends.

use std::sync::{Arc, Mutex};

use dashgrid_layout::{Breakpoint, InteractionMode, LayoutItem, WidgetDescriptor, WidgetKind};
use dashgrid_runtime::{
    DashboardConfig, FileStorage, GridConfig, LAYOUTS_KEY, LayoutEngine, LayoutSource,
    MemoryStorage, StorageBackend, VISIBLE_WIDGETS_KEY,
};
use pretty_assertions::assert_eq;
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

const CONFIG: &str = r#"
[grid]
sm_columns = 2

[[widgets]]
kind = "weather"
instances = { id = "weather", col_span = 3, row_span = 2 }

[[widgets]]
kind = "calendar"
instances = [
    { id = "cal-old", enabled = false },
    { id = "cal", x = 3, y = 0, col_span = 4, row_span = 4 },
]

[[widgets]]
kind = "clock"
instances = { x = 7, col_span = 2 }
"#;

fn config() -> DashboardConfig {
    DashboardConfig::from_toml_str(CONFIG)
        .and_then(DashboardConfig::validated)
        .expect("test config should be valid")
}

fn engine(storage: Arc<dyn StorageBackend>) -> LayoutEngine {
    LayoutEngine::from_config(&config(), storage)
}

#[test]
fn configuration_drives_descriptors() {
    let cfg = config();
    let ids: Vec<String> = cfg.descriptors().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["weather", "cal", "clock"]);
}

#[test]
fn wide_container_yields_fifteen_columns() {
    let mut e = engine(Arc::new(MemoryStorage::new()));
    e.on_viewport_resize(1200.0);
    let model = e.render_model();
    assert_eq!(model.breakpoint, Breakpoint::Lg);
    assert_eq!(model.columns, 15);
    assert!((model.cell_width - 71.2).abs() < 1e-9);
    assert_eq!(model.row_height, model.cell_width);
}

#[test]
fn fresh_storage_synthesizes_scaled_desktop_layout() {
    let storage = Arc::new(MemoryStorage::new());
    let e = engine(storage.clone());
    assert_eq!(e.store().source(), LayoutSource::Synthesized);
    assert_eq!(
        e.store().get_item(Breakpoint::Lg, "cal"),
        Some(&LayoutItem::new("cal", 6, 0, 8, 8))
    );
    assert_eq!(
        e.store().get_item(Breakpoint::Lg, "clock"),
        Some(&LayoutItem::new("clock", 14, 0, 4, 2))
    );
    assert!(storage.load(LAYOUTS_KEY).unwrap().is_some());
}

#[test]
fn committed_layout_survives_restart() {
    let storage = Arc::new(MemoryStorage::new());
    {
        let mut e = engine(storage.clone());
        e.on_drag_start("cal");
        e.on_layout_commit(Breakpoint::Lg, [LayoutItem::new("cal", 0, 10, 8, 8)]);
        e.on_drag_stop("cal");
    }
    let e = engine(storage);
    assert_eq!(e.store().source(), LayoutSource::Persisted);
    assert_eq!(
        e.store().get_item(Breakpoint::Lg, "cal"),
        Some(&LayoutItem::new("cal", 0, 10, 8, 8))
    );
    assert_eq!(e.render_model().interaction.mode, InteractionMode::Idle);
}

#[test]
fn hide_and_show_round_trip_keeps_position() {
    let storage = Arc::new(MemoryStorage::new());
    let mut e = engine(storage.clone());
    e.on_layout_commit(Breakpoint::Lg, [LayoutItem::new("clock", 2, 9, 4, 2)]);

    assert!(e.on_toggle_widget("clock").visibility);
    assert!(!e.is_visible("clock"));
    assert_eq!(
        engine(storage.clone()).render_model().visible_widget_ids,
        vec!["weather", "cal"]
    );

    let shown = e.on_toggle_widget("clock");
    assert!(shown.visibility);
    assert!(!shown.layout);
    assert_eq!(
        e.store().get_item(Breakpoint::Lg, "clock"),
        Some(&LayoutItem::new("clock", 2, 9, 4, 2))
    );
}

#[test]
fn showing_widget_without_item_synthesizes_one() {
    // Layout saved before "clock" existed and with "clock" hidden.
    let storage = Arc::new(MemoryStorage::with_entries([
        (
            LAYOUTS_KEY,
            r#"{"version":2,"lg":[{"i":"weather","x":0,"y":0,"w":6,"h":4}],"sm":[]}"#,
        ),
        (VISIBLE_WIDGETS_KEY, r#"["weather"]"#),
    ]));
    let mut e = engine(storage);
    assert!(e.store().get_item(Breakpoint::Lg, "clock").is_none());

    let changes = e.on_toggle_widget("clock");
    assert!(changes.layout);
    assert_eq!(
        e.store().get_item(Breakpoint::Lg, "clock"),
        Some(&LayoutItem::new("clock", 14, 0, 4, 2))
    );
}

#[test]
fn switching_to_mobile_stacks_missing_items() {
    let storage = Arc::new(MemoryStorage::with_entries([(
        LAYOUTS_KEY,
        r#"{"version":2,"lg":[{"i":"weather","x":0,"y":0,"w":6,"h":4}],"sm":[{"i":"weather","x":0,"y":0,"w":2,"h":4}]}"#,
    )]));
    let mut e = engine(storage);
    let changes = e.on_viewport_resize(500.0);
    assert!(changes.dimensions);
    assert!(changes.layout);

    let model = e.render_model();
    assert_eq!(model.columns, 2);
    assert_eq!(
        model.layouts.sm,
        vec![
            LayoutItem::new("weather", 0, 0, 2, 4),
            LayoutItem::new("cal", 0, 4, 2, 8),
            LayoutItem::new("clock", 0, 12, 2, 2),
        ]
    );
}

#[test]
fn legacy_layouts_are_migrated_through_storage() {
    let storage = Arc::new(MemoryStorage::with_entries([(
        LAYOUTS_KEY,
        r#"{"desktop":[{"i":"cal","x":3,"y":0,"w":4,"h":4}],"mobile":[{"i":"cal","x":0,"y":0,"w":2,"h":4}]}"#,
    )]));
    let e = engine(storage.clone());
    assert_eq!(e.store().source(), LayoutSource::Migrated);
    assert_eq!(
        e.store().get_item(Breakpoint::Lg, "cal"),
        Some(&LayoutItem::new("cal", 6, 0, 8, 8))
    );
    assert_eq!(
        e.store().get_item(Breakpoint::Sm, "cal"),
        Some(&LayoutItem::new("cal", 0, 0, 4, 8))
    );

    let again = engine(storage);
    assert_eq!(again.store().source(), LayoutSource::Persisted);
    assert_eq!(again.store().document(), e.store().document());
}

#[test]
fn file_storage_backs_the_engine() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(dir.path()));
    {
        let mut e = LayoutEngine::new(
            &GridConfig::default(),
            [WidgetDescriptor::new("rss", WidgetKind::Rss).span(5, 3)],
            storage.clone(),
        );
        e.on_layout_commit(Breakpoint::Lg, [LayoutItem::new("rss", 4, 4, 10, 6)]);
        e.toggle_debug_overlay();
    }
    assert!(dir.path().join(format!("{LAYOUTS_KEY}.json")).exists());

    let e = LayoutEngine::new(
        &GridConfig::default(),
        [WidgetDescriptor::new("rss", WidgetKind::Rss).span(5, 3)],
        storage,
    );
    assert!(e.show_debug());
    assert_eq!(
        e.store().get_item(Breakpoint::Lg, "rss"),
        Some(&LayoutItem::new("rss", 4, 4, 10, 6))
    );
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CapturedEvents {
    warnings: Vec<String>,
}

struct WarnCapture {
    state: Arc<Mutex<CapturedEvents>>,
}

impl<S> Layer<S> for WarnCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != tracing::Level::WARN {
            return;
        }
        let target = event.metadata().target().to_string();
        if let Ok(mut state) = self.state.lock() {
            state.warnings.push(target);
        }
    }
}

#[test]
fn unreadable_layouts_are_logged_and_replaced() {
    let state = Arc::new(Mutex::new(CapturedEvents::default()));
    let subscriber = tracing_subscriber::registry().with(WarnCapture {
        state: Arc::clone(&state),
    });
    let _guard = tracing::subscriber::set_default(subscriber);
    tracing::callsite::rebuild_interest_cache();

    let storage = Arc::new(MemoryStorage::with_entries([(LAYOUTS_KEY, "{not json")]));
    let e = engine(storage);
    assert_eq!(e.store().source(), LayoutSource::Synthesized);

    let snapshot = state.lock().expect("capture lock");
    assert!(
        snapshot.warnings.iter().any(|t| t == "dashgrid.store"),
        "expected a dashgrid.store warning, got {:?}",
        snapshot.warnings
    );
}
