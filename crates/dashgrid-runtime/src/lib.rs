#![forbid(unsafe_code)]

//! Stateful side of the dashgrid widget grid.
//!
//! - [`storage`]: key-value persistence backends (in-memory, file).
//! - [`store`]: the persisted, migrated layout document.
//! - [`visibility`]: which configured widgets are shown.
//! - [`config`]: dashboard configuration loaded from TOML or JSON.
//! - [`engine`]: the event reducer the rendering layer drives.
//!
//! All logging goes through `tracing` under `dashgrid.*` targets. Enable the
//! `logging` feature for a ready-made subscriber.

pub mod catalog;
pub mod config;
pub mod engine;
#[cfg(feature = "logging")]
pub mod logging;
pub mod storage;
pub mod store;
pub mod visibility;

pub use catalog::WidgetCatalog;
pub use config::{ConfigError, DashboardConfig, GridConfig, OneOrMany, WidgetEntry, WidgetFamilyConfig};
pub use engine::{Changes, GridEvent, InteractionView, LayoutEngine, RenderModel};
#[cfg(feature = "logging")]
pub use logging::{LOG_ENV, LogFormat, init_logging};
pub use storage::{
    FileStorage, LAYOUTS_KEY, MemoryStorage, SHOW_DEBUG_KEY, StorageBackend, StorageError,
    StorageResult, VISIBLE_WIDGETS_KEY,
};
pub use store::{LayoutSource, LayoutStore};
pub use visibility::{ToggleOutcome, VisibilityController};

pub use dashgrid_layout as layout;
