//! Pokedex Sync: the client-side data synchronization core for a paginated,
//! filterable item catalog.
//!
//! The core keeps a merged, cursor-paginated list of items per filter
//! combination, issues list requests with monotonic tokens so late responses
//! never clobber newer ones, triggers "load more" from a visibility signal,
//! and reconciles favorite mutations into the cached pages in place.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Command loop (main.rs)                             │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Session runtime (runtime)                          │  ← Outbox, delivery,
//! │                                                     │    observer scope
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Filter store, query executor, page cache         │
//! │  - Reconciler, scroll trigger, notifications        │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Worker Layer  │   │ Catalog Layer │
//! │ (ui/)         │   │ (worker/)     │   │ (catalog/)    │
//! │ - Snapshots   │   │ - Protocol    │   │ - Trait       │
//! │               │   │ - Trace ctx   │   │ - JSON fixture│
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Data paths (infrastructure/)                     │
//! │  - Item model and errors (domain/)                  │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry tracing, file-based OTLP export    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```toml
//! catalog_path = "~/dex/catalog.json"
//! trace_level = "debug"
//! notification_timeout_ms = 5000
//! ```
//!
//! Every key is optional; see [`Config`].
//!
//! # Example
//!
//! ```rust
//! use pokedex_sync::catalog::{ItemRecord, JsonCatalog};
//! use pokedex_sync::app::notifications::ToastSlot;
//! use pokedex_sync::worker::CatalogWorker;
//! use pokedex_sync::{initialize, Config, Event, Session};
//!
//! let catalog = JsonCatalog::in_memory(vec![ItemRecord::new(25, "Pikachu", &["Electric"])]);
//! let state = initialize(&Config::default());
//! let mut session = Session::new(state, CatalogWorker::new(Box::new(catalog)), Box::new(ToastSlot::default()));
//!
//! session.dispatch(&Event::Mount)?;
//! session.pump()?;
//! assert_eq!(session.state().list_snapshot().items.len(), 1);
//! # Ok::<(), pokedex_sync::PokedexError>(())
//! ```

pub mod app;
pub mod catalog;
pub mod domain;
pub mod infrastructure;
pub mod runtime;
pub mod ui;
pub mod worker;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, ViewMode};
pub use domain::{Item, ItemId, PokedexError, Result};
pub use runtime::Session;

use app::notifications::DEFAULT_TIMEOUT_MS;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_TRACE_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_TRACE_BACKUPS: usize = 3;

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog fixture file. Default: `<data_dir>/catalog.json`.
    pub catalog_path: Option<PathBuf>,

    /// Directory for the trace file and the default catalog.
    pub data_dir: Option<PathBuf>,

    /// `EnvFilter` directive for spans. Default: `"info"`.
    pub trace_level: Option<String>,

    /// Timeout attached to notifications that carry none.
    pub notification_timeout_ms: u64,

    /// Trace file size that triggers rotation.
    pub trace_max_bytes: u64,

    /// Rotated trace files kept.
    pub trace_backups: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            data_dir: None,
            trace_level: None,
            notification_timeout_ms: DEFAULT_TIMEOUT_MS,
            trace_max_bytes: DEFAULT_TRACE_MAX_BYTES,
            trace_backups: DEFAULT_TRACE_BACKUPS,
        }
    }
}

impl Config {
    /// Parses configuration from a string key/value map.
    ///
    /// Unknown keys are ignored. Numeric values that fail to parse fall back
    /// to their defaults.
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use pokedex_sync::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("trace_level".to_string(), "debug".to_string());
    /// map.insert("trace_backups".to_string(), "many".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.trace_level.as_deref(), Some("debug"));
    /// assert_eq!(config.trace_backups, 3);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let path = |key: &str| {
            map.get(key)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
        };

        Self {
            catalog_path: path("catalog_path"),
            data_dir: path("data_dir"),
            trace_level: map.get("trace_level").cloned(),
            notification_timeout_ms: map
                .get("notification_timeout_ms")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.notification_timeout_ms),
            trace_max_bytes: map
                .get("trace_max_bytes")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.trace_max_bytes),
            trace_backups: map
                .get("trace_backups")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.trace_backups),
        }
    }

    /// Reads a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`PokedexError::Io`] if the file cannot be read and
    /// [`PokedexError::Config`] if it is not valid TOML for this struct.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| PokedexError::Config(format!("{}: {e}", path.display())))
    }
}

/// Builds the session state for `config`.
///
/// Filters start at their defaults: empty search, no type, favorites off,
/// grid view, one page of limit. No request is issued until
/// [`Event::Mount`] is handled.
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!(
        catalog = ?config.catalog_path,
        timeout_ms = config.notification_timeout_ms,
        "initializing pokedex session"
    );
    AppState::new()
}
