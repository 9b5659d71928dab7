//! Presentation boundary.
//!
//! The sync core does not render anything itself. It exposes read-only
//! snapshots that a renderer turns into output:
//!
//! ```text
//! AppState → list_snapshot / detail_snapshot / types_snapshot → renderer
//! ```

pub mod viewmodel;

pub use viewmodel::{DetailSnapshot, ItemCard, ListSnapshot, StatusMessage, TypesSnapshot};
