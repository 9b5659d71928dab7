//! Read-only snapshots handed to the rendering collaborator.
//!
//! Snapshots are computed on demand from `AppState` (see
//! `AppState::list_snapshot` and friends) and carry no behavior. They
//! serialize to JSON so any front end can consume them.
//!
//! # Example
//!
//! ```rust
//! use pokedex_sync::ui::viewmodel::{ListSnapshot, StatusMessage};
//! use pokedex_sync::app::ViewMode;
//!
//! let snapshot = ListSnapshot {
//!     loading: false,
//!     loading_more: false,
//!     error: None,
//!     items: vec![],
//!     view: ViewMode::Grid,
//!     message: Some(StatusMessage::empty_list()),
//! };
//! assert!(snapshot.is_empty_state());
//! ```

use crate::app::ViewMode;
use crate::domain::{Item, ItemId};
use serde::Serialize;

/// Snapshot of the list for the active page key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSnapshot {
    /// A reset fetch is outstanding.
    pub loading: bool,

    /// A fetch-more is outstanding.
    pub loading_more: bool,

    /// Persistent error of the active key.
    pub error: Option<String>,

    /// Visible items, in cache order.
    pub items: Vec<ItemCard>,

    pub view: ViewMode,

    /// Error or empty-state message, when one applies.
    pub message: Option<StatusMessage>,
}

impl ListSnapshot {
    /// Settled, error-free and nothing to show.
    #[must_use]
    pub fn is_empty_state(&self) -> bool {
        self.error.is_none() && self.message.is_some()
    }
}

/// One card in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCard {
    pub id: ItemId,
    pub name: String,

    /// Type tags joined with `", "`.
    pub types_label: String,
    pub image: String,
    pub is_favorite: bool,

    /// Detail view route.
    pub route: String,
}

impl From<&Item> for ItemCard {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            types_label: item.types.join(", "),
            image: item.image.clone(),
            is_favorite: item.is_favorite,
            route: item.route(),
        }
    }
}

/// Title/subtitle pair shown in place of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub title: String,
    pub subtitle: String,
}

impl StatusMessage {
    fn new(title: &str, subtitle: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
        }
    }

    #[must_use]
    pub fn empty_list() -> Self {
        Self::new("No items found", "Try a different search or filter")
    }

    #[must_use]
    pub fn fetch_failed() -> Self {
        Self::new("Catalog unavailable", "Please try again later")
    }

    #[must_use]
    pub fn types_failed() -> Self {
        Self::new("Catalog unavailable", "Types couldn't be loaded")
    }
}

/// Snapshot of one detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSnapshot {
    pub name: String,
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<Item>,
}

/// Snapshot of the type list used by the type filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypesSnapshot {
    pub loading: bool,
    pub error: Option<StatusMessage>,
    pub types: Vec<String>,
}
