//! Session-owned application state and snapshot computation.
//!
//! [`AppState`] bundles the components of the sync core: the filter store,
//! the page cache, the query executor and the scroll trigger, plus the detail
//! and type data loaded alongside the list. It is created once per session
//! by [`crate::initialize`] and mutated only by the event handler.
//!
//! # Example
//!
//! ```rust
//! use pokedex_sync::app::AppState;
//!
//! let state = AppState::new();
//! let snapshot = state.list_snapshot();
//! assert!(snapshot.items.is_empty());
//! assert!(!snapshot.loading);
//! ```

use super::cache::PageCache;
use super::filters::{FilterStore, PageKey};
use super::modes::ScrollPhase;
use super::query::QueryExecutor;
use super::scroll::ScrollTrigger;
use crate::domain::{Item, ItemId};
use crate::ui::viewmodel::{DetailSnapshot, ItemCard, ListSnapshot, StatusMessage, TypesSnapshot};
use std::collections::{HashMap, HashSet};

/// Loading state of the type list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypesState {
    pub loading: bool,
    pub error: Option<String>,
    pub types: Vec<String>,
}

/// Central state container for one browsing session.
#[derive(Debug, Default)]
pub struct AppState {
    /// Filter, layout and limit; the only source of list query variables.
    pub filters: FilterStore,

    pub cache: PageCache,
    pub executor: QueryExecutor,
    pub scroll: ScrollTrigger,

    /// Settled detail fetches, keyed by the requested name.
    pub details: HashMap<String, Item>,

    /// Name of the detail view currently open, if any.
    pub active_detail: Option<String>,

    pub types: TypesState,

    /// Ids with a favorite mutation outstanding.
    pub favorites_in_flight: HashSet<ItemId>,
}

impl AppState {
    /// Creates a state holding the session defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Page key derived from the current filters.
    #[must_use]
    pub fn active_key(&self) -> PageKey {
        self.filters.state().page_key()
    }

    /// Looks up a loaded item's name and favorite flag.
    ///
    /// Searches the active list entry first, then every settled detail
    /// (including its evolution chain).
    #[must_use]
    pub fn loaded_item(&self, id: ItemId) -> Option<(String, bool)> {
        let key = self.active_key();
        if let Some(item) = self.cache.get(&key).and_then(|entry| entry.iter().find(|i| i.id == id)) {
            return Some((item.name.clone(), item.is_favorite));
        }

        self.details.values().find_map(|detail| {
            if detail.id == id {
                return Some((detail.name.clone(), detail.is_favorite));
            }
            detail
                .evolutions
                .as_ref()?
                .iter()
                .find(|e| e.id == id)
                .map(|e| (e.name.clone(), e.is_favorite))
        })
    }

    /// Folds a confirmed mutation into every settled detail.
    pub fn patch_details(&mut self, item: &Item) -> usize {
        self.details
            .values_mut()
            .map(|detail| detail.absorb(item))
            .filter(|changed| *changed)
            .count()
    }

    /// Snapshot of the list for the active key.
    ///
    /// When the favorite-only filter is on, cached items that are no longer
    /// favorites are hidden here; the cache itself keeps them until the next
    /// reset.
    #[must_use]
    pub fn list_snapshot(&self) -> ListSnapshot {
        let filters = self.filters.state();
        let key = filters.page_key();
        let phase = self.scroll.phase(&key);
        let error = self.executor.list_error(&key).map(str::to_string);

        let items: Vec<ItemCard> = self
            .cache
            .get(&key)
            .unwrap_or_default()
            .iter()
            .filter(|item| !filters.favorites_only() || item.is_favorite)
            .map(ItemCard::from)
            .collect();

        let message = if error.is_some() {
            Some(StatusMessage::fetch_failed())
        } else if phase == ScrollPhase::Ready && items.is_empty() {
            Some(StatusMessage::empty_list())
        } else {
            None
        };

        ListSnapshot {
            loading: phase == ScrollPhase::LoadingFirstPage,
            loading_more: phase == ScrollPhase::LoadingMore,
            error,
            items,
            view: filters.view,
            message,
        }
    }

    /// Snapshot of the detail view for `name`.
    #[must_use]
    pub fn detail_snapshot(&self, name: &str) -> DetailSnapshot {
        DetailSnapshot {
            name: name.to_string(),
            loading: self.executor.is_detail_loading(name),
            error: self.executor.detail_error(name).map(str::to_string),
            data: self.details.get(name).cloned(),
        }
    }

    #[must_use]
    pub fn types_snapshot(&self) -> TypesSnapshot {
        TypesSnapshot {
            loading: self.types.loading,
            error: self.types.error.as_ref().map(|_| StatusMessage::types_failed()),
            types: self.types.types.clone(),
        }
    }
}
