//! Filter state store: the single source of truth for list query variables.
//!
//! [`FilterStore`] owns a [`FilterState`] and only changes it through six
//! named actions. Every change is pushed to subscribers synchronously, before
//! the action returns, so a renderer never observes a half-applied update.
//!
//! # Actions
//!
//! | action            | effect                                              |
//! |-------------------|-----------------------------------------------------|
//! | `set_search`      | overwrite `search`, mark `refetch_pending`          |
//! | `set_type`        | overwrite `item_type`, mark `refetch_pending`       |
//! | `set_is_favorite` | overwrite `is_favorite`, mark `refetch_pending`     |
//! | `set_view`        | overwrite `view` only; unknown values are ignored   |
//! | `reset_limit`     | `limit = PAGE_SIZE`, clear `refetch_pending`        |
//! | `increase_limit`  | `limit += PAGE_SIZE`                                |

use super::modes::ViewMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of items requested per page.
pub const PAGE_SIZE: usize = 9;

/// Identity of one independently paginated cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PageKey {
    pub search: String,
    pub item_type: Option<String>,
    pub is_favorite: Option<bool>,
}

impl PageKey {
    /// Key for the unfiltered list matching `search`.
    #[must_use]
    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "search={:?} type={} favorite={}",
            self.search,
            self.item_type.as_deref().unwrap_or("*"),
            self.is_favorite.map_or("*", |v| if v { "yes" } else { "no" })
        )
    }
}

/// Active filter, layout and pagination state for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub item_type: Option<String>,
    pub is_favorite: Option<bool>,
    pub view: ViewMode,

    /// Items the active list is allowed to hold; always a multiple of [`PAGE_SIZE`].
    pub limit: usize,

    /// Set by any filter change, cleared when the resulting reset settles.
    pub refetch_pending: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            item_type: None,
            is_favorite: None,
            view: ViewMode::Grid,
            limit: PAGE_SIZE,
            refetch_pending: false,
        }
    }
}

impl FilterState {
    /// Page key derived from the current filter values.
    #[must_use]
    pub fn page_key(&self) -> PageKey {
        PageKey {
            search: self.search.clone(),
            item_type: self.item_type.clone(),
            is_favorite: self.is_favorite,
        }
    }

    /// Whether only favorites should be shown.
    #[must_use]
    pub fn favorites_only(&self) -> bool {
        self.is_favorite == Some(true)
    }
}

/// Handle returned by [`FilterStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FilterState)>;

/// Filter state container mutated only through named actions.
///
/// # Example
///
/// ```rust
/// use pokedex_sync::app::filters::{FilterStore, PAGE_SIZE};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(Cell::new(0));
/// let mut store = FilterStore::new();
/// let counter = Rc::clone(&seen);
/// store.subscribe(move |_| counter.set(counter.get() + 1));
///
/// store.set_search("char");
/// assert_eq!(seen.get(), 1);
/// assert!(store.state().refetch_pending);
/// assert_eq!(store.state().limit, PAGE_SIZE);
/// ```
pub struct FilterStore {
    state: FilterState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore {
    /// Creates a store holding the session defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: FilterState::default(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    /// Registers a listener invoked after every state change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&FilterState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        self.commit("set_search", |state| {
            state.search = search;
            state.refetch_pending = true;
        });
    }

    pub fn set_type(&mut self, item_type: Option<String>) {
        self.commit("set_type", |state| {
            state.item_type = item_type;
            state.refetch_pending = true;
        });
    }

    pub fn set_is_favorite(&mut self, is_favorite: bool) {
        self.commit("set_is_favorite", |state| {
            state.is_favorite = Some(is_favorite);
            state.refetch_pending = true;
        });
    }

    /// Switches the list layout.
    ///
    /// Unrecognized values leave the previous view in place and return `false`.
    pub fn set_view(&mut self, view: &str) -> bool {
        match view.parse::<ViewMode>() {
            Ok(view) => {
                self.commit("set_view", |state| state.view = view);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, current = %self.state.view, "view change rejected");
                false
            }
        }
    }

    pub fn reset_limit(&mut self) {
        self.commit("reset_limit", |state| {
            state.limit = PAGE_SIZE;
            state.refetch_pending = false;
        });
    }

    pub fn increase_limit(&mut self) {
        self.commit("increase_limit", |state| state.limit += PAGE_SIZE);
    }

    fn commit<F>(&mut self, action: &'static str, apply: F)
    where
        F: FnOnce(&mut FilterState),
    {
        let before = self.state.clone();
        apply(&mut self.state);

        if self.state == before {
            tracing::trace!(action, "filter state unchanged");
            return;
        }

        tracing::debug!(
            action,
            key = %self.state.page_key(),
            limit = self.state.limit,
            refetch_pending = self.state.refetch_pending,
            listeners = self.listeners.len(),
            "filter state changed"
        );

        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
