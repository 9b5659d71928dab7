//! Mutation reconciler: folds confirmed favorite changes into the active page.
//!
//! After a favorite/unfavorite call succeeds, the server's copy of the item is
//! swapped into the entry for the *currently active* page key at the index it
//! already occupies. Nothing is inserted, removed, reordered or refetched.
//!
//! If the item is not part of the loaded page (filtered out by search, type or
//! the favorite-only flag) the call is a no-op. An item whose new favorite flag
//! contradicts the active favorite-only filter stays in the entry until the
//! next reset; hiding it is the job of the snapshot's display predicate, not
//! of the cache.

use super::cache::PageCache;
use super::filters::PageKey;
use crate::domain::Item;

/// What [`apply`] did with a mutation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The element at `index` was replaced (or already equal).
    Replaced { index: usize },

    /// The item is not in the active entry; nothing changed.
    NotLoaded,
}

/// Replaces the element with `item.id` inside `cache[active]`, preserving order.
///
/// Idempotent: applying the same item twice leaves the same state as once.
///
/// # Example
///
/// ```rust
/// use pokedex_sync::app::cache::PageCache;
/// use pokedex_sync::app::filters::PageKey;
/// use pokedex_sync::app::reconciler::{apply, Reconciliation};
/// use pokedex_sync::Item;
///
/// let key = PageKey::default();
/// let mut cache = PageCache::new();
/// cache.merge(&key, 0, vec![Item::new(1, "a", &[], ""), Item::new(2, "b", &[], "")]);
///
/// let mut updated = Item::new(2, "b", &[], "");
/// updated.is_favorite = true;
/// assert_eq!(apply(&mut cache, &key, &updated), Reconciliation::Replaced { index: 1 });
/// assert!(cache.get(&key).unwrap()[1].is_favorite);
/// ```
pub fn apply(cache: &mut PageCache, active: &PageKey, item: &Item) -> Reconciliation {
    let _span = tracing::debug_span!("reconcile_mutation",
        item_id = item.id,
        is_favorite = item.is_favorite,
        key = %active
    )
    .entered();

    let Some(entry) = cache.entry_mut(active) else {
        tracing::debug!("no entry for active key");
        return Reconciliation::NotLoaded;
    };

    let Some(index) = entry.iter().position(|existing| existing.id == item.id) else {
        tracing::debug!("item not in active page, leaving cache untouched");
        return Reconciliation::NotLoaded;
    };

    entry[index] = item.clone();
    tracing::debug!(index, "item replaced in place");
    Reconciliation::Replaced { index }
}
