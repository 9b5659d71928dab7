//! Page merge cache keyed by filter combination.
//!
//! The cache is a two-level mapping: [`PageKey`] → ordered `Vec<Item>`. Each
//! entry holds everything fetched so far for one filter tuple. Entries are
//! created lazily on the first settled fetch for a key and replaced wholesale
//! by every reset; they are never partially invalidated or truncated.
//!
//! The merge policy itself lives in the pure [`merge`] function so it can be
//! exercised without any transport in the loop.

use super::filters::PageKey;
use crate::domain::{Item, ItemId};
use std::collections::{HashMap, HashSet};

/// Combines an existing entry with an incoming batch.
///
/// - `is_reset == true`: the incoming batch *is* the new entry. Whatever was
///   cached before, including content fetched under a superseded filter value
///   that happens to map to the same key, is discarded.
/// - `is_reset == false`: the batch is appended, skipping any id already
///   present so the first occurrence wins.
///
/// Duplicates inside `incoming` are collapsed the same way.
///
/// # Example
///
/// ```rust
/// use pokedex_sync::app::cache::merge;
/// use pokedex_sync::Item;
///
/// let item = |id| Item::new(id, &format!("item-{id}"), &[], "");
/// let existing = vec![item(1), item(2)];
///
/// let appended = merge(Some(existing.as_slice()), vec![item(2), item(3)], false);
/// assert_eq!(appended.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2, 3]);
///
/// let replaced = merge(Some(existing.as_slice()), vec![item(9)], true);
/// assert_eq!(replaced.len(), 1);
/// ```
#[must_use]
pub fn merge(existing: Option<&[Item]>, incoming: Vec<Item>, is_reset: bool) -> Vec<Item> {
    let base: &[Item] = if is_reset { &[] } else { existing.unwrap_or(&[]) };

    let mut seen: HashSet<ItemId> = base.iter().map(|item| item.id).collect();
    let mut merged = Vec::with_capacity(base.len() + incoming.len());
    merged.extend_from_slice(base);

    for item in incoming {
        if seen.insert(item.id) {
            merged.push(item);
        } else {
            tracing::debug!(item_id = item.id, "dropping duplicate id from incoming batch");
        }
    }

    merged
}

/// Per-key store of accumulated list pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageCache {
    entries: HashMap<PageKey, Vec<Item>>,
}

impl PageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a settled list fetch to the entry for `key`.
    ///
    /// `offset == 0` marks a reset and replaces the entry; any other offset
    /// appends. Returns the entry as it stands afterwards.
    pub fn merge(&mut self, key: &PageKey, offset: usize, incoming: Vec<Item>) -> &[Item] {
        let is_reset = offset == 0;
        let _span = tracing::debug_span!("page_cache_merge",
            key = %key,
            offset,
            incoming = incoming.len(),
            is_reset
        )
        .entered();

        let merged = merge(self.entries.get(key).map(Vec::as_slice), incoming, is_reset);
        tracing::debug!(entry_len = merged.len(), "page cache entry updated");

        let entry = self.entries.entry(key.clone()).or_default();
        *entry = merged;
        entry
    }

    /// Entry for `key`, if any fetch for it has settled.
    #[must_use]
    pub fn get(&self, key: &PageKey) -> Option<&[Item]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of items cached for `key` (zero when absent).
    #[must_use]
    pub fn len_of(&self, key: &PageKey) -> usize {
        self.entries.get(key).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn contains_key(&self, key: &PageKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Mutable access for the mutation reconciler.
    ///
    /// Slices cannot grow or shrink, which keeps entry length under the
    /// control of [`PageCache::merge`].
    pub(crate) fn entry_mut(&mut self, key: &PageKey) -> Option<&mut [Item]> {
        self.entries.get_mut(key).map(Vec::as_mut_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: ItemId) -> Item {
        Item::new(id, &format!("item-{id}"), &["Normal"], "")
    }

    fn batch(ids: impl IntoIterator<Item = ItemId>) -> Vec<Item> {
        ids.into_iter().map(item).collect()
    }

    fn ids(items: &[Item]) -> Vec<ItemId> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn first_fetch_creates_entry() {
        let mut cache = PageCache::new();
        let key = PageKey::default();
        assert!(cache.get(&key).is_none());

        cache.merge(&key, 0, batch(1..=9));
        assert_eq!(ids(cache.get(&key).unwrap()), (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn reset_replaces_regardless_of_prior_entry() {
        let mut cache = PageCache::new();
        let key = PageKey::default();
        cache.merge(&key, 0, batch(1..=9));
        cache.merge(&key, 9, batch(10..=18));

        let entry = cache.merge(&key, 0, batch([3, 1, 2]));
        assert_eq!(ids(entry), vec![3, 1, 2]);
    }

    #[test]
    fn reset_with_no_edges_yields_empty_entry() {
        let mut cache = PageCache::new();
        let key = PageKey::search("zzz");
        cache.merge(&key, 0, Vec::new());
        assert!(cache.contains_key(&key));
        assert_eq!(cache.len_of(&key), 0);
    }

    #[test]
    fn append_keeps_first_occurrence() {
        let merged = merge(Some(batch(1..=3).as_slice()), batch([3, 4, 1, 5, 4]), false);
        assert_eq!(ids(&merged), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn append_without_entry_starts_from_empty() {
        let merged = merge(None, batch([7, 8]), false);
        assert_eq!(ids(&merged), vec![7, 8]);
    }

    #[test]
    fn fetch_more_length_is_sum_of_batches_in_arrival_order() {
        let mut cache = PageCache::new();
        let key = PageKey::default();
        let batches = [batch(1..=9), batch(10..=18), batch(19..=21), Vec::new()];

        let mut offset = 0;
        let mut expected = Vec::new();
        for b in batches {
            expected.extend(ids(&b));
            cache.merge(&key, offset, b);
            offset = cache.len_of(&key);
        }

        let entry = cache.get(&key).unwrap();
        assert_eq!(entry.len(), 21);
        assert_eq!(ids(entry), expected);
    }

    #[test]
    fn keys_are_independent() {
        let mut cache = PageCache::new();
        let all = PageKey::default();
        let charm = PageKey::search("char");
        cache.merge(&all, 0, batch(1..=9));
        cache.merge(&charm, 0, batch([4, 5]));

        assert_eq!(cache.len_of(&all), 9);
        assert_eq!(ids(cache.get(&charm).unwrap()), vec![4, 5]);
    }
}
