//! JSON fixture-backed catalog.
//!
//! The whole catalog is held in memory. When opened from a file, favorite
//! changes are written back with an atomic write (temp file + rename) so a
//! crash never leaves a truncated catalog behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "items": [
//!     {
//!       "id": 1,
//!       "name": "Bulbasaur",
//!       "types": ["Grass", "Poison"],
//!       "image": "https://img.pokemondb.net/artwork/bulbasaur.jpg",
//!       "maxCP": 951,
//!       "evolutionIds": [2, 3],
//!       "favoritedAt": null
//!     }
//!   ]
//! }
//! ```

use super::backend::{Catalog, ListQuery};
use super::models::ItemRecord;
use crate::domain::error::{PokedexError, Result};
use crate::domain::{Item, ItemId, ItemSummary};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogData {
    version: u32,
    #[serde(default)]
    items: Vec<ItemRecord>,
}

impl Default for CatalogData {
    fn default() -> Self {
        Self {
            version: 1,
            items: Vec::new(),
        }
    }
}

/// Catalog served from a JSON document.
pub struct JsonCatalog {
    /// Backing file; `None` for in-memory catalogs.
    file_path: Option<PathBuf>,

    /// Records sorted by id.
    data: CatalogData,

    dirty: bool,
}

impl JsonCatalog {
    /// Opens the catalog at `file_path`, starting empty if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the file
    /// exists but is not a valid catalog document.
    pub fn open(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "opening JSON catalog");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("catalog file missing, starting empty");
            CatalogData::default()
        };

        Ok(Self::from_data(Some(file_path), data))
    }

    /// Builds a catalog that lives only in memory.
    #[must_use]
    pub fn in_memory(items: Vec<ItemRecord>) -> Self {
        Self::from_data(None, CatalogData { version: 1, items })
    }

    fn from_data(file_path: Option<PathBuf>, mut data: CatalogData) -> Self {
        data.items.sort_by_key(|record| record.id);
        data.items.dedup_by_key(|record| record.id);

        tracing::debug!(
            version = data.version,
            item_count = data.items.len(),
            persistent = file_path.is_some(),
            "catalog loaded"
        );

        Self {
            file_path,
            data,
            dirty: false,
        }
    }

    fn load_from_file(path: &Path) -> Result<CatalogData> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| PokedexError::Catalog(format!("failed to parse catalog: {e}")))
    }

    fn save_to_file(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let Some(file_path) = self.file_path.as_ref() else {
            self.dirty = false;
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| PokedexError::Catalog(format!("failed to serialize catalog: {e}")))?;

        let tmp_path = file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?file_path, "catalog saved");
        Ok(())
    }

    fn record(&self, id: ItemId) -> Option<&ItemRecord> {
        self.data
            .items
            .binary_search_by_key(&id, |record| record.id)
            .ok()
            .map(|index| &self.data.items[index])
    }

    fn set_favorite(&mut self, id: ItemId, favorite: bool) -> Result<Item> {
        let _span = tracing::debug_span!("json_set_favorite", item_id = id, favorite).entered();

        let index = self
            .data
            .items
            .binary_search_by_key(&id, |record| record.id)
            .map_err(|_| PokedexError::NotFound(format!("item {id}")))?;

        let record = &mut self.data.items[index];
        if record.is_favorite() != favorite {
            record.favorited_at = favorite.then(|| chrono::Utc::now().timestamp());
            self.dirty = true;
        }
        let item = record.to_item();

        self.save_to_file()?;
        tracing::debug!(name = %item.name, "favorite flag stored");
        Ok(item)
    }
}

/// Lower-cased search tokens; empty when there is nothing to match.
fn search_tokens(search: Option<&str>) -> Vec<String> {
    search
        .map(|s| s.split_whitespace().map(str::to_lowercase).collect())
        .unwrap_or_default()
}

impl Catalog for JsonCatalog {
    fn list(&self, query: &ListQuery) -> Result<Vec<Item>> {
        let _span = tracing::debug_span!("json_list",
            offset = query.offset,
            limit = query.limit,
            search = ?query.search,
            item_type = ?query.filter.item_type,
            is_favorite = ?query.filter.is_favorite
        )
        .entered();

        let tokens = search_tokens(query.search.as_deref());
        let matcher = SkimMatcherV2::default();
        let favorites_only = query.filter.is_favorite == Some(true);

        let edges: Vec<Item> = self
            .data
            .items
            .iter()
            .filter(|record| !favorites_only || record.is_favorite())
            .filter(|record| {
                query
                    .filter
                    .item_type
                    .as_ref()
                    .map_or(true, |t| record.types.iter().any(|rt| rt == t))
            })
            .filter(|record| {
                let name = record.name.to_lowercase();
                tokens.iter().all(|token| matcher.fuzzy_match(&name, token).is_some())
            })
            .skip(query.offset)
            .take(query.limit)
            .map(ItemRecord::to_item)
            .collect();

        tracing::debug!(edge_count = edges.len(), "list served");
        Ok(edges)
    }

    fn by_name(&self, name: &str) -> Result<Item> {
        let _span = tracing::debug_span!("json_by_name", name).entered();

        let record = self
            .data
            .items
            .iter()
            .find(|record| record.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| PokedexError::NotFound(name.to_string()))?;

        let evolutions: Vec<ItemSummary> = record
            .evolution_ids
            .iter()
            .filter_map(|id| self.record(*id))
            .map(|evolution| evolution.to_item().summary())
            .collect();

        let mut detail = record.to_detail();
        detail.evolutions = Some(evolutions);
        Ok(detail)
    }

    fn types(&self) -> Result<Vec<String>> {
        let types: BTreeSet<&str> = self
            .data
            .items
            .iter()
            .flat_map(|record| record.types.iter().map(String::as_str))
            .collect();

        tracing::debug!(type_count = types.len(), "types served");
        Ok(types.into_iter().map(str::to_string).collect())
    }

    fn favorite(&mut self, id: ItemId) -> Result<Item> {
        self.set_favorite(id, true)
    }

    fn unfavorite(&mut self, id: ItemId) -> Result<Item> {
        self.set_favorite(id, false)
    }
}

impl Drop for JsonCatalog {
    fn drop(&mut self) {
        if let Err(e) = self.save_to_file() {
            tracing::error!(error = %e, "failed to save catalog on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ListFilter;

    fn starter_catalog() -> JsonCatalog {
        let mut bulbasaur = ItemRecord::new(1, "Bulbasaur", &["Grass", "Poison"]);
        bulbasaur.evolution_ids = vec![2, 3];
        bulbasaur.max_cp = Some(951);

        JsonCatalog::in_memory(vec![
            ItemRecord::new(4, "Charmander", &["Fire"]),
            ItemRecord::new(3, "Venusaur", &["Grass", "Poison"]),
            bulbasaur,
            ItemRecord::new(2, "Ivysaur", &["Grass", "Poison"]),
            ItemRecord::new(5, "Charmeleon", &["Fire"]),
            ItemRecord::new(7, "Squirtle", &["Water"]),
        ])
    }

    fn ids(items: &[Item]) -> Vec<ItemId> {
        items.iter().map(|i| i.id).collect()
    }

    fn query(limit: usize, offset: usize) -> ListQuery {
        ListQuery {
            limit,
            offset,
            ..ListQuery::default()
        }
    }

    #[test]
    fn lists_in_id_order_with_window() {
        let catalog = starter_catalog();
        assert_eq!(ids(&catalog.list(&query(3, 0)).unwrap()), vec![1, 2, 3]);
        assert_eq!(ids(&catalog.list(&query(3, 3)).unwrap()), vec![4, 5, 7]);
        assert!(catalog.list(&query(3, 6)).unwrap().is_empty());
    }

    #[test]
    fn search_and_type_filters() {
        let catalog = starter_catalog();
        let mut q = query(9, 0);
        q.search = Some("char".into());
        assert_eq!(ids(&catalog.list(&q).unwrap()), vec![4, 5]);

        let mut q = query(9, 0);
        q.filter.item_type = Some("Grass".into());
        assert_eq!(ids(&catalog.list(&q).unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn favorite_filter_only_narrows_when_true() {
        let mut catalog = starter_catalog();
        catalog.favorite(5).unwrap();

        let mut q = query(9, 0);
        q.filter = ListFilter {
            is_favorite: Some(true),
            item_type: None,
        };
        assert_eq!(ids(&catalog.list(&q).unwrap()), vec![5]);

        q.filter.is_favorite = Some(false);
        assert_eq!(catalog.list(&q).unwrap().len(), 6);
    }

    #[test]
    fn by_name_resolves_evolutions() {
        let catalog = starter_catalog();
        let detail = catalog.by_name("bulbasaur").unwrap();
        assert_eq!(detail.max_cp, Some(951));
        let names: Vec<_> = detail.evolutions.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Ivysaur", "Venusaur"]);

        assert!(matches!(catalog.by_name("Mew"), Err(PokedexError::NotFound(_))));
    }

    #[test]
    fn types_are_sorted_and_unique() {
        let catalog = starter_catalog();
        assert_eq!(catalog.types().unwrap(), vec!["Fire", "Grass", "Poison", "Water"]);
    }

    #[test]
    fn mutations_return_short_form() {
        let mut catalog = starter_catalog();
        let item = catalog.favorite(1).unwrap();
        assert!(item.is_favorite);
        assert!(item.max_cp.is_none());

        let item = catalog.unfavorite(1).unwrap();
        assert!(!item.is_favorite);
        assert!(matches!(catalog.favorite(99), Err(PokedexError::NotFound(_))));
    }

    #[test]
    fn favorites_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");

        {
            let mut catalog = JsonCatalog::open(path.clone()).unwrap();
            assert!(catalog.list(&query(9, 0)).unwrap().is_empty());
            catalog.data.items.push(ItemRecord::new(25, "Pikachu", &["Electric"]));
            catalog.favorite(25).unwrap();
        }

        assert!(!path.with_extension("tmp").exists());
        let reopened = JsonCatalog::open(path).unwrap();
        let items = reopened.list(&query(9, 0)).unwrap();
        assert_eq!(ids(&items), vec![25]);
        assert!(items[0].is_favorite);
    }

    #[test]
    fn invalid_file_is_catalog_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonCatalog::open(path), Err(PokedexError::Catalog(_))));
    }
}
