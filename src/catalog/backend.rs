//! Catalog backend abstraction.
//!
//! [`Catalog`] is the set of collaborator operations the sync core consumes:
//! paged listing, lookup by name, the type list and the two favorite
//! mutations. The core never talks to an implementation directly; requests go
//! through the worker, which owns one boxed `Catalog`.

use crate::domain::error::Result;
use crate::domain::{Item, ItemId};
use serde::{Deserialize, Serialize};

/// Optional narrowing applied by [`Catalog::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    /// `Some(true)` restricts the listing to favorites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,

    /// Only items carrying this type tag.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
}

/// Arguments of one `list` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: usize,
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default)]
    pub filter: ListFilter,
}

/// Operations offered by a catalog service.
///
/// # Implementations
///
/// - [`JsonCatalog`](super::JsonCatalog): fixture-backed, from a JSON file or memory
///
/// # Examples
///
/// ```no_run
/// use pokedex_sync::catalog::{Catalog, JsonCatalog, ListQuery};
/// use std::path::PathBuf;
///
/// let catalog = JsonCatalog::open(PathBuf::from("/tmp/catalog.json"))?;
/// let page = catalog.list(&ListQuery { limit: 9, ..ListQuery::default() })?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Catalog {
    /// Returns the `[offset, offset + limit)` window of matching items.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot serve the request.
    fn list(&self, query: &ListQuery) -> Result<Vec<Item>>;

    /// Returns the full item named `name`, evolutions included.
    ///
    /// # Errors
    ///
    /// Returns [`PokedexError::NotFound`](crate::PokedexError::NotFound) when no
    /// item has that name.
    fn by_name(&self, name: &str) -> Result<Item>;

    /// Returns every type tag in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot serve the request.
    fn types(&self) -> Result<Vec<String>>;

    /// Marks `id` as a favorite and returns the updated item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist or the change cannot be
    /// persisted.
    fn favorite(&mut self, id: ItemId) -> Result<Item>;

    /// Clears the favorite flag of `id` and returns the updated item.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::favorite`].
    fn unfavorite(&mut self, id: ItemId) -> Result<Item>;
}
