//! Catalog collaborator: the list, lookup, type and favorite operations.
//!
//! - `backend`: the [`Catalog`] trait and its query types
//! - `json`: [`JsonCatalog`], a JSON fixture implementation
//! - `models`: on-disk record types

pub mod backend;
pub mod json;
pub mod models;

pub use backend::{Catalog, ListFilter, ListQuery};
pub use json::JsonCatalog;
pub use models::ItemRecord;
