//! Error types for the catalog synchronization core.
//!
//! This module defines the centralized error type [`PokedexError`] and a type alias
//! [`Result`] used throughout the crate. Outcomes that are *not* failures, such as
//! an empty page or a stale response, are modelled as values elsewhere and never
//! surface here.

use super::item::ItemId;
use thiserror::Error;

/// The main error type for catalog synchronization.
///
/// # Examples
///
/// ```
/// use pokedex_sync::PokedexError;
///
/// fn fetch() -> Result<(), PokedexError> {
///     Err(PokedexError::Network("connection refused".to_string()))
/// }
///
/// assert!(fetch().is_err());
/// ```
#[derive(Debug, Error)]
pub enum PokedexError {
    /// Transport or server failure on a list or detail fetch.
    ///
    /// Puts the affected page key (or detail name) into a persistent error state.
    /// There is no automatic retry.
    #[error("Network error: {0}")]
    Network(String),

    /// A favorite/unfavorite mutation was rejected.
    ///
    /// Surfaced only as a transient notification; no cached state changes.
    #[error("Mutation failed: {0}")]
    Mutation(String),

    /// The catalog backend failed to read, parse, or persist its data.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// No catalog entry matched the requested name or id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A mutation was requested for an item that is not currently loaded.
    #[error("Item {0} is not loaded in any view")]
    ItemNotLoaded(ItemId),

    /// An unrecognized view value was supplied.
    ///
    /// The filter store fails closed on this error and keeps the previous view.
    #[error("Invalid view value: {0}")]
    InvalidView(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a worker message failed.
    #[error("Worker communication error: {0}")]
    Worker(String),

    /// Configuration is invalid or could not be read.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for catalog synchronization operations.
pub type Result<T> = std::result::Result<T, PokedexError>;
