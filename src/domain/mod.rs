//! Domain layer for the catalog synchronization core.
//!
//! Holds the item model and error types, independent of any transport,
//! rendering or storage concern.
//!
//! - [`error`]: Error types and result aliases
//! - [`item`]: Catalog item model
//!
//! # Examples
//!
//! ```
//! use pokedex_sync::domain::{Item, Result};
//!
//! fn lookup() -> Result<Item> {
//!     Ok(Item::new(7, "Squirtle", &["Water"], "s.png"))
//! }
//! ```

pub mod error;
pub mod item;

pub use error::{PokedexError, Result};
pub use item::{Dimension, Item, ItemId, ItemSummary};
