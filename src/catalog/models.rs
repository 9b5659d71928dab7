//! Catalog record models.
//!
//! Records are the on-disk shape of catalog entries. They differ from the
//! domain [`Item`] in two ways: evolutions are stored as id references, and
//! the favorite flag is derived from a `favorited_at` timestamp.

use crate::domain::{Dimension, Item, ItemId};
use serde::{Deserialize, Serialize};

/// One stored catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    pub image: String,

    #[serde(default, rename = "maxCP", skip_serializing_if = "Option::is_none")]
    pub max_cp: Option<u32>,
    #[serde(default, rename = "maxHP", skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,

    /// Ids of the evolution chain, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evolution_ids: Vec<ItemId>,

    /// Unix timestamp of when the item was favorited, `None` if it is not.
    #[serde(default)]
    pub favorited_at: Option<i64>,
}

impl ItemRecord {
    /// Creates an unfavorited record with no detail fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use pokedex_sync::catalog::ItemRecord;
    ///
    /// let record = ItemRecord::new(1, "Bulbasaur", &["Grass", "Poison"]);
    /// assert!(!record.is_favorite());
    /// assert!(record.image.ends_with("/1.png"));
    /// ```
    #[must_use]
    pub fn new(id: ItemId, name: &str, types: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            types: types.iter().map(|t| (*t).to_string()).collect(),
            image: format!("https://img.pokemondb.net/artwork/{id}.png"),
            max_cp: None,
            max_hp: None,
            weight: None,
            height: None,
            sound: None,
            evolution_ids: Vec::new(),
            favorited_at: None,
        }
    }

    #[must_use]
    pub const fn is_favorite(&self) -> bool {
        self.favorited_at.is_some()
    }

    /// The short form returned by `list` and the mutations.
    #[must_use]
    pub fn to_item(&self) -> Item {
        Item {
            id: self.id,
            name: self.name.clone(),
            types: self.types.clone(),
            image: self.image.clone(),
            is_favorite: self.is_favorite(),
            max_cp: None,
            max_hp: None,
            weight: None,
            height: None,
            sound: None,
            evolutions: None,
        }
    }

    /// The full form returned by `byName`, with evolutions left empty.
    #[must_use]
    pub fn to_detail(&self) -> Item {
        Item {
            max_cp: self.max_cp,
            max_hp: self.max_hp,
            weight: self.weight.clone(),
            height: self.height.clone(),
            sound: self.sound.clone(),
            ..self.to_item()
        }
    }
}
