//! Catalog item model.
//!
//! An [`Item`] is the unit of data that flows through the page cache. It is
//! owned by the cache and only ever replaced wholesale; the mutation
//! reconciler is the single place that swaps one in after a confirmed
//! favorite change.

use serde::{Deserialize, Serialize};

/// Stable integer identifier of a catalog item.
pub type ItemId = u32;

/// Inclusive measurement range, used for weight and height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub minimum: f64,
    pub maximum: f64,
}

/// Short-form item, as listed among another item's evolutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: ItemId,
    pub name: String,
    pub image: String,
    pub is_favorite: bool,
}

/// A catalog item.
///
/// List fetches populate only the short fields (`id`, `name`, `types`,
/// `image`, `is_favorite`); detail fetches fill in the optional ones.
///
/// # Examples
///
/// ```
/// use pokedex_sync::Item;
///
/// let item = Item::new(25, "Pikachu", &["Electric"], "https://img/25.png");
/// assert!(!item.is_favorite);
/// assert_eq!(item.route(), "/Pikachu");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,

    /// Routing key for the detail view.
    pub name: String,

    #[serde(default)]
    pub types: Vec<String>,

    pub image: String,

    #[serde(default)]
    pub is_favorite: bool,

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

    /// Ordered evolution chain, present only on detail fetches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolutions: Option<Vec<ItemSummary>>,
}

impl Item {
    /// Creates a list-shaped item with no detail fields.
    #[must_use]
    pub fn new(id: ItemId, name: &str, types: &[&str], image: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            types: types.iter().map(|t| (*t).to_string()).collect(),
            image: image.to_string(),
            is_favorite: false,
            max_cp: None,
            max_hp: None,
            weight: None,
            height: None,
            sound: None,
            evolutions: None,
        }
    }

    /// Route of the detail view for this item.
    #[must_use]
    pub fn route(&self) -> String {
        format!("/{}", self.name)
    }

    /// Short-form projection used in evolution chains.
    #[must_use]
    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
            is_favorite: self.is_favorite,
        }
    }

    /// Folds a mutation result into a detail-shaped item.
    ///
    /// Mutations return only the short fields, so detail fields already held
    /// here are kept when `update` leaves them empty. Matching evolution
    /// entries pick up the new favorite flag. Returns `true` when anything
    /// changed.
    pub fn absorb(&mut self, update: &Self) -> bool {
        let mut changed = false;

        if self.id == update.id {
            let merged = Self {
                max_cp: update.max_cp.or(self.max_cp),
                max_hp: update.max_hp.or(self.max_hp),
                weight: update.weight.clone().or_else(|| self.weight.clone()),
                height: update.height.clone().or_else(|| self.height.clone()),
                sound: update.sound.clone().or_else(|| self.sound.clone()),
                evolutions: update.evolutions.clone().or_else(|| self.evolutions.clone()),
                ..update.clone()
            };
            changed = *self != merged;
            *self = merged;
        }

        if let Some(evolutions) = self.evolutions.as_mut() {
            for evolution in evolutions.iter_mut().filter(|e| e.id == update.id) {
                if evolution.is_favorite != update.is_favorite {
                    evolution.is_favorite = update.is_favorite;
                    changed = true;
                }
            }
        }

        changed
    }
}
