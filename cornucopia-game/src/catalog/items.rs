//! Item and recipe reference data.

use serde::{Deserialize, Serialize};

use crate::constants::{
    SPONSOR_DEFAULT_WEIGHT, SPONSOR_HEAVY_WEAPON_DAMAGE, SPONSOR_HEAVY_WEAPON_WEIGHT,
    SPONSOR_MEDICINE_WEIGHT, SPONSOR_PROVISION_WEIGHT,
};
use crate::error::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Food,
    Water,
    Medicine,
    Utility,
    Material,
}

impl ItemKind {
    #[must_use]
    pub const fn is_provision(self) -> bool {
        matches!(self, Self::Food | Self::Water)
    }
}

/// Where an item can come from in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    Cornucopia,
    Foraged,
    Built,
}

/// Numeric effects an item carries; absent fields count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemEffect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<i32>,
}

impl ItemEffect {
    #[must_use]
    pub const fn damage(value: i32) -> Self {
        Self {
            damage: Some(value),
            healing: None,
            food: None,
            water: None,
        }
    }

    #[must_use]
    pub const fn healing(value: i32) -> Self {
        Self {
            damage: None,
            healing: Some(value),
            food: None,
            water: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub key: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub effect: ItemEffect,
    #[serde(default)]
    pub sources: Vec<ItemSource>,
}

impl Item {
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, kind: ItemKind, effect: ItemEffect) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind,
            effect,
            sources: Vec::new(),
        }
    }

    #[must_use]
    pub fn damage(&self) -> i32 {
        self.effect.damage.unwrap_or(0)
    }

    #[must_use]
    pub fn healing(&self) -> i32 {
        self.effect.healing.unwrap_or(0)
    }

    #[must_use]
    pub fn comes_from(&self, source: ItemSource) -> bool {
        self.sources.contains(&source)
    }

    /// Relative odds of this item appearing in a sponsor drop; zero when it never drops.
    #[must_use]
    pub fn sponsor_weight(&self) -> u32 {
        if self.comes_from(ItemSource::Built) || self.kind == ItemKind::Material {
            return 0;
        }
        match self.kind {
            ItemKind::Weapon if self.damage() > SPONSOR_HEAVY_WEAPON_DAMAGE => {
                SPONSOR_HEAVY_WEAPON_WEIGHT
            }
            ItemKind::Medicine => SPONSOR_MEDICINE_WEIGHT,
            ItemKind::Food | ItemKind::Water => SPONSOR_PROVISION_WEIGHT,
            _ => SPONSOR_DEFAULT_WEIGHT,
        }
    }
}

/// Crafting recipe expressed in item keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub result: String,
    pub components: Vec<String>,
    pub intelligence_threshold: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<Item>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl ItemCatalog {
    /// Parse the item catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the catalog shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.key == key)
    }

    /// Look up an item that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownItem`] when the key is not catalogued.
    pub fn require(&self, key: &str) -> Result<&Item, SimulationError> {
        self.get(key)
            .ok_or_else(|| SimulationError::UnknownItem(key.to_string()))
    }

    pub fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |item| item.kind == kind)
    }

    /// Food and water items, the pool for successful forage finds.
    #[must_use]
    pub fn provisions(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.kind.is_provision())
            .collect()
    }

    #[must_use]
    pub fn materials(&self) -> Vec<&Item> {
        self.of_kind(ItemKind::Material).collect()
    }

    /// Items stocked at the Cornucopia.
    #[must_use]
    pub fn cornucopia_items(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.comes_from(ItemSource::Cornucopia))
            .collect()
    }

    /// Flattened sponsor pool; each item repeated by its weight.
    #[must_use]
    pub fn sponsor_pool(&self) -> Vec<&Item> {
        self.items
            .iter()
            .flat_map(|item| {
                let weight = usize::try_from(item.sponsor_weight()).unwrap_or(0);
                std::iter::repeat_n(item, weight)
            })
            .collect()
    }

    /// Result item of a recipe.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownItem`] if the recipe names an unknown result.
    pub fn recipe_result(&self, recipe: &Recipe) -> Result<&Item, SimulationError> {
        self.require(&recipe.result)
    }

    /// Component names of a recipe, in recipe order.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownItem`] if any component key is unknown.
    pub fn component_names(&self, recipe: &Recipe) -> Result<Vec<&str>, SimulationError> {
        recipe
            .components
            .iter()
            .map(|key| self.require(key).map(|item| item.name.as_str()))
            .collect()
    }
}
