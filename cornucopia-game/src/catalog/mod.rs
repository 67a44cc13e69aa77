//! Immutable reference catalogs injected into the engine.
//!
//! The bundled JSON assets are embedded at compile time; fixtures can build a
//! [`Catalog`] from their own JSON through [`Catalog::from_json`].

mod arenas;
mod flavor;
mod items;
mod rosters;

use std::collections::HashSet;

use thiserror::Error;

pub use arenas::{Arena, DistrictEffect, Terrain};
pub use flavor::{AllianceActionPools, DeathCauses, FlavorText, Trap, TrapPenalty, pick_line};
pub use items::{Item, ItemCatalog, ItemEffect, ItemKind, ItemSource, Recipe};
pub use rosters::{DistrictProfile, RosterData, TributeTemplate};

use crate::constants::{DISTRICT_COUNT, STAT_MAX, STAT_MIN};
use crate::tribute::Stat;

const ITEMS_JSON: &str = include_str!("../../assets/data/items.json");
const ARENAS_JSON: &str = include_str!("../../assets/data/arenas.json");
const FLAVOR_JSON: &str = include_str!("../../assets/data/flavor.json");
const TRIBUTES_JSON: &str = include_str!("../../assets/data/tributes.json");

/// Errors raised while loading or validating reference data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse {asset}: {source}")]
    Parse {
        asset: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("recipe for `{recipe}` references unknown item `{key}`")]
    UnknownItem { recipe: String, key: String },
    #[error("template pool `{0}` has no entries")]
    EmptyPool(&'static str),
    #[error("item key `{0}` is defined more than once")]
    DuplicateItem(String),
    #[error("arena `{0}` is defined more than once")]
    DuplicateArena(String),
    #[error("catalog contains no arenas")]
    NoArenas,
    #[error("no generation profile for district {0}")]
    MissingDistrictProfile(u8),
    #[error("{tribute} has {stat} {value}, expected between {min} and {max}")]
    StatOutOfRange {
        tribute: String,
        stat: Stat,
        value: i32,
        min: i32,
        max: i32,
    },
}

/// Source of reference data for a run.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate a complete catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// Loads the JSON assets bundled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl CatalogSource for StaticCatalog {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Catalog::load_from_static()
    }
}

/// Every piece of reference data the engine reads.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub items: ItemCatalog,
    pub arenas: Vec<Arena>,
    pub flavor: FlavorText,
    pub rosters: RosterData,
}

impl Catalog {
    /// Load the bundled assets.
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded asset fails to parse or validate.
    pub fn load_from_static() -> Result<Self, CatalogError> {
        Self::from_json(ITEMS_JSON, ARENAS_JSON, FLAVOR_JSON, TRIBUTES_JSON)
    }

    /// Build a catalog from JSON documents.
    ///
    /// # Errors
    ///
    /// Returns an error if any document fails to parse or the combined catalog is invalid.
    pub fn from_json(
        items: &str,
        arenas: &str,
        flavor: &str,
        rosters: &str,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            items: ItemCatalog::from_json(items).map_err(|source| CatalogError::Parse {
                asset: "items",
                source,
            })?,
            arenas: serde_json::from_str(arenas).map_err(|source| CatalogError::Parse {
                asset: "arenas",
                source,
            })?,
            flavor: FlavorText::from_json(flavor).map_err(|source| CatalogError::Parse {
                asset: "flavor",
                source,
            })?,
            rosters: RosterData::from_json(rosters).map_err(|source| CatalogError::Parse {
                asset: "tributes",
                source,
            })?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check cross-references and pool sizes.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut keys = HashSet::new();
        for item in &self.items.items {
            if !keys.insert(item.key.as_str()) {
                return Err(CatalogError::DuplicateItem(item.key.clone()));
            }
        }
        for recipe in &self.items.recipes {
            for key in std::iter::once(&recipe.result).chain(&recipe.components) {
                if !keys.contains(key.as_str()) {
                    return Err(CatalogError::UnknownItem {
                        recipe: recipe.result.clone(),
                        key: key.clone(),
                    });
                }
            }
        }

        if self.arenas.is_empty() {
            return Err(CatalogError::NoArenas);
        }
        let mut arena_names = HashSet::new();
        for arena in &self.arenas {
            if !arena_names.insert(arena.name.as_str()) {
                return Err(CatalogError::DuplicateArena(arena.name.clone()));
            }
        }

        for (label, len) in self.flavor.required_pools() {
            if len == 0 {
                return Err(CatalogError::EmptyPool(label));
            }
        }
        if self.items.materials().is_empty() {
            return Err(CatalogError::EmptyPool("items.material"));
        }
        if self.items.provisions().is_empty() {
            return Err(CatalogError::EmptyPool("items.provision"));
        }
        if self.items.cornucopia_items().is_empty() {
            return Err(CatalogError::EmptyPool("items.cornucopia"));
        }

        if self.rosters.book.is_empty() {
            return Err(CatalogError::EmptyPool("tributes.book"));
        }
        for template in &self.rosters.book {
            for stat in Stat::ALL {
                let value = template.stats.get(stat);
                if !(STAT_MIN..=STAT_MAX).contains(&value) {
                    return Err(CatalogError::StatOutOfRange {
                        tribute: template.name.clone(),
                        stat,
                        value,
                        min: STAT_MIN,
                        max: STAT_MAX,
                    });
                }
            }
        }
        for district in 1..=DISTRICT_COUNT {
            if self.rosters.profile(district).is_none() {
                return Err(CatalogError::MissingDistrictProfile(district));
            }
        }
        Ok(())
    }

    /// Arena by exact name.
    #[must_use]
    pub fn arena(&self, name: &str) -> Option<&Arena> {
        self.arenas.iter().find(|arena| arena.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_assets_load_and_validate() {
        let catalog = StaticCatalog.load_catalog().unwrap();
        assert_eq!(catalog.rosters.book.len(), 24);
        assert!(catalog.arena("Temperate Forest").is_some());
        assert!(catalog.arenas.iter().all(|arena| arena.name != "Random"));
        assert!(!catalog.items.recipes.is_empty());
    }

    #[test]
    fn unknown_recipe_component_is_rejected() {
        let mut catalog = Catalog::load_from_static().unwrap();
        catalog.items.recipes[0].components.push("unobtainium".to_string());
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::UnknownItem { key, .. }) if key == "unobtainium"
        ));
    }

    #[test]
    fn empty_pools_are_rejected() {
        let mut catalog = Catalog::load_from_static().unwrap();
        catalog.flavor.crafting.clear();
        assert!(matches!(catalog.validate(), Err(CatalogError::EmptyPool("crafting"))));
    }

    #[test]
    fn malformed_json_names_the_asset() {
        let err = Catalog::from_json("{", ARENAS_JSON, FLAVOR_JSON, TRIBUTES_JSON).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { asset: "items", .. }));
    }
}
