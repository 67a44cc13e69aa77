use std::collections::HashSet;
use std::hash::Hasher;

use cornucopia_game::{Catalog, GameRunner, GameSettings, GameSummary, ItemKind, RosterSet};
use twox_hash::XxHash64;

fn catalog() -> Catalog {
    Catalog::load_from_static().unwrap()
}

fn digest(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

#[test]
fn bundled_catalog_covers_every_district() {
    let catalog = catalog();
    let districts: HashSet<u8> = catalog.rosters.book.iter().map(|t| t.district).collect();
    assert_eq!(districts.len(), 12);
    for district in 1..=12 {
        assert!(catalog.rosters.profile(district).is_some(), "district {district}");
        let pair = catalog
            .rosters
            .book
            .iter()
            .filter(|t| t.district == district)
            .count();
        assert_eq!(pair, 2, "district {district} sends two tributes");
    }
    assert_eq!(catalog.arenas.len(), 7);
    assert!(catalog.arenas.iter().all(|arena| !arena.events.is_empty()));
}

#[test]
fn every_recipe_resolves_to_known_items() {
    let catalog = catalog();
    for recipe in &catalog.items.recipes {
        let result = catalog.items.recipe_result(recipe).unwrap();
        assert_ne!(result.kind, ItemKind::Material, "{} crafts a material", result.key);
        let components = catalog.items.component_names(recipe).unwrap();
        assert_eq!(components.len(), recipe.components.len());
    }
    assert!(!catalog.items.sponsor_pool().is_empty());
    assert!(!catalog.items.cornucopia_items().is_empty());
}

#[test]
fn summary_serialization_round_trips() {
    let catalog = catalog();
    let mut runner = GameRunner::new(&catalog, GameSettings::default()).unwrap();
    runner.run_to_completion();
    let summary = runner.summary();
    let saved = serde_json::to_string(&summary).unwrap();
    let restored: GameSummary = serde_json::from_str(&saved).unwrap();
    assert_eq!(summary, restored);
}

#[test]
fn fingerprints_depend_only_on_settings() {
    let catalog = catalog();
    let run = |seed: u64| {
        let settings = GameSettings {
            seed,
            roster: RosterSet::Generic,
            ..GameSettings::default()
        };
        let mut runner = GameRunner::new(&catalog, settings).unwrap();
        runner.run_to_completion();
        let bytes = serde_json::to_vec(&runner.summary()).unwrap();
        assert_eq!(runner.fingerprint().unwrap(), digest(&bytes));
        runner.fingerprint().unwrap()
    };
    assert_eq!(run(0x00C0_FFEE), run(0x00C0_FFEE));
    let distinct: HashSet<u64> = (0..6).map(run).collect();
    assert!(distinct.len() > 1, "different seeds should diverge");
}
