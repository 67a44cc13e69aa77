use std::collections::HashSet;

use cornucopia_game::{
    ArenaChoice, Catalog, CountingRng, DayOptions, Engine, GameRunner, GameSettings, RosterSet,
    RunState, Tribute, initialize_relationships, reap,
};

fn catalog() -> Catalog {
    Catalog::load_from_static().unwrap()
}

fn assert_roster_invariants(tributes: &[Tribute], mid_game: bool, context: &str) {
    let living: HashSet<u32> = tributes
        .iter()
        .filter(|t| t.is_alive())
        .map(|t| t.id)
        .collect();
    for tribute in tributes {
        assert!(tribute.stats.in_bounds(), "{context}: {} stats", tribute.name);
        assert!((0..=100).contains(&tribute.food), "{context}: food");
        assert!((0..=100).contains(&tribute.water), "{context}: water");
        assert!((-10..=10).contains(&tribute.morale), "{context}: morale");
        assert!(tribute.health <= tribute.max_health + f64::EPSILON, "{context}: health cap");
        if tribute.is_alive() {
            if mid_game {
                assert!(tribute.health > 0.0, "{context}: {} alive at 0", tribute.name);
            }
            for ally in &tribute.allies {
                assert!(living.contains(ally), "{context}: dead ally of {}", tribute.name);
                let partner = tributes.iter().find(|t| t.id == *ally).unwrap();
                assert!(partner.allies.contains(&tribute.id), "{context}: one-sided alliance");
            }
        } else {
            assert!(tribute.allies.is_empty(), "{context}: dead tribute keeps allies");
            assert!(tribute.cause_of_death.is_some(), "{context}: missing cause");
        }
        for relationship in tribute.relationships.values() {
            assert!((-100..=100).contains(&relationship.score), "{context}: relationship");
        }
    }
}

#[test]
fn full_runs_hold_invariants_across_seeds() {
    let catalog = catalog();
    for seed in 0..12_u64 {
        let roster = if seed % 2 == 0 {
            RosterSet::Book
        } else {
            RosterSet::Generic
        };
        let settings = GameSettings {
            seed,
            roster,
            ..GameSettings::default()
        };
        let mut runner = GameRunner::new(&catalog, settings).unwrap();
        while runner.state().is_running() {
            runner.step();
            let context = format!("seed {seed} day {}", runner.day());
            assert_roster_invariants(runner.tributes(), runner.state().is_running(), &context);
        }
        assert_eq!(runner.state(), &RunState::Finished, "seed {seed}");

        let summary = runner.summary();
        let dead = runner.tributes().iter().filter(|t| !t.is_alive()).count();
        assert_eq!(summary.timeline.len(), dead, "seed {seed}: every death logged once");
        let unique: HashSet<u32> = summary.placements.iter().copied().collect();
        assert_eq!(unique.len(), 24, "seed {seed}: placements cover the roster");

        let days: Vec<f64> = runner.log().iter().map(|day| day.day).collect();
        assert!(days.windows(2).all(|pair| pair[0] < pair[1]), "seed {seed}: {days:?}");
    }
}

#[test]
fn short_runs_end_in_sudden_death_or_finale() {
    let catalog = catalog();
    let settings = GameSettings {
        seed: 99,
        max_days: 1,
        arena: ArenaChoice::Named("Frozen Tundra".into()),
        ..GameSettings::default()
    };
    let mut runner = GameRunner::new(&catalog, settings).unwrap();
    runner.run_to_completion();
    assert_eq!(runner.state(), &RunState::Finished);
    assert!(runner.tributes().iter().filter(|t| t.is_alive()).count() <= 1);
    assert!(runner.day() <= 2);
    assert_eq!(runner.arena().name, "Frozen Tundra");
}

#[test]
fn culling_lands_half_a_day_before_the_final_day() {
    let catalog = catalog();
    let settings = GameSettings {
        seed: 5,
        max_days: 2,
        bloodbath_deaths: 0,
        ..GameSettings::default()
    };
    let mut runner = GameRunner::new(&catalog, settings).unwrap();
    runner.run_to_completion();
    let culled = runner
        .log()
        .iter()
        .find(|day| (day.day - 1.5).abs() < f64::EPSILON);
    if let Some(culling) = culled {
        assert!(!culling.deaths.is_empty());
    }
}

#[test]
fn engine_phases_leave_the_input_roster_untouched() {
    let catalog = catalog();
    let engine = Engine::new(&catalog);
    let arena = catalog.arena("Temperate Forest").unwrap();
    let mut rng = CountingRng::seeded(77);
    let mut tributes = reap(RosterSet::Book, &catalog.rosters, &mut rng).unwrap();
    initialize_relationships(&mut tributes);
    let before = tributes.clone();

    let day = engine
        .run_normal_day(&tributes, 1, arena, DayOptions::default(), &mut rng)
        .unwrap();
    assert_eq!(tributes, before);
    assert_eq!(day.tributes.len(), 24);
    assert!(!day.report.events.is_empty());
    assert_roster_invariants(&day.tributes, true, "bloodbath");

    let culled = engine.run_culling(&day.tributes, 4, &mut rng).unwrap();
    assert_eq!(culled.tributes.iter().filter(|t| t.is_alive()).count(), 4);
    assert_roster_invariants(&culled.tributes, true, "culling");
}
