//! Roster creation: the fixed book roster or a freshly rolled generic one.

use serde::{Deserialize, Serialize};

use crate::catalog::{DistrictProfile, RosterData};
use crate::constants::{
    BASE_STAT_WEIGHT, BIAS_STAT_WEIGHT, BONUS_SKILL_CHANCE, CAREER_SKILL_COUNT,
    CAREER_STAT_POINTS, CAREER_TRAIT_CHANCE, DISTRICT_COUNT, FIRST_SKILL_CHANCE, STAT_MAX,
    STAT_POINTS, STAT_SHUFFLE_FLOOR, STAT_SHUFFLES, TRAIT_CHANCE, WEAKNESS_STAT_PENALTY,
};
use crate::error::SimulationError;
use crate::rng::RandomSource;
use crate::tribute::{Gender, Skill, Stat, Stats, Trait, Tribute, TributeId};

/// Which roster a game starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSet {
    /// The 24 named tributes with fixed stats.
    #[default]
    Book,
    /// Two rolled tributes per district.
    Generic,
}

/// Build the starting roster for `set`.
///
/// # Errors
///
/// Returns [`SimulationError::Invariant`] if a district has no generation profile.
pub fn reap(
    set: RosterSet,
    data: &RosterData,
    rng: &mut impl RandomSource,
) -> Result<Vec<Tribute>, SimulationError> {
    match set {
        RosterSet::Book => Ok(reap_book(data)),
        RosterSet::Generic => reap_generic(data, rng),
    }
}

/// The book roster with ids assigned from 1.
#[must_use]
pub fn reap_book(data: &RosterData) -> Vec<Tribute> {
    (1..)
        .zip(&data.book)
        .map(|(id, template)| {
            Tribute::new(id, template.name.as_str(), template.district, template.gender)
                .with_stats(template.stats)
                .with_skills(template.skills.iter().copied())
                .with_traits(template.traits.iter().copied())
        })
        .collect()
}

/// A boy and a girl from every district, rolled from the district profiles.
///
/// # Errors
///
/// Returns [`SimulationError::Invariant`] if a district has no generation profile.
pub fn reap_generic(
    data: &RosterData,
    rng: &mut impl RandomSource,
) -> Result<Vec<Tribute>, SimulationError> {
    let mut tributes = Vec::new();
    let mut next_id: TributeId = 1;
    for district in 1..=DISTRICT_COUNT {
        let profile = data.profile(district).ok_or_else(|| {
            SimulationError::Invariant(format!("no generation profile for district {district}"))
        })?;
        for (gender, label) in [(Gender::Male, "Boy"), (Gender::Female, "Girl")] {
            let stats = roll_stats(profile, rng);
            let skills = roll_skills(profile, rng);
            let traits = roll_traits(profile, rng);
            tributes.push(
                Tribute::new(next_id, format!("District {district} {label}"), district, gender)
                    .with_stats(stats)
                    .with_skills(skills)
                    .with_traits(traits),
            );
            next_id += 1;
        }
    }
    log::debug!("reaped {} generic tributes", tributes.len());
    Ok(tributes)
}

fn stat_weight(profile: &DistrictProfile, stat: Stat) -> u32 {
    let mut weight = BASE_STAT_WEIGHT;
    if profile.bias.contains(&stat) {
        weight += BIAS_STAT_WEIGHT;
    }
    if profile.weakness.contains(&stat) {
        weight = weight.saturating_sub(WEAKNESS_STAT_PENALTY).max(1);
    }
    weight
}

/// Spend the district's point budget one point at a time, weighted toward
/// its biases, then swap a couple of points at random.
fn roll_stats(profile: &DistrictProfile, rng: &mut impl RandomSource) -> Stats {
    let mut stats = Stats::uniform(1);
    let budget = if profile.career {
        CAREER_STAT_POINTS
    } else {
        STAT_POINTS
    };
    let spendable = budget - i32::try_from(Stat::ALL.len()).unwrap_or(0);
    for _ in 0..spendable {
        let pool: Vec<Stat> = Stat::ALL
            .iter()
            .copied()
            .filter(|stat| stats.get(*stat) < STAT_MAX)
            .flat_map(|stat| {
                let weight = usize::try_from(stat_weight(profile, stat)).unwrap_or(1);
                std::iter::repeat_n(stat, weight)
            })
            .collect();
        let Some(&stat) = rng.pick(&pool) else {
            break;
        };
        stats.adjust(stat, 1);
    }

    for _ in 0..STAT_SHUFFLES {
        let (Some(&lower), Some(&raise)) = (rng.pick(&Stat::ALL), rng.pick(&Stat::ALL)) else {
            continue;
        };
        if lower != raise && stats.get(lower) > STAT_SHUFFLE_FLOOR && stats.get(raise) < STAT_MAX {
            stats.adjust(lower, -1);
            stats.adjust(raise, 1);
        }
    }
    stats
}

fn roll_skills(profile: &DistrictProfile, rng: &mut impl RandomSource) -> Vec<Skill> {
    let mut skills = Vec::new();
    if profile.career {
        let mut pool = profile.skill_pool.clone();
        rng.shuffle(&mut pool);
        skills.extend(pool.into_iter().take(CAREER_SKILL_COUNT));
        if rng.chance(BONUS_SKILL_CHANCE)
            && let Some(&bonus) = rng.pick(&Skill::ALL)
            && !skills.contains(&bonus)
        {
            skills.push(bonus);
        }
    } else {
        if rng.chance(FIRST_SKILL_CHANCE)
            && let Some(&first) = rng.pick(&profile.skill_pool)
        {
            skills.push(first);
        }
        if skills.len() < 2
            && rng.chance(BONUS_SKILL_CHANCE)
            && let Some(&bonus) = rng.pick(&Skill::ALL)
            && !skills.contains(&bonus)
        {
            skills.push(bonus);
        }
    }
    skills
}

fn roll_traits(profile: &DistrictProfile, rng: &mut impl RandomSource) -> Vec<Trait> {
    let chance = if profile.career {
        CAREER_TRAIT_CHANCE
    } else {
        TRAIT_CHANCE
    };
    if !rng.chance(chance) {
        return Vec::new();
    }
    let pool: Vec<Trait> = profile
        .trait_pool
        .iter()
        .copied()
        .chain(Trait::ALL)
        .collect();
    rng.pick(&pool).copied().into_iter().collect()
}
