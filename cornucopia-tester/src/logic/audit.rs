use std::collections::BTreeSet;

use cornucopia_game::{GameDay, RelationshipLevel, Tribute, TributeId};

const VITAL_RANGE: std::ops::RangeInclusive<i32> = 0..=100;
const MORALE_RANGE: std::ops::RangeInclusive<i32> = -10..=10;
const RELATIONSHIP_RANGE: std::ops::RangeInclusive<i32> = -100..=100;
const MAX_HEALTH_FLOOR: f64 = 20.0;
const MAX_HEALTH_CAP: f64 = 100.0;

/// Roster and log entries on either side of one runner step.
#[derive(Debug, Clone, Copy)]
pub struct StepSnapshot<'a> {
    pub before: &'a [Tribute],
    pub after: &'a [Tribute],
    pub published: &'a [GameDay],
    pub last_day_tag: Option<f64>,
    /// False once the run reached a terminal state.
    pub running: bool,
}

/// Check one step for broken invariants. Returns one message per violation.
#[must_use]
pub fn audit_step(step: &StepSnapshot<'_>) -> Vec<String> {
    let mut violations = Vec::new();

    if step.before.len() != step.after.len() {
        violations.push(format!(
            "roster size changed from {} to {}",
            step.before.len(),
            step.after.len()
        ));
        return violations;
    }

    for (before, after) in step.before.iter().zip(step.after) {
        if before.id != after.id {
            violations.push(format!("roster order changed at id {}", before.id));
        }
        if !before.is_alive() && after.is_alive() {
            violations.push(format!("{} came back to life", after.name));
        }
        if after.max_health > before.max_health + f64::EPSILON {
            violations.push(format!("{} max health increased", after.name));
        }
    }

    for tribute in step.after {
        audit_tribute(tribute, step.after, step.running, &mut violations);
    }

    audit_deaths(step, &mut violations);
    audit_day_tags(step, &mut violations);
    violations
}

fn audit_tribute(tribute: &Tribute, roster: &[Tribute], running: bool, out: &mut Vec<String>) {
    let name = &tribute.name;
    if !tribute.stats.in_bounds() {
        out.push(format!("{name} has stats outside 1..=10: {:?}", tribute.stats));
    }
    if !VITAL_RANGE.contains(&tribute.food) || !VITAL_RANGE.contains(&tribute.water) {
        out.push(format!(
            "{name} vitals out of range (food {}, water {})",
            tribute.food, tribute.water
        ));
    }
    if !MORALE_RANGE.contains(&tribute.morale) {
        out.push(format!("{name} morale {} out of range", tribute.morale));
    }
    if tribute.max_health < MAX_HEALTH_FLOOR || tribute.max_health > MAX_HEALTH_CAP {
        out.push(format!("{name} max health {:.1} out of range", tribute.max_health));
    }
    if tribute.health > tribute.max_health + f64::EPSILON {
        out.push(format!(
            "{name} health {:.1} exceeds max {:.1}",
            tribute.health, tribute.max_health
        ));
    }
    for (other, relationship) in &tribute.relationships {
        if *other == tribute.id {
            out.push(format!("{name} has a relationship with themselves"));
        }
        if !RELATIONSHIP_RANGE.contains(&relationship.score)
            || relationship.level != RelationshipLevel::from_score(relationship.score)
        {
            out.push(format!("{name} relationship toward {other} is inconsistent"));
        }
    }

    if tribute.is_alive() {
        if running && tribute.health <= 0.0 {
            out.push(format!("{name} is alive at {:.1} health", tribute.health));
        }
        for ally in &tribute.allies {
            match roster.iter().find(|t| t.id == *ally) {
                Some(partner) if !partner.is_alive() => {
                    out.push(format!("{name} is allied with the fallen {}", partner.name));
                }
                Some(partner) if !partner.is_allied_with(tribute.id) => {
                    out.push(format!("{name} -> {} alliance is one-sided", partner.name));
                }
                Some(_) => {}
                None => out.push(format!("{name} is allied with unknown id {ally}")),
            }
        }
    } else {
        if !tribute.allies.is_empty() || tribute.alliance_name.is_some() {
            out.push(format!("{name} kept alliance state after death"));
        }
        if tribute.cause_of_death.is_none() {
            out.push(format!("{name} died without a cause"));
        }
    }
}

fn audit_deaths(step: &StepSnapshot<'_>, out: &mut Vec<String>) {
    let newly_dead: BTreeSet<TributeId> = step
        .before
        .iter()
        .zip(step.after)
        .filter(|(before, after)| before.is_alive() && !after.is_alive())
        .map(|(_, after)| after.id)
        .collect();
    let mut recorded = BTreeSet::new();
    for death in step.published.iter().flat_map(|day| &day.deaths) {
        if !recorded.insert(death.tribute_id) {
            out.push(format!("{} died twice in one step", death.tribute_name));
        }
    }
    if newly_dead != recorded {
        out.push(format!(
            "death records {recorded:?} do not match roster deaths {newly_dead:?}"
        ));
    }
}

fn audit_day_tags(step: &StepSnapshot<'_>, out: &mut Vec<String>) {
    let mut last = step.last_day_tag;
    for day in step.published {
        if let Some(previous) = last
            && day.day <= previous
        {
            out.push(format!("day tag {} does not follow {previous}", day.day));
        }
        last = Some(day.day);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cornucopia_game::{DayReport, DeathRecord, Gender, Stats, Status};

    fn roster() -> Vec<Tribute> {
        (1..=3)
            .map(|id| {
                Tribute::new(id, format!("T{id}"), 1, Gender::Male).with_stats(Stats::uniform(5))
            })
            .collect()
    }

    fn kill(tribute: &mut Tribute) {
        tribute.status = Status::Dead;
        tribute.cause_of_death = Some("Fell.".into());
    }

    #[test]
    fn clean_step_passes() {
        let before = roster();
        let mut after = before.clone();
        kill(&mut after[2]);
        let mut report = DayReport::new("day");
        report.deaths.push(DeathRecord {
            tribute_id: 3,
            tribute_name: "T3".into(),
            cause: "Fell.".into(),
        });
        let published = vec![report.into_day(1.0)];
        let step = StepSnapshot {
            before: &before,
            after: &after,
            published: &published,
            last_day_tag: Some(0.0),
            running: true,
        };
        assert!(audit_step(&step).is_empty());
    }

    #[test]
    fn unrecorded_death_and_stale_tag_are_flagged() {
        let before = roster();
        let mut after = before.clone();
        kill(&mut after[0]);
        let published = vec![DayReport::new("day").into_day(1.0)];
        let step = StepSnapshot {
            before: &before,
            after: &after,
            published: &published,
            last_day_tag: Some(1.0),
            running: true,
        };
        let violations = audit_step(&step);
        assert_eq!(violations.len(), 2, "{violations:?}");
    }

    #[test]
    fn one_sided_alliance_is_flagged() {
        let before = roster();
        let mut after = before.clone();
        after[0].allies.push(2);
        after[1].morale = 11;
        let step = StepSnapshot {
            before: &before,
            after: &after,
            published: &[],
            last_day_tag: None,
            running: true,
        };
        let violations = audit_step(&step);
        assert!(violations.iter().any(|v| v.contains("one-sided")));
        assert!(violations.iter().any(|v| v.contains("morale")));
    }
}
