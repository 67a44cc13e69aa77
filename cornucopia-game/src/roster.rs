//! Working copy of the tribute collection for one phase.
//!
//! All structural mutations that must stay consistent across several
//! tributes (deaths, alliance links, alliance names) go through [`Roster`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants::{CELEBRATION_MORALE, DEVASTATED_MORALE, SADDENED_MORALE};
use crate::error::SimulationError;
use crate::report::{DayReport, DeathRecord, EventKind};
use crate::tribute::{RelationshipLevel, Status, Tribute, TributeId};

/// A connected group of living allied tributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceGroup {
    pub name: Option<String>,
    pub members: Vec<TributeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    tributes: Vec<Tribute>,
}

impl Roster {
    #[must_use]
    pub const fn new(tributes: Vec<Tribute>) -> Self {
        Self { tributes }
    }

    /// Private working copy of a caller's roster.
    #[must_use]
    pub fn snapshot(tributes: &[Tribute]) -> Self {
        Self::new(tributes.to_vec())
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Tribute> {
        self.tributes
    }

    #[must_use]
    pub fn tributes(&self) -> &[Tribute] {
        &self.tributes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tributes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TributeId) -> Option<&Tribute> {
        self.tributes.iter().find(|tribute| tribute.id == id)
    }

    pub fn get_mut(&mut self, id: TributeId) -> Option<&mut Tribute> {
        self.tributes.iter_mut().find(|tribute| tribute.id == id)
    }

    /// # Errors
    ///
    /// Returns [`SimulationError::MissingTribute`] if `id` is not in the roster.
    pub fn require(&self, id: TributeId) -> Result<&Tribute, SimulationError> {
        self.get(id).ok_or(SimulationError::MissingTribute(id))
    }

    /// # Errors
    ///
    /// Returns [`SimulationError::MissingTribute`] if `id` is not in the roster.
    pub fn require_mut(&mut self, id: TributeId) -> Result<&mut Tribute, SimulationError> {
        self.get_mut(id).ok_or(SimulationError::MissingTribute(id))
    }

    /// Mutable access to two distinct tributes at once.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::MissingTribute`] if either id is absent, or
    /// [`SimulationError::Invariant`] if both ids are the same.
    pub fn pair_mut(
        &mut self,
        first: TributeId,
        second: TributeId,
    ) -> Result<(&mut Tribute, &mut Tribute), SimulationError> {
        if first == second {
            return Err(SimulationError::Invariant(format!(
                "tribute {first} cannot be paired with itself"
            )));
        }
        let first_index = self.index_of(first)?;
        let second_index = self.index_of(second)?;
        if first_index < second_index {
            let (head, tail) = self.tributes.split_at_mut(second_index);
            Ok((&mut head[first_index], &mut tail[0]))
        } else {
            let (head, tail) = self.tributes.split_at_mut(first_index);
            Ok((&mut tail[0], &mut head[second_index]))
        }
    }

    fn index_of(&self, id: TributeId) -> Result<usize, SimulationError> {
        self.tributes
            .iter()
            .position(|tribute| tribute.id == id)
            .ok_or(SimulationError::MissingTribute(id))
    }

    #[must_use]
    pub fn is_alive(&self, id: TributeId) -> bool {
        self.get(id).is_some_and(Tribute::is_alive)
    }

    /// Living ids in roster order.
    #[must_use]
    pub fn living_ids(&self) -> Vec<TributeId> {
        self.tributes
            .iter()
            .filter(|tribute| tribute.is_alive())
            .map(|tribute| tribute.id)
            .collect()
    }

    pub fn living(&self) -> impl Iterator<Item = &Tribute> {
        self.tributes.iter().filter(|tribute| tribute.is_alive())
    }

    #[must_use]
    pub fn living_count(&self) -> usize {
        self.living().count()
    }

    /// Living allies of `id`, in ally-list order.
    #[must_use]
    pub fn living_allies(&self, id: TributeId) -> Vec<TributeId> {
        self.get(id).map_or_else(Vec::new, |tribute| {
            tribute
                .allies
                .iter()
                .copied()
                .filter(|ally| self.is_alive(*ally))
                .collect()
        })
    }

    /// Form a symmetric alliance link.
    ///
    /// # Errors
    ///
    /// Returns an error if either tribute is missing or the ids are equal.
    pub fn link(&mut self, first: TributeId, second: TributeId) -> Result<(), SimulationError> {
        let (a, b) = self.pair_mut(first, second)?;
        if !a.allies.contains(&second) {
            a.allies.push(second);
        }
        if !b.allies.contains(&first) {
            b.allies.push(first);
        }
        Ok(())
    }

    /// Remove an alliance link in both directions.
    pub fn unlink(&mut self, first: TributeId, second: TributeId) {
        if let Some(a) = self.get_mut(first) {
            a.allies.retain(|ally| *ally != second);
        }
        if let Some(b) = self.get_mut(second) {
            b.allies.retain(|ally| *ally != first);
        }
    }

    /// Detach `id` from every alliance it belongs to.
    pub fn leave_alliances(&mut self, id: TributeId) {
        for tribute in &mut self.tributes {
            tribute.allies.retain(|ally| *ally != id);
        }
        if let Some(leaver) = self.get_mut(id) {
            leaver.allies.clear();
            leaver.alliance_name = None;
        }
        self.normalize_alliance_names();
    }

    /// Connected components of the ally graph over living tributes.
    fn components(&self) -> Vec<Vec<TributeId>> {
        let adjacency: BTreeMap<TributeId, Vec<TributeId>> = self
            .living()
            .map(|tribute| {
                let neighbours = tribute
                    .allies
                    .iter()
                    .copied()
                    .filter(|ally| self.is_alive(*ally))
                    .collect();
                (tribute.id, neighbours)
            })
            .collect();

        let mut seen = BTreeSet::new();
        let mut groups = Vec::new();
        for tribute in self.living() {
            if !seen.insert(tribute.id) {
                continue;
            }
            let mut group = vec![tribute.id];
            let mut cursor = 0;
            while let Some(current) = group.get(cursor).copied() {
                cursor += 1;
                for next in adjacency.get(&current).into_iter().flatten() {
                    if seen.insert(*next) {
                        group.push(*next);
                    }
                }
            }
            groups.push(group);
        }
        groups
    }

    /// Member ids of the living alliance group containing `id`, `id` first.
    #[must_use]
    pub fn group_of(&self, id: TributeId) -> Vec<TributeId> {
        self.components()
            .into_iter()
            .find(|group| group.contains(&id))
            .map(|mut group| {
                if let Some(position) = group.iter().position(|member| *member == id) {
                    group.swap(0, position);
                }
                group
            })
            .unwrap_or_default()
    }

    /// Every alliance with at least two living members.
    #[must_use]
    pub fn alliance_groups(&self) -> Vec<AllianceGroup> {
        self.components()
            .into_iter()
            .filter(|group| group.len() >= 2)
            .map(|members| AllianceGroup {
                name: members
                    .first()
                    .and_then(|id| self.get(*id))
                    .and_then(|tribute| tribute.alliance_name.clone()),
                members,
            })
            .collect()
    }

    /// Give every member of a group the same name.
    pub fn name_group(&mut self, members: &[TributeId], name: &str) {
        for id in members {
            if let Some(tribute) = self.get_mut(*id) {
                tribute.alliance_name = Some(name.to_string());
            }
        }
    }

    /// Re-establish alliance naming after structural changes.
    ///
    /// Lone tributes lose their name. Each group keeps the first name one of
    /// its members already carries that no earlier group has claimed, so two
    /// tributes share a name only when they are connected.
    pub fn normalize_alliance_names(&mut self) {
        let mut claimed = BTreeSet::new();
        for tribute in &mut self.tributes {
            if !tribute.is_alive() {
                tribute.alliance_name = None;
            }
        }
        for group in self.components() {
            if group.len() < 2 {
                for id in &group {
                    if let Some(tribute) = self.get_mut(*id) {
                        tribute.alliance_name = None;
                    }
                }
                continue;
            }
            let name = group
                .iter()
                .filter_map(|id| self.get(*id).and_then(|t| t.alliance_name.clone()))
                .find(|name| !claimed.contains(name));
            if let Some(name) = &name {
                claimed.insert(name.clone());
            }
            for id in &group {
                if let Some(tribute) = self.get_mut(*id) {
                    tribute.alliance_name.clone_from(&name);
                }
            }
        }
    }

    /// Record a death exactly once and ripple it through the roster.
    ///
    /// Returns `false` when the tribute was already dead.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::MissingTribute`] if `id` is not in the roster.
    pub fn kill(
        &mut self,
        id: TributeId,
        cause: &str,
        timestamp: &str,
        report: &mut DayReport,
    ) -> Result<bool, SimulationError> {
        let victim = self.require_mut(id)?;
        if !victim.is_alive() {
            return Ok(false);
        }
        victim.status = Status::Dead;
        victim.cause_of_death = Some(cause.to_string());
        let victim_name = victim.name.clone();
        let victim_district = victim.district;
        log::trace!("{victim_name} dies: {cause}");
        report.deaths.push(DeathRecord {
            tribute_id: id,
            tribute_name: victim_name.clone(),
            cause: cause.to_string(),
        });

        for tribute in self.tributes.iter_mut().filter(|t| t.is_alive()) {
            let Some(relationship) = tribute.relationship(id) else {
                continue;
            };
            let kin = tribute.district == victim_district && !tribute.is_allied_with(id);
            match relationship.level {
                RelationshipLevel::MaximumAlly | RelationshipLevel::CloseAlly => {
                    tribute.adjust_morale(DEVASTATED_MORALE);
                    report.push(
                        EventKind::Negative,
                        format!(
                            "{} is devastated by the death of their ally, {victim_name}.",
                            tribute.name
                        ),
                        timestamp,
                    );
                }
                RelationshipLevel::Ally => tribute.adjust_morale(SADDENED_MORALE),
                _ if kin => tribute.adjust_morale(SADDENED_MORALE),
                RelationshipLevel::Enemy => {
                    tribute.adjust_morale(CELEBRATION_MORALE);
                    report.push(
                        EventKind::Positive,
                        format!(
                            "{} celebrates the death of their enemy, {victim_name}.",
                            tribute.name
                        ),
                        timestamp,
                    );
                }
                RelationshipLevel::Neutral => {}
            }
        }

        for tribute in &mut self.tributes {
            tribute.allies.retain(|ally| *ally != id);
        }
        if let Some(victim) = self.get_mut(id) {
            victim.allies.clear();
            victim.alliance_name = None;
        }
        self.normalize_alliance_names();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tribute::Gender;

    fn roster(count: u32) -> Roster {
        Roster::new(
            (1..=count)
                .map(|id| {
                    let district = u8::try_from(id).unwrap();
                    Tribute::new(id, format!("T{id}"), district, Gender::Female)
                })
                .collect(),
        )
    }

    #[test]
    fn kill_is_recorded_once() {
        let mut roster = roster(3);
        let mut report = DayReport::default();
        assert!(roster.kill(2, "Fell.", "08:00", &mut report).unwrap());
        assert!(!roster.kill(2, "Fell again.", "09:00", &mut report).unwrap());
        assert_eq!(report.deaths.len(), 1);
        assert_eq!(roster.get(2).unwrap().cause_of_death.as_deref(), Some("Fell."));
        assert_eq!(roster.living_count(), 2);
    }

    #[test]
    fn death_ripples_through_relationships() {
        let mut roster = roster(4);
        roster.get_mut(1).unwrap().set_relationship(4, 70);
        roster.get_mut(2).unwrap().set_relationship(4, -50);
        roster.get_mut(3).unwrap().set_relationship(4, 30);
        let mut report = DayReport::default();
        roster.kill(4, "Mutts.", "14:00", &mut report).unwrap();
        assert_eq!(roster.get(1).unwrap().morale, -8);
        assert_eq!(roster.get(2).unwrap().morale, 5);
        assert_eq!(roster.get(3).unwrap().morale, -4);
        assert_eq!(report.events.len(), 2);
    }

    #[test]
    fn same_district_neutral_mourns() {
        let mut roster = Roster::new(vec![
            Tribute::new(1, "Katniss", 12, Gender::Female),
            Tribute::new(2, "Peeta", 12, Gender::Male),
        ]);
        roster.get_mut(1).unwrap().set_relationship(2, 10);
        roster.kill(2, "Fell.", "10:00", &mut DayReport::default()).unwrap();
        assert_eq!(roster.get(1).unwrap().morale, -4);
    }

    #[test]
    fn district_ties_outweigh_enmity() {
        let mut roster = Roster::new(vec![
            Tribute::new(1, "Katniss", 12, Gender::Female),
            Tribute::new(2, "Peeta", 12, Gender::Male),
        ]);
        roster.get_mut(1).unwrap().set_relationship(2, -60);
        let mut report = DayReport::default();
        roster.kill(2, "Fell.", "10:00", &mut report).unwrap();
        assert_eq!(roster.get(1).unwrap().morale, -4);
        assert!(report.events.iter().all(|event| event.kind != EventKind::Positive));
    }

    #[test]
    fn death_dissolves_shrunken_alliances() {
        let mut roster = roster(4);
        roster.link(1, 2).unwrap();
        roster.link(2, 3).unwrap();
        roster.name_group(&[1, 2, 3], "The Swift Pact");
        roster.kill(2, "Fell.", "10:00", &mut DayReport::default()).unwrap();
        for id in 1..=3 {
            let tribute = roster.get(id).unwrap();
            assert!(tribute.allies.is_empty());
            assert!(tribute.alliance_name.is_none());
        }
    }

    #[test]
    fn split_groups_keep_distinct_names() {
        let mut roster = roster(5);
        roster.link(1, 2).unwrap();
        roster.link(2, 3).unwrap();
        roster.link(3, 4).unwrap();
        roster.link(4, 5).unwrap();
        roster.name_group(&[1, 2, 3, 4, 5], "The Final Wolves");
        roster.leave_alliances(3);
        let names: Vec<Option<String>> = (1..=5)
            .map(|id| roster.get(id).unwrap().alliance_name.clone())
            .collect();
        assert_eq!(names[0].as_deref(), Some("The Final Wolves"));
        assert_eq!(names[1].as_deref(), Some("The Final Wolves"));
        assert!(names[2].is_none());
        assert!(names[3].is_none(), "second group loses the claimed name");
        assert!(names[4].is_none());
        assert_eq!(roster.alliance_groups().len(), 2);
    }

    #[test]
    fn pair_mut_rejects_self_pairs() {
        let mut roster = roster(2);
        assert!(matches!(roster.pair_mut(1, 1), Err(SimulationError::Invariant(_))));
        let (a, b) = roster.pair_mut(2, 1).unwrap();
        assert_eq!((a.id, b.id), (2, 1));
    }
}
