//! Per-entity damage tallies.
//!
//! A `Damageable` owns one non-negative counter per supported damage type.
//! The supported set is fixed when the entity spawns; every mutation goes
//! through [`Damageable::change_damage`] or one of the batch writes, and
//! each returns the list of types that actually changed so the caller can
//! publish exactly one notification.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::prototypes::{DamageClass, DamageGroupId, DamageGroupPrototype, DamageTypeId};
use super::resistance::ResistanceSet;
use crate::core::types::EntityId;

/// One type's damage after a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageChangeData {
    pub damage_type: DamageTypeId,
    pub new_value: i32,
    pub delta: i32,
}

/// Why a damage change was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DamageError {
    #[error("damage class {class} is not supported by this entity")]
    UnsupportedDamageClass { class: DamageClass },

    #[error("the change had no effect")]
    NoEffectChange,

    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("entity {0} is not damageable")]
    NotDamageable(EntityId),
}

/// How a damageable entity relates to one damage group
#[derive(Debug, Clone, PartialEq)]
struct GroupSupport {
    /// Supported member types, in the group's declaration order
    members: Vec<DamageTypeId>,
    /// Every member of the group is supported
    fully_supported: bool,
}

/// Damage tallies for one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Damageable {
    damage_per_type: BTreeMap<DamageTypeId, i32>,
    groups: BTreeMap<DamageGroupId, GroupSupport>,
    resistances: Option<ResistanceSet>,
    total: i32,
}

impl Damageable {
    /// Create a damageable supporting `supported` types.
    ///
    /// `catalogue_groups` is the global group list; only groups with at
    /// least one supported member become applicable.
    pub fn new(
        supported: impl IntoIterator<Item = DamageTypeId>,
        catalogue_groups: &[DamageGroupPrototype],
        resistances: Option<ResistanceSet>,
    ) -> Self {
        let damage_per_type: BTreeMap<DamageTypeId, i32> =
            supported.into_iter().map(|t| (t, 0)).collect();

        let mut groups = BTreeMap::new();
        for group in catalogue_groups {
            let members: Vec<DamageTypeId> = group
                .damage_types
                .iter()
                .filter(|t| damage_per_type.contains_key(*t))
                .cloned()
                .collect();
            if members.is_empty() {
                continue;
            }
            let fully_supported = members.len() == group.damage_types.len();
            groups.insert(
                group.id.clone(),
                GroupSupport {
                    members,
                    fully_supported,
                },
            );
        }

        Self {
            damage_per_type,
            groups,
            resistances,
            total: 0,
        }
    }

    /// Apply a signed amount of damage (negative heals) to a type or group.
    ///
    /// Group amounts are split over the supported member types. Values are
    /// clamped at zero. Returns the changed types, or an error when nothing
    /// could change.
    pub fn change_damage(
        &mut self,
        class: &DamageClass,
        amount: i32,
        ignore_resistances: bool,
    ) -> Result<Vec<DamageChangeData>, DamageError> {
        let planned: Vec<(DamageTypeId, i32)> = match class {
            DamageClass::Type(damage_type) => {
                if !self.is_supported_type(damage_type) {
                    return Err(DamageError::UnsupportedDamageClass {
                        class: class.clone(),
                    });
                }
                vec![(damage_type.clone(), amount)]
            }
            DamageClass::Group(group) => {
                let Some(support) = self.groups.get(group) else {
                    return Err(DamageError::UnsupportedDamageClass {
                        class: class.clone(),
                    });
                };
                if amount >= 0 {
                    split_evenly(&support.members, amount)
                } else {
                    self.plan_group_healing(&support.members, amount.saturating_neg())
                }
            }
        };

        let deltas: Vec<(DamageTypeId, i32)> = planned
            .into_iter()
            .map(|(damage_type, amount)| {
                let amount = match (&self.resistances, ignore_resistances) {
                    (Some(resistances), false) => resistances.apply(&damage_type, amount),
                    _ => amount,
                };
                (damage_type, amount)
            })
            .collect();

        let changes = self.apply_deltas(deltas);
        if changes.is_empty() {
            return Err(DamageError::NoEffectChange);
        }

        tracing::debug!(
            "Damage {} by {} changed {} type(s), total now {}",
            class,
            amount,
            changes.len(),
            self.total
        );
        Ok(changes)
    }

    /// `change_damage` reduced to the boolean contract
    pub fn try_change_damage(
        &mut self,
        class: &DamageClass,
        amount: i32,
        ignore_resistances: bool,
    ) -> bool {
        self.change_damage(class, amount, ignore_resistances).is_ok()
    }

    /// Write the same value into every type as one batch
    pub fn set_all_damage(&mut self, value: i32) -> Vec<DamageChangeData> {
        let value = value.max(0);
        let deltas: Vec<(DamageTypeId, i32)> = self
            .damage_per_type
            .iter()
            .map(|(t, current)| (t.clone(), value - current))
            .collect();
        self.apply_deltas(deltas)
    }

    /// Remove all damage as one batch
    pub fn heal_all(&mut self) -> Vec<DamageChangeData> {
        self.set_all_damage(0)
    }

    fn apply_deltas(&mut self, deltas: Vec<(DamageTypeId, i32)>) -> Vec<DamageChangeData> {
        let mut changes = Vec::new();
        for (damage_type, delta) in deltas {
            if delta == 0 {
                continue;
            }
            let Some(value) = self.damage_per_type.get_mut(&damage_type) else {
                continue;
            };
            let old = *value;
            let new = old.saturating_add(delta).max(0);
            if new == old {
                continue;
            }
            *value = new;
            changes.push(DamageChangeData {
                damage_type,
                new_value: new,
                delta: new - old,
            });
        }
        if !changes.is_empty() {
            self.total = self
                .damage_per_type
                .values()
                .fold(0i32, |acc, v| acc.saturating_add(*v));
        }
        changes
    }

    /// Distribute healing round-robin, each type capped by its own damage.
    ///
    /// Every cycle hands out `max(1, left / n)` per type until the healing
    /// is used up or a cycle heals nothing.
    fn plan_group_healing(&self, members: &[DamageTypeId], healing: i32) -> Vec<(DamageTypeId, i32)> {
        let n = members.len() as i32;
        let mut planned = vec![0i32; members.len()];
        let mut left = healing;

        while left > 0 {
            let per_type = if left < n { 1 } else { left / n };
            let mut healed_this_cycle = 0;

            for (i, damage_type) in members.iter().enumerate() {
                if left == 0 {
                    break;
                }
                let available = self.damage_of(damage_type).unwrap_or(0) - planned[i];
                let heal = per_type.min(available).min(left).max(0);
                planned[i] += heal;
                left -= heal;
                healed_this_cycle += heal;
            }

            if healed_this_cycle == 0 {
                break;
            }
        }

        members
            .iter()
            .cloned()
            .zip(planned)
            .map(|(t, heal)| (t, -heal))
            .collect()
    }

    pub fn total_damage(&self) -> i32 {
        self.total
    }

    pub fn damage_of(&self, damage_type: &DamageTypeId) -> Option<i32> {
        self.damage_per_type.get(damage_type).copied()
    }

    /// Sum over the supported members of a group
    pub fn group_damage(&self, group: &DamageGroupId) -> Option<i32> {
        self.groups.get(group).map(|support| {
            support
                .members
                .iter()
                .filter_map(|t| self.damage_of(t))
                .sum()
        })
    }

    pub fn is_supported_type(&self, damage_type: &DamageTypeId) -> bool {
        self.damage_per_type.contains_key(damage_type)
    }

    /// At least one member of the group is supported
    pub fn supports_group(&self, group: &DamageGroupId) -> bool {
        self.groups.contains_key(group)
    }

    pub fn fully_supports_group(&self, group: &DamageGroupId) -> bool {
        self.groups.get(group).is_some_and(|s| s.fully_supported)
    }

    pub fn supports(&self, class: &DamageClass) -> bool {
        match class {
            DamageClass::Type(t) => self.is_supported_type(t),
            DamageClass::Group(g) => self.supports_group(g),
        }
    }

    pub fn supported_types(&self) -> impl Iterator<Item = &DamageTypeId> {
        self.damage_per_type.keys()
    }

    pub fn applicable_groups(&self) -> BTreeSet<DamageGroupId> {
        self.groups.keys().cloned().collect()
    }

    pub fn damage_per_type_ids(&self) -> BTreeMap<String, i32> {
        self.damage_per_type
            .iter()
            .map(|(t, v)| (t.0.clone(), *v))
            .collect()
    }

    pub fn damage_per_applicable_group_ids(&self) -> BTreeMap<String, i32> {
        self.groups
            .keys()
            .filter_map(|g| self.group_damage(g).map(|d| (g.0.clone(), d)))
            .collect()
    }

    pub fn damage_per_fully_supported_group_ids(&self) -> BTreeMap<String, i32> {
        self.groups
            .iter()
            .filter(|(_, s)| s.fully_supported)
            .filter_map(|(g, _)| self.group_damage(g).map(|d| (g.0.clone(), d)))
            .collect()
    }
}

/// Even split; the remainder goes one unit each to the first members
fn split_evenly(members: &[DamageTypeId], amount: i32) -> Vec<(DamageTypeId, i32)> {
    let n = members.len() as i32;
    let base = amount / n;
    let remainder = amount % n;
    members
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let extra = if (i as i32) < remainder { 1 } else { 0 };
            (t.clone(), base + extra)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<DamageGroupPrototype> {
        vec![
            DamageGroupPrototype {
                id: "Brute".into(),
                damage_types: vec!["Blunt".into(), "Slash".into(), "Piercing".into()],
            },
            DamageGroupPrototype {
                id: "Toxin".into(),
                damage_types: vec!["Poison".into()],
            },
            DamageGroupPrototype {
                id: "Burn".into(),
                damage_types: vec!["Heat".into(), "Cold".into()],
            },
        ]
    }

    fn brute_and_poison() -> Damageable {
        Damageable::new(
            ["Blunt", "Slash", "Piercing", "Poison", "Heat"]
                .into_iter()
                .map(DamageTypeId::from),
            &groups(),
            None,
        )
    }

    #[test]
    fn test_type_damage_and_total() {
        let mut d = brute_and_poison();
        let changes = d
            .change_damage(&DamageClass::damage_type("Blunt"), 15, false)
            .unwrap();
        assert_eq!(
            changes,
            vec![DamageChangeData {
                damage_type: "Blunt".into(),
                new_value: 15,
                delta: 15
            }]
        );
        assert_eq!(d.total_damage(), 15);
    }

    #[test]
    fn test_unsupported_type_is_rejected_without_mutation() {
        let mut d = brute_and_poison();
        let err = d
            .change_damage(&DamageClass::damage_type("Cold"), 10, false)
            .unwrap_err();
        assert!(matches!(err, DamageError::UnsupportedDamageClass { .. }));
        assert_eq!(d.total_damage(), 0);
    }

    #[test]
    fn test_healing_clamps_at_zero_and_reports_clamped_delta() {
        let mut d = brute_and_poison();
        d.change_damage(&DamageClass::damage_type("Blunt"), 5, false).unwrap();
        let changes = d
            .change_damage(&DamageClass::damage_type("Blunt"), -20, false)
            .unwrap();
        assert_eq!(changes[0].delta, -5);
        assert_eq!(changes[0].new_value, 0);
        assert_eq!(d.total_damage(), 0);
    }

    #[test]
    fn test_healing_undamaged_type_has_no_effect() {
        let mut d = brute_and_poison();
        assert_eq!(
            d.change_damage(&DamageClass::damage_type("Blunt"), -3, false),
            Err(DamageError::NoEffectChange)
        );
        assert_eq!(
            d.change_damage(&DamageClass::damage_type("Blunt"), 0, false),
            Err(DamageError::NoEffectChange)
        );
    }

    #[test]
    fn test_group_damage_splits_with_remainder_first() {
        let mut d = brute_and_poison();
        d.change_damage(&DamageClass::group("Brute"), 10, false).unwrap();
        assert_eq!(d.damage_of(&"Blunt".into()), Some(4));
        assert_eq!(d.damage_of(&"Slash".into()), Some(3));
        assert_eq!(d.damage_of(&"Piercing".into()), Some(3));
        assert_eq!(d.group_damage(&"Brute".into()), Some(10));
    }

    #[test]
    fn test_group_skips_unsupported_members() {
        let mut d = brute_and_poison();
        // Burn = Heat + Cold, only Heat supported
        d.change_damage(&DamageClass::group("Burn"), 9, false).unwrap();
        assert_eq!(d.damage_of(&"Heat".into()), Some(9));
        assert!(d.supports_group(&"Burn".into()));
        assert!(!d.fully_supports_group(&"Burn".into()));
    }

    #[test]
    fn test_group_healing_round_robin() {
        let mut d = brute_and_poison();
        d.change_damage(&DamageClass::damage_type("Blunt"), 10, false).unwrap();
        d.change_damage(&DamageClass::damage_type("Slash"), 1, false).unwrap();

        // 6 healing over 3 types: cycle 1 gives 2 to Blunt, 1 to Slash and
        // nothing to Piercing; the remaining 3 drain from Blunt one at a time.
        let changes = d.change_damage(&DamageClass::group("Brute"), -6, false).unwrap();
        assert_eq!(d.damage_of(&"Slash".into()), Some(0));
        assert_eq!(d.damage_of(&"Blunt".into()), Some(5));
        assert_eq!(d.total_damage(), 5);
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_group_healing_stops_when_nothing_left_to_heal() {
        let mut d = brute_and_poison();
        d.change_damage(&DamageClass::damage_type("Slash"), 2, false).unwrap();
        let changes = d.change_damage(&DamageClass::group("Brute"), -100, false).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(d.total_damage(), 0);
    }

    #[test]
    fn test_resistances_apply_unless_ignored() {
        let resist = ResistanceSet::new().with_coefficient("Blunt".into(), 0.5);
        let mut d = Damageable::new([DamageTypeId::from("Blunt")], &groups(), Some(resist));

        d.change_damage(&DamageClass::damage_type("Blunt"), 10, false).unwrap();
        assert_eq!(d.total_damage(), 5);

        d.change_damage(&DamageClass::damage_type("Blunt"), 10, true).unwrap();
        assert_eq!(d.total_damage(), 15);
    }

    #[test]
    fn test_fully_supported_group_projection() {
        let mut d = brute_and_poison();
        d.change_damage(&DamageClass::group("Toxin"), 7, false).unwrap();
        d.change_damage(&DamageClass::damage_type("Heat"), 3, false).unwrap();

        let full = d.damage_per_fully_supported_group_ids();
        assert_eq!(full.get("Toxin"), Some(&7));
        assert_eq!(full.get("Brute"), Some(&0));
        assert!(!full.contains_key("Burn"));

        let applicable = d.damage_per_applicable_group_ids();
        assert_eq!(applicable.get("Burn"), Some(&3));

        let per_type = d.damage_per_type_ids();
        assert_eq!(per_type.len(), 5);
        assert_eq!(per_type.get("Poison"), Some(&7));
    }

    #[test]
    fn test_heal_all_reports_every_damaged_type_once() {
        let mut d = brute_and_poison();
        d.change_damage(&DamageClass::group("Brute"), 30, false).unwrap();
        d.change_damage(&DamageClass::damage_type("Poison"), 1, false).unwrap();

        let changes = d.heal_all();
        assert_eq!(changes.len(), 4);
        assert_eq!(d.total_damage(), 0);
        assert!(d.heal_all().is_empty());
    }

    #[test]
    fn test_huge_damage_saturates() {
        let mut d = brute_and_poison();
        d.change_damage(&DamageClass::damage_type("Blunt"), i32::MAX, true).unwrap();
        d.change_damage(&DamageClass::damage_type("Slash"), i32::MAX, true).unwrap();
        assert_eq!(d.total_damage(), i32::MAX);
    }

    #[test]
    fn test_group_healing_with_min_amount_heals_everything() {
        let mut d = brute_and_poison();
        d.change_damage(&DamageClass::group("Brute"), 30, true).unwrap();

        let changes = d
            .change_damage(&DamageClass::group("Brute"), i32::MIN, true)
            .unwrap();
        assert_eq!(changes.len(), 3);
        assert_eq!(d.total_damage(), 0);
    }
}
