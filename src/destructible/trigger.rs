//! Conditions that arm a destructible threshold

use serde::Deserialize;

use crate::damage::{DamageGroupId, DamageTypeId, Damageable};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThresholdTrigger {
    /// Total damage reaches an absolute value
    Damage { damage: i32 },
    /// Total damage reaches a fraction of the destructible's max damage
    Fraction { fraction: f32 },
    /// One damage type reaches a value
    DamageType {
        damage_type: DamageTypeId,
        damage: i32,
    },
    /// The summed damage of a group reaches a value
    DamageGroup {
        damage_group: DamageGroupId,
        damage: i32,
    },
    And { triggers: Vec<ThresholdTrigger> },
    Or { triggers: Vec<ThresholdTrigger> },
}

impl ThresholdTrigger {
    pub fn reached(&self, damageable: &Damageable, max_damage: Option<i32>) -> bool {
        match self {
            ThresholdTrigger::Damage { damage } => damageable.total_damage() >= *damage,
            ThresholdTrigger::Fraction { fraction } => match max_damage {
                Some(max) => damageable.total_damage() as f64 >= *fraction as f64 * max as f64,
                None => false,
            },
            ThresholdTrigger::DamageType {
                damage_type,
                damage,
            } => damageable
                .damage_of(damage_type)
                .is_some_and(|value| value >= *damage),
            ThresholdTrigger::DamageGroup {
                damage_group,
                damage,
            } => damageable
                .group_damage(damage_group)
                .is_some_and(|value| value >= *damage),
            ThresholdTrigger::And { triggers } => triggers
                .iter()
                .all(|t| t.reached(damageable, max_damage)),
            ThresholdTrigger::Or { triggers } => triggers
                .iter()
                .any(|t| t.reached(damageable, max_damage)),
        }
    }

    /// Position of the trigger on the damage axis, used to order thresholds
    pub fn sort_key(&self, max_damage: Option<i32>) -> f64 {
        match self {
            ThresholdTrigger::Damage { damage }
            | ThresholdTrigger::DamageType { damage, .. }
            | ThresholdTrigger::DamageGroup { damage, .. } => *damage as f64,
            ThresholdTrigger::Fraction { fraction } => {
                *fraction as f64 * max_damage.unwrap_or(0) as f64
            }
            ThresholdTrigger::And { triggers } => triggers
                .iter()
                .map(|t| t.sort_key(max_damage))
                .fold(f64::MIN, f64::max),
            ThresholdTrigger::Or { triggers } => triggers
                .iter()
                .map(|t| t.sort_key(max_damage))
                .fold(f64::MAX, f64::min),
        }
    }

    pub fn uses_fraction(&self) -> bool {
        match self {
            ThresholdTrigger::Fraction { .. } => true,
            ThresholdTrigger::And { triggers } | ThresholdTrigger::Or { triggers } => {
                triggers.iter().any(|t| t.uses_fraction())
            }
            _ => false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            ThresholdTrigger::Damage { damage }
            | ThresholdTrigger::DamageType { damage, .. }
            | ThresholdTrigger::DamageGroup { damage, .. } => {
                if *damage < 0 {
                    return Err(format!("trigger damage {} is negative", damage));
                }
            }
            ThresholdTrigger::Fraction { fraction } => {
                if !(0.0..=1.0).contains(fraction) {
                    return Err(format!("trigger fraction {} is outside 0..=1", fraction));
                }
            }
            ThresholdTrigger::And { triggers } | ThresholdTrigger::Or { triggers } => {
                if triggers.is_empty() {
                    return Err("composite trigger has no children".into());
                }
                for trigger in triggers {
                    trigger.validate()?;
                }
            }
        }
        Ok(())
    }
}
