//! Armed/triggered thresholds and the per-entity destructible table

use rand::Rng;
use serde::Deserialize;

use super::behavior::ThresholdBehavior;
use super::trigger::ThresholdTrigger;
use crate::core::types::EntityId;
use crate::damage::Damageable;
use crate::engine::EngineBridge;

fn default_trigger_once() -> bool {
    true
}

/// Declarative threshold as written in prototype data
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThresholdDef {
    pub trigger: ThresholdTrigger,
    #[serde(default)]
    pub behaviors: Vec<ThresholdBehavior>,
    #[serde(default = "default_trigger_once")]
    pub trigger_once: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DestructibleDef {
    /// Reference for fraction triggers
    #[serde(default)]
    pub max_damage: Option<i32>,
    #[serde(default)]
    pub thresholds: Vec<ThresholdDef>,
}

impl DestructibleDef {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(max) = self.max_damage {
            if max <= 0 {
                return Err(format!("max_damage must be positive, got {}", max));
            }
        }
        for (i, threshold) in self.thresholds.iter().enumerate() {
            threshold
                .trigger
                .validate()
                .map_err(|e| format!("threshold {}: {}", i, e))?;
            if threshold.trigger.uses_fraction() && self.max_damage.is_none() {
                return Err(format!(
                    "threshold {} uses a fraction trigger but max_damage is not set",
                    i
                ));
            }
            for behavior in &threshold.behaviors {
                behavior
                    .validate()
                    .map_err(|e| format!("threshold {}: {}", i, e))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdPhase {
    Armed,
    Triggered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    trigger: ThresholdTrigger,
    behaviors: Vec<ThresholdBehavior>,
    trigger_once: bool,
    phase: ThresholdPhase,
    /// Set on the first crossing, never cleared
    triggered: bool,
}

impl Threshold {
    pub fn new(def: ThresholdDef) -> Self {
        Self {
            trigger: def.trigger,
            behaviors: def.behaviors,
            trigger_once: def.trigger_once,
            phase: ThresholdPhase::Armed,
            triggered: false,
        }
    }

    pub fn trigger(&self) -> &ThresholdTrigger {
        &self.trigger
    }

    pub fn behaviors(&self) -> &[ThresholdBehavior] {
        &self.behaviors
    }

    pub fn trigger_once(&self) -> bool {
        self.trigger_once
    }

    pub fn phase(&self) -> ThresholdPhase {
        self.phase
    }

    pub fn has_triggered(&self) -> bool {
        self.triggered
    }

    /// Advance the phase for the current damage. Returns true on a new crossing.
    pub fn evaluate(&mut self, damageable: &Damageable, max_damage: Option<i32>) -> bool {
        let reached = self.trigger.reached(damageable, max_damage);
        match self.phase {
            ThresholdPhase::Armed if reached => {
                self.phase = ThresholdPhase::Triggered;
                self.triggered = true;
                true
            }
            ThresholdPhase::Triggered if !reached && !self.trigger_once => {
                self.phase = ThresholdPhase::Armed;
                false
            }
            _ => false,
        }
    }
}

/// Result of running one crossed threshold's behaviors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdFiring {
    pub index: usize,
    pub executed: usize,
    pub failed: usize,
    pub destroys_owner: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Destructible {
    thresholds: Vec<Threshold>,
    max_damage: Option<i32>,
}

impl Destructible {
    pub fn from_def(def: &DestructibleDef) -> Result<Self, String> {
        def.validate()?;
        let mut thresholds: Vec<Threshold> =
            def.thresholds.iter().cloned().map(Threshold::new).collect();
        // Stable: declaration order on equal keys
        thresholds.sort_by(|a, b| {
            a.trigger
                .sort_key(def.max_damage)
                .total_cmp(&b.trigger.sort_key(def.max_damage))
        });
        Ok(Self {
            thresholds,
            max_damage: def.max_damage,
        })
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn threshold(&self, index: usize) -> Option<&Threshold> {
        self.thresholds.get(index)
    }

    pub fn max_damage(&self) -> Option<i32> {
        self.max_damage
    }

    /// Indices of thresholds newly crossed by the current damage, ascending
    pub fn evaluate(&mut self, damageable: &Damageable) -> Vec<usize> {
        let max_damage = self.max_damage;
        self.thresholds
            .iter_mut()
            .enumerate()
            .filter_map(|(i, t)| t.evaluate(damageable, max_damage).then_some(i))
            .collect()
    }

    /// Run the behaviors of threshold `index` in declaration order.
    ///
    /// A failing behavior is logged and skipped; the rest still run.
    pub fn execute(
        &self,
        index: usize,
        owner: EntityId,
        bridge: &mut dyn EngineBridge,
        rng: &mut impl Rng,
    ) -> ThresholdFiring {
        let mut firing = ThresholdFiring {
            index,
            executed: 0,
            failed: 0,
            destroys_owner: false,
        };
        let Some(threshold) = self.thresholds.get(index) else {
            return firing;
        };

        for behavior in &threshold.behaviors {
            match behavior.execute(owner, bridge, rng) {
                Ok(()) => {
                    firing.executed += 1;
                    firing.destroys_owner |= behavior.destroys_owner();
                }
                Err(e) => {
                    firing.failed += 1;
                    tracing::warn!(
                        "Entity {} threshold {} behavior {} failed: {}",
                        owner,
                        index,
                        behavior.name(),
                        e
                    );
                }
            }
        }
        firing
    }

    /// Evaluate and fire every newly crossed threshold
    pub fn update(
        &mut self,
        owner: EntityId,
        damageable: &Damageable,
        bridge: &mut dyn EngineBridge,
        rng: &mut impl Rng,
    ) -> Vec<ThresholdFiring> {
        let crossed = self.evaluate(damageable);
        crossed
            .into_iter()
            .map(|index| self.execute(index, owner, bridge, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::{DamageClass, DamageTypeId};
    use crate::destructible::{ActKind, MinMax};
    use crate::engine::{EngineError, EngineRequest, RecordingBridge};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    fn damageable() -> Damageable {
        Damageable::new(
            ["Blunt", "Heat"].into_iter().map(DamageTypeId::from),
            &[],
            None,
        )
    }

    fn def(damage: i32, behaviors: Vec<ThresholdBehavior>, trigger_once: bool) -> ThresholdDef {
        ThresholdDef {
            trigger: ThresholdTrigger::Damage { damage },
            behaviors,
            trigger_once,
        }
    }

    fn sound(name: &str) -> ThresholdBehavior {
        ThresholdBehavior::PlaySound {
            sound: name.to_string(),
        }
    }

    #[test]
    fn test_jump_fires_each_threshold_once_in_order() {
        let mut destructible = Destructible::from_def(&DestructibleDef {
            max_damage: None,
            thresholds: vec![
                def(100, vec![sound("b")], true),
                def(50, vec![sound("a")], true),
            ],
        })
        .unwrap();
        let owner = EntityId::new();
        let mut bridge = RecordingBridge::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut d = damageable();

        d.change_damage(&DamageClass::damage_type("Blunt"), 500, true).unwrap();
        let firings = destructible.update(owner, &d, &mut bridge, &mut rng);
        assert_eq!(firings.len(), 2);

        let sounds: Vec<_> = bridge
            .requests()
            .iter()
            .map(|r| match r {
                EngineRequest::PlaySound { sound, .. } => sound.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(sounds, vec!["a", "b"]);

        d.change_damage(&DamageClass::damage_type("Blunt"), 10, true).unwrap();
        assert!(destructible.update(owner, &d, &mut bridge, &mut rng).is_empty());
    }

    #[test]
    fn test_repeatable_threshold_rearms() {
        let mut destructible = Destructible::from_def(&DestructibleDef {
            max_damage: None,
            thresholds: vec![def(20, vec![sound("creak")], false)],
        })
        .unwrap();
        let mut d = damageable();
        let blunt = DamageClass::damage_type("Blunt");

        d.change_damage(&blunt, 25, true).unwrap();
        assert_eq!(destructible.evaluate(&d), vec![0]);
        assert_eq!(destructible.thresholds()[0].phase(), ThresholdPhase::Triggered);

        d.change_damage(&blunt, -10, true).unwrap();
        assert!(destructible.evaluate(&d).is_empty());
        assert_eq!(destructible.thresholds()[0].phase(), ThresholdPhase::Armed);

        d.change_damage(&blunt, 10, true).unwrap();
        assert_eq!(destructible.evaluate(&d), vec![0]);
    }

    #[test]
    fn test_one_shot_stays_triggered_after_heal() {
        let mut destructible = Destructible::from_def(&DestructibleDef {
            max_damage: None,
            thresholds: vec![def(20, vec![], true)],
        })
        .unwrap();
        let mut d = damageable();
        let blunt = DamageClass::damage_type("Blunt");

        d.change_damage(&blunt, 25, true).unwrap();
        assert_eq!(destructible.evaluate(&d), vec![0]);
        d.heal_all();
        destructible.evaluate(&d);
        d.change_damage(&blunt, 25, true).unwrap();
        assert!(destructible.evaluate(&d).is_empty());
        assert!(destructible.thresholds()[0].has_triggered());
    }

    struct RefusingBridge {
        accepted: Vec<EngineRequest>,
    }

    impl EngineBridge for RefusingBridge {
        fn submit(&mut self, request: EngineRequest) -> Result<(), EngineError> {
            if matches!(request, EngineRequest::SpawnEntities { .. }) {
                return Err(EngineError::Refused("no room".into()));
            }
            self.accepted.push(request);
            Ok(())
        }
    }

    #[test]
    fn test_failed_behavior_does_not_block_siblings() {
        let mut destructible = Destructible::from_def(&DestructibleDef {
            max_damage: None,
            thresholds: vec![def(
                10,
                vec![
                    ThresholdBehavior::SpawnEntities {
                        spawn: BTreeMap::from([("Shard".to_string(), MinMax { min: 1, max: 1 })]),
                    },
                    sound("shatter"),
                    ThresholdBehavior::DoActs {
                        acts: vec![ActKind::Destruction],
                    },
                ],
                true,
            )],
        })
        .unwrap();
        let mut bridge = RefusingBridge { accepted: vec![] };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut d = damageable();
        d.change_damage(&DamageClass::damage_type("Heat"), 10, true).unwrap();

        let firings = destructible.update(EntityId::new(), &d, &mut bridge, &mut rng);
        assert_eq!(
            firings,
            vec![ThresholdFiring {
                index: 0,
                executed: 2,
                failed: 1,
                destroys_owner: true
            }]
        );
        assert_eq!(bridge.accepted.len(), 2);
        assert!(destructible.thresholds()[0].has_triggered());
    }

    #[test]
    fn test_fraction_requires_max_damage() {
        let fraction = ThresholdDef {
            trigger: ThresholdTrigger::Fraction { fraction: 0.5 },
            behaviors: vec![],
            trigger_once: true,
        };
        assert!(Destructible::from_def(&DestructibleDef {
            max_damage: None,
            thresholds: vec![fraction.clone()],
        })
        .is_err());

        let mut destructible = Destructible::from_def(&DestructibleDef {
            max_damage: Some(200),
            thresholds: vec![def(150, vec![], true), fraction],
        })
        .unwrap();
        assert!(matches!(
            destructible.thresholds()[0].trigger(),
            ThresholdTrigger::Fraction { .. }
        ));

        let mut d = damageable();
        d.change_damage(&DamageClass::damage_type("Blunt"), 100, true).unwrap();
        assert_eq!(destructible.evaluate(&d), vec![0]);
    }
}
