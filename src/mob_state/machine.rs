//! Damage-driven life-state machine.
//!
//! The state in effect is the threshold entry with the largest key at or
//! below the owner's total damage. Transitions may skip states when damage
//! jumps; only the final state is entered, and only once.

use super::state::MobStateKind;
use crate::core::thresholds::ThresholdTable;
use crate::core::types::EntityId;
use crate::engine::{AppearanceVisual, EngineRequest};

/// A change of life state. `from` is `None` for the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobStateTransition {
    pub from: Option<MobStateKind>,
    pub to: MobStateKind,
}

/// Result of recomputing the state for a new damage total
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MobStateUpdate {
    pub transition: Option<MobStateTransition>,
    pub requests: Vec<EngineRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MobState {
    thresholds: ThresholdTable<i32, MobStateKind>,
    current: Option<(i32, MobStateKind)>,
    health_alert_levels: u8,
    last_health_severity: Option<u8>,
}

impl MobState {
    /// Create a machine from a validated table. The table must start at 0.
    pub fn new(
        thresholds: ThresholdTable<i32, MobStateKind>,
        health_alert_levels: u8,
    ) -> Result<Self, String> {
        let (first, _) = thresholds.first();
        if first != 0 {
            return Err(format!(
                "mob state thresholds must start at 0 damage, found {}",
                first
            ));
        }
        Ok(Self {
            thresholds,
            current: None,
            health_alert_levels: health_alert_levels.max(1),
            last_health_severity: None,
        })
    }

    /// Build from `(damage, state)` pairs in ascending order
    pub fn from_entries(
        entries: Vec<(i32, MobStateKind)>,
        health_alert_levels: u8,
    ) -> Result<Self, String> {
        let table = ThresholdTable::new(entries)?;
        Self::new(table, health_alert_levels)
    }

    pub fn current_state(&self) -> Option<MobStateKind> {
        self.current.map(|(_, state)| state)
    }

    pub fn thresholds(&self) -> &ThresholdTable<i32, MobStateKind> {
        &self.thresholds
    }

    pub fn is_alive(&self) -> bool {
        self.current_state()
            .is_some_and(|state| !state.is_incapacitated())
    }

    pub fn is_critical(&self) -> bool {
        self.current_state() == Some(MobStateKind::Critical)
    }

    pub fn is_dead(&self) -> bool {
        self.current_state() == Some(MobStateKind::Dead)
    }

    pub fn is_incapacitated(&self) -> bool {
        self.current_state()
            .is_some_and(|state| state.is_incapacitated())
    }

    /// Damage at which the owner would enter `state`
    pub fn threshold_for(&self, state: MobStateKind) -> Option<i32> {
        self.thresholds.key_of(|s| *s == state)
    }

    /// Recompute the state for `total_damage`.
    ///
    /// Emits the enter effects of the new state when the state kind
    /// changes, and refreshes the health alert while in the Normal state.
    pub fn update(&mut self, owner: EntityId, total_damage: i32) -> MobStateUpdate {
        let Some((key, &next)) = self.thresholds.floor(total_damage.max(0)) else {
            return MobStateUpdate::default();
        };

        let previous = self.current_state();
        self.current = Some((key, next));

        let mut update = MobStateUpdate::default();

        if previous != Some(next) {
            tracing::info!(
                "Entity {} mob state {} -> {} at {} damage",
                owner,
                previous.map(|s| s.name()).unwrap_or("none"),
                next,
                total_damage
            );
            update.transition = Some(MobStateTransition {
                from: previous,
                to: next,
            });
            self.last_health_severity = None;
            update.requests.extend(enter_effects(owner, next));
        }

        if next == MobStateKind::Normal {
            let severity = self.health_severity(key, total_damage);
            if self.last_health_severity != Some(severity) {
                self.last_health_severity = Some(severity);
                update.requests.push(EngineRequest::ShowAlert {
                    entity: owner,
                    alert: next.alert(),
                    severity: Some(severity),
                });
            }
        }

        update
    }

    /// Severity of the health alert while in the Normal state
    fn health_severity(&self, key: i32, total_damage: i32) -> u8 {
        let levels = self.health_alert_levels as i64;
        let Some(next_key) = self.thresholds.next_key_above(key) else {
            return 0;
        };
        if next_key <= 0 {
            return 0;
        }
        let severity = (total_damage.max(0) as i64 * levels) / next_key as i64;
        severity.min(levels - 1) as u8
    }
}

fn enter_effects(owner: EntityId, state: MobStateKind) -> Vec<EngineRequest> {
    let mut requests = vec![
        EngineRequest::SetAppearance {
            entity: owner,
            visual: AppearanceVisual::DamageState(state.visual()),
        },
        EngineRequest::SetMovementLocked {
            entity: owner,
            locked: state.is_incapacitated(),
        },
    ];
    if state != MobStateKind::Normal {
        requests.push(EngineRequest::ShowAlert {
            entity: owner,
            alert: state.alert(),
            severity: None,
        });
    }
    requests
}
