//! Simulation events and the deferred-work queue handed to observers

use crate::core::types::EntityId;
use crate::damage::{DamageChangeData, DamageClass};
use crate::mob_state::MobStateKind;
use crate::producers::{NeedBand, NeedKind};

/// Events generated while applying damage and running producers
///
/// Delivered synchronously to observers and collected in the world's log,
/// which `run_simulation_tick` drains.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// One batch of damage changes on an entity
    DamageChanged {
        entity: EntityId,
        changes: Vec<DamageChangeData>,
        /// Total damage after the batch
        total: i32,
    },
    /// The entity entered a new life state
    StateTransitioned {
        entity: EntityId,
        /// `None` when the initial state is entered at spawn
        from: Option<MobStateKind>,
        to: MobStateKind,
    },
    /// A destructible threshold was crossed and its behaviors ran
    ThresholdCrossed {
        entity: EntityId,
        threshold: usize,
        executed: usize,
        failed: usize,
    },
    NeedBandChanged {
        entity: EntityId,
        kind: NeedKind,
        from: Option<NeedBand>,
        to: NeedBand,
    },
    EntityDestroyed {
        entity: EntityId,
    },
}

impl SimulationEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            SimulationEvent::DamageChanged { entity, .. }
            | SimulationEvent::StateTransitioned { entity, .. }
            | SimulationEvent::ThresholdCrossed { entity, .. }
            | SimulationEvent::NeedBandChanged { entity, .. }
            | SimulationEvent::EntityDestroyed { entity } => *entity,
        }
    }
}

/// A damage change requested by an observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredDamage {
    pub target: EntityId,
    pub class: DamageClass,
    pub amount: i32,
    pub ignore_resistances: bool,
}

/// Work observers schedule for the start of the next tick.
///
/// Observers never see the world, so they cannot change damage while a
/// notification is being delivered.
#[derive(Debug, Default)]
pub struct Deferred {
    damage: Vec<DeferredDamage>,
}

impl Deferred {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn change_damage(
        &mut self,
        target: EntityId,
        class: DamageClass,
        amount: i32,
        ignore_resistances: bool,
    ) {
        self.damage.push(DeferredDamage {
            target,
            class,
            amount,
            ignore_resistances,
        });
    }

    pub fn len(&self) -> usize {
        self.damage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.damage.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<DeferredDamage> {
        std::mem::take(&mut self.damage)
    }
}

/// Callback registered with `World::subscribe`
pub type Observer = Box<dyn FnMut(&SimulationEvent, &mut Deferred)>;
