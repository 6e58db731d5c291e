//! Derived-damage producers
//!
//! Each producer owns a scalar (thirst, body temperature, oxygen) that it
//! advances every tick. Producers never touch a Damageable directly: they
//! return the damage they want applied and the engine requests their band
//! changes imply, and the world applies both.

pub mod accumulator;
pub mod need;
pub mod respiration;
pub mod temperature;

pub use accumulator::DamageAccumulator;
pub use need::{Need, NeedBand, NeedBandChange, NeedDef, NeedKind};
pub use respiration::{Respiration, RespirationDef};
pub use temperature::{Temperature, TemperatureBand, TemperatureDef};

use thiserror::Error;

use crate::core::types::{EntityId, Seconds};
use crate::damage::DamageTypeId;
use crate::engine::EngineRequest;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProducerError {
    #[error("{producer} scalar became non-finite ({value})")]
    NonFinite { producer: &'static str, value: f32 },
}

/// What a producer can see of its owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerContext {
    pub is_dead: bool,
}

/// A damage change a producer asks the world to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageDelta {
    pub damage_type: DamageTypeId,
    pub amount: i32,
    pub ignore_resistances: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProducerOutput {
    pub damage: Vec<DamageDelta>,
    pub requests: Vec<EngineRequest>,
    pub band_change: Option<NeedBandChange>,
}

impl ProducerOutput {
    pub fn is_empty(&self) -> bool {
        self.damage.is_empty() && self.requests.is_empty() && self.band_change.is_none()
    }
}

pub trait DamageProducer {
    fn name(&self) -> &'static str;

    /// Advance the producer by `elapsed` seconds
    fn update(
        &mut self,
        owner: EntityId,
        elapsed: Seconds,
        ctx: &ProducerContext,
    ) -> Result<ProducerOutput, ProducerError>;
}

pub(crate) fn check_finite(producer: &'static str, value: f32) -> Result<(), ProducerError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProducerError::NonFinite { producer, value })
    }
}
