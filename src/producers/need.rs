//! Thirst and hunger
//!
//! A need is a level that decays over time. The band it sits in sets the
//! decay multiplier, the HUD alert and whether movement is slowed. At the
//! bottom band the owner takes damage every tick until it dies.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::accumulator::DamageAccumulator;
use super::{check_finite, DamageDelta, DamageProducer, ProducerContext, ProducerError, ProducerOutput};
use crate::core::config::SimulationConfig;
use crate::core::thresholds::ThresholdTable;
use crate::core::types::{EntityId, Seconds};
use crate::damage::DamageTypeId;
use crate::engine::{AlertCategory, AlertType, EngineRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedKind {
    Thirst,
    Hunger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedBand {
    Over,
    Okay,
    Low,
    Critical,
    Dead,
}

impl NeedBand {
    /// Decay multiplier while in this band. `None` keeps the previous rate.
    pub fn decay_multiplier(&self) -> Option<f32> {
        match self {
            NeedBand::Over => Some(1.2),
            NeedBand::Okay => Some(1.0),
            NeedBand::Low => Some(0.8),
            NeedBand::Critical => Some(0.6),
            NeedBand::Dead => None,
        }
    }

    pub fn slows_movement(&self) -> bool {
        matches!(self, NeedBand::Critical | NeedBand::Dead)
    }
}

impl NeedKind {
    pub fn name(&self) -> &'static str {
        match self {
            NeedKind::Thirst => "thirst",
            NeedKind::Hunger => "hunger",
        }
    }

    /// Band triggers in ascending order
    pub fn triggers(&self) -> [(f32, NeedBand); 5] {
        match self {
            NeedKind::Thirst => [
                (0.0, NeedBand::Dead),
                (150.0, NeedBand::Critical),
                (300.0, NeedBand::Low),
                (450.0, NeedBand::Okay),
                (600.0, NeedBand::Over),
            ],
            NeedKind::Hunger => [
                (0.0, NeedBand::Dead),
                (100.0, NeedBand::Critical),
                (250.0, NeedBand::Low),
                (450.0, NeedBand::Okay),
                (600.0, NeedBand::Over),
            ],
        }
    }

    pub fn alert(&self, band: NeedBand) -> Option<AlertType> {
        match (self, band) {
            (NeedKind::Thirst, NeedBand::Over) => Some(AlertType::Overhydrated),
            (NeedKind::Thirst, NeedBand::Low) => Some(AlertType::Thirsty),
            (NeedKind::Thirst, NeedBand::Critical) => Some(AlertType::Parched),
            (NeedKind::Hunger, NeedBand::Over) => Some(AlertType::Overfed),
            (NeedKind::Hunger, NeedBand::Low) => Some(AlertType::Peckish),
            (NeedKind::Hunger, NeedBand::Critical) => Some(AlertType::Starving),
            _ => None,
        }
    }

    pub fn alert_category(&self) -> AlertCategory {
        match self {
            NeedKind::Thirst => AlertCategory::Thirst,
            NeedKind::Hunger => AlertCategory::Hunger,
        }
    }

    fn base_decay_rate(&self, config: &SimulationConfig) -> f32 {
        match self {
            NeedKind::Thirst => config.thirst_base_decay_rate,
            NeedKind::Hunger => config.hunger_base_decay_rate,
        }
    }
}

fn default_need_damage_type() -> DamageTypeId {
    DamageTypeId::from("Blunt")
}

/// Prototype data for a need
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NeedDef {
    /// Overrides the configured base decay rate
    #[serde(default)]
    pub base_decay_rate: Option<f32>,
    #[serde(default = "default_need_damage_type")]
    pub damage_type: DamageTypeId,
}

impl Default for NeedDef {
    fn default() -> Self {
        Self {
            base_decay_rate: None,
            damage_type: default_need_damage_type(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeedBandChange {
    pub kind: NeedKind,
    pub from: Option<NeedBand>,
    pub to: NeedBand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Need {
    kind: NeedKind,
    bands: ThresholdTable<f32, NeedBand>,
    level: f32,
    band: NeedBand,
    base_decay_rate: f32,
    actual_decay_rate: f32,
    damage_type: DamageTypeId,
    damage_per_second: f32,
    slowed_modifier: f32,
    accumulator: DamageAccumulator,
}

impl Need {
    /// Create a need with its level sampled between the Low and Okay triggers
    pub fn new(
        kind: NeedKind,
        def: &NeedDef,
        config: &SimulationConfig,
        rng: &mut impl Rng,
    ) -> Result<Self, String> {
        let bands = ThresholdTable::new(kind.triggers().to_vec())?;
        let low = trigger_of(&bands, NeedBand::Low);
        let okay = trigger_of(&bands, NeedBand::Okay);
        let start = rng.gen_range((low as i32 + 10)..(okay as i32 - 1)) as f32;
        Self::with_level(kind, def, config, start, bands)
    }

    /// Create a need at an exact level
    pub fn at_level(
        kind: NeedKind,
        def: &NeedDef,
        config: &SimulationConfig,
        level: f32,
    ) -> Result<Self, String> {
        let bands = ThresholdTable::new(kind.triggers().to_vec())?;
        Self::with_level(kind, def, config, level, bands)
    }

    fn with_level(
        kind: NeedKind,
        def: &NeedDef,
        config: &SimulationConfig,
        level: f32,
        bands: ThresholdTable<f32, NeedBand>,
    ) -> Result<Self, String> {
        let base_decay_rate = def
            .base_decay_rate
            .unwrap_or_else(|| kind.base_decay_rate(config));
        if base_decay_rate < 0.0 || !base_decay_rate.is_finite() {
            return Err(format!(
                "{} base decay rate {} must be a non-negative number",
                kind.name(),
                base_decay_rate
            ));
        }
        let mut need = Self {
            kind,
            bands,
            level,
            band: NeedBand::Okay,
            base_decay_rate,
            actual_decay_rate: base_decay_rate,
            damage_type: def.damage_type.clone(),
            damage_per_second: config.starvation_damage_per_second,
            slowed_modifier: config.critical_need_movement_modifier,
            accumulator: DamageAccumulator::new(),
        };
        need.band = need.band_of(level);
        if let Some(multiplier) = need.band.decay_multiplier() {
            need.actual_decay_rate = base_decay_rate * multiplier;
        }
        Ok(need)
    }

    pub fn kind(&self) -> NeedKind {
        self.kind
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn band(&self) -> NeedBand {
        self.band
    }

    pub fn actual_decay_rate(&self) -> f32 {
        self.actual_decay_rate
    }

    pub fn damage_type(&self) -> &DamageTypeId {
        &self.damage_type
    }

    /// Walk/sprint multiplier this need imposes
    pub fn movement_modifier(&self) -> f32 {
        if self.band.slows_movement() {
            self.slowed_modifier
        } else {
            1.0
        }
    }

    /// Smallest trigger at or above `level`; above the top trigger is the top band
    pub fn band_of(&self, level: f32) -> NeedBand {
        match self.bands.ceiling(level) {
            Some((_, band)) => *band,
            None => *self.bands.last().1,
        }
    }

    pub fn trigger(&self, band: NeedBand) -> f32 {
        trigger_of(&self.bands, band)
    }

    /// Effects of the current band, applied regardless of the last band
    pub fn spawn_effects(&mut self, owner: EntityId) -> Vec<EngineRequest> {
        let band = self.band;
        self.enter_band(owner, band, true)
    }

    /// Raise the level, capped at the top trigger
    pub fn satiate(&mut self, owner: EntityId, amount: f32) -> ProducerOutput {
        let cap = self.bands.last().0;
        self.level = (self.level + amount).min(cap);
        self.refresh_band(owner)
    }

    /// Put the level back to the Okay trigger
    pub fn reset(&mut self, owner: EntityId) -> ProducerOutput {
        self.level = self.trigger(NeedBand::Okay);
        self.accumulator.reset();
        self.refresh_band(owner)
    }

    fn refresh_band(&mut self, owner: EntityId) -> ProducerOutput {
        let mut output = ProducerOutput::default();
        let next = self.band_of(self.level);
        if next != self.band {
            let from = self.band;
            tracing::debug!(
                "Entity {} {} band {:?} -> {:?} at {:.1}",
                owner,
                self.kind.name(),
                from,
                next,
                self.level
            );
            output.requests = self.enter_band(owner, next, false);
            output.band_change = Some(NeedBandChange {
                kind: self.kind,
                from: Some(from),
                to: next,
            });
        }
        output
    }

    fn enter_band(&mut self, owner: EntityId, next: NeedBand, force: bool) -> Vec<EngineRequest> {
        let previous = self.band;
        self.band = next;
        let mut requests = Vec::new();

        if force || previous.slows_movement() != next.slows_movement() {
            let modifier = self.movement_modifier();
            requests.push(EngineRequest::RefreshMovementSpeed {
                entity: owner,
                walk_modifier: modifier,
                sprint_modifier: modifier,
            });
        }

        match self.kind.alert(next) {
            Some(alert) => requests.push(EngineRequest::ShowAlert {
                entity: owner,
                alert,
                severity: None,
            }),
            None => requests.push(EngineRequest::ClearAlertCategory {
                entity: owner,
                category: self.kind.alert_category(),
            }),
        }

        if let Some(multiplier) = next.decay_multiplier() {
            self.actual_decay_rate = self.base_decay_rate * multiplier;
        }
        requests
    }
}

fn trigger_of(bands: &ThresholdTable<f32, NeedBand>, band: NeedBand) -> f32 {
    bands.key_of(|b| *b == band).unwrap_or(0.0)
}

impl DamageProducer for Need {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn update(
        &mut self,
        owner: EntityId,
        elapsed: Seconds,
        ctx: &ProducerContext,
    ) -> Result<ProducerOutput, ProducerError> {
        let level = self.level - elapsed * self.actual_decay_rate;
        check_finite(self.kind.name(), level)?;
        self.level = level.max(0.0);

        let mut output = self.refresh_band(owner);

        if self.band == NeedBand::Dead && !ctx.is_dead {
            let amount = self.accumulator.accumulate(self.damage_per_second * elapsed);
            if amount > 0 {
                output.damage.push(DamageDelta {
                    damage_type: self.damage_type.clone(),
                    amount,
                    ignore_resistances: true,
                });
            }
        }
        Ok(output)
    }
}
