//! Oxygen saturation and suffocation damage

use serde::Deserialize;

use super::accumulator::DamageAccumulator;
use super::{check_finite, DamageDelta, DamageProducer, ProducerContext, ProducerError, ProducerOutput};
use crate::core::types::{EntityId, Seconds};
use crate::damage::DamageTypeId;
use crate::engine::{AlertCategory, AlertType, EngineRequest};

fn default_max_saturation() -> f32 {
    100.0
}

fn default_suffocation_threshold() -> f32 {
    40.0
}

fn default_recovery_rate() -> f32 {
    5.0
}

fn default_depletion_rate() -> f32 {
    1.0
}

fn default_damage_per_second() -> f32 {
    1.0
}

fn default_asphyxiation() -> DamageTypeId {
    DamageTypeId::from("Asphyxiation")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RespirationDef {
    #[serde(default = "default_max_saturation")]
    pub max_saturation: f32,
    #[serde(default = "default_suffocation_threshold")]
    pub suffocation_threshold: f32,
    /// Saturation regained per second while breathing
    #[serde(default = "default_recovery_rate")]
    pub recovery_rate: f32,
    /// Saturation lost per second while not breathing
    #[serde(default = "default_depletion_rate")]
    pub depletion_rate: f32,
    #[serde(default = "default_damage_per_second")]
    pub damage_per_second: f32,
    #[serde(default = "default_asphyxiation")]
    pub damage_type: DamageTypeId,
}

impl Default for RespirationDef {
    fn default() -> Self {
        Self {
            max_saturation: default_max_saturation(),
            suffocation_threshold: default_suffocation_threshold(),
            recovery_rate: default_recovery_rate(),
            depletion_rate: default_depletion_rate(),
            damage_per_second: default_damage_per_second(),
            damage_type: default_asphyxiation(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Respiration {
    def: RespirationDef,
    saturation: f32,
    breathing: bool,
    suffocating: bool,
    accumulator: DamageAccumulator,
}

impl Respiration {
    pub fn new(def: &RespirationDef) -> Result<Self, String> {
        if def.max_saturation <= 0.0 {
            return Err("max_saturation must be positive".into());
        }
        if !(0.0..=def.max_saturation).contains(&def.suffocation_threshold) {
            return Err(format!(
                "suffocation_threshold {} must be within 0..={}",
                def.suffocation_threshold, def.max_saturation
            ));
        }
        Ok(Self {
            def: def.clone(),
            saturation: def.max_saturation,
            breathing: true,
            suffocating: false,
            accumulator: DamageAccumulator::new(),
        })
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn is_breathing(&self) -> bool {
        self.breathing
    }

    pub fn is_suffocating(&self) -> bool {
        self.suffocating
    }

    /// Whether the owner currently has air to breathe
    pub fn set_breathing(&mut self, breathing: bool) {
        self.breathing = breathing;
    }

    /// Full saturation, alert cleared
    pub fn restore(&mut self, owner: EntityId) -> ProducerOutput {
        self.saturation = self.def.max_saturation;
        self.breathing = true;
        self.accumulator.reset();
        let mut output = ProducerOutput::default();
        if self.suffocating {
            self.suffocating = false;
            output.requests.push(EngineRequest::ClearAlertCategory {
                entity: owner,
                category: AlertCategory::Breathing,
            });
        }
        output
    }
}

impl DamageProducer for Respiration {
    fn name(&self) -> &'static str {
        "respiration"
    }

    fn update(
        &mut self,
        owner: EntityId,
        elapsed: Seconds,
        ctx: &ProducerContext,
    ) -> Result<ProducerOutput, ProducerError> {
        let rate = if self.breathing {
            self.def.recovery_rate
        } else {
            -self.def.depletion_rate
        };
        let saturation = self.saturation + rate * elapsed;
        check_finite("respiration", saturation)?;
        self.saturation = saturation.clamp(0.0, self.def.max_saturation);

        let mut output = ProducerOutput::default();
        let suffocating = self.saturation < self.def.suffocation_threshold;
        if suffocating != self.suffocating {
            self.suffocating = suffocating;
            output.requests.push(if suffocating {
                EngineRequest::ShowAlert {
                    entity: owner,
                    alert: AlertType::LowOxygen,
                    severity: None,
                }
            } else {
                EngineRequest::ClearAlertCategory {
                    entity: owner,
                    category: AlertCategory::Breathing,
                }
            });
        }

        if self.suffocating && !ctx.is_dead {
            let amount = self
                .accumulator
                .accumulate(self.def.damage_per_second * elapsed);
            if amount > 0 {
                output.damage.push(DamageDelta {
                    damage_type: self.def.damage_type.clone(),
                    amount,
                    ignore_resistances: true,
                });
            }
        }
        Ok(output)
    }
}
