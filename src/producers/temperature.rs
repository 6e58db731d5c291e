//! Body temperature: HUD alert bands and heat/cold damage

use serde::Deserialize;

use super::{check_finite, DamageDelta, DamageProducer, ProducerContext, ProducerError, ProducerOutput};
use crate::core::thresholds::ThresholdTable;
use crate::core::types::{EntityId, Seconds};
use crate::damage::DamageTypeId;
use crate::engine::{AlertCategory, AlertType, EngineRequest};

/// 20 degrees Celsius in Kelvin
pub const ROOM_TEMPERATURE: f32 = 293.15;

/// Heat capacity used when nothing better is known
pub const MINIMUM_HEAT_CAPACITY: f32 = 0.0003;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    Cold(u8),
    Comfortable,
    Hot(u8),
}

impl TemperatureBand {
    fn request(&self, owner: EntityId) -> EngineRequest {
        match self {
            TemperatureBand::Cold(severity) => EngineRequest::ShowAlert {
                entity: owner,
                alert: AlertType::Cold,
                severity: Some(*severity),
            },
            TemperatureBand::Hot(severity) => EngineRequest::ShowAlert {
                entity: owner,
                alert: AlertType::Hot,
                severity: Some(*severity),
            },
            TemperatureBand::Comfortable => EngineRequest::ClearAlertCategory {
                entity: owner,
                category: AlertCategory::Temperature,
            },
        }
    }
}

fn alert_bands() -> Result<ThresholdTable<f32, TemperatureBand>, String> {
    ThresholdTable::new(vec![
        (260.0, TemperatureBand::Cold(3)),
        (280.0, TemperatureBand::Cold(2)),
        (292.0, TemperatureBand::Cold(1)),
        (327.0, TemperatureBand::Comfortable),
        (335.0, TemperatureBand::Hot(1)),
        (345.0, TemperatureBand::Hot(2)),
    ])
}

fn default_coefficient() -> f32 {
    1.0
}

fn default_temperature() -> f32 {
    ROOM_TEMPERATURE
}

fn default_specific_heat() -> f32 {
    MINIMUM_HEAT_CAPACITY
}

fn default_heat_type() -> DamageTypeId {
    DamageTypeId::from("Heat")
}

fn default_cold_type() -> DamageTypeId {
    DamageTypeId::from("Cold")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemperatureDef {
    pub heat_damage_threshold: f32,
    pub cold_damage_threshold: f32,
    #[serde(default = "default_coefficient")]
    pub damage_coefficient: f32,
    #[serde(default = "default_temperature")]
    pub current_temperature: f32,
    #[serde(default = "default_specific_heat")]
    pub specific_heat: f32,
    /// Without a mass the heat capacity falls back to the minimum
    #[serde(default)]
    pub mass: Option<f32>,
    #[serde(default = "default_heat_type")]
    pub heat_damage_type: DamageTypeId,
    #[serde(default = "default_cold_type")]
    pub cold_damage_type: DamageTypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Temperature {
    current: f32,
    heat_damage_threshold: f32,
    cold_damage_threshold: f32,
    damage_coefficient: f32,
    heat_capacity: f32,
    heat_damage_type: DamageTypeId,
    cold_damage_type: DamageTypeId,
    bands: ThresholdTable<f32, TemperatureBand>,
    band: Option<TemperatureBand>,
    interval: Seconds,
    since_update: Seconds,
}

impl Temperature {
    pub fn new(def: &TemperatureDef, update_interval: Seconds) -> Result<Self, String> {
        if def.cold_damage_threshold >= def.heat_damage_threshold {
            return Err(format!(
                "cold damage threshold {} must be below heat damage threshold {}",
                def.cold_damage_threshold, def.heat_damage_threshold
            ));
        }
        if def.specific_heat <= 0.0 || def.mass.is_some_and(|m| m <= 0.0) {
            return Err("specific heat and mass must be positive".into());
        }
        if update_interval <= 0.0 {
            return Err(format!("update interval {} must be positive", update_interval));
        }
        let heat_capacity = match def.mass {
            Some(mass) => def.specific_heat * mass,
            None => MINIMUM_HEAT_CAPACITY,
        };
        Ok(Self {
            current: def.current_temperature,
            heat_damage_threshold: def.heat_damage_threshold,
            cold_damage_threshold: def.cold_damage_threshold,
            damage_coefficient: def.damage_coefficient,
            heat_capacity,
            heat_damage_type: def.heat_damage_type.clone(),
            cold_damage_type: def.cold_damage_type.clone(),
            bands: alert_bands()?,
            band: None,
            interval: update_interval,
            since_update: 0.0,
        })
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn heat_capacity(&self) -> f32 {
        self.heat_capacity
    }

    pub fn band_of(&self, temperature: f32) -> TemperatureBand {
        match self.bands.ceiling(temperature) {
            Some((_, band)) => *band,
            None => TemperatureBand::Hot(3),
        }
    }

    pub fn receive_heat(&mut self, heat: f32) {
        self.current += heat / self.heat_capacity;
    }

    pub fn remove_heat(&mut self, heat: f32) {
        self.current -= heat / self.heat_capacity;
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.current = temperature;
    }

    /// One alert/damage pass at the current temperature
    fn pass(&mut self, owner: EntityId, output: &mut ProducerOutput) {
        let band = self.band_of(self.current);
        if self.band != Some(band) {
            self.band = Some(band);
            output.requests.push(band.request(owner));
        }

        let (damage_type, amount) = if self.current >= self.heat_damage_threshold {
            (
                &self.heat_damage_type,
                ((self.current - self.heat_damage_threshold) * self.damage_coefficient).floor(),
            )
        } else if self.current <= self.cold_damage_threshold {
            (
                &self.cold_damage_type,
                ((self.cold_damage_threshold - self.current) * self.damage_coefficient).floor(),
            )
        } else {
            return;
        };

        if amount >= 1.0 {
            output.damage.push(DamageDelta {
                damage_type: damage_type.clone(),
                amount: amount.min(i32::MAX as f32) as i32,
                ignore_resistances: false,
            });
        }
    }
}

impl DamageProducer for Temperature {
    fn name(&self) -> &'static str {
        "temperature"
    }

    fn update(
        &mut self,
        owner: EntityId,
        elapsed: Seconds,
        _ctx: &ProducerContext,
    ) -> Result<ProducerOutput, ProducerError> {
        check_finite("temperature", self.current)?;

        let mut output = ProducerOutput::default();
        self.since_update += elapsed;
        while self.since_update >= self.interval {
            self.since_update -= self.interval;
            self.pass(owner, &mut output);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def() -> TemperatureDef {
        TemperatureDef {
            heat_damage_threshold: 360.0,
            cold_damage_threshold: 260.0,
            damage_coefficient: 0.5,
            current_temperature: 310.0,
            specific_heat: 42.0,
            mass: Some(70.0),
            heat_damage_type: "Heat".into(),
            cold_damage_type: "Cold".into(),
        }
    }

    #[test]
    fn test_alert_bands() {
        let temp = Temperature::new(&def(), 1.0).unwrap();
        assert_eq!(temp.band_of(250.0), TemperatureBand::Cold(3));
        assert_eq!(temp.band_of(260.0), TemperatureBand::Cold(3));
        assert_eq!(temp.band_of(270.0), TemperatureBand::Cold(2));
        assert_eq!(temp.band_of(290.0), TemperatureBand::Cold(1));
        assert_eq!(temp.band_of(310.0), TemperatureBand::Comfortable);
        assert_eq!(temp.band_of(330.0), TemperatureBand::Hot(1));
        assert_eq!(temp.band_of(345.0), TemperatureBand::Hot(2));
        assert_eq!(temp.band_of(346.0), TemperatureBand::Hot(3));
    }

    #[test]
    fn test_heat_damage_on_interval() {
        let owner = EntityId::new();
        let ctx = ProducerContext::default();
        let mut temp = Temperature::new(&def(), 1.0).unwrap();
        temp.set_temperature(371.0);

        assert!(temp.update(owner, 0.5, &ctx).unwrap().is_empty());

        let output = temp.update(owner, 0.5, &ctx).unwrap();
        assert_eq!(
            output.damage,
            vec![DamageDelta {
                damage_type: "Heat".into(),
                amount: 5,
                ignore_resistances: false
            }]
        );
        assert!(output.requests.contains(&EngineRequest::ShowAlert {
            entity: owner,
            alert: AlertType::Hot,
            severity: Some(3)
        }));

        // Same band: damage again, alert not repeated
        let output = temp.update(owner, 1.0, &ctx).unwrap();
        assert_eq!(output.damage.len(), 1);
        assert!(output.requests.is_empty());
    }

    #[test]
    fn test_cold_damage() {
        let mut temp = Temperature::new(&def(), 1.0).unwrap();
        temp.set_temperature(250.0);
        let output = temp
            .update(EntityId::new(), 1.0, &ProducerContext::default())
            .unwrap();
        assert_eq!(output.damage[0].damage_type, DamageTypeId::from("Cold"));
        assert_eq!(output.damage[0].amount, 5);
    }

    #[test]
    fn test_comfortable_clears_alert_without_damage() {
        let owner = EntityId::new();
        let mut temp = Temperature::new(&def(), 1.0).unwrap();
        let output = temp.update(owner, 1.0, &ProducerContext::default()).unwrap();
        assert!(output.damage.is_empty());
        assert_eq!(
            output.requests,
            vec![EngineRequest::ClearAlertCategory {
                entity: owner,
                category: AlertCategory::Temperature
            }]
        );
    }

    #[test]
    fn test_heat_exchange_uses_capacity() {
        let mut temp = Temperature::new(&def(), 1.0).unwrap();
        let capacity = temp.heat_capacity();
        assert_eq!(capacity, 42.0 * 70.0);
        temp.receive_heat(capacity * 10.0);
        assert!((temp.current() - 320.0).abs() < 1e-3);
        temp.remove_heat(capacity * 20.0);
        assert!((temp.current() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut bad = def();
        bad.cold_damage_threshold = 400.0;
        assert!(Temperature::new(&bad, 1.0).is_err());
    }
}
