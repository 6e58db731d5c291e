//! Entities and their capability sets

use rand::Rng;
use std::fmt;

use crate::core::config::SimulationConfig;
use crate::core::types::EntityId;
use crate::damage::Damageable;
use crate::destructible::Destructible;
use crate::medical::MedicalScanner;
use crate::mob_state::MobState;
use crate::producers::{DamageProducer, Need, NeedKind, Respiration, Temperature};
use crate::prototypes::{EntityPrototype, PrototypeCatalog, PrototypeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Damageable,
    MobState,
    Destructible,
    Thirst,
    Hunger,
    Temperature,
    Respiration,
    MedicalScanner,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Damageable => "damageable",
            Capability::MobState => "mob_state",
            Capability::Destructible => "destructible",
            Capability::Thirst => "thirst",
            Capability::Hunger => "hunger",
            Capability::Temperature => "temperature",
            Capability::Respiration => "respiration",
            Capability::MedicalScanner => "medical_scanner",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Components an entity was spawned with. Resolved once from the prototype.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub damageable: Option<Damageable>,
    pub mob_state: Option<MobState>,
    pub destructible: Option<Destructible>,
    pub thirst: Option<Need>,
    pub hunger: Option<Need>,
    pub temperature: Option<Temperature>,
    pub respiration: Option<Respiration>,
    pub medical_scanner: Option<MedicalScanner>,
}

impl Capabilities {
    pub fn from_prototype(
        proto: &EntityPrototype,
        catalog: &PrototypeCatalog,
        config: &SimulationConfig,
        rng: &mut impl Rng,
    ) -> Result<Self, PrototypeError> {
        let invalid = |component: &'static str, reason: String| PrototypeError::InvalidComponent {
            entity: proto.id.clone(),
            component,
            reason,
        };

        let damageable = match &proto.damageable {
            Some(def) => Some(catalog.build_damageable(&def.container, def.resistance_set.as_deref())?),
            None => None,
        };

        let mob_state = match &proto.mob_state {
            Some(def) => Some(
                MobState::from_entries(def.entries(), config.health_alert_levels)
                    .map_err(PrototypeError::InvalidThresholdConfiguration)?,
            ),
            None => None,
        };

        let destructible = match &proto.destructible {
            Some(def) => Some(
                Destructible::from_def(def).map_err(PrototypeError::InvalidThresholdConfiguration)?,
            ),
            None => None,
        };

        let thirst = match &proto.thirst {
            Some(def) => Some(
                Need::new(NeedKind::Thirst, def, config, rng).map_err(|e| invalid("thirst", e))?,
            ),
            None => None,
        };

        let hunger = match &proto.hunger {
            Some(def) => Some(
                Need::new(NeedKind::Hunger, def, config, rng).map_err(|e| invalid("hunger", e))?,
            ),
            None => None,
        };

        let temperature = match &proto.temperature {
            Some(def) => Some(
                Temperature::new(def, config.temperature_update_interval)
                    .map_err(|e| invalid("temperature", e))?,
            ),
            None => None,
        };

        let respiration = match &proto.respiration {
            Some(def) => Some(Respiration::new(def).map_err(|e| invalid("respiration", e))?),
            None => None,
        };

        Ok(Self {
            damageable,
            mob_state,
            destructible,
            thirst,
            hunger,
            temperature,
            respiration,
            medical_scanner: proto.medical_scanner.as_ref().map(MedicalScanner::new),
        })
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Damageable => self.damageable.is_some(),
            Capability::MobState => self.mob_state.is_some(),
            Capability::Destructible => self.destructible.is_some(),
            Capability::Thirst => self.thirst.is_some(),
            Capability::Hunger => self.hunger.is_some(),
            Capability::Temperature => self.temperature.is_some(),
            Capability::Respiration => self.respiration.is_some(),
            Capability::MedicalScanner => self.medical_scanner.is_some(),
        }
    }

    pub fn list(&self) -> Vec<Capability> {
        [
            Capability::Damageable,
            Capability::MobState,
            Capability::Destructible,
            Capability::Thirst,
            Capability::Hunger,
            Capability::Temperature,
            Capability::Respiration,
            Capability::MedicalScanner,
        ]
        .into_iter()
        .filter(|c| self.has(*c))
        .collect()
    }

    pub fn need_mut(&mut self, kind: NeedKind) -> Option<&mut Need> {
        match kind {
            NeedKind::Thirst => self.thirst.as_mut(),
            NeedKind::Hunger => self.hunger.as_mut(),
        }
    }

    /// Every derived-damage producer the entity carries
    pub fn producers_mut(&mut self) -> Vec<&mut dyn DamageProducer> {
        let mut producers: Vec<&mut dyn DamageProducer> = Vec::new();
        if let Some(need) = self.thirst.as_mut() {
            producers.push(need);
        }
        if let Some(need) = self.hunger.as_mut() {
            producers.push(need);
        }
        if let Some(temperature) = self.temperature.as_mut() {
            producers.push(temperature);
        }
        if let Some(respiration) = self.respiration.as_mut() {
            producers.push(respiration);
        }
        producers
    }

    /// Whether the entity may use interactions: no mob state, or not incapacitated
    pub fn can_act(&self) -> bool {
        !self
            .mob_state
            .as_ref()
            .is_some_and(|m| m.is_incapacitated())
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub prototype: String,
    pub capabilities: Capabilities,
}

impl Entity {
    pub fn is_dead(&self) -> bool {
        self.capabilities
            .mob_state
            .as_ref()
            .is_some_and(|m| m.is_dead())
    }
}
