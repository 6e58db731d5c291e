//! Entity prototypes: which capabilities an entity spawns with

use serde::Deserialize;

use crate::destructible::DestructibleDef;
use crate::medical::MedicalScannerDef;
use crate::mob_state::MobStateKind;
use crate::producers::{NeedDef, RespirationDef, TemperatureDef};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DamageableDef {
    /// Damage container naming the supported types
    pub container: String,
    #[serde(default)]
    pub resistance_set: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MobStateThresholdDef {
    pub damage: i32,
    pub state: MobStateKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MobStateDef {
    pub thresholds: Vec<MobStateThresholdDef>,
}

impl MobStateDef {
    pub fn entries(&self) -> Vec<(i32, MobStateKind)> {
        self.thresholds.iter().map(|t| (t.damage, t.state)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityPrototype {
    pub id: String,
    /// Default display name of spawned entities
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub damageable: Option<DamageableDef>,
    #[serde(default)]
    pub mob_state: Option<MobStateDef>,
    #[serde(default)]
    pub destructible: Option<DestructibleDef>,
    #[serde(default)]
    pub thirst: Option<NeedDef>,
    #[serde(default)]
    pub hunger: Option<NeedDef>,
    #[serde(default)]
    pub temperature: Option<TemperatureDef>,
    #[serde(default)]
    pub respiration: Option<RespirationDef>,
    #[serde(default)]
    pub medical_scanner: Option<MedicalScannerDef>,
}

impl EntityPrototype {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
