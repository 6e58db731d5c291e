//! Prototype catalogue: damage types, groups, containers, resistance sets
//! and entity prototypes, loaded from TOML and validated once.

pub mod catalog;
pub mod entity;

pub use catalog::PrototypeCatalog;
pub use entity::{DamageableDef, EntityPrototype, MobStateDef, MobStateThresholdDef};

use thiserror::Error;

use crate::damage::{DamageGroupId, DamageTypeId};

/// Fatal load-time errors. A catalogue that produced one is rejected.
#[derive(Error, Debug)]
pub enum PrototypeError {
    #[error("Invalid threshold configuration: {0}")]
    InvalidThresholdConfiguration(String),

    #[error("Damage group {0} has no member types")]
    EmptyDamageGroup(DamageGroupId),

    #[error("Unknown damage type: {0}")]
    UnknownDamageType(DamageTypeId),

    #[error("Unknown damage group: {0}")]
    UnknownDamageGroup(DamageGroupId),

    #[error("Unknown damage container: {0}")]
    UnknownDamageContainer(String),

    #[error("Unknown resistance set: {0}")]
    UnknownResistanceSet(String),

    #[error("Unknown entity prototype: {0}")]
    UnknownEntityPrototype(String),

    #[error("Duplicate {kind} prototype: {id}")]
    Duplicate { kind: &'static str, id: String },

    #[error("Invalid behavior: {0}")]
    InvalidBehavior(String),

    #[error("Invalid {component} on entity {entity}: {reason}")]
    InvalidComponent {
        entity: String,
        component: &'static str,
        reason: String,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
