use thiserror::Error;

use crate::core::types::EntityId;
use crate::damage::DamageError;
use crate::medical::ScannerError;
use crate::prototypes::PrototypeError;

#[derive(Error, Debug)]
pub enum VitalsError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Entity {entity} has no {capability} capability")]
    MissingCapability { entity: EntityId, capability: String },

    #[error("Prototype error: {0}")]
    Prototype(#[from] PrototypeError),

    #[error("Action {action} is not available on {target}")]
    ActionUnavailable { action: String, target: EntityId },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Damage error: {0}")]
    Damage(#[from] DamageError),

    #[error("Scanner error: {0}")]
    Scanner(#[from] ScannerError),
}

pub type Result<T> = std::result::Result<T, VitalsError>;
