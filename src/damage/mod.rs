//! Typed damage: prototypes, resistances and the per-entity damageable.

pub mod damageable;
pub mod prototypes;
pub mod resistance;

pub use damageable::{DamageChangeData, DamageError, Damageable};
pub use prototypes::{
    DamageClass, DamageContainerPrototype, DamageGroupId, DamageGroupPrototype, DamageTypeId,
    DamageTypePrototype, ResistanceSetPrototype,
};
pub use resistance::ResistanceSet;
