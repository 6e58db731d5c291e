//! Mob life states: normal, critical, dead.

pub mod machine;
pub mod state;

pub use machine::{MobState, MobStateTransition, MobStateUpdate};
pub use state::MobStateKind;
