//! Station Vitals - damage, life state and destruction for simulated entities

pub mod command;
pub mod core;
pub mod damage;
pub mod destructible;
pub mod ecs;
pub mod engine;
pub mod medical;
pub mod mob_state;
pub mod producers;
pub mod prototypes;
pub mod simulation;
