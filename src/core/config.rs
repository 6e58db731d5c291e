//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use serde::{Deserialize, Serialize};

/// Configuration for the simulation systems
///
/// Passed explicitly into [`crate::ecs::World::new`]. Can be loaded from TOML;
/// any field left out keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === TICK DRIVER ===
    /// Simulated seconds advanced by one `tick` of the REPL driver
    pub tick_seconds: f32,

    // === NEEDS ===
    /// Thirst points lost per second in the Okay band
    ///
    /// Band multipliers scale this: 1.2 overhydrated, 0.8 thirsty, 0.6 parched.
    /// At 0.1 a freshly spawned mob (about 400 thirst) goes dry after
    /// roughly an hour of simulated time.
    pub thirst_base_decay_rate: f32,

    /// Hunger points lost per second in the Okay band
    pub hunger_base_decay_rate: f32,

    /// Damage per second applied while a need sits in its Dead band
    ///
    /// Integer damage is flushed through an accumulator, so 2.0 at 0.3 s
    /// ticks applies exactly 6 damage over 10 ticks.
    pub starvation_damage_per_second: f32,

    /// Walk and sprint multiplier applied while a need is in its Critical band
    pub critical_need_movement_modifier: f32,

    // === TEMPERATURE ===
    /// Seconds of accumulated time between temperature damage/alert passes
    pub temperature_update_interval: f32,

    /// Temperature restored by rejuvenation (Kelvin)
    pub normal_body_temperature: f32,

    // === MOB STATE ===
    /// Number of severity steps of the health alert shown in the Normal state
    ///
    /// Severity runs from 0 to `health_alert_levels - 1` as total damage
    /// approaches the next threshold.
    pub health_alert_levels: u8,

    // === RANDOMNESS ===
    /// Seed for spawn-count sampling and initial need levels
    pub rng_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 0.5,

            thirst_base_decay_rate: 0.1,
            hunger_base_decay_rate: 0.1,
            starvation_damage_per_second: 2.0,
            critical_need_movement_modifier: 0.75,

            temperature_update_interval: 1.0,
            normal_body_temperature: 310.15,

            health_alert_levels: 7,

            rng_seed: 0x5EED_CAFE,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(content).map_err(|e| format!("Invalid config TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_seconds <= 0.0 || !self.tick_seconds.is_finite() {
            return Err(format!("tick_seconds ({}) must be positive", self.tick_seconds));
        }

        if self.thirst_base_decay_rate < 0.0 || self.hunger_base_decay_rate < 0.0 {
            return Err("Need decay rates must not be negative".into());
        }

        if self.starvation_damage_per_second < 0.0 {
            return Err(format!(
                "starvation_damage_per_second ({}) must not be negative",
                self.starvation_damage_per_second
            ));
        }

        if !(0.0..=1.0).contains(&self.critical_need_movement_modifier) {
            return Err(format!(
                "critical_need_movement_modifier ({}) should be within 0.0..=1.0",
                self.critical_need_movement_modifier
            ));
        }

        if self.temperature_update_interval <= 0.0 {
            return Err(format!(
                "temperature_update_interval ({}) must be positive",
                self.temperature_update_interval
            ));
        }

        if self.health_alert_levels == 0 {
            return Err("health_alert_levels must be at least 1".into());
        }

        Ok(())
    }
}
