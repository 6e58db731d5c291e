//! Alert identifiers shown on the player's HUD

use serde::{Deserialize, Serialize};

/// Alerts are grouped so that a whole category can be cleared at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertCategory {
    Health,
    Thirst,
    Hunger,
    Temperature,
    Breathing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    HumanHealth,
    HumanCrit,
    HumanDead,
    Overhydrated,
    Thirsty,
    Parched,
    Overfed,
    Peckish,
    Starving,
    Cold,
    Hot,
    LowOxygen,
}

impl AlertType {
    pub fn category(&self) -> AlertCategory {
        match self {
            AlertType::HumanHealth | AlertType::HumanCrit | AlertType::HumanDead => {
                AlertCategory::Health
            }
            AlertType::Overhydrated | AlertType::Thirsty | AlertType::Parched => {
                AlertCategory::Thirst
            }
            AlertType::Overfed | AlertType::Peckish | AlertType::Starving => AlertCategory::Hunger,
            AlertType::Cold | AlertType::Hot => AlertCategory::Temperature,
            AlertType::LowOxygen => AlertCategory::Breathing,
        }
    }
}
