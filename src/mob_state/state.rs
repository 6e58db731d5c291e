//! Life states of a mob

use serde::{Deserialize, Serialize};

use crate::engine::{AlertType, DamageStateVisual};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MobStateKind {
    Normal,
    Critical,
    Dead,
}

impl MobStateKind {
    /// Critical and dead mobs cannot act
    pub fn is_incapacitated(&self) -> bool {
        matches!(self, MobStateKind::Critical | MobStateKind::Dead)
    }

    pub fn visual(&self) -> DamageStateVisual {
        match self {
            MobStateKind::Normal => DamageStateVisual::Alive,
            MobStateKind::Critical => DamageStateVisual::Critical,
            MobStateKind::Dead => DamageStateVisual::Dead,
        }
    }

    pub fn alert(&self) -> AlertType {
        match self {
            MobStateKind::Normal => AlertType::HumanHealth,
            MobStateKind::Critical => AlertType::HumanCrit,
            MobStateKind::Dead => AlertType::HumanDead,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MobStateKind::Normal => "normal",
            MobStateKind::Critical => "critical",
            MobStateKind::Dead => "dead",
        }
    }
}

impl std::fmt::Display for MobStateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
