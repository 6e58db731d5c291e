//! Effects run when a threshold is crossed

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::types::EntityId;
use crate::engine::{EngineBridge, EngineError, EngineRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActKind {
    Breakage,
    Destruction,
}

/// Inclusive count range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MinMax {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThresholdBehavior {
    /// Spawn a uniformly sampled number of each kind at the owner
    SpawnEntities { spawn: BTreeMap<String, MinMax> },
    PlaySound { sound: String },
    DoActs { acts: Vec<ActKind> },
    Gib {
        #[serde(default)]
        recursive: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BehaviorError {
    #[error("spawn range for {kind} is inverted ({min} > {max})")]
    InvalidRange { kind: String, min: u32, max: u32 },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ThresholdBehavior {
    pub fn name(&self) -> &'static str {
        match self {
            ThresholdBehavior::SpawnEntities { .. } => "spawn_entities",
            ThresholdBehavior::PlaySound { .. } => "play_sound",
            ThresholdBehavior::DoActs { .. } => "do_acts",
            ThresholdBehavior::Gib { .. } => "gib",
        }
    }

    /// Whether running this behavior removes the owner from the world
    pub fn destroys_owner(&self) -> bool {
        match self {
            ThresholdBehavior::DoActs { acts } => acts.contains(&ActKind::Destruction),
            ThresholdBehavior::Gib { .. } => true,
            _ => false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let ThresholdBehavior::SpawnEntities { spawn } = self {
            for (kind, range) in spawn {
                if range.min > range.max {
                    return Err(format!(
                        "spawn range for {} is inverted ({} > {})",
                        kind, range.min, range.max
                    ));
                }
            }
        }
        Ok(())
    }

    /// Send this behavior's requests for `owner` to the engine
    pub fn execute(
        &self,
        owner: EntityId,
        bridge: &mut dyn EngineBridge,
        rng: &mut impl Rng,
    ) -> Result<(), BehaviorError> {
        match self {
            ThresholdBehavior::SpawnEntities { spawn } => {
                for (kind, range) in spawn {
                    if range.min > range.max {
                        return Err(BehaviorError::InvalidRange {
                            kind: kind.clone(),
                            min: range.min,
                            max: range.max,
                        });
                    }
                    let count = rng.gen_range(range.min..=range.max);
                    if count == 0 {
                        continue;
                    }
                    bridge.submit(EngineRequest::SpawnEntities {
                        at: owner,
                        kind: kind.clone(),
                        count,
                    })?;
                }
            }
            ThresholdBehavior::PlaySound { sound } => {
                bridge.submit(EngineRequest::PlaySound {
                    entity: owner,
                    sound: sound.clone(),
                })?;
            }
            ThresholdBehavior::DoActs { acts } => {
                for act in acts {
                    bridge.submit(EngineRequest::Act {
                        entity: owner,
                        act: *act,
                    })?;
                }
            }
            ThresholdBehavior::Gib { recursive } => {
                bridge.submit(EngineRequest::Gib {
                    entity: owner,
                    recursive: *recursive,
                })?;
            }
        }
        Ok(())
    }
}
