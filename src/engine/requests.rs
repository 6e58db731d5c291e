//! Requests sent out to the host engine.
//!
//! The core never renders, spawns or moves anything itself. It describes
//! what should happen as an `EngineRequest` and hands it to the bridge.

use serde::Serialize;

use super::alerts::{AlertCategory, AlertType};
use crate::core::types::EntityId;
use crate::destructible::ActKind;
use crate::medical::{MedicalScannerStatus, ScannerUiState};

/// Life-state sprite set of a mob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DamageStateVisual {
    Alive,
    Critical,
    Dead,
}

/// Appearance data keyed by visual layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppearanceVisual {
    DamageState(DamageStateVisual),
    ScannerStatus(MedicalScannerStatus),
}

/// State objects pushed to an open UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UiState {
    MedicalScanner(ScannerUiState),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EngineRequest {
    SetAppearance {
        entity: EntityId,
        visual: AppearanceVisual,
    },
    ShowAlert {
        entity: EntityId,
        alert: AlertType,
        severity: Option<u8>,
    },
    ClearAlertCategory {
        entity: EntityId,
        category: AlertCategory,
    },
    SpawnEntities {
        /// Spawned at this entity's location
        at: EntityId,
        kind: String,
        count: u32,
    },
    PlaySound {
        entity: EntityId,
        sound: String,
    },
    Act {
        entity: EntityId,
        act: ActKind,
    },
    Gib {
        entity: EntityId,
        recursive: bool,
    },
    DeleteEntity {
        entity: EntityId,
    },
    SetMovementLocked {
        entity: EntityId,
        locked: bool,
    },
    RefreshMovementSpeed {
        entity: EntityId,
        walk_modifier: f32,
        sprint_modifier: f32,
    },
    PushUiState {
        entity: EntityId,
        state: UiState,
    },
}

impl EngineRequest {
    /// Entity the request is addressed to
    pub fn entity(&self) -> EntityId {
        match self {
            EngineRequest::SetAppearance { entity, .. }
            | EngineRequest::ShowAlert { entity, .. }
            | EngineRequest::ClearAlertCategory { entity, .. }
            | EngineRequest::PlaySound { entity, .. }
            | EngineRequest::Act { entity, .. }
            | EngineRequest::Gib { entity, .. }
            | EngineRequest::DeleteEntity { entity }
            | EngineRequest::SetMovementLocked { entity, .. }
            | EngineRequest::RefreshMovementSpeed { entity, .. }
            | EngineRequest::PushUiState { entity, .. } => *entity,
            EngineRequest::SpawnEntities { at, .. } => *at,
        }
    }
}
