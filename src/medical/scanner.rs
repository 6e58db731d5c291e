//! Scanner state, status light and UI state

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::types::EntityId;
use crate::damage::Damageable;
use crate::engine::{AppearanceVisual, EngineRequest, UiState};
use crate::mob_state::MobState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicalScannerStatus {
    Off,
    Open,
    Green,
    Yellow,
    Red,
    Death,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScannerError {
    #[error("scanner {scanner} already holds {occupant}")]
    Occupied { scanner: EntityId, occupant: EntityId },

    #[error("{0} has no body to scan")]
    NotDamageable(EntityId),

    #[error("scanner {0} is empty")]
    Empty(EntityId),

    #[error("{0} is not a medical scanner")]
    NotAScanner(EntityId),

    #[error("{0} cannot be inserted into itself")]
    SelfInsert(EntityId),

    #[error("{body} is already inside scanner {scanner}")]
    AlreadyInside { body: EntityId, scanner: EntityId },
}

/// State pushed to an open scanner window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScannerUiState {
    pub occupant: Option<EntityId>,
    /// Damage per fully supported group
    pub damage_per_group: BTreeMap<String, i32>,
    pub damage_per_type: BTreeMap<String, i32>,
    pub occupied: bool,
}

fn default_powered() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MedicalScannerDef {
    #[serde(default = "default_powered")]
    pub powered: bool,
}

impl Default for MedicalScannerDef {
    fn default() -> Self {
        Self { powered: true }
    }
}

/// What the scanner can see of its occupant
#[derive(Debug, Clone, Copy)]
pub struct OccupantView<'a> {
    pub id: EntityId,
    pub damageable: Option<&'a Damageable>,
    pub mob_state: Option<&'a MobState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalScanner {
    powered: bool,
    occupant: Option<EntityId>,
}

impl MedicalScanner {
    pub fn new(def: &MedicalScannerDef) -> Self {
        Self {
            powered: def.powered,
            occupant: None,
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn set_powered(&mut self, powered: bool) {
        self.powered = powered;
    }

    pub fn occupant(&self) -> Option<EntityId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn insert(
        &mut self,
        scanner: EntityId,
        body: EntityId,
        has_damageable: bool,
    ) -> Result<(), ScannerError> {
        if scanner == body {
            return Err(ScannerError::SelfInsert(body));
        }
        if let Some(occupant) = self.occupant {
            return Err(ScannerError::Occupied { scanner, occupant });
        }
        if !has_damageable {
            return Err(ScannerError::NotDamageable(body));
        }
        self.occupant = Some(body);
        Ok(())
    }

    pub fn eject(&mut self, scanner: EntityId) -> Result<EntityId, ScannerError> {
        self.occupant.take().ok_or(ScannerError::Empty(scanner))
    }

    pub fn status(&self, occupant: Option<&OccupantView<'_>>) -> MedicalScannerStatus {
        if !self.powered {
            return MedicalScannerStatus::Off;
        }
        match occupant.and_then(|o| o.mob_state) {
            None => MedicalScannerStatus::Open,
            Some(state) if state.is_alive() => MedicalScannerStatus::Green,
            Some(state) if state.is_critical() => MedicalScannerStatus::Red,
            Some(state) if state.is_dead() => MedicalScannerStatus::Death,
            Some(_) => MedicalScannerStatus::Yellow,
        }
    }

    pub fn ui_state(&self, occupant: Option<&OccupantView<'_>>) -> ScannerUiState {
        match occupant {
            Some(OccupantView {
                id,
                damageable: Some(damageable),
                ..
            }) => ScannerUiState {
                occupant: Some(*id),
                damage_per_group: damageable.damage_per_fully_supported_group_ids(),
                damage_per_type: damageable.damage_per_type_ids(),
                occupied: true,
            },
            _ => ScannerUiState::default(),
        }
    }

    /// Status light and, while powered, the UI state
    pub fn refresh(&self, owner: EntityId, occupant: Option<&OccupantView<'_>>) -> Vec<EngineRequest> {
        let mut requests = vec![EngineRequest::SetAppearance {
            entity: owner,
            visual: AppearanceVisual::ScannerStatus(self.status(occupant)),
        }];
        if self.powered {
            requests.push(EngineRequest::PushUiState {
                entity: owner,
                state: UiState::MedicalScanner(self.ui_state(occupant)),
            });
        }
        requests
    }
}
