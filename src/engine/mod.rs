//! Boundary with the host engine: alerts, visuals, spawns, UI pushes.

pub mod alerts;
pub mod bridge;
pub mod requests;

pub use alerts::{AlertCategory, AlertType};
pub use bridge::{EngineBridge, EngineError, RecordingBridge};
pub use requests::{AppearanceVisual, DamageStateVisual, EngineRequest, UiState};
