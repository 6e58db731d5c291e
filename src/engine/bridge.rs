//! Outbound seam to the host engine

use thiserror::Error;

use super::requests::EngineRequest;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine refused request: {0}")]
    Refused(String),
}

/// Receives every request the simulation produces, in order
pub trait EngineBridge {
    fn submit(&mut self, request: EngineRequest) -> Result<(), EngineError>;
}

/// Bridge that accepts and journals every request
#[derive(Debug, Default)]
pub struct RecordingBridge {
    requests: Vec<EngineRequest>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[EngineRequest] {
        &self.requests
    }

    /// Take the journal, leaving it empty
    pub fn drain(&mut self) -> Vec<EngineRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

impl EngineBridge for RecordingBridge {
    fn submit(&mut self, request: EngineRequest) -> Result<(), EngineError> {
        self.requests.push(request);
        Ok(())
    }
}
