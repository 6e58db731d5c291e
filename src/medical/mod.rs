//! Medical scanner: a one-body container that reports its occupant's damage

pub mod scanner;

pub use scanner::{MedicalScanner, MedicalScannerDef, MedicalScannerStatus, OccupantView, ScannerError, ScannerUiState};
