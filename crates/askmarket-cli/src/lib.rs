//! AskMarket CLI
//!
//! Drives an in-memory marketplace from JSON scripts:
//! - Settings: layered configuration for the binary
//! - Script: operations replayed against a fresh marketplace

pub mod script;
pub mod settings;

pub use script::{RunReport, Script, Step, StepFailure, StepOutcome};
pub use settings::{LoggingConfig, Settings};
