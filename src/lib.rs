// src/lib.rs

#![cfg_attr(not(any(test, feature = "std")), no_std)] // Specify no_std at the crate root

pub mod common;
pub mod provisioning;
pub mod sensor;

// Re-export key types for convenience
pub use common::{SensorError, SensorReading, SequencerError};
pub use provisioning::{CommandSequencer, CommandStage};
pub use sensor::SingleWireSensor;
