// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod error;
pub mod hal_traits;
pub mod timing;
pub mod types;

// --- Re-export key types/traits for easier access ---

// From error.rs
pub use error::{ChecksumMismatch, ResponsePhase, SensorError, SequencerError};

// From hal_traits.rs
pub use hal_traits::{Direction, ElapsedTimer, GpioLine, PinState, SerialPort};

// From types.rs
pub use types::{ProtocolFrame, SensorReading, FRAME_BYTES};

// From timing.rs (constants - users can access via common::timing::*)
pub use timing::duration_to_ticks;
