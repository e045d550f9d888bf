// src/sensor/mod.rs

// Declare the modules within the sensor directory.

// Single-wire temperature/humidity driver
pub mod driver;
// embedded-hal bridge for the data line
pub mod open_drain;
// ADC conversions for the on-board analog inputs
pub mod analog;

// --- Public Re-exports ---
pub use driver::{classify_bit, SensorTiming, SingleWireSensor};
pub use open_drain::OpenDrainLine;
