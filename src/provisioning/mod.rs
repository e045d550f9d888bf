// src/provisioning/mod.rs

// AT-command provisioning of the serial Wi-Fi module.
pub mod ack;
pub mod sequencer;
pub mod shared;
pub mod stage;
pub mod window;

// Re-export the types the firmware interacts with
pub use ack::{AckDetector, AckLatch, ACK_TOKEN};
pub use sequencer::{CommandSequencer, Progress};
pub use shared::SharedSequencer;
pub use stage::CommandStage;
pub use window::{ReceiveWindow, RECEIVE_WINDOW_CAPACITY};
