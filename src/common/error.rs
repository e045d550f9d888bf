// src/common/error.rs

/// Handshake phase during which the sensor stopped answering.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResponsePhase {
    /// The sensor never pulled the released line low.
    Acknowledge,
    /// The sensor's ~80 us low pulse did not end.
    Low,
    /// The sensor's ~80 us high pulse did not end.
    High,
}

/// A decoded frame whose checksum byte disagrees with its payload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("checksum mismatch: frame carried {expected:#04x}, calculated {calculated:#04x}")]
pub struct ChecksumMismatch {
    /// Checksum byte received from the sensor.
    pub expected: u8,
    /// Sum of the four payload bytes, modulo 256.
    pub calculated: u8,
}

/// Errors reported by a single sensor transaction.
///
/// None of these are fatal; the caller decides whether and when to retry.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum SensorError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying pin error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// The sensor did not answer the start signal within budget.
    #[error("sensor did not answer the start signal ({phase:?} phase)")]
    StartTimeout { phase: ResponsePhase },

    /// A data bit's low marker or high phase did not complete within budget.
    #[error("bit {bit} timed out")]
    BitTimeout { bit: u8 },

    /// Received checksum does not match the calculated one.
    #[error("checksum mismatch: frame carried {expected:#04x}, calculated {calculated:#04x}")]
    ChecksumMismatch { expected: u8, calculated: u8 },
}

impl<E: core::fmt::Debug> SensorError<E> {
    /// True for both handshake and bit timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            SensorError::StartTimeout { .. } | SensorError::BitTimeout { .. }
        )
    }
}

impl<E: core::fmt::Debug> From<ChecksumMismatch> for SensorError<E> {
    fn from(e: ChecksumMismatch) -> Self {
        SensorError::ChecksumMismatch {
            expected: e.expected,
            calculated: e.calculated,
        }
    }
}

/// Errors reported by the provisioning sequencer.
///
/// A missing acknowledgement is not an error: the sequencer simply stays on
/// its current stage.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum SequencerError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying serial error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// No sequencer is installed in the shared cell.
    #[error("no sequencer installed")]
    NotInstalled,

    /// The probe command was already sent.
    #[error("sequencer already started")]
    AlreadyStarted,
}
