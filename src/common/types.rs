// src/common/types.rs

use super::error::ChecksumMismatch;

/// Number of bytes in one sensor transaction.
pub const FRAME_BYTES: usize = 5;

/// Integer temperature (degrees Celsius) and relative humidity (percent).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct SensorReading {
    pub temperature: u8,
    pub humidity: u8,
}

/// The five raw bytes of one sensor transaction, checksum already verified.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProtocolFrame {
    pub humidity_int: u8,
    pub humidity_frac: u8,
    pub temperature_int: u8,
    pub temperature_frac: u8,
    pub checksum: u8,
}

impl ProtocolFrame {
    /// Builds a frame from bytes in wire order, rejecting a bad checksum.
    pub fn from_bytes(bytes: [u8; FRAME_BYTES]) -> Result<Self, ChecksumMismatch> {
        let calculated = Self::checksum_of(&bytes[..4]);
        if calculated != bytes[4] {
            return Err(ChecksumMismatch {
                expected: bytes[4],
                calculated,
            });
        }
        Ok(ProtocolFrame {
            humidity_int: bytes[0],
            humidity_frac: bytes[1],
            temperature_int: bytes[2],
            temperature_frac: bytes[3],
            checksum: bytes[4],
        })
    }

    /// Modulo-256 sum of `payload`.
    #[inline]
    pub fn checksum_of(payload: &[u8]) -> u8 {
        payload.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
    }

    /// Bytes in wire order.
    pub const fn to_bytes(&self) -> [u8; FRAME_BYTES] {
        [
            self.humidity_int,
            self.humidity_frac,
            self.temperature_int,
            self.temperature_frac,
            self.checksum,
        ]
    }

    /// Integer parts only; the fractional bytes are dropped.
    pub const fn reading(&self) -> SensorReading {
        SensorReading {
            temperature: self.temperature_int,
            humidity: self.humidity_int,
        }
    }
}

impl From<ProtocolFrame> for SensorReading {
    fn from(frame: ProtocolFrame) -> Self {
        frame.reading()
    }
}

impl TryFrom<[u8; FRAME_BYTES]> for ProtocolFrame {
    type Error = ChecksumMismatch;

    fn try_from(bytes: [u8; FRAME_BYTES]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}
