// src/provisioning/ack.rs

/// Acknowledgement the module sends after every accepted command.
pub const ACK_TOKEN: [u8; 2] = *b"OK";

/// Progress toward recognising the two-byte token.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum AckLatch {
    #[default]
    Idle,
    FirstSeen,
}

/// Spots a two-byte token that is contiguous in arrival order.
#[derive(Debug, Clone)]
pub struct AckDetector {
    token: [u8; 2],
    latch: AckLatch,
}

impl AckDetector {
    pub const fn new(token: [u8; 2]) -> Self {
        AckDetector {
            token,
            latch: AckLatch::Idle,
        }
    }

    /// Feeds one received byte; returns `true` when it completes the token.
    ///
    /// A byte that breaks a half-seen token is immediately retried as the
    /// token's first byte, so "OOK" still yields one detection.
    pub fn feed(&mut self, byte: u8) -> bool {
        if self.latch == AckLatch::FirstSeen && byte == self.token[1] {
            self.latch = AckLatch::Idle;
            return true;
        }
        self.latch = if byte == self.token[0] {
            AckLatch::FirstSeen
        } else {
            AckLatch::Idle
        };
        false
    }

    pub fn latch(&self) -> AckLatch {
        self.latch
    }

    /// Drops a half-seen token.
    pub fn reset(&mut self) {
        self.latch = AckLatch::Idle;
    }
}

impl Default for AckDetector {
    fn default() -> Self {
        Self::new(ACK_TOKEN)
    }
}
