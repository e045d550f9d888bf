// src/provisioning/window.rs

use arrayvec::ArrayVec;
use heapless::Deque;

/// Capacity of the receive window used by the node.
pub const RECEIVE_WINDOW_CAPACITY: usize = 200;

/// The most recent bytes received from the module, newest first.
///
/// Once `N` bytes have arrived the window stays full: every new byte evicts
/// the oldest one.
#[derive(Debug, Clone)]
pub struct ReceiveWindow<const N: usize = RECEIVE_WINDOW_CAPACITY> {
    bytes: Deque<u8, N>,
}

impl<const N: usize> ReceiveWindow<N> {
    pub const fn new() -> Self {
        ReceiveWindow {
            bytes: Deque::new(),
        }
    }

    /// Records a newly received byte, returning the byte it evicted, if any.
    pub fn push(&mut self, byte: u8) -> Option<u8> {
        let evicted = if self.bytes.is_full() {
            self.bytes.pop_back()
        } else {
            None
        };
        // Only fails for a zero-capacity window.
        let _ = self.bytes.push_front(byte);
        evicted
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The byte that arrived last.
    pub fn newest(&self) -> Option<u8> {
        self.bytes.front().copied()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &u8> + '_ {
        self.bytes.iter()
    }

    /// Copies the window out, newest first.
    pub fn snapshot(&self) -> ArrayVec<u8, N> {
        self.bytes.iter().copied().collect()
    }

    /// Whether `needle`, given in arrival order, occurs anywhere in the window.
    pub fn contains(&self, needle: &[u8]) -> bool {
        if needle.is_empty() {
            return true;
        }
        let snapshot = self.snapshot();
        snapshot
            .windows(needle.len())
            .any(|candidate| candidate.iter().rev().eq(needle.iter()))
    }
}

impl<const N: usize> Default for ReceiveWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
