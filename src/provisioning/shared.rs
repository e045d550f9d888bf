// src/provisioning/shared.rs

use super::{
    sequencer::{CommandSequencer, Progress},
    stage::CommandStage,
    window::RECEIVE_WINDOW_CAPACITY,
};
use crate::common::{error::SequencerError, hal_traits::SerialPort};
use arrayvec::ArrayVec;
use core::cell::RefCell;
use critical_section::Mutex;

/// Hand-off cell between the main context and the receive interrupt.
///
/// Intended to live in a `static`. The main context
/// [`install`](Self::install)s a fresh sequencer and then calls
/// [`start`](Self::start), so reception is armed only once the interrupt
/// handler has somewhere to deliver bytes. The handler feeds bytes through
/// [`on_byte_received`](Self::on_byte_received); every other access goes
/// through a critical section.
pub struct SharedSequencer<S, const N: usize = RECEIVE_WINDOW_CAPACITY>
where
    S: SerialPort,
{
    inner: Mutex<RefCell<Option<CommandSequencer<S, N>>>>,
}

impl<S, const N: usize> SharedSequencer<S, N>
where
    S: SerialPort,
{
    pub const fn new() -> Self {
        SharedSequencer {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Moves `sequencer` into the cell. Hands it back if one is already
    /// installed.
    pub fn install(&self, sequencer: CommandSequencer<S, N>) -> Result<(), CommandSequencer<S, N>> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow_ref_mut(cs);
            if slot.is_some() {
                return Err(sequencer);
            }
            *slot = Some(sequencer);
            Ok(())
        })
    }

    /// Removes the sequencer from the cell.
    pub fn take(&self) -> Option<CommandSequencer<S, N>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Kicks off the installed sequencer and waits for the probe to go out.
    ///
    /// Each completion poll takes its own short critical section, so the
    /// receive interrupt keeps being served while the probe is sent.
    pub fn start(&self) -> Result<(), SequencerError<S::Error>> {
        self.kick_off()?;
        nb::block!(self.poll_probe_sent())
    }

    /// See [`CommandSequencer::kick_off`].
    pub fn kick_off(&self) -> Result<(), SequencerError<S::Error>> {
        self.with(|sequencer| sequencer.kick_off())
            .unwrap_or(Err(SequencerError::NotInstalled))
    }

    /// See [`CommandSequencer::poll_probe_sent`].
    pub fn poll_probe_sent(&self) -> nb::Result<(), SequencerError<S::Error>> {
        self.with(|sequencer| sequencer.poll_probe_sent())
            .unwrap_or(Err(nb::Error::Other(SequencerError::NotInstalled)))
    }

    /// Entry point for the receive-complete interrupt.
    ///
    /// With no sequencer installed the byte is dropped with
    /// [`SequencerError::NotInstalled`] and reception is not re-armed.
    pub fn on_byte_received(&self, byte: u8) -> Result<Progress, SequencerError<S::Error>> {
        self.with(|sequencer| sequencer.on_byte_received(byte))
            .unwrap_or(Err(SequencerError::NotInstalled))
    }

    /// Runs `f` on the installed sequencer inside a critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut CommandSequencer<S, N>) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    pub fn stage(&self) -> Option<CommandStage> {
        self.with(|sequencer| sequencer.stage())
    }

    pub fn is_provisioned(&self) -> bool {
        self.with(|sequencer| sequencer.is_provisioned())
            .unwrap_or(false)
    }

    /// Copy of the receive window, newest first.
    pub fn window_snapshot(&self) -> Option<ArrayVec<u8, N>> {
        self.with(|sequencer| sequencer.window().snapshot())
    }
}

impl<S, const N: usize> Default for SharedSequencer<S, N>
where
    S: SerialPort,
{
    fn default() -> Self {
        Self::new()
    }
}
