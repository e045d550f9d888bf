// src/provisioning/sequencer.rs

use super::{
    ack::{AckDetector, AckLatch},
    stage::{self, CommandStage},
    window::{ReceiveWindow, RECEIVE_WINDOW_CAPACITY},
};
use crate::common::{error::SequencerError, hal_traits::SerialPort};
use log::{debug, info, warn};

/// Outcome of feeding one received byte to the sequencer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Progress {
    /// Byte buffered, no acknowledgement completed.
    Waiting,
    /// An acknowledgement moved the script to this stage and its command was
    /// queued for transmission.
    Advanced(CommandStage),
    /// The last acknowledgement arrived; the module is provisioned.
    Provisioned,
    /// An acknowledgement arrived after provisioning had finished.
    Ignored,
}

/// Drives the module through the provisioning script, one stage per
/// acknowledgement, entirely from receive-complete events.
///
/// There is no acknowledgement timeout and no retry: if an "OK" is lost the
/// sequencer waits on its current stage forever. Callers that care can watch
/// [`stage`](CommandSequencer::stage) from their own supervision loop.
#[derive(Debug)]
pub struct CommandSequencer<S, const N: usize = RECEIVE_WINDOW_CAPACITY>
where
    S: SerialPort,
{
    serial: S,
    stage: CommandStage,
    started: bool,
    window: ReceiveWindow<N>,
    detector: AckDetector,
}

impl<S, const N: usize> CommandSequencer<S, N>
where
    S: SerialPort,
{
    pub fn new(serial: S) -> Self {
        CommandSequencer {
            serial,
            stage: CommandStage::Probe,
            started: false,
            window: ReceiveWindow::new(),
            detector: AckDetector::default(),
        }
    }

    /// Arms reception and sends the probe, blocking until it has gone out.
    pub fn start(&mut self) -> Result<(), SequencerError<S::Error>> {
        self.kick_off()?;
        nb::block!(self.poll_probe_sent())
    }

    /// Arms reception and queues the probe without waiting for it.
    ///
    /// Acknowledgements only advance the script once this has succeeded. If
    /// queuing the probe fails the sequencer stays unstarted and the call may
    /// be repeated.
    pub fn kick_off(&mut self) -> Result<(), SequencerError<S::Error>> {
        if self.started {
            return Err(SequencerError::AlreadyStarted);
        }
        self.serial.receive_one_async().map_err(SequencerError::Io)?;
        self.serial.transmit(stage::PROBE).map_err(SequencerError::Io)?;
        self.started = true;
        info!("wifi probe queued, provisioning started");
        Ok(())
    }

    /// Polls for completion of the probe transmission.
    pub fn poll_probe_sent(&mut self) -> nb::Result<(), SequencerError<S::Error>> {
        self.serial.flush().map_err(|e| e.map(SequencerError::Io))
    }

    /// Handles one byte delivered by the receive-complete interrupt.
    ///
    /// Every byte is buffered and reception is always re-armed, even when
    /// queuing the next command failed; in that case the transmit error is
    /// returned afterwards and the script stays on the new stage. Before
    /// [`kick_off`](Self::kick_off) bytes are only buffered and the latch is
    /// held idle.
    pub fn on_byte_received(&mut self, byte: u8) -> Result<Progress, SequencerError<S::Error>> {
        self.window.push(byte);

        let progress = if !self.started {
            self.detector.reset();
            Ok(Progress::Waiting)
        } else if self.detector.feed(byte) {
            self.advance()
        } else {
            Ok(Progress::Waiting)
        };

        let rearm = self.serial.receive_one_async().map_err(SequencerError::Io);
        let progress = progress?;
        rearm?;
        Ok(progress)
    }

    fn advance(&mut self) -> Result<Progress, SequencerError<S::Error>> {
        if self.stage.is_done() {
            debug!("acknowledgement after provisioning ignored");
            return Ok(Progress::Ignored);
        }
        self.stage = self.stage.next();
        match self.stage.command() {
            Some(command) => {
                debug!("stage {:?}: sending {} bytes", self.stage, command.len());
                self.serial.transmit(command).map_err(|e| {
                    warn!("failed to queue command for {:?}: {:?}", self.stage, e);
                    SequencerError::Io(e)
                })?;
                Ok(Progress::Advanced(self.stage))
            }
            None => {
                info!("wifi module provisioned");
                Ok(Progress::Provisioned)
            }
        }
    }

    // --- Accessors ---

    pub fn stage(&self) -> CommandStage {
        self.stage
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_provisioned(&self) -> bool {
        self.stage.is_done()
    }

    pub fn window(&self) -> &ReceiveWindow<N> {
        &self.window
    }

    pub fn ack_latch(&self) -> AckLatch {
        self.detector.latch()
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Gives back the serial port.
    pub fn release(self) -> S {
        self.serial
    }
}

// --- Unit Tests ---
#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // --- Mock Comm Error ---
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub(crate) struct MockCommError;

    // --- Mock Serial Port ---
    #[derive(Debug, Default)]
    pub(crate) struct MockSerial {
        pub(crate) sent: Vec<Vec<u8>>,
        pub(crate) armed: usize,
        pub(crate) flush_polls: usize,
        pub(crate) busy_polls: usize,
        /// Transmits fail once this many buffers have been sent.
        pub(crate) fail_after: Option<usize>,
    }

    impl SerialPort for MockSerial {
        type Error = MockCommError;
        fn transmit(&mut self, bytes: &'static [u8]) -> Result<(), Self::Error> {
            if self.fail_after.is_some_and(|limit| self.sent.len() >= limit) {
                return Err(MockCommError);
            }
            self.sent.push(bytes.to_vec());
            Ok(())
        }
        fn flush(&mut self) -> nb::Result<(), Self::Error> {
            self.flush_polls += 1;
            if self.flush_polls <= self.busy_polls {
                Err(nb::Error::WouldBlock)
            } else {
                Ok(())
            }
        }
        fn receive_one_async(&mut self) -> Result<(), Self::Error> {
            self.armed += 1;
            Ok(())
        }
    }

    // Helpers
    fn started() -> CommandSequencer<MockSerial> {
        let mut seq = CommandSequencer::new(MockSerial::default());
        seq.start().unwrap();
        seq
    }

    fn feed(seq: &mut CommandSequencer<MockSerial>, bytes: &[u8]) -> Vec<Progress> {
        bytes
            .iter()
            .map(|b| seq.on_byte_received(*b).unwrap())
            .filter(|p| *p != Progress::Waiting)
            .collect()
    }

    #[test]
    fn test_start_sends_probe_and_arms_receive() {
        let mut seq: CommandSequencer<MockSerial> = CommandSequencer::new(MockSerial {
            busy_polls: 3,
            ..MockSerial::default()
        });
        assert!(!seq.is_started());
        seq.start().unwrap();

        assert!(seq.is_started());
        assert_eq!(seq.stage(), CommandStage::Probe);
        assert_eq!(seq.serial().sent, vec![b"AT\r\n".to_vec()]);
        assert_eq!(seq.serial().armed, 1);
        assert_eq!(seq.serial().flush_polls, 4);
        assert_eq!(seq.start(), Err(SequencerError::AlreadyStarted));
    }

    #[test]
    fn test_bytes_before_start_are_buffered_without_advancing() {
        let mut seq: CommandSequencer<MockSerial> = CommandSequencer::new(MockSerial::default());
        assert_eq!(feed(&mut seq, b"OK\r\nO"), Vec::<Progress>::new());
        assert_eq!(seq.window().snapshot().as_slice(), b"O\n\rKO");
        assert_eq!(seq.ack_latch(), AckLatch::Idle);
        assert_eq!(seq.serial().armed, 5);
        assert_eq!(seq.stage(), CommandStage::Probe);
        assert!(seq.serial().sent.is_empty());

        // A half-seen token from before the kick-off does not count.
        seq.start().unwrap();
        assert_eq!(feed(&mut seq, b"K"), Vec::<Progress>::new());
        assert_eq!(feed(&mut seq, b"OK"), vec![Progress::Advanced(CommandStage::SetMode)]);
    }

    #[test]
    fn test_failed_kick_off_can_be_repeated() {
        let mut seq: CommandSequencer<MockSerial> = CommandSequencer::new(MockSerial {
            fail_after: Some(0),
            ..MockSerial::default()
        });
        assert_eq!(seq.kick_off(), Err(SequencerError::Io(MockCommError)));
        assert!(!seq.is_started());
        assert_eq!(seq.kick_off(), Err(SequencerError::Io(MockCommError)));
        assert!(seq.serial().sent.is_empty());
        // Reception stays armed while unstarted.
        assert_eq!(seq.on_byte_received(b'A'), Ok(Progress::Waiting));
        assert_eq!(seq.serial().armed, 3);
    }

    #[test]
    fn test_single_ack_advances_one_stage() {
        let mut seq = started();
        let progress = feed(&mut seq, b"AT\r\r\n\r\nOK\r\n");

        assert_eq!(progress, vec![Progress::Advanced(CommandStage::SetMode)]);
        assert_eq!(seq.stage(), CommandStage::SetMode);
        let sent = &seq.serial().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].as_slice(), b"ATPW=2\r\n");
        assert_eq!(sent[1].len(), 8);
    }

    #[test]
    fn test_every_byte_rearms_receive() {
        let mut seq = started();
        let stream = b"xxOKyyOOK\r\n";
        feed(&mut seq, stream);
        // One arm from start plus one per byte.
        assert_eq!(seq.serial().armed, 1 + stream.len());
    }

    #[test]
    fn test_full_script_reaches_done() {
        let mut seq = started();
        let mut progress = Vec::new();
        for _ in 0..6 {
            progress.extend(feed(&mut seq, b"\r\nOK\r\n"));
        }

        assert_eq!(
            progress,
            vec![
                Progress::Advanced(CommandStage::SetMode),
                Progress::Advanced(CommandStage::ConfigureAp),
                Progress::Advanced(CommandStage::EnableDhcp),
                Progress::Advanced(CommandStage::OpenServer),
                Progress::Advanced(CommandStage::StartWebServer),
                Progress::Provisioned,
            ]
        );
        assert!(seq.is_provisioned());

        let sent: Vec<&[u8]> = seq.serial().sent.iter().map(Vec::as_slice).collect();
        assert_eq!(
            sent,
            vec![
                &b"AT\r\n"[..],
                &b"ATPW=2\r\n"[..],
                &b"ATPA=MICRO2022,,11,0\r\n\0"[..],
                &b"ATPH=1,1\r\n"[..],
                &b"ATPS=0,3001\r\n"[..],
                &b"ATSW=c\r\n"[..],
            ]
        );
    }

    #[test]
    fn test_acks_after_done_send_nothing() {
        let mut seq = started();
        for _ in 0..6 {
            feed(&mut seq, b"OK");
        }
        let sent_before = seq.serial().sent.len();
        let armed_before = seq.serial().armed;

        assert_eq!(feed(&mut seq, b"OKOK"), vec![Progress::Ignored, Progress::Ignored]);
        assert_eq!(seq.stage(), CommandStage::Done);
        assert_eq!(seq.serial().sent.len(), sent_before);
        assert_eq!(seq.serial().armed, armed_before + 4);
    }

    #[test]
    fn test_overlapping_token_detects_once() {
        let mut seq = started();
        assert_eq!(seq.on_byte_received(b'O'), Ok(Progress::Waiting));
        assert_eq!(seq.ack_latch(), AckLatch::FirstSeen);
        assert_eq!(seq.on_byte_received(b'O'), Ok(Progress::Waiting));
        assert_eq!(seq.ack_latch(), AckLatch::FirstSeen);
        assert_eq!(
            seq.on_byte_received(b'K'),
            Ok(Progress::Advanced(CommandStage::SetMode))
        );
        assert_eq!(seq.ack_latch(), AckLatch::Idle);
    }

    #[test]
    fn test_missing_ack_stalls_on_current_stage() {
        let mut seq = started();
        feed(&mut seq, b"OK");
        feed(&mut seq, b"ERROR\r\nO\r\nK\r\n");
        assert_eq!(seq.stage(), CommandStage::SetMode);
        assert_eq!(seq.serial().sent.len(), 2);
        assert!(seq.window().contains(b"ERROR"));
    }

    #[test]
    fn test_window_tracks_stream() {
        let mut seq: CommandSequencer<MockSerial, 4> =
            CommandSequencer::new(MockSerial::default());
        seq.start().unwrap();
        for b in b"ready\r\nOK" {
            seq.on_byte_received(*b).unwrap();
        }
        assert_eq!(seq.window().snapshot().as_slice(), b"KO\n\r");
        assert_eq!(seq.stage(), CommandStage::SetMode);
    }

    #[test]
    fn test_transmit_failure_still_rearms() {
        let mut seq: CommandSequencer<MockSerial> = CommandSequencer::new(MockSerial {
            fail_after: Some(1),
            ..MockSerial::default()
        });
        seq.start().unwrap();
        let armed_before = seq.serial().armed;

        assert_eq!(feed(&mut seq, b"O"), Vec::<Progress>::new());
        assert_eq!(
            seq.on_byte_received(b'K'),
            Err(SequencerError::Io(MockCommError))
        );
        assert_eq!(seq.serial().armed, armed_before + 2);
        // No retry: the stage moved on even though its command never went out.
        assert_eq!(seq.stage(), CommandStage::SetMode);
        assert_eq!(seq.release().sent.len(), 1);
    }
}
