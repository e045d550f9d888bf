// src/sensor/driver.rs

use crate::common::{
    error::{ResponsePhase, SensorError},
    hal_traits::{Direction, ElapsedTimer, GpioLine, PinState},
    timing,
    types::{ProtocolFrame, SensorReading, FRAME_BYTES},
};
use core::time::Duration;
use log::{debug, trace, warn};

const _: () = assert!(FRAME_BYTES * 8 == timing::FRAME_BITS);

/// Timing parameters of one transaction. `Default` uses the datasheet values
/// from [`timing`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SensorTiming {
    /// How long the host holds the line low to wake the sensor.
    pub start_low: Duration,
    /// How long the host drives the line high before releasing it.
    pub start_release: Duration,
    /// Budget for each phase of the sensor's response handshake.
    pub response_timeout: Duration,
    /// Budget for each phase of a data bit.
    pub bit_timeout: Duration,
    /// Shortest high phase that decodes to 1.
    pub one_threshold: Duration,
}

impl Default for SensorTiming {
    fn default() -> Self {
        SensorTiming {
            start_low: timing::START_SIGNAL_LOW,
            start_release: timing::START_SIGNAL_RELEASE,
            response_timeout: timing::RESPONSE_PHASE_TIMEOUT,
            bit_timeout: timing::BIT_PHASE_TIMEOUT,
            one_threshold: timing::BIT_ONE_THRESHOLD,
        }
    }
}

// SensorTiming converted once into counter ticks.
#[derive(Debug, Copy, Clone)]
struct TickBudget {
    start_low: u32,
    start_release: u32,
    response_timeout: u32,
    bit_timeout: u32,
    one_threshold: u32,
}

impl TickBudget {
    fn new(timing: &SensorTiming, tick_hz: u32) -> Self {
        TickBudget {
            start_low: timing::duration_to_ticks(timing.start_low, tick_hz),
            start_release: timing::duration_to_ticks(timing.start_release, tick_hz),
            response_timeout: timing::duration_to_ticks(timing.response_timeout, tick_hz),
            bit_timeout: timing::duration_to_ticks(timing.bit_timeout, tick_hz),
            one_threshold: timing::duration_to_ticks(timing.one_threshold, tick_hz),
        }
    }
}

/// Decodes one data bit from the length of its high phase.
///
/// The boundary belongs to 1: exactly `one_threshold_ticks` decodes to 1.
#[inline]
pub const fn classify_bit(high_ticks: u32, one_threshold_ticks: u32) -> bool {
    high_ticks >= one_threshold_ticks
}

/// Driver for a DHT11-style sensor on a single open-drain data line.
///
/// Owns the line and the timer exclusively. Every call to [`read`] is one
/// complete, blocking attempt of roughly 4-5 ms after the 18 ms start signal;
/// there are no internal retries. Interrupts are left enabled, so callers
/// with long-running handlers should expect occasional timeouts.
///
/// [`read`]: SingleWireSensor::read
#[derive(Debug)]
pub struct SingleWireSensor<L, T>
where
    L: GpioLine,
    T: ElapsedTimer,
{
    line: L,
    timer: T,
    timing: SensorTiming,
    budget: TickBudget,
    last_reading: Option<SensorReading>,
}

impl<L, T> SingleWireSensor<L, T>
where
    L: GpioLine,
    T: ElapsedTimer,
{
    pub fn new(line: L, timer: T) -> Self {
        Self::with_timing(line, timer, SensorTiming::default())
    }

    pub fn with_timing(line: L, timer: T, timing: SensorTiming) -> Self {
        SingleWireSensor {
            line,
            timer,
            budget: TickBudget::new(&timing, T::TICK_HZ),
            timing,
            last_reading: None,
        }
    }

    pub fn timing(&self) -> &SensorTiming {
        &self.timing
    }

    /// Most recent successful reading. Failed transactions leave it unchanged.
    pub fn last_reading(&self) -> Option<SensorReading> {
        self.last_reading
    }

    /// Gives back the line and the timer.
    pub fn release(self) -> (L, T) {
        (self.line, self.timer)
    }

    // --- Public Blocking Methods ---

    /// Runs one transaction and returns the integer temperature and humidity.
    pub fn read(&mut self) -> Result<SensorReading, SensorError<L::Error>> {
        let frame = self.read_frame()?;
        Ok(frame.reading())
    }

    /// Runs one transaction and returns the whole validated frame, including
    /// the fractional bytes.
    pub fn read_frame(&mut self) -> Result<ProtocolFrame, SensorError<L::Error>> {
        let result = self.transaction();
        match &result {
            Ok(frame) => {
                let reading = frame.reading();
                debug!(
                    "sensor reading: {} C, {} %RH",
                    reading.temperature, reading.humidity
                );
                self.last_reading = Some(reading);
            }
            Err(e) => warn!("sensor transaction failed: {}", e),
        }
        result
    }

    fn transaction(&mut self) -> Result<ProtocolFrame, SensorError<L::Error>> {
        self.send_start_signal()?;
        self.await_response()?;
        let bytes = self.read_bytes()?;
        Ok(ProtocolFrame::from_bytes(bytes)?)
    }

    // --- Protocol Phases (Private) ---

    fn send_start_signal(&mut self) -> Result<(), SensorError<L::Error>> {
        self.line
            .set_direction(Direction::Output)
            .map_err(SensorError::Io)?;
        self.line.write(PinState::Low).map_err(SensorError::Io)?;
        self.hold(self.budget.start_low);
        self.line.write(PinState::High).map_err(SensorError::Io)?;
        self.hold(self.budget.start_release);
        self.line
            .set_direction(Direction::Input)
            .map_err(SensorError::Io)
    }

    fn await_response(&mut self) -> Result<(), SensorError<L::Error>> {
        let budget = self.budget.response_timeout;
        self.wait_while(PinState::High, budget)?
            .ok_or(SensorError::StartTimeout { phase: ResponsePhase::Acknowledge })?;
        let low = self
            .wait_while(PinState::Low, budget)?
            .ok_or(SensorError::StartTimeout { phase: ResponsePhase::Low })?;
        let high = self
            .wait_while(PinState::High, budget)?
            .ok_or(SensorError::StartTimeout { phase: ResponsePhase::High })?;
        trace!("response pulses: low {} ticks, high {} ticks", low, high);
        Ok(())
    }

    fn read_bytes(&mut self) -> Result<[u8; FRAME_BYTES], SensorError<L::Error>> {
        let mut bytes = [0u8; FRAME_BYTES];
        for (index, byte) in bytes.iter_mut().enumerate() {
            for offset in 0..8 {
                let one = self.read_bit((index * 8 + offset) as u8)?;
                *byte = (*byte << 1) | u8::from(one);
            }
        }
        trace!("raw frame: {:02x?}", bytes);
        Ok(bytes)
    }

    fn read_bit(&mut self, bit: u8) -> Result<bool, SensorError<L::Error>> {
        let budget = self.budget.bit_timeout;
        self.wait_while(PinState::Low, budget)?
            .ok_or(SensorError::BitTimeout { bit })?;
        let high = self
            .wait_while(PinState::High, budget)?
            .ok_or(SensorError::BitTimeout { bit })?;
        Ok(classify_bit(high, self.budget.one_threshold))
    }

    // --- Low-Level Timing Helpers (Private) ---

    /// Busy-waits for `ticks` counter ticks.
    fn hold(&mut self, ticks: u32) {
        self.timer.reset();
        while self.timer.elapsed_ticks() < ticks {
            core::hint::spin_loop();
        }
    }

    /// Polls until the line leaves `level`.
    ///
    /// Returns the ticks spent at `level`, or `None` once more than `budget`
    /// ticks passed without a change.
    fn wait_while(
        &mut self,
        level: PinState,
        budget: u32,
    ) -> Result<Option<u32>, SensorError<L::Error>> {
        self.timer.reset();
        loop {
            let elapsed = self.timer.elapsed_ticks();
            if self.line.read().map_err(SensorError::Io)? != level {
                return Ok(Some(elapsed));
            }
            if elapsed > budget {
                return Ok(None);
            }
        }
    }
}
