// src/common/hal_traits.rs

use core::fmt::Debug;

/// Logic level of a digital line. Borrowed from embedded-hal so pins from any
/// HAL can be bridged without a conversion layer.
pub use embedded_hal::digital::PinState;

/// Direction of a bidirectional line.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    /// The host drives the line.
    Output,
    /// The host releases the line and samples it.
    Input,
}

/// Abstraction for the bidirectional data line of a single-wire sensor.
///
/// The line is open-drain with an external pull-up: releasing it (switching
/// to [`Direction::Input`]) lets it float high unless the sensor pulls it low.
pub trait GpioLine {
    /// Associated error type for pin access errors.
    type Error: Debug;

    /// Switches the line between host-driven and sampled.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Drives the line to `level`. Only meaningful in [`Direction::Output`].
    fn write(&mut self, level: PinState) -> Result<(), Self::Error>;

    /// Samples the current level of the line.
    fn read(&mut self) -> Result<PinState, Self::Error>;
}

/// Abstraction for a free-running hardware counter used to time pulses.
pub trait ElapsedTimer {
    /// Counter frequency in ticks per second.
    const TICK_HZ: u32;

    /// Restarts counting from zero.
    fn reset(&mut self);

    /// Ticks elapsed since the last [`reset`](ElapsedTimer::reset).
    fn elapsed_ticks(&mut self) -> u32;
}

/// Abstraction for an interrupt-driven serial port.
///
/// Reception is armed one byte at a time; the platform delivers the byte by
/// calling the sequencer from its receive-complete interrupt.
pub trait SerialPort {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Queues `bytes` for interrupt-driven transmission. Must not block.
    ///
    /// The whole slice is sent; its length is the transmit length. The slice
    /// is `'static` so an implementation may keep sending from it after
    /// returning.
    fn transmit(&mut self, bytes: &'static [u8]) -> Result<(), Self::Error>;

    /// Checks whether the queued transmission has completed.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while bytes are still going out.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;

    /// Arms a single-byte asynchronous receive.
    fn receive_one_async(&mut self) -> Result<(), Self::Error>;
}
