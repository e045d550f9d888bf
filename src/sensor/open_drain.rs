// src/sensor/open_drain.rs

use crate::common::hal_traits::{Direction, GpioLine, PinState};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Adapts an embedded-hal open-drain pin (readable while driven) to
/// [`GpioLine`].
///
/// Open-drain pins have no separate input mode: releasing the line means
/// writing high and letting the pull-up (or the sensor) decide the level.
#[derive(Debug)]
pub struct OpenDrainLine<P> {
    pin: P,
    direction: Direction,
}

impl<P> OpenDrainLine<P>
where
    P: InputPin + OutputPin,
{
    /// Wraps `pin`, releasing it so the bus idles high.
    pub fn new(mut pin: P) -> Result<Self, <P as ErrorType>::Error> {
        pin.set_high()?;
        Ok(OpenDrainLine {
            pin,
            direction: Direction::Input,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> GpioLine for OpenDrainLine<P>
where
    P: InputPin + OutputPin,
{
    type Error = <P as ErrorType>::Error;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.direction = direction;
        match direction {
            Direction::Input => self.pin.set_high(),
            Direction::Output => Ok(()),
        }
    }

    fn write(&mut self, level: PinState) -> Result<(), Self::Error> {
        self.pin.set_state(level)
    }

    fn read(&mut self) -> Result<PinState, Self::Error> {
        self.pin.is_high().map(PinState::from)
    }
}
