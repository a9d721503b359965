//! Raspberry Pi GPIO backend built on `rppal`. Pins use BCM numbering.

use super::{Edge, EdgeCallback, Gpio, Pull, SignalError};
use rppal::gpio::{Event, Gpio as RppalHandle, InputPin, Trigger};
use std::collections::HashMap;
use std::time::Instant;

/// Edge interrupts delivered on rppal's interrupt thread.
pub struct RppalGpio {
    gpio: RppalHandle,
    /// Claimed pins. Dropping an `InputPin` clears its interrupt.
    pins: HashMap<u8, InputPin>,
}

impl RppalGpio {
    /// Opens the GPIO peripheral.
    pub fn new() -> Result<Self, SignalError> {
        let gpio = RppalHandle::new().map_err(|e| SignalError::GpioUnavailable(e.to_string()))?;
        Ok(Self {
            gpio,
            pins: HashMap::new(),
        })
    }
}

impl Gpio for RppalGpio {
    fn configure_pin(&mut self, pin: u8, pull: Pull) -> Result<(), SignalError> {
        let raw = self
            .gpio
            .get(pin)
            .map_err(|e| SignalError::PinClaimFailed {
                pin,
                reason: e.to_string(),
            })?;
        let input = match pull {
            Pull::Up => raw.into_input_pullup(),
            Pull::Down => raw.into_input_pulldown(),
            Pull::Off => raw.into_input(),
        };
        self.pins.insert(pin, input);
        Ok(())
    }

    fn on_edge(&mut self, pin: u8, edge: Edge, callback: EdgeCallback) -> Result<(), SignalError> {
        let input = self
            .pins
            .get_mut(&pin)
            .ok_or_else(|| SignalError::HandlerInstallFailed {
                pin,
                reason: "pin not configured".into(),
            })?;
        let trigger = match edge {
            Edge::Rising => Trigger::RisingEdge,
            Edge::Falling => Trigger::FallingEdge,
            Edge::Both => Trigger::Both,
        };

        // Debouncing happens in the callback, so rppal's own filter stays off.
        let mut callback = callback;
        input
            .set_async_interrupt(trigger, None, move |_event: Event| callback(Instant::now()))
            .map_err(|e| SignalError::HandlerInstallFailed {
                pin,
                reason: e.to_string(),
            })
    }
}
