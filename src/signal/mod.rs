//! Physical and software input triggers.
//!
//! Two logical buttons drive the booth. Each is bound to one GPIO pin with
//! its own debounce window; accepted edges become events on the booth's
//! queue through a [`BoothHandle`](crate::booth::BoothHandle). Ctrl-C and an
//! optional console reader feed the same handle.

mod debounce;
#[cfg(feature = "gpio")]
mod rpi;
mod simulated;
mod software;
mod source;

pub use debounce::Debouncer;
#[cfg(feature = "gpio")]
pub use rpi::RppalGpio;
pub use simulated::SimulatedGpio;
pub use software::{install_interrupt_handler, parse_command, spawn_console_trigger};
pub use source::InputSignals;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors raised while wiring input sources.
#[derive(Debug, Error)]
pub enum SignalError {
    /// A pin is already in use or could not be set up as an input.
    #[error("failed to claim GPIO pin {pin}: {reason}")]
    PinClaimFailed {
        /// BCM pin number.
        pin: u8,
        /// Backend error text.
        reason: String,
    },
    /// The pin was claimed but edge detection could not be enabled.
    #[error("failed to register edge handler on pin {pin}: {reason}")]
    HandlerInstallFailed {
        /// BCM pin number.
        pin: u8,
        /// Backend error text.
        reason: String,
    },
    /// The GPIO peripheral could not be opened at all.
    #[error("GPIO subsystem unavailable: {0}")]
    GpioUnavailable(String),
    /// The Ctrl-C handler could not be installed.
    #[error("failed to install interrupt handler: {0}")]
    Interrupt(#[from] ctrlc::Error),
}

/// Logical booth buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Take a picture.
    Capture,
    /// Shut the booth down.
    Quit,
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Button::Capture => f.write_str("capture"),
            Button::Quit => f.write_str("quit"),
        }
    }
}

/// Pull resistor applied to an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    /// Internal pull-up; the button shorts the pin to ground.
    Up,
    /// Internal pull-down; the button connects the pin to 3.3V.
    Down,
    /// No internal resistor.
    Off,
}

/// Level transitions that count as a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// Low to high.
    Rising,
    /// High to low.
    Falling,
    /// Either transition.
    Both,
}

/// Fixed mapping from a button to its pin. Set once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinBinding {
    /// Button the pin reports for.
    pub button: Button,
    /// BCM pin number.
    pub pin: u8,
    /// Pull resistor to configure.
    pub pull: Pull,
    /// Transitions that count as a press.
    pub edge: Edge,
    /// Minimum time between accepted edges.
    pub debounce: Duration,
}

/// Called from the GPIO backend's thread with the edge timestamp.
pub type EdgeCallback = Box<dyn FnMut(Instant) + Send + 'static>;

/// GPIO subsystem seen by [`InputSignals`].
pub trait Gpio {
    /// Claims `pin` as an input with the given pull resistor.
    fn configure_pin(&mut self, pin: u8, pull: Pull) -> Result<(), SignalError>;

    /// Invokes `callback` asynchronously on every matching edge of `pin`.
    fn on_edge(&mut self, pin: u8, edge: Edge, callback: EdgeCallback) -> Result<(), SignalError>;
}
