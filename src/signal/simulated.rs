use super::{Edge, EdgeCallback, Gpio, Pull, SignalError};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// GPIO backend driven by hand, for tests and demos.
///
/// Edges are delivered synchronously on the caller's thread.
#[derive(Default)]
pub struct SimulatedGpio {
    configured: HashMap<u8, Pull>,
    handlers: HashMap<u8, (Edge, EdgeCallback)>,
    unavailable: HashSet<u8>,
}

impl SimulatedGpio {
    /// Creates a backend with every pin available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes claims on `pin` fail, as if another process held it.
    pub fn mark_unavailable(&mut self, pin: u8) {
        self.unavailable.insert(pin);
    }

    /// Pull resistor configured on `pin`.
    pub fn pull(&self, pin: u8) -> Option<Pull> {
        self.configured.get(&pin).copied()
    }

    /// Edge mode registered on `pin`.
    pub fn edge_mode(&self, pin: u8) -> Option<Edge> {
        self.handlers.get(&pin).map(|(edge, _)| *edge)
    }

    /// Fires an edge on `pin` at `at`. Returns false if no handler is bound.
    pub fn edge(&mut self, pin: u8, at: Instant) -> bool {
        match self.handlers.get_mut(&pin) {
            Some((_, callback)) => {
                callback(at);
                true
            }
            None => false,
        }
    }
}

impl Gpio for SimulatedGpio {
    fn configure_pin(&mut self, pin: u8, pull: Pull) -> Result<(), SignalError> {
        if self.unavailable.contains(&pin) {
            return Err(SignalError::PinClaimFailed {
                pin,
                reason: "pin not available".into(),
            });
        }
        if self.configured.contains_key(&pin) {
            return Err(SignalError::PinClaimFailed {
                pin,
                reason: "pin already in use".into(),
            });
        }
        self.configured.insert(pin, pull);
        Ok(())
    }

    fn on_edge(&mut self, pin: u8, edge: Edge, callback: EdgeCallback) -> Result<(), SignalError> {
        if !self.configured.contains_key(&pin) {
            return Err(SignalError::HandlerInstallFailed {
                pin,
                reason: "pin not configured".into(),
            });
        }
        self.handlers.insert(pin, (edge, callback));
        Ok(())
    }
}
