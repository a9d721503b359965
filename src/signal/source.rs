use super::{Debouncer, Gpio, PinBinding, SignalError};
use crate::booth::BoothHandle;
use std::collections::HashSet;

/// Installed button bindings.
///
/// Holds the GPIO backend for as long as the buttons should stay live;
/// dropping it releases the pins.
pub struct InputSignals<G: Gpio> {
    gpio: G,
    bindings: Vec<PinBinding>,
}

impl<G: Gpio> InputSignals<G> {
    /// Claims every bound pin and routes debounced edges to `handle`.
    ///
    /// Any claim failure aborts startup.
    pub fn install(
        mut gpio: G,
        bindings: Vec<PinBinding>,
        handle: &BoothHandle,
    ) -> Result<Self, SignalError> {
        let mut claimed = HashSet::new();

        for binding in &bindings {
            if !claimed.insert(binding.pin) {
                return Err(SignalError::PinClaimFailed {
                    pin: binding.pin,
                    reason: "pin bound to more than one button".into(),
                });
            }

            gpio.configure_pin(binding.pin, binding.pull)?;

            let mut debouncer = Debouncer::new(binding.debounce);
            let handle = handle.clone();
            let button = binding.button;
            let pin = binding.pin;
            gpio.on_edge(
                binding.pin,
                binding.edge,
                Box::new(move |at| {
                    if debouncer.accept(at) {
                        tracing::debug!(pin, %button, "Button pressed");
                        handle.signal(button);
                    } else {
                        tracing::trace!(pin, %button, "Edge suppressed by debounce");
                    }
                }),
            )?;

            tracing::info!(
                pin = binding.pin,
                button = %binding.button,
                debounce_ms = binding.debounce.as_millis() as u64,
                edge = ?binding.edge,
                "Button bound"
            );
        }

        Ok(Self { gpio, bindings })
    }

    /// The installed bindings.
    pub fn bindings(&self) -> &[PinBinding] {
        &self.bindings
    }

    /// The GPIO backend.
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Mutable access to the GPIO backend.
    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booth::{Event, EventQueue};
    use crate::signal::{Button, Edge, Pull, SimulatedGpio};
    use std::time::{Duration, Instant};

    fn binding(button: Button, pin: u8) -> PinBinding {
        PinBinding {
            button,
            pin,
            pull: Pull::Down,
            edge: Edge::Both,
            debounce: Duration::from_millis(300),
        }
    }

    fn handle(queue: &EventQueue) -> BoothHandle {
        BoothHandle::new(queue.clone())
    }

    #[test]
    fn test_edges_become_events() {
        let queue = EventQueue::new();
        let mut signals = InputSignals::install(
            SimulatedGpio::new(),
            vec![binding(Button::Quit, 4), binding(Button::Capture, 21)],
            &handle(&queue),
        )
        .unwrap();

        let t0 = Instant::now();
        assert!(signals.gpio_mut().edge(21, t0));
        assert!(signals.gpio_mut().edge(4, t0));

        assert_eq!(
            queue.drain(),
            vec![Event::CaptureRequested, Event::QuitRequested]
        );
        assert_eq!(signals.gpio().pull(21), Some(Pull::Down));
    }

    #[test]
    fn test_pins_debounce_independently() {
        let queue = EventQueue::new();
        let mut signals = InputSignals::install(
            SimulatedGpio::new(),
            vec![binding(Button::Quit, 4), binding(Button::Capture, 21)],
            &handle(&queue),
        )
        .unwrap();

        let t0 = Instant::now();
        let gpio = signals.gpio_mut();
        gpio.edge(21, t0);
        gpio.edge(21, t0 + Duration::from_millis(10));
        gpio.edge(4, t0 + Duration::from_millis(20));

        assert_eq!(
            queue.drain(),
            vec![Event::CaptureRequested, Event::QuitRequested]
        );
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let queue = EventQueue::new();
        let result = InputSignals::install(
            SimulatedGpio::new(),
            vec![binding(Button::Quit, 4), binding(Button::Capture, 4)],
            &handle(&queue),
        );
        assert!(matches!(
            result,
            Err(SignalError::PinClaimFailed { pin: 4, .. })
        ));
    }

    #[test]
    fn test_unavailable_pin_is_fatal() {
        let queue = EventQueue::new();
        let mut gpio = SimulatedGpio::new();
        gpio.mark_unavailable(21);

        let result = InputSignals::install(
            gpio,
            vec![binding(Button::Capture, 21)],
            &handle(&queue),
        );
        assert!(matches!(
            result,
            Err(SignalError::PinClaimFailed { pin: 21, .. })
        ));
    }
}
