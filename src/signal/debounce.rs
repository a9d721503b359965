use std::time::{Duration, Instant};

/// Suppresses edges closer together than a fixed window.
///
/// The window is measured from the last *accepted* edge, so a long burst of
/// bounce noise yields one press per window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    /// Creates a debouncer with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Returns true if an edge at `at` counts as a press.
    pub fn accept(&mut self, at: Instant) -> bool {
        match self.last_accepted {
            // Out-of-order timestamps saturate to zero and are rejected.
            Some(last) if at.saturating_duration_since(last) < self.window => false,
            _ => {
                self.last_accepted = Some(at);
                true
            }
        }
    }

    /// The configured window.
    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn test_first_edge_accepted() {
        let mut debouncer = Debouncer::new(WINDOW);
        assert!(debouncer.accept(Instant::now()));
    }

    #[test]
    fn test_edges_inside_window_suppressed() {
        let mut debouncer = Debouncer::new(WINDOW);
        let t0 = Instant::now();

        assert!(debouncer.accept(t0));
        assert!(!debouncer.accept(t0 + Duration::from_millis(5)));
        assert!(!debouncer.accept(t0 + Duration::from_millis(299)));
        assert!(debouncer.accept(t0 + WINDOW));
    }

    #[test]
    fn test_window_measured_from_accepted_edge() {
        let mut debouncer = Debouncer::new(WINDOW);
        let t0 = Instant::now();

        assert!(debouncer.accept(t0));
        assert!(!debouncer.accept(t0 + Duration::from_millis(200)));
        // Only 150ms after the suppressed edge.
        assert!(debouncer.accept(t0 + Duration::from_millis(350)));
    }

    proptest! {
        #[test]
        fn prop_accepted_edges_are_a_window_apart(offsets in prop::collection::vec(0u64..2_000, 1..50)) {
            let mut offsets = offsets;
            offsets.sort_unstable();

            let t0 = Instant::now();
            let mut debouncer = Debouncer::new(WINDOW);
            let accepted: Vec<u64> = offsets
                .iter()
                .copied()
                .filter(|&ms| debouncer.accept(t0 + Duration::from_millis(ms)))
                .collect();

            prop_assert!(!accepted.is_empty());
            for pair in accepted.windows(2) {
                prop_assert!(pair[1] - pair[0] >= WINDOW.as_millis() as u64);
            }
        }
    }
}
