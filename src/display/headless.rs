use super::{Display, DisplayBackend, DisplayError, Origin};
use crate::capture::{Frame, Resolution};

/// Backend for running without a screen.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    created: usize,
}

impl HeadlessBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surfaces created.
    pub fn created(&self) -> usize {
        self.created
    }
}

impl DisplayBackend for HeadlessBackend {
    type Surface = HeadlessDisplay;

    fn create_fullscreen(
        &mut self,
        resolution: Resolution,
    ) -> Result<HeadlessDisplay, DisplayError> {
        self.created += 1;
        tracing::info!(%resolution, "Headless display created");
        Ok(HeadlessDisplay {
            resolution,
            ..Default::default()
        })
    }
}

/// Surface that records what would have been shown.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    resolution: Resolution,
    draws: u64,
    presents: u64,
    last_sequence: Option<u64>,
    released: bool,
    close_requested: bool,
}

impl HeadlessDisplay {
    /// Surface size.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of `draw` calls.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Number of `present` calls.
    pub fn presents(&self) -> u64 {
        self.presents
    }

    /// Sequence number of the last drawn frame.
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// True once `release` ran.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Simulates the user closing the window.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }
}

impl Display for HeadlessDisplay {
    fn draw(&mut self, frame: &Frame, _origin: Origin) {
        self.draws += 1;
        self.last_sequence = Some(frame.sequence());
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        if self.released {
            return Err(DisplayError::PresentFailed("surface released".into()));
        }
        self.presents += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }

    fn close_requested(&self) -> bool {
        self.close_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_draw_and_present() {
        let mut backend = HeadlessBackend::new();
        let mut display = backend.create_fullscreen(Resolution::new(4, 4)).unwrap();
        let frame = Frame::new(vec![0; 48], 4, 4, 9);

        display.draw(&frame, Origin::TOP_LEFT);
        display.present().unwrap();

        assert_eq!(backend.created(), 1);
        assert_eq!(display.draws(), 1);
        assert_eq!(display.presents(), 1);
        assert_eq!(display.last_sequence(), Some(9));
    }

    #[test]
    fn test_present_after_release_fails() {
        let mut display = HeadlessBackend::new()
            .create_fullscreen(Resolution::new(2, 2))
            .unwrap();
        display.release();
        assert!(display.is_released());
        assert!(display.present().is_err());
    }
}
