//! Preview output surface.
//!
//! The capture loop draws the current frame buffer every tick and presents
//! it. Surfaces are owned by the loop thread and never shared.

mod headless;
#[cfg(feature = "display")]
mod window;

pub use headless::{HeadlessBackend, HeadlessDisplay};
#[cfg(feature = "display")]
pub use window::{MinifbBackend, MinifbDisplay};

use crate::capture::{Frame, Resolution};
use thiserror::Error;

/// Errors that can occur while driving the display.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The fullscreen surface could not be opened.
    #[error("failed to create display surface: {0}")]
    CreateFailed(String),
    /// The back buffer could not be shown.
    #[error("failed to present frame: {0}")]
    PresentFailed(String),
}

/// Top-left position of a drawn frame on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Origin {
    /// Horizontal offset in pixels.
    pub x: i32,
    /// Vertical offset in pixels.
    pub y: i32,
}

impl Origin {
    /// The surface's top-left corner.
    pub const TOP_LEFT: Origin = Origin { x: 0, y: 0 };
}

/// Creates fullscreen surfaces.
pub trait DisplayBackend {
    /// Surface type produced by this backend.
    type Surface: Display;

    /// Opens a fullscreen surface at `resolution`.
    fn create_fullscreen(&mut self, resolution: Resolution)
        -> Result<Self::Surface, DisplayError>;
}

/// A surface the preview is drawn to.
pub trait Display {
    /// Copies `frame` onto the back buffer at `origin`.
    fn draw(&mut self, frame: &Frame, origin: Origin);

    /// Makes the back buffer visible.
    fn present(&mut self) -> Result<(), DisplayError>;

    /// Closes the surface. Called once during teardown.
    fn release(&mut self);

    /// Returns true if the user asked the surface to close.
    fn close_requested(&self) -> bool {
        false
    }
}
