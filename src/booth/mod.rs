//! Event model, controller and capture loop.
//!
//! The loop is single-threaded because the camera and display handles are
//! not safe to share. Input arrives asynchronously through [`BoothHandle`]s
//! that only append to the [`EventQueue`]; the loop drains it without
//! blocking on every iteration.
//!
//! ```text
//!  GPIO / Ctrl-C / console ──► BoothHandle ──► EventQueue
//!                                                  │
//!  loop: preview tick ─► drain ─► capture | teardown
//! ```

mod controller;
mod event;

pub use controller::{LoopState, LoopStats, Photobooth};
pub use event::{BoothHandle, Event, EventQueue};

use crate::capture::CameraError;
use crate::config::ConfigError;
use crate::display::DisplayError;
use crate::signal::SignalError;
use thiserror::Error;

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum BoothError {
    /// Enumeration returned an empty device list.
    #[error("no cameras detected")]
    NoCameraDetected,
    /// The selected camera could not be opened.
    #[error(transparent)]
    Camera(#[from] CameraError),
    /// The preview surface could not be created.
    #[error(transparent)]
    Display(#[from] DisplayError),
    /// A button could not be wired.
    #[error(transparent)]
    Signal(#[from] SignalError),
    /// Settings failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
