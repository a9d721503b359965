//! Photobooth Library
//!
//! Drives a single-board-computer photo booth: a fullscreen live camera
//! preview, a capture button that saves a still as PNG, and a quit button
//! that shuts everything down cleanly.
//!
//! # Architecture
//!
//! ```text
//! signal (GPIO, Ctrl-C, console) → booth::EventQueue
//!                                        ↓
//! capture → booth::Photobooth (preview tick, event drain) → display
//!                                        ↓
//!                                     storage
//! ```
//!
//! Only the event queue crosses threads. The camera and the display are
//! owned by the thread running the capture loop.
//!
//! # Example
//!
//! ```no_run
//! use photobooth::{
//!     booth::Photobooth,
//!     capture::MockBackend,
//!     config::FileConfig,
//!     display::HeadlessBackend,
//!     storage::PngStore,
//! };
//!
//! let config = FileConfig::default();
//! let mut booth = Photobooth::initialize(
//!     &config.capture,
//!     &config.storage,
//!     &mut MockBackend::new(),
//!     &mut HeadlessBackend::new(),
//!     PngStore::new(),
//! )
//! .unwrap();
//!
//! let handle = booth.handle();
//! handle.capture();
//! handle.exit();
//!
//! let stats = booth.run();
//! assert_eq!(stats.captures_saved, 1);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod booth;
pub mod capture;
pub mod config;
pub mod display;
pub mod metrics;
pub mod signal;
pub mod storage;

// Re-export commonly used types at crate root
pub use booth::{BoothError, BoothHandle, Event, EventQueue, LoopState, LoopStats, Photobooth};
pub use capture::{Camera, CameraBackend, CaptureConfig, Frame, MockBackend, Resolution};
pub use config::{ConfigError, FileConfig};
pub use display::{Display, DisplayBackend, HeadlessBackend};
pub use signal::{Button, Debouncer, InputSignals, PinBinding};
pub use storage::{CaptureSaver, ImageStore, PngStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
