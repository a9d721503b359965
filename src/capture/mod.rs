//! Camera input and frame handling.
//!
//! This module provides abstractions for enumerating and opening cameras,
//! pulling preview frames, and the camera's configuration. Real hardware is
//! behind the `camera` feature; [`MockBackend`] generates synthetic frames.

mod camera;
mod config;
mod frame;
#[cfg(feature = "camera")]
mod native;

pub use camera::{Camera, CameraBackend, CameraError, DeviceId, MockBackend, MockCamera};
pub use config::{CaptureConfig, DEFAULT_CAMERA_FPS};
pub use frame::{Frame, Resolution, BYTES_PER_PIXEL};
#[cfg(feature = "camera")]
pub use native::{NokhwaBackend, NokhwaCamera};
