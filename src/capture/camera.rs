//! Camera abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.
//! A [`CameraBackend`] enumerates and opens devices; the [`Camera`] it hands
//! back is already streaming and is owned by the capture loop.

use super::{CaptureConfig, Frame, Resolution};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Enumeration failed, or the selected device is not in the list.
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    /// The device exists but its stream could not be opened.
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    /// The requested capture settings were rejected.
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    /// A frame could not be read or decoded.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    /// No frame has arrived yet.
    #[error("camera returned no frame data")]
    NoFrame,
    /// The camera was used after `stop`.
    #[error("camera is stopped")]
    Stopped,
}

/// Identifies one enumerated capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId {
    /// Position of the device in the enumeration.
    pub index: u32,
    /// Human-readable device name.
    pub name: String,
    /// Address the backend opens the device by, when it is not `index`
    /// (a device path or platform identifier string).
    pub path: Option<String>,
}

impl DeviceId {
    /// Creates a device identifier.
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            path: None,
        }
    }

    /// Attaches the backend's own address for the device.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({})", self.index, self.name)
    }
}

/// Enumerates and opens capture devices.
pub trait CameraBackend {
    /// Handle type produced by [`CameraBackend::open`].
    type Camera: Camera;

    /// Lists the capture devices currently available.
    fn list_devices(&mut self) -> Result<Vec<DeviceId>, CameraError>;

    /// Opens the device and starts streaming at the configured resolution.
    fn open(&mut self, device: &DeviceId, config: &CaptureConfig)
        -> Result<Self::Camera, CameraError>;
}

/// An open, started capture device.
pub trait Camera {
    /// Returns true if a frame newer than the last fetched one is available.
    ///
    /// Never blocks.
    fn has_new_frame(&mut self) -> bool;

    /// Fetches the newest frame into `buffer`, reusing its allocation.
    fn fetch_into(&mut self, buffer: &mut Frame) -> Result<(), CameraError>;

    /// Fetches the newest frame into a freshly allocated buffer.
    fn fetch(&mut self) -> Result<Frame, CameraError>;

    /// Stops streaming and releases the device.
    fn stop(&mut self);

    /// Returns true until [`Camera::stop`] has been called.
    fn is_running(&self) -> bool;
}

/// Mock backend that hands out [`MockCamera`]s.
#[derive(Debug, Clone)]
pub struct MockBackend {
    devices: Vec<DeviceId>,
    opened: usize,
}

impl MockBackend {
    /// Creates a backend exposing a single synthetic device.
    pub fn new() -> Self {
        Self::with_devices(vec![DeviceId::new(0, "mock camera")])
    }

    /// Creates a backend exposing the given devices.
    pub fn with_devices(devices: Vec<DeviceId>) -> Self {
        Self { devices, opened: 0 }
    }

    /// Creates a backend with no devices at all.
    pub fn empty() -> Self {
        Self::with_devices(Vec::new())
    }

    /// Number of cameras opened so far.
    pub fn opened(&self) -> usize {
        self.opened
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for MockBackend {
    type Camera = MockCamera;

    fn list_devices(&mut self) -> Result<Vec<DeviceId>, CameraError> {
        Ok(self.devices.clone())
    }

    fn open(
        &mut self,
        device: &DeviceId,
        config: &CaptureConfig,
    ) -> Result<MockCamera, CameraError> {
        if !self.devices.contains(device) {
            return Err(CameraError::DeviceNotFound(device.to_string()));
        }
        let mut camera = MockCamera::new();
        camera.start(config)?;
        self.opened += 1;
        tracing::info!(device = %device, "MockCamera opened");
        Ok(camera)
    }
}

/// Mock camera for testing that generates synthetic frames.
///
/// Frame readiness and fetch failures can be scripted; once a script runs
/// out, frames are always ready and fetches succeed.
#[derive(Debug, Default)]
pub struct MockCamera {
    resolution: Option<Resolution>,
    running: bool,
    sequence: u64,
    ready_script: VecDeque<bool>,
    fetch_script: VecDeque<bool>,
    fetches: u64,
    stops: u32,
    polls_after_stop: u32,
}

impl MockCamera {
    /// Creates a camera that has not been started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the config and starts streaming.
    pub fn start(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.resolution = Some(config.resolution());
        self.running = true;
        self.sequence = 0;
        Ok(())
    }

    /// Queues the answers of upcoming `has_new_frame` calls.
    pub fn script_ready(&mut self, ready: impl IntoIterator<Item = bool>) {
        self.ready_script.extend(ready);
    }

    /// Queues the outcome of upcoming fetches (`false` fails with `NoFrame`).
    pub fn script_fetches(&mut self, outcomes: impl IntoIterator<Item = bool>) {
        self.fetch_script.extend(outcomes);
    }

    /// Number of successful fetches.
    pub fn fetches(&self) -> u64 {
        self.fetches
    }

    /// Number of times `stop` was called.
    pub fn stops(&self) -> u32 {
        self.stops
    }

    /// Number of `has_new_frame` calls made after the camera was stopped.
    pub fn polls_after_stop(&self) -> u32 {
        self.polls_after_stop
    }

    fn next_pixels(&mut self) -> Result<(Resolution, Vec<u8>), CameraError> {
        let resolution = self.resolution.ok_or(CameraError::Stopped)?;
        if !self.running {
            return Err(CameraError::Stopped);
        }
        if !self.fetch_script.pop_front().unwrap_or(true) {
            return Err(CameraError::NoFrame);
        }

        self.sequence += 1;
        self.fetches += 1;

        // Horizontal gradient shifted by the sequence so frames differ.
        let width = resolution.width as usize;
        let shift = self.sequence as usize;
        let mut pixels = Vec::with_capacity(resolution.rgb_len());
        for i in 0..resolution.pixel_count() {
            let x = i % width;
            let v = ((x + shift) % 256) as u8;
            pixels.extend_from_slice(&[v, v / 2, 255 - v]);
        }
        Ok((resolution, pixels))
    }
}

impl Camera for MockCamera {
    fn has_new_frame(&mut self) -> bool {
        if !self.running {
            self.polls_after_stop += 1;
            return false;
        }
        self.ready_script.pop_front().unwrap_or(true)
    }

    fn fetch_into(&mut self, buffer: &mut Frame) -> Result<(), CameraError> {
        let (resolution, pixels) = self.next_pixels()?;
        buffer.overwrite(&pixels, resolution.width, resolution.height, self.sequence);
        Ok(())
    }

    fn fetch(&mut self) -> Result<Frame, CameraError> {
        let (resolution, pixels) = self.next_pixels()?;
        Ok(Frame::new(
            pixels,
            resolution.width,
            resolution.height,
            self.sequence,
        ))
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.running = false;
        tracing::info!("MockCamera stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> CaptureConfig {
        CaptureConfig::with_dimensions(8, 4)
    }

    #[test]
    fn test_mock_camera_lifecycle() {
        let mut backend = MockBackend::new();
        let devices = backend.list_devices().unwrap();
        assert_eq!(devices.len(), 1);

        let mut camera = backend.open(&devices[0], &small_config()).unwrap();
        assert!(camera.is_running());
        assert!(camera.has_new_frame());

        let frame = camera.fetch().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);

        let frame2 = camera.fetch().unwrap();
        assert_eq!(frame2.sequence(), 2);

        camera.stop();
        assert!(!camera.is_running());
        assert_eq!(camera.stops(), 1);
    }

    #[test]
    fn test_fetch_after_stop_fails() {
        let mut camera = MockCamera::new();
        camera.start(&small_config()).unwrap();
        camera.stop();

        assert!(matches!(camera.fetch(), Err(CameraError::Stopped)));
        assert!(!camera.has_new_frame());
        assert_eq!(camera.polls_after_stop(), 1);
    }

    #[test]
    fn test_scripted_readiness_and_failures() {
        let mut camera = MockCamera::new();
        camera.start(&small_config()).unwrap();
        camera.script_ready([false, true]);
        camera.script_fetches([false]);

        assert!(!camera.has_new_frame());
        assert!(camera.has_new_frame());
        assert!(matches!(camera.fetch(), Err(CameraError::NoFrame)));
        assert!(camera.fetch().is_ok());
        assert_eq!(camera.fetches(), 1);
    }

    #[test]
    fn test_fetch_into_overwrites_buffer() {
        let config = small_config();
        let mut camera = MockCamera::new();
        camera.start(&config).unwrap();

        let mut buffer = Frame::blank(config.resolution());
        camera.fetch_into(&mut buffer).unwrap();

        assert!(buffer.is_valid());
        assert_eq!(buffer.sequence(), 1);
    }

    #[test]
    fn test_open_unknown_device() {
        let mut backend = MockBackend::new();
        let result = backend.open(&DeviceId::new(3, "missing"), &small_config());
        assert!(matches!(result, Err(CameraError::DeviceNotFound(_))));
        assert_eq!(backend.opened(), 0);
    }

    #[test]
    fn test_device_path_survives_open() {
        let device = DeviceId::new(0, "usb camera").with_path("/dev/video2");
        let mut backend = MockBackend::with_devices(vec![device.clone()]);

        let listed = backend.list_devices().unwrap();
        assert_eq!(listed[0].path.as_deref(), Some("/dev/video2"));
        assert!(backend.open(&listed[0], &small_config()).is_ok());
        assert_eq!(DeviceId::new(0, "usb camera").path, None);
    }
}
