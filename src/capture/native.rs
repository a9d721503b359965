//! Hardware camera backend built on `nokhwa`.
//!
//! Frames are pulled by nokhwa's capture thread; the callback only bumps a
//! counter, so `has_new_frame` is a single atomic load on the loop thread.

use super::{Camera, CameraBackend, CameraError, CaptureConfig, DeviceId, Frame};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat,
        RequestedFormatType, Resolution as NokhwaResolution,
    },
    Buffer, CallbackCamera,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Enumerates and opens cameras through the platform's native API.
#[derive(Debug, Default)]
pub struct NokhwaBackend;

impl NokhwaBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl CameraBackend for NokhwaBackend {
    type Camera = NokhwaCamera;

    fn list_devices(&mut self) -> Result<Vec<DeviceId>, CameraError> {
        let cameras = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| CameraError::DeviceNotFound(e.to_string()))?;

        Ok(cameras
            .iter()
            .enumerate()
            .map(|(i, info)| match info.index() {
                CameraIndex::Index(n) => DeviceId::new(*n, info.human_name()),
                CameraIndex::String(path) => {
                    DeviceId::new(i as u32, info.human_name()).with_path(path.clone())
                }
            })
            .collect())
    }

    fn open(
        &mut self,
        device: &DeviceId,
        config: &CaptureConfig,
    ) -> Result<NokhwaCamera, CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;

        let arrived = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&arrived);
        let mut inner = CallbackCamera::new(
            native_index(device),
            requested_format(config),
            move |_buffer: Buffer| {
                counter.fetch_add(1, Ordering::Release);
            },
        )
        .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        inner
            .open_stream()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        tracing::info!(
            device = %device,
            resolution = %config.resolution(),
            "Camera stream opened"
        );

        Ok(NokhwaCamera {
            inner,
            arrived,
            consumed: 0,
            running: true,
        })
    }
}

/// Returns the address nokhwa opens `device` by.
fn native_index(device: &DeviceId) -> CameraIndex {
    match &device.path {
        Some(path) => CameraIndex::String(path.clone()),
        None => CameraIndex::Index(device.index),
    }
}

/// The stream format asked of the camera. Preview pacing plays no part.
fn requested_format(config: &CaptureConfig) -> RequestedFormat<'static> {
    RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(camera_format(config)))
}

fn camera_format(config: &CaptureConfig) -> CameraFormat {
    CameraFormat::new(
        NokhwaResolution::new(config.width, config.height),
        FrameFormat::MJPEG,
        config.camera_fps,
    )
}

/// A streaming nokhwa camera.
pub struct NokhwaCamera {
    inner: CallbackCamera,
    /// Frames delivered by the capture thread.
    arrived: Arc<AtomicU64>,
    /// Value of `arrived` at the last fetch.
    consumed: u64,
    running: bool,
}

impl NokhwaCamera {
    fn decode_latest(&mut self) -> Result<(u32, u32, Vec<u8>), CameraError> {
        if !self.running {
            return Err(CameraError::Stopped);
        }
        let arrived = self.arrived.load(Ordering::Acquire);
        if arrived == 0 {
            return Err(CameraError::NoFrame);
        }

        let buffer = self
            .inner
            .last_frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        self.consumed = arrived;
        let (width, height) = (image.width(), image.height());
        Ok((width, height, image.into_raw()))
    }
}

impl Camera for NokhwaCamera {
    fn has_new_frame(&mut self) -> bool {
        self.running && self.arrived.load(Ordering::Acquire) > self.consumed
    }

    fn fetch_into(&mut self, buffer: &mut Frame) -> Result<(), CameraError> {
        let (width, height, pixels) = self.decode_latest()?;
        buffer.overwrite(&pixels, width, height, self.consumed);
        Ok(())
    }

    fn fetch(&mut self) -> Result<Frame, CameraError> {
        let (width, height, pixels) = self.decode_latest()?;
        Ok(Frame::new(pixels, width, height, self.consumed))
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Err(e) = self.inner.stop_stream() {
            tracing::warn!(error = %e, "Failed to stop camera stream cleanly");
        }
        tracing::info!("Camera stream stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
