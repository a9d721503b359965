//! Camera capture configuration.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Resolution;

/// Frame rate requested from the camera unless configured otherwise.
pub const DEFAULT_CAMERA_FPS: u32 = 30;

/// Highest rate accepted for either the camera or preview pacing.
const MAX_FPS: u32 = 120;

/// Configuration for camera capture and preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Index into the enumerated camera list.
    pub device_index: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate requested from the camera stream.
    pub camera_fps: u32,
    /// Upper bound on preview ticks per second (0 disables pacing).
    pub preview_fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 1920,
            height: 1080,
            camera_fps: DEFAULT_CAMERA_FPS,
            preview_fps: 30,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Returns the configured output size.
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Returns the minimum time between preview ticks, if pacing is enabled.
    pub fn tick_interval(&self) -> Option<Duration> {
        (self.preview_fps > 0).then(|| Duration::from_secs(1) / self.preview_fps)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.preview_fps > MAX_FPS || !(1..=MAX_FPS).contains(&self.camera_fps) {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_tick_interval() {
        let mut config = CaptureConfig::default();
        assert_eq!(config.tick_interval(), Some(Duration::from_secs(1) / 30));
        config.preview_fps = 0;
        assert_eq!(config.tick_interval(), None);
    }

    #[test]
    fn test_unpaced_preview_keeps_camera_rate() {
        let config = CaptureConfig {
            preview_fps: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), None);
        assert_eq!(config.camera_fps, DEFAULT_CAMERA_FPS);
    }

    #[test]
    fn test_camera_rate_bounds() {
        for camera_fps in [0, MAX_FPS + 1] {
            let config = CaptureConfig {
                camera_fps,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidFrameRate)
            ));
        }
    }
}
