//! Booth configuration.
//!
//! Every setting has a compiled-in default matching the reference booth
//! hardware: a 1920x1080 preview, capture button on BCM 21, quit button on
//! BCM 4, both debounced for 300ms. A TOML file may override any subset.
//!
//! Camera settings live with the camera in [`crate::capture::CaptureConfig`];
//! this module holds the booth-wide sections and the file format tying them
//! together.

use crate::capture::CaptureConfig;
use crate::signal::{Button, Edge, PinBinding, Pull};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name used for saved captures when none is configured.
pub const DEFAULT_SAVE_DIR_NAME: &str = "saved_images";

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Preview pacing above 120 fps, or a camera rate outside 1-120 fps.
    #[error("invalid frame rate (preview 0-120 fps, camera 1-120 fps)")]
    InvalidFrameRate,
    /// A button was configured with a zero debounce window.
    #[error("debounce window for {0} button must be non-zero")]
    InvalidDebounce(Button),
    /// Both buttons are wired to the same pin.
    #[error("capture and quit buttons share pin {0}")]
    DuplicatePin(u8),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for [`FileConfig`].
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Button wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// BCM pin of the capture button.
    pub capture_pin: u8,
    /// BCM pin of the quit button.
    pub quit_pin: u8,
    /// Debounce window of the capture button in milliseconds.
    pub capture_debounce_ms: u64,
    /// Debounce window of the quit button in milliseconds.
    pub quit_debounce_ms: u64,
    /// Pull resistor applied to both pins.
    pub pull: Pull,
    /// Edges that count as a press.
    pub edge: Edge,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            capture_pin: 21,
            quit_pin: 4,
            capture_debounce_ms: 300,
            quit_debounce_ms: 300,
            pull: Pull::Down,
            edge: Edge::Both,
        }
    }
}

impl SignalConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture_debounce_ms == 0 {
            return Err(ConfigError::InvalidDebounce(Button::Capture));
        }
        if self.quit_debounce_ms == 0 {
            return Err(ConfigError::InvalidDebounce(Button::Quit));
        }
        if self.capture_pin == self.quit_pin {
            return Err(ConfigError::DuplicatePin(self.capture_pin));
        }
        Ok(())
    }

    /// Expands the wiring into the fixed set of pin bindings.
    pub fn bindings(&self) -> Vec<PinBinding> {
        vec![
            PinBinding {
                button: Button::Quit,
                pin: self.quit_pin,
                pull: self.pull,
                edge: self.edge,
                debounce: Duration::from_millis(self.quit_debounce_ms),
            },
            PinBinding {
                button: Button::Capture,
                pin: self.capture_pin,
                pull: self.pull,
                edge: self.edge,
                debounce: Duration::from_millis(self.capture_debounce_ms),
            },
        ]
    }
}

/// Where captures are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for saved images, created on first capture.
    pub save_directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
        }
    }
}

/// Returns `saved_images` next to the running executable.
pub fn default_save_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_SAVE_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_DIR_NAME))
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metrics server port (0 to disable).
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { port: 9090 }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[capture]`: camera selection, resolution and frame rates.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// `[signals]`: button pins, pulls, edges and debounce windows.
    #[serde(default)]
    pub signals: SignalConfig,
    /// `[storage]`: capture directory.
    #[serde(default)]
    pub storage: StorageConfig,
    /// `[metrics]`: Prometheus exporter.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.signals.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Resolution;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capture.resolution(), Resolution::new(1920, 1080));
        assert_eq!(config.signals.capture_pin, 21);
        assert_eq!(config.signals.quit_pin, 4);
        assert_eq!(config.metrics.port, 9090);
        assert!(config
            .storage
            .save_directory
            .ends_with(DEFAULT_SAVE_DIR_NAME));
    }

    #[test]
    fn test_shared_pin_invalid() {
        let config = SignalConfig {
            capture_pin: 4,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::DuplicatePin(4))));
    }

    #[test]
    fn test_zero_debounce_invalid() {
        let config = SignalConfig {
            quit_debounce_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDebounce(Button::Quit))
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [capture]
            width = 640
            height = 480
            preview_fps = 0

            [signals]
            capture_debounce_ms = 150
            pull = "up"

            [storage]
            save_directory = "/tmp/booth"
            "#,
        )
        .unwrap();

        assert_eq!(config.capture.resolution(), Resolution::new(640, 480));
        assert_eq!(config.capture.device_index, 0);
        assert_eq!(config.capture.preview_fps, 0);
        assert_eq!(config.capture.camera_fps, 30);
        assert_eq!(config.signals.capture_debounce_ms, 150);
        assert_eq!(config.signals.quit_debounce_ms, 300);
        assert_eq!(config.signals.pull, Pull::Up);
        assert_eq!(config.storage.save_directory, PathBuf::from("/tmp/booth"));
    }

    #[test]
    fn test_unparseable_toml_rejected() {
        let result = FileConfig::from_toml("[capture]\nwidth = \"wide\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_bindings_carry_debounce() {
        let config = SignalConfig {
            quit_debounce_ms: 50,
            ..Default::default()
        };
        let bindings = config.bindings();
        let quit = bindings.iter().find(|b| b.button == Button::Quit).unwrap();
        assert_eq!(quit.pin, 4);
        assert_eq!(quit.debounce, Duration::from_millis(50));
        assert_eq!(quit.edge, Edge::Both);
    }
}
