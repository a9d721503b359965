//! Persisting captured frames.
//!
//! Each capture is written once, as a PNG named by a random 128-bit
//! identifier. Failures are reported to the caller and never retried.

mod memory;
mod png;
mod saver;

pub use memory::MemoryStore;
pub use png::PngStore;
pub use saver::{CaptureRecord, CaptureSaver};

use crate::capture::Frame;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extension of saved captures.
pub const CAPTURE_EXTENSION: &str = "png";

/// Errors that can occur while saving a capture.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The save directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreateFailed {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// The capture could not be encoded or written.
    #[error("failed to write image {}: {reason}", path.display())]
    ImageWriteFailed {
        /// Target file.
        path: PathBuf,
        /// Encoder, filesystem or camera error text.
        reason: String,
    },
}

/// Destination for captured images.
pub trait ImageStore {
    /// Creates `path` and any missing parents.
    fn ensure_directory(&mut self, path: &Path) -> Result<(), StorageError>;

    /// Encodes `frame` and writes it to `path`.
    fn write_image(&mut self, frame: &Frame, path: &Path) -> Result<(), StorageError>;
}

/// Generates a collision-resistant capture file name.
pub fn capture_filename() -> String {
    format!("{}.{}", uuid::Uuid::new_v4(), CAPTURE_EXTENSION)
}
