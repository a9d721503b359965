use super::{ImageStore, StorageError};
use crate::capture::Frame;
use image::{ColorType, ImageFormat};
use std::path::Path;

/// Writes captures to the local filesystem as PNG files.
#[derive(Debug, Default)]
pub struct PngStore;

impl PngStore {
    /// Creates the store.
    pub fn new() -> Self {
        Self
    }
}

impl ImageStore for PngStore {
    fn ensure_directory(&mut self, path: &Path) -> Result<(), StorageError> {
        std::fs::create_dir_all(path).map_err(|source| StorageError::DirectoryCreateFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Save directory ready");
        Ok(())
    }

    fn write_image(&mut self, frame: &Frame, path: &Path) -> Result<(), StorageError> {
        if !frame.is_valid() {
            return Err(StorageError::ImageWriteFailed {
                path: path.to_path_buf(),
                reason: format!("malformed frame {:?}", frame),
            });
        }

        image::save_buffer_with_format(
            path,
            frame.pixels(),
            frame.width(),
            frame.height(),
            ColorType::Rgb8,
            ImageFormat::Png,
        )
        .map_err(|e| StorageError::ImageWriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Resolution;

    fn scratch_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("photobooth-png-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_creates_nested_directory() {
        let root = scratch_dir();
        let nested = root.join("a").join("b");
        let mut store = PngStore::new();

        store.ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());

        // Existing directories are fine.
        store.ensure_directory(&nested).unwrap();
        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_written_png_decodes() {
        let root = scratch_dir();
        let mut store = PngStore::new();
        store.ensure_directory(&root).unwrap();

        let resolution = Resolution::new(4, 3);
        let frame = Frame::new(vec![128u8; resolution.rgb_len()], 4, 3, 1);
        let path = root.join("shot.png");
        store.write_image(&frame, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0).0, [128, 128, 128]);
        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let path = scratch_dir().join("missing").join("shot.png");
        let frame = Frame::blank(Resolution::new(2, 2));
        let result = PngStore::new().write_image(&frame, &path);
        assert!(matches!(result, Err(StorageError::ImageWriteFailed { .. })));
    }
}
