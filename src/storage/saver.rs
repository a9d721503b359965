use super::{capture_filename, ImageStore, StorageError};
use crate::capture::Frame;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// A capture that made it to storage.
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    /// Where the image was written.
    pub path: PathBuf,
    /// Camera sequence number of the saved frame.
    pub sequence: u64,
    /// Wall-clock time the write completed.
    pub saved_at: DateTime<Local>,
}

/// Saves captures into one directory.
///
/// The directory is created on the first save and assumed present after
/// that. A failed write clears the assumption so the next capture creates
/// the directory again if it disappeared.
#[derive(Debug)]
pub struct CaptureSaver {
    directory: PathBuf,
    directory_ready: bool,
}

impl CaptureSaver {
    /// Creates a saver writing into `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            directory_ready: false,
        }
    }

    /// Target directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `frame` under a fresh random name. Exactly one write attempt.
    pub fn save<S: ImageStore>(
        &mut self,
        store: &mut S,
        frame: &Frame,
    ) -> Result<CaptureRecord, StorageError> {
        if !self.directory_ready {
            store.ensure_directory(&self.directory)?;
            self.directory_ready = true;
        }

        let path = self.directory.join(capture_filename());
        if let Err(e) = store.write_image(frame, &path) {
            self.directory_ready = false;
            return Err(e);
        }

        Ok(CaptureRecord {
            path,
            sequence: frame.sequence(),
            saved_at: Local::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Resolution;
    use crate::storage::MemoryStore;

    fn frame(sequence: u64) -> Frame {
        Frame::new(vec![0; Resolution::new(2, 2).rgb_len()], 2, 2, sequence)
    }

    #[test]
    fn test_directory_created_once() {
        let mut store = MemoryStore::new();
        let mut saver = CaptureSaver::new("/booth/saved_images");

        let first = saver.save(&mut store, &frame(1)).unwrap();
        let second = saver.save(&mut store, &frame(2)).unwrap();

        assert_eq!(store.ensure_calls(), 1);
        assert_ne!(first.path, second.path);
        assert!(first.path.starts_with("/booth/saved_images"));
        assert_eq!(second.sequence, 2);
    }

    #[test]
    fn test_directory_failure_reported() {
        let mut store = MemoryStore::new();
        store.fail_directories(true);
        let mut saver = CaptureSaver::new("/ro/shots");

        let result = saver.save(&mut store, &frame(1));
        assert!(matches!(
            result,
            Err(StorageError::DirectoryCreateFailed { .. })
        ));
        assert_eq!(store.write_attempts(), 0);

        // Retried on the next capture, not this one.
        store.fail_directories(false);
        assert!(saver.save(&mut store, &frame(2)).is_ok());
        assert_eq!(store.ensure_calls(), 2);
    }

    #[test]
    fn test_write_failure_rechecks_directory() {
        let mut store = MemoryStore::new();
        let mut saver = CaptureSaver::new("/shots");
        store.script_writes([false]);

        assert!(saver.save(&mut store, &frame(1)).is_err());
        assert!(saver.save(&mut store, &frame(2)).is_ok());
        assert_eq!(store.ensure_calls(), 2);
        assert_eq!(store.written().len(), 1);
    }
}
