use super::{ImageStore, StorageError};
use crate::capture::Frame;
use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory store for exercising the capture path without a disk.
///
/// Writes into a directory that was never ensured fail, like a real
/// filesystem would. Failures can be scripted per call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    directories: HashSet<PathBuf>,
    written: Vec<(PathBuf, u64)>,
    ensure_calls: u32,
    write_attempts: u32,
    fail_directories: bool,
    write_script: VecDeque<bool>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every directory creation fail with a permission error.
    pub fn fail_directories(&mut self, fail: bool) {
        self.fail_directories = fail;
    }

    /// Queues the outcome of upcoming writes (`false` simulates a full disk).
    pub fn script_writes(&mut self, outcomes: impl IntoIterator<Item = bool>) {
        self.write_script.extend(outcomes);
    }

    /// Paths and frame sequence numbers written so far, in order.
    pub fn written(&self) -> &[(PathBuf, u64)] {
        &self.written
    }

    /// Number of `ensure_directory` calls.
    pub fn ensure_calls(&self) -> u32 {
        self.ensure_calls
    }

    /// Number of `write_image` calls, successful or not.
    pub fn write_attempts(&self) -> u32 {
        self.write_attempts
    }

    /// True if `path` was created.
    pub fn has_directory(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }
}

impl ImageStore for MemoryStore {
    fn ensure_directory(&mut self, path: &Path) -> Result<(), StorageError> {
        self.ensure_calls += 1;
        if self.fail_directories {
            return Err(StorageError::DirectoryCreateFailed {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                self.directories.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn write_image(&mut self, frame: &Frame, path: &Path) -> Result<(), StorageError> {
        self.write_attempts += 1;
        let fail = |reason: &str| StorageError::ImageWriteFailed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let parent_exists = path
            .parent()
            .is_some_and(|parent| self.directories.contains(parent));
        if !parent_exists {
            return Err(fail("no such directory"));
        }
        if !self.write_script.pop_front().unwrap_or(true) {
            return Err(fail("no space left on device"));
        }

        self.written.push((path.to_path_buf(), frame.sequence()));
        Ok(())
    }
}
