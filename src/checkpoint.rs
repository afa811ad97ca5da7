//! Durable resume-index store.
//!
//! A single decimal integer in `resume_index.txt` under the output root,
//! holding the last index confirmed written. Absence means either a fresh
//! job or a finished one; the driver disambiguates by looking at the output
//! tree. The record only ever advances after the corresponding tiles are on
//! disk, which is the whole resumability contract.

use crate::error::CheckpointError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the checkpoint record under the output root.
pub const CHECKPOINT_FILE: &str = "resume_index.txt";

/// Handle on the on-disk checkpoint record.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store for the record under `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(CHECKPOINT_FILE),
        }
    }

    /// Location of the record on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a record currently exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The next index to generate: 0 when there is no record, otherwise the
    /// stored last-completed index plus one. Malformed or unreadable content
    /// restarts from 0 rather than aborting; tiles are regenerated at the
    /// same deterministic paths, so starting over is always safe.
    #[must_use]
    pub fn next_index(&self) -> u64 {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!("checkpoint unreadable ({e}); starting from index 0");
                }
                return 0;
            }
        };
        match content.trim().parse::<u64>() {
            Ok(last_completed) => last_completed + 1,
            Err(_) => {
                tracing::warn!(
                    "malformed checkpoint content {:?}; starting from index 0",
                    content.trim()
                );
                0
            }
        }
    }

    /// Persists `last_completed`. Writes a sibling temp file and renames it
    /// over the record, so an interrupted save leaves the old value intact.
    pub fn save(&self, last_completed: u64) -> Result<(), CheckpointError> {
        let tmp = self.path.with_extension("txt.tmp");
        fs::write(&tmp, last_completed.to_string()).map_err(CheckpointError::Write)?;
        fs::rename(&tmp, &self.path).map_err(CheckpointError::Write)
    }

    /// Removes the record, signaling job completion. An already-absent
    /// record is not an error.
    pub fn clear(&self) -> Result<(), CheckpointError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CheckpointError::Remove(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_record_starts_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        assert!(!store.exists());
        assert_eq!(store.next_index(), 0);
    }

    #[test]
    fn save_then_resume_after_stored_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        store.save(2047).unwrap();
        assert!(store.exists());
        assert_eq!(store.next_index(), 2048);

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "2047");
    }

    #[test]
    fn malformed_record_starts_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        fs::write(store.path(), "abc").unwrap();
        assert_eq!(store.next_index(), 0);
    }

    #[test]
    fn saves_are_monotonic_over_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        for last in [3u64, 7, 11, 15] {
            store.save(last).unwrap();
            assert_eq!(store.next_index(), last + 1);
        }
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        store.save(5).unwrap();
        store.clear().unwrap();
        assert!(!store.exists());
        store.clear().unwrap();
    }
}
