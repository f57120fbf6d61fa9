//! Checkpoint file store

use crate::adapters::atomic::write_atomic;
use crate::core::checkpoint::Checkpoint;
use crate::domain::{QuillError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Durable checkpoint file
///
/// The file is present only while a run is incomplete. Clones share the
/// count of successful saves.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
    saves: Arc<AtomicUsize>,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Successful saves through this store and its clones
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the persisted checkpoint, or an empty one if there is none
    ///
    /// # Errors
    ///
    /// Returns a checkpoint error if the file exists but cannot be read or
    /// is not a JSON object of strings.
    pub fn load(&self) -> Result<Checkpoint> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No checkpoint found, starting fresh");
                return Ok(Checkpoint::new());
            }
            Err(e) => {
                return Err(QuillError::Checkpoint(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        let checkpoint: Checkpoint = serde_json::from_str(&contents).map_err(|e| {
            QuillError::Checkpoint(format!(
                "{} is not a valid checkpoint: {e}",
                self.path.display()
            ))
        })?;

        tracing::info!(
            path = %self.path.display(),
            entries = checkpoint.len(),
            "Loaded checkpoint"
        );
        Ok(checkpoint)
    }

    /// Persist the checkpoint, replacing the previous file atomically
    ///
    /// # Errors
    ///
    /// Returns a checkpoint error if serialisation or the write fails. The
    /// previous file is left intact in that case.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let bytes = serde_json::to_vec(checkpoint)
            .map_err(|e| QuillError::Checkpoint(format!("Failed to serialise checkpoint: {e}")))?;

        write_atomic(&self.path, &bytes).map_err(|e| {
            QuillError::Checkpoint(format!("Failed to write {}: {e}", self.path.display()))
        })?;
        self.saves.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(path = %self.path.display(), entries = checkpoint.len(), "Saved checkpoint");
        Ok(())
    }

    /// Remove the checkpoint file; a missing file is not an error
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Checkpoint cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(QuillError::Checkpoint(format!(
                "Failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CodeId;
    use tempfile::TempDir;

    fn sample() -> Checkpoint {
        [(CodeId::new("A0428").unwrap(), "Ambulance service".to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        assert!(!store.exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        store.save(&sample()).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), sample());

        store.clear().unwrap();
        assert!(!store.exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_clones_share_save_count() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        let clone = store.clone();

        store.save(&sample()).unwrap();
        clone.save(&sample()).unwrap();
        clone.clear().unwrap();

        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn test_corrupt_checkpoint_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checkpoint.json");
        fs::write(&path, "{\"A0428\": ").unwrap();

        let err = CheckpointStore::new(&path).load().unwrap_err();
        assert!(matches!(err, QuillError::Checkpoint(_)));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        store.save(&sample()).unwrap();
        store.save(&sample()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }
}
