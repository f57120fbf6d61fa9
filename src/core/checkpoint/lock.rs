//! Run lock
//!
//! A lock file next to the checkpoint, created with create-new semantics,
//! marks a run in progress. It is removed when the [`RunLock`] is dropped.

use crate::domain::{QuillError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Contents of the lock file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub run_id: Uuid,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

/// Lock file path for a checkpoint: `<checkpoint>.lock`
pub fn lock_path_for(checkpoint: &Path) -> PathBuf {
    let mut name = checkpoint.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

/// Exclusive claim on a checkpoint for the duration of one run
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    record: LockRecord,
}

impl RunLock {
    /// Acquire the lock at `path`
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Lock`] if the file already exists, naming the
    /// holder when its record is readable. Other I/O failures are reported
    /// as [`QuillError::Io`].
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = match Self::read_holder(&path) {
                    Some(record) => format!(
                        "run {} (pid {}) since {}",
                        record.run_id,
                        record.pid,
                        record.started_at.to_rfc3339()
                    ),
                    None => "an unknown run".to_string(),
                };
                return Err(QuillError::Lock(format!(
                    "{} is held by {holder}; remove the file if that run is no longer active",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(QuillError::Io(format!(
                    "Failed to create lock file {}: {e}",
                    path.display()
                )))
            }
        };

        let record = LockRecord {
            run_id: Uuid::new_v4(),
            pid: std::process::id(),
            started_at: Utc::now(),
        };
        let write = serde_json::to_vec(&record)
            .map_err(QuillError::from)
            .and_then(|bytes| {
                file.write_all(&bytes)?;
                file.sync_all()?;
                Ok(())
            });
        if let Err(e) = write {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        tracing::debug!(path = %path.display(), run_id = %record.run_id, "Run lock acquired");
        Ok(Self { path, record })
    }

    /// Read the record of whoever holds the lock at `path`
    pub fn read_holder(path: &Path) -> Option<LockRecord> {
        let contents = fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    pub fn run_id(&self) -> Uuid {
        self.record.run_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Run lock released"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove run lock"
            ),
        }
    }
}
