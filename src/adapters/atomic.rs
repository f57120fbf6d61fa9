//! Atomic file replacement
//!
//! Writes go to a temporary file in the target's directory, are fsynced, and
//! are then renamed over the target, so readers only ever see the previous
//! complete file or the new complete file.

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `bytes` atomically
///
/// Parent directories are created when missing.
///
/// # Errors
///
/// Returns the underlying I/O error; on failure the previous file at `path`
/// is left untouched and the temporary file is removed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    tracing::trace!(path = %path.display(), bytes = bytes.len(), "Atomic write complete");
    Ok(())
}
