//! Atomic file operations for record persistence.
//!
//! Writes go through:
//! 1. A temp file with a unique PID+TID suffix
//! 2. fsync so the data reaches disk
//! 3. An atomic rename over the target path
//!
//! Readers therefore see either the previous file or the new one, never a
//! partial write.

use crate::config::StoreConfig;
use crate::{Result, RosterError};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use tracing::debug;

/// Whether an I/O error means the file is not there.
///
/// A name the filesystem rejects (too long) can never have been written,
/// so it counts as absent.
pub(crate) fn is_absent(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::InvalidFilename)
}

/// Read a file to a string.
///
/// Returns `None` if the file doesn't exist.
pub(crate) fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if is_absent(&e) => Ok(None),
        Err(e) => Err(RosterError::read_with_path(e, path)),
    }
}

/// Write `contents` to `path` atomically.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);

    let written = write_and_sync(&temp_path, contents)
        .and_then(|()| fs::rename(&temp_path, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(RosterError::write_with_path(e, path));
    }

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

fn write_and_sync(temp_path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)?;
    file.write_all(contents)?;
    file.flush()?;
    file.sync_all()
}

/// Temp file next to `path`: `.<file hash>.<pid>.<tid>.tmp`.
///
/// The length does not depend on the target's file name, so any name that
/// fits on disk can also be written through a temp file.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_hash = hash_of(&path.file_name());
    path.with_file_name(format!(
        ".{:016x}.{}.{:016x}.{}",
        file_hash,
        process::id(),
        hash_of(&thread::current().id()),
        StoreConfig::TEMP_SUFFIX
    ))
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
