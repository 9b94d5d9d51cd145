//! Filesystem record store: one JSON file per service.
//!
//! File names are the percent-encoded service name plus `.json`, so any name
//! maps to exactly one file directly under the root. Files without that
//! extension (temp files, stray data) are never listed.

use super::atomic::{is_absent, read_if_exists, write_atomic};
use super::traits::RecordStore;
use crate::config::StoreConfig;
use crate::record::ServiceRecord;
use crate::{Result, RosterError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Record store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsRecordStore {
    root: PathBuf,
}

impl FsRecordStore {
    /// Open the store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| RosterError::StoreWrite {
            message: format!("Failed to create storage root {}", root.display()),
            path: Some(root.clone()),
            source: Some(e),
        })?;
        debug!("Opened record store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for `name`.
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(format!(
            "{}.{}",
            urlencoding::encode(name),
            StoreConfig::RECORD_EXTENSION
        ))
    }

    fn write(&self, name: &str, record: &ServiceRecord) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(record).map_err(|e| RosterError::StoreWrite {
            message: format!("Failed to serialize record for {}: {}", name, e),
            path: None,
            source: None,
        })?;
        write_atomic(&self.record_path(name), &serialized)
    }
}

/// Recover the service name from a directory entry, if it is a record file.
fn name_from_file(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != StoreConfig::RECORD_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    urlencoding::decode(stem).ok().map(|name| name.into_owned())
}

impl RecordStore for FsRecordStore {
    fn put(&self, name: &str, record: &ServiceRecord) -> Result<()> {
        self.write(name, record)
    }

    fn replace(&self, name: &str, record: &ServiceRecord) -> Result<()> {
        if !self.record_path(name).exists() {
            return Err(RosterError::not_found(name));
        }
        self.write(name, record)
    }

    fn get(&self, name: &str) -> Result<ServiceRecord> {
        let path = self.record_path(name);
        let contents = read_if_exists(&path)?.ok_or_else(|| RosterError::not_found(name))?;

        let record: ServiceRecord =
            serde_json::from_str(&contents).map_err(|e| RosterError::CorruptRecord {
                name: name.to_string(),
                message: format!("Failed to parse {}: {}", path.display(), e),
                source: Some(e),
            })?;

        if record.name != name {
            return Err(RosterError::CorruptRecord {
                name: name.to_string(),
                message: format!("{} holds a record for {:?}", path.display(), record.name),
                source: None,
            });
        }

        Ok(record)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.record_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if is_absent(&e) => Err(RosterError::not_found(name)),
            Err(e) => Err(RosterError::write_with_path(e, path)),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| RosterError::read_with_path(e, &self.root))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read entry in {}: {}", self.root.display(), e);
                    continue;
                }
            };
            if let Some(name) = name_from_file(&entry.path()) {
                names.push(name);
            }
        }
        Ok(names)
    }
}
