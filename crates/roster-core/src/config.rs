//! Registry configuration.
//!
//! Fixed constants live on the unit structs below; the tunable options
//! (storage root, sweep interval, TTL) live on [`RegistryConfig`].

use crate::{Result, RosterError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// On-disk layout constants for the filesystem store.
pub struct StoreConfig;

impl StoreConfig {
    /// Extension that marks a file as a service record.
    pub const RECORD_EXTENSION: &'static str = "json";
    /// Trailing suffix of in-flight temp files.
    pub const TEMP_SUFFIX: &'static str = "tmp";
}

/// In-process locking constants.
pub struct LockConfig;

impl LockConfig {
    /// Number of lock stripes names are hashed onto.
    pub const STRIPES: usize = 64;
}

/// Options for a registry instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding one record file per service.
    pub storage_root: PathBuf,
    /// Period between sweep passes.
    #[serde(rename = "sweep_interval_secs", with = "duration_secs")]
    pub sweep_interval: Duration,
    /// Maximum age of `last_seen` before a record is evicted.
    #[serde(rename = "ttl_secs", with = "duration_secs")]
    pub ttl: Duration,
}

impl RegistryConfig {
    pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
    pub const DEFAULT_TTL_SECS: u64 = 60;

    /// Configuration with default timings bound to `storage_root`.
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            sweep_interval: Duration::from_secs(Self::DEFAULT_SWEEP_INTERVAL_SECS),
            ttl: Duration::from_secs(Self::DEFAULT_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RosterError::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| RosterError::Config {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject timings the sweeper cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(RosterError::Config {
                message: "ttl must be greater than zero".to_string(),
            });
        }
        if self.sweep_interval.is_zero() {
            return Err(RosterError::Config {
                message: "sweep_interval must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
