//! The client-facing registry API.

use crate::config::RegistryConfig;
use crate::locks::NameLocks;
use crate::record::{validate_name, ServiceRecord};
use crate::store::{FsRecordStore, RecordStore};
use crate::sweep::SweeperHandle;
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Service registry over a [`RecordStore`].
///
/// Register, Unregister and Heartbeat take the name's write lock; Discover
/// takes its read lock. The store remains the only holder of record state.
pub struct Registry {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) locks: NameLocks,
    pub(crate) config: RegistryConfig,
}

impl Registry {
    /// Open a registry backed by files under `config.storage_root`.
    ///
    /// Creates the storage directory if it doesn't exist. The configuration is
    /// validated first, so a rejected config leaves the filesystem untouched.
    pub fn open(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        let store = FsRecordStore::open(&config.storage_root)?;
        Self::with_store(Arc::new(store), config)
    }

    /// Build a registry over an arbitrary store.
    ///
    /// `config.storage_root` is informational for non-filesystem stores.
    pub fn with_store(store: Arc<dyn RecordStore>, config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            locks: NameLocks::new(),
            config,
        })
    }

    /// Open a filesystem-backed registry and start its sweeper.
    ///
    /// Must be called from within a Tokio runtime. The sweeper runs until the
    /// returned handle is stopped or dropped.
    pub fn start(config: RegistryConfig) -> Result<(Arc<Self>, SweeperHandle)> {
        let registry = Arc::new(Self::open(config)?);
        let sweeper = registry.spawn_sweeper()?;
        Ok((registry, sweeper))
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Register (or re-register) `name` at `address`, stamped with the current time.
    pub fn register(&self, name: &str, address: &str) -> Result<()> {
        validate_name(name)?;
        let record = ServiceRecord::new(name, address, Utc::now());

        let _guard = self.locks.write(name);
        self.store.put(name, &record)?;
        debug!("Registered {} at {}", name, address);
        Ok(())
    }

    /// Remove `name`. Fails with `NotFound` if it isn't registered.
    pub fn unregister(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        let _guard = self.locks.write(name);
        self.store.delete(name)?;
        debug!("Unregistered {}", name);
        Ok(())
    }

    /// Look up the stored record for `name`, stale or not.
    pub fn discover(&self, name: &str) -> Result<ServiceRecord> {
        validate_name(name)?;

        let _guard = self.locks.read(name);
        self.store.get(name)
    }

    /// Refresh `last_seen` for `name`, keeping its address.
    ///
    /// Read and write happen under the name's write lock, and the write only
    /// succeeds if the record still exists, so a heartbeat never brings back
    /// a record that was unregistered or swept.
    pub fn heartbeat(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        let _guard = self.locks.write(name);
        let mut record = self.store.get(name)?;
        record.last_seen = Utc::now();
        self.store.replace(name, &record)?;
        debug!("Heartbeat from {}", name);
        Ok(())
    }
}
