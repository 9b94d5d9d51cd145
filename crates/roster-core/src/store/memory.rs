//! In-memory record store for embedding and tests.

use super::traits::RecordStore;
use crate::record::ServiceRecord;
use crate::{Result, RosterError};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Record store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, ServiceRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, ServiceRecord>>> {
        self.records
            .read()
            .map_err(|_| RosterError::Other("Memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, ServiceRecord>>> {
        self.records
            .write()
            .map_err(|_| RosterError::Other("Memory store lock poisoned".to_string()))
    }
}

impl RecordStore for MemoryRecordStore {
    fn put(&self, name: &str, record: &ServiceRecord) -> Result<()> {
        self.write()?.insert(name.to_string(), record.clone());
        Ok(())
    }

    fn replace(&self, name: &str, record: &ServiceRecord) -> Result<()> {
        match self.write()?.get_mut(name) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(RosterError::not_found(name)),
        }
    }

    fn get(&self, name: &str) -> Result<ServiceRecord> {
        self.read()?
            .get(name)
            .cloned()
            .ok_or_else(|| RosterError::not_found(name))
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.write()?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RosterError::not_found(name))
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }
}
