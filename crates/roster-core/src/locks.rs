//! Striped per-name read/write locks.
//!
//! Names hash onto a fixed set of stripes, so the table never grows and holds
//! no record state. Two names may share a stripe; that only costs contention.
//!
//! The stripes guard no data, so a poisoned stripe is recovered, never
//! reported.

use crate::config::LockConfig;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) struct NameLocks {
    stripes: Vec<RwLock<()>>,
}

impl NameLocks {
    pub(crate) fn new() -> Self {
        Self::with_stripes(LockConfig::STRIPES)
    }

    pub(crate) fn with_stripes(count: usize) -> Self {
        Self {
            stripes: (0..count.max(1)).map(|_| RwLock::new(())).collect(),
        }
    }

    fn stripe(&self, name: &str) -> &RwLock<()> {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        let index = (hasher.finish() % self.stripes.len() as u64) as usize;
        &self.stripes[index]
    }

    pub(crate) fn read(&self, name: &str) -> RwLockReadGuard<'_, ()> {
        self.stripe(name).read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self, name: &str) -> RwLockWriteGuard<'_, ()> {
        self.stripe(name).write().unwrap_or_else(PoisonError::into_inner)
    }
}
