//! The service record and name validation.

use crate::{Result, RosterError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A registered service instance.
///
/// Serialized as a JSON object with exactly `name`, `address` and an RFC 3339
/// `last_seen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceRecord {
    pub name: String,
    /// Opaque network location (host:port or URI).
    pub address: String,
    pub last_seen: DateTime<Utc>,
}

impl ServiceRecord {
    pub fn new(name: impl Into<String>, address: impl Into<String>, last_seen: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            last_seen,
        }
    }

    /// Time elapsed since `last_seen`, or `None` if `last_seen` is in the future.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        now.signed_duration_since(self.last_seen).to_std().ok()
    }

    /// Whether the record has outlived `ttl` at `now`.
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now).is_some_and(|age| age > ttl)
    }
}

/// Check that a service name can be used as a store key.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RosterError::Validation {
            field: "name".to_string(),
            message: "service name must not be empty".to_string(),
        });
    }
    if name.chars().any(char::is_control) {
        return Err(RosterError::Validation {
            field: "name".to_string(),
            message: "service name must not contain control characters".to_string(),
        });
    }
    Ok(())
}
