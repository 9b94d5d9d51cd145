//! Record store capability trait.

use crate::error::Result;
use crate::record::ServiceRecord;

/// Durable mapping from service name to its record.
///
/// Implementations must make `put` and `replace` atomic with respect to
/// readers. All operations are synchronous; async callers run them on the
/// blocking pool.
pub trait RecordStore: Send + Sync {
    /// Write or overwrite the record for `name`.
    fn put(&self, name: &str, record: &ServiceRecord) -> Result<()>;

    /// Overwrite the record for `name` only if one is currently stored.
    ///
    /// Fails with `NotFound` when the record is absent.
    fn replace(&self, name: &str, record: &ServiceRecord) -> Result<()>;

    /// Get the current record for `name`.
    fn get(&self, name: &str) -> Result<ServiceRecord>;

    /// Remove the record for `name`. Fails with `NotFound` if absent.
    fn delete(&self, name: &str) -> Result<()>;

    /// Snapshot of all stored names.
    ///
    /// Names added or removed while the scan runs may or may not appear.
    fn list(&self) -> Result<Vec<String>>;
}
