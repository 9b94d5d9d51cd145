//! Roster Core - a file-backed service registry.
//!
//! Processes register a name and network address, refresh it with
//! heartbeats, and look each other up by name. A background sweeper evicts
//! records whose last heartbeat is older than the configured TTL.
//!
//! # Example
//!
//! ```rust,ignore
//! use roster_core::{Registry, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> roster_core::Result<()> {
//!     let (registry, sweeper) = Registry::start(RegistryConfig::new("/var/lib/roster"))?;
//!
//!     registry.register("billing", "10.0.0.7:8080")?;
//!     let peer = registry.discover("billing")?;
//!     println!("billing lives at {}", peer.address);
//!
//!     registry.unregister("billing")?;
//!     sweeper.stop().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod record;
pub mod registry;
pub mod store;
pub mod sweep;

mod locks;

pub use config::{LockConfig, RegistryConfig, StoreConfig};
pub use error::{Result, RosterError};
pub use record::ServiceRecord;
pub use registry::Registry;
pub use store::{FsRecordStore, MemoryRecordStore, RecordStore};
pub use sweep::{SweepReport, SweeperHandle};
