//! Record persistence.
//!
//! This module provides:
//! - The `RecordStore` capability trait
//! - A filesystem backend (one atomic JSON file per service)
//! - An in-memory backend

mod atomic;
mod fs;
mod memory;
mod traits;

pub use fs::FsRecordStore;
pub use memory::MemoryRecordStore;
pub use traits::RecordStore;
