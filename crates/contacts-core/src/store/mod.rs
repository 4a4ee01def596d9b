// # Contact Store Implementations
//
// This module provides implementations of the ContactStore trait for
// different persistence strategies.

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryContactStore;
pub use sqlite::SqliteContactStore;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::traits::ContactStore;

/// Open the store described by `config`
///
/// The returned handle is meant to be created once at startup and shared
/// with every component that needs the address book.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn ContactStore>> {
    config.validate()?;

    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryContactStore::new())),
        StoreConfig::Sqlite { path } => Ok(Arc::new(SqliteContactStore::open(path)?)),
    }
}
