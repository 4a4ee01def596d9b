// # contacts-core
//
// Core library for presence-based contact synchronization.
//
// ## Architecture Overview
//
// This library provides the pieces needed to keep a local address book and a
// remote contact service converged on the same set of contacts:
// - **Contact**: The single domain record, keyed by an immutable UUID
// - **ContactStore**: Trait for the local, persistent contact collection
// - **RemoteClient**: Trait for the remote contact service (fetch + create)
// - **SyncEngine**: Runs reconciliation passes between the two
//
// ## Design Principles
//
// 1. **Presence, not content**: Only the set of identifiers is reconciled.
//    A contact that exists on both sides is never touched, whatever its fields.
// 2. **Additive only**: A pass creates missing copies. It never updates or deletes.
// 3. **Best effort**: Remote failures are logged and reported in the pass
//    outcome. The next pass is the retry.
// 4. **Library-First**: Stores and remote clients are injected; nothing is a
//    process-wide singleton.

pub mod config;
pub mod contact;
pub mod engine;
pub mod error;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{ContactsConfig, EngineConfig, StoreConfig, SyncConfig};
pub use contact::Contact;
pub use engine::{SyncEngine, SyncEvent, SyncHandle, SyncOutcome, SyncReport};
pub use error::{Error, Result};
pub use store::{MemoryContactStore, SqliteContactStore};
pub use traits::{ContactStore, RemoteClient, RemoteClientFactory};
