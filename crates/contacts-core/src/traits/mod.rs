//! Core traits for the contacts system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ContactStore`]: The local, persistent contact collection
//! - [`RemoteClient`]: The remote contact service
//! - [`RemoteClientFactory`]: Builds a remote client from sync settings

pub mod contact_store;
pub mod remote_client;

pub use contact_store::ContactStore;
pub use remote_client::{RemoteClient, RemoteClientFactory};
