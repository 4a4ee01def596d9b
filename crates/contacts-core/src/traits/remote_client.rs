// # Remote Client Trait
//
// Defines the interface for the remote contact service.
//
// ## Implementations
//
// - HTTP + JSON + Basic Auth: `contacts-remote-http` crate

use async_trait::async_trait;

use crate::config::SyncConfig;
use crate::contact::Contact;

/// Trait for remote contact service clients
///
/// A client is built for one set of credentials (see [`RemoteClientFactory`])
/// and exposes exactly the two calls a reconciliation pass needs.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS calls to the configured service only
/// - ✅ Parse the service's responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failed item is picked up by the next pass)
/// - ❌ Access the local store (owned by `SyncEngine`)
/// - ❌ Cache contacts between calls
/// - ❌ Spawn tasks or threads
/// - ❌ Decide what needs pushing (owned by `SyncEngine`)
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch every contact known to the remote service
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Contact>)`: All remote contacts (possibly none)
    /// - `Err(Error)`: Transport failure or an invalid/absent payload.
    ///   This must never be collapsed into an empty list.
    async fn fetch_all(&self) -> Result<Vec<Contact>, crate::Error>;

    /// Create one contact on the remote service
    ///
    /// # Idempotency
    ///
    /// Not guaranteed. Submitting the same identifier twice may create a
    /// duplicate, depending on the server.
    async fn create(&self, contact: &Contact) -> Result<(), crate::Error>;

    /// Get the remote client name (for logging/debugging)
    fn remote_name(&self) -> &'static str;
}

/// Helper trait for constructing remote clients from sync settings
///
/// The engine asks the factory for a fresh client at the start of every
/// configured pass, so credentials changed between passes take effect.
pub trait RemoteClientFactory: Send + Sync {
    /// Create a RemoteClient instance from sync settings
    ///
    /// Only called with a complete [`SyncConfig`].
    fn create(&self, config: &SyncConfig) -> Result<Box<dyn RemoteClient>, crate::Error>;
}
