// # Contact Store Trait
//
// Defines the interface for the local contact collection.
//
// ## Implementations
//
// - In-memory: `MemoryContactStore`
// - SQLite: `SqliteContactStore`
//
// ## Usage
//
// ```rust,ignore
// use contacts_core::{Contact, ContactStore};
//
// let store = /* ContactStore implementation */;
//
// let contact = Contact::new().with_name("Ada");
// store.add(&contact).await?;
//
// let everyone = store.get_all().await?;
// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::contact::Contact;

/// Trait for local contact store implementations
///
/// Contacts are keyed by their immutable [`Contact::id`]. Stores are plain
/// CRUD collections; they must not know anything about synchronization.
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Forbidden
///
/// - ❌ Calling the remote service (owned by `RemoteClient`)
/// - ❌ Deciding what to sync (owned by `SyncEngine`)
/// - ❌ Spawning background tasks without a clear lifecycle
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Get every stored contact
    async fn get_all(&self) -> Result<Vec<Contact>, crate::Error>;

    /// Look up a contact by identifier
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Contact))`: The contact
    /// - `Ok(None)`: No contact with that identifier
    /// - `Err(Error)`: Storage error
    async fn get(&self, id: Uuid) -> Result<Option<Contact>, crate::Error>;

    /// Insert a new contact
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Inserted
    /// - `Err(Error::Duplicate)`: A contact with the same identifier exists
    /// - `Err(Error)`: Storage error
    async fn add(&self, contact: &Contact) -> Result<(), crate::Error>;

    /// Replace every field of an existing contact
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Updated
    /// - `Err(Error::NotFound)`: No contact with that identifier
    /// - `Err(Error)`: Storage error
    async fn update(&self, contact: &Contact) -> Result<(), crate::Error>;

    /// Get contacts marked as favorite
    ///
    /// The default implementation filters [`ContactStore::get_all`].
    async fn favorites(&self) -> Result<Vec<Contact>, crate::Error> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|contact| contact.is_favorite)
            .collect())
    }

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
