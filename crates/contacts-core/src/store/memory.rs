// # Memory Contact Store
//
// In-memory implementation of ContactStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for testing and for embedding the engine where the host
// application owns persistence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::contact::Contact;
use crate::traits::ContactStore;
use crate::Error;

/// In-memory contact store
///
/// Contacts live in a HashMap keyed by identifier, protected by a RwLock.
/// Cloning the store yields another handle onto the same contacts.
///
/// # Example
///
/// ```rust,no_run
/// use contacts_core::{Contact, ContactStore, MemoryContactStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryContactStore::new();
///
///     let contact = Contact::new().with_name("Ada");
///     store.add(&contact).await?;
///
///     let found = store.get(contact.id()).await?;
///     assert_eq!(found, Some(contact));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryContactStore {
    inner: Arc<RwLock<HashMap<Uuid, Contact>>>,
}

impl MemoryContactStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a store pre-populated with `contacts`
    ///
    /// Later entries win when identifiers repeat.
    pub fn with_contacts(contacts: impl IntoIterator<Item = Contact>) -> Self {
        let map = contacts
            .into_iter()
            .map(|contact| (contact.id(), contact))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Get the number of contacts in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Remove all contacts from the store
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

impl Default for MemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn get_all(&self) -> Result<Vec<Contact>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.values().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Contact>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(&id).cloned())
    }

    async fn add(&self, contact: &Contact) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        if guard.contains_key(&contact.id()) {
            return Err(Error::duplicate(contact.id().to_string()));
        }
        guard.insert(contact.id(), contact.clone());
        Ok(())
    }

    async fn update(&self, contact: &Contact) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        match guard.get_mut(&contact.id()) {
            Some(existing) => {
                *existing = contact.clone();
                Ok(())
            }
            None => Err(Error::not_found(contact.id().to_string())),
        }
    }

    async fn flush(&self) -> Result<(), Error> {
        // No-op for memory store
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryContactStore::new();

        // Initially empty
        assert!(store.is_empty().await);
        assert_eq!(store.len().await, 0);

        let contact = Contact::new().with_name("Ada").with_email("ada@example.com");
        store.add(&contact).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert!(!store.is_empty().await);

        let retrieved = store.get(contact.id()).await.unwrap();
        assert_eq!(retrieved, Some(contact));

        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_id() {
        let store = MemoryContactStore::new();
        let contact = Contact::new().with_name("First");
        store.add(&contact).await.unwrap();

        let again = Contact::with_id(contact.id()).with_name("Second");
        let err = store.add(&again).await.unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));

        // Original untouched
        let stored = store.get(contact.id()).await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("First"));
    }

    #[tokio::test]
    async fn test_memory_store_update() {
        let store = MemoryContactStore::new();
        let contact = Contact::new().with_name("Before");
        store.add(&contact).await.unwrap();

        let edited = contact.clone().with_name("After").with_favorite(true);
        store.update(&edited).await.unwrap();

        let stored = store.get(contact.id()).await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("After"));
        assert!(stored.is_favorite);

        let missing = Contact::new();
        assert!(matches!(
            store.update(&missing).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_store_favorites() {
        let fav = Contact::new().with_name("Fav").with_favorite(true);
        let other = Contact::new().with_name("Other");
        let store = MemoryContactStore::with_contacts([fav.clone(), other]);

        let favorites = store.favorites().await.unwrap();
        assert_eq!(favorites, vec![fav]);
    }

    #[tokio::test]
    async fn test_clones_share_contacts() {
        let store = MemoryContactStore::new();
        let handle = store.clone();

        handle.add(&Contact::new()).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
