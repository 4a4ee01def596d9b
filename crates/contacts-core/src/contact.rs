// # Contact
//
// The single domain record shared by the local store and the remote client.
//
// ## Identity
//
// A contact's `id` is a v4 UUID generated client-side when the contact is
// created. It never changes afterwards and it is the only thing compared when
// deciding whether two contacts are "the same" contact. There is deliberately
// no setter for it.

use std::fmt;
use uuid::Uuid;

/// A contact record
///
/// All profile fields are optional except the favorite flag, which defaults
/// to `false`. The photo is an opaque byte sequence; encoding and decoding it
/// is left to whatever renders it.
///
/// # Example
///
/// ```rust
/// use contacts_core::Contact;
///
/// let contact = Contact::new()
///     .with_name("Ada Lovelace")
///     .with_email("ada@example.com")
///     .with_favorite(true);
///
/// assert_eq!(contact.name.as_deref(), Some("Ada Lovelace"));
/// assert!(contact.is_favorite);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Contact {
    id: Uuid,
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Whether the contact is marked as a favorite
    pub is_favorite: bool,
    /// Postal address, free text
    pub address: Option<String>,
    /// Photo bytes
    pub image: Option<Vec<u8>>,
}

impl Contact {
    /// Create an empty contact with a fresh identifier
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Create an empty contact with a known identifier
    ///
    /// Used when materializing a contact that already exists elsewhere
    /// (a database row, a remote payload).
    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            email: None,
            is_favorite: false,
            address: None,
            image: None,
        }
    }

    /// The contact's immutable identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Mark or unmark as favorite
    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.is_favorite = favorite;
        self
    }

    /// Attach a photo
    ///
    /// An empty byte vector is treated as "no photo".
    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = if image.is_empty() { None } else { Some(image) };
        self
    }
}

impl Default for Contact {
    fn default() -> Self {
        Self::new()
    }
}

// Photo bytes are summarized by length so log lines stay readable
impl fmt::Debug for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contact")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("is_favorite", &self.is_favorite)
            .field("address", &self.address)
            .field(
                "image",
                &self.image.as_ref().map(|bytes| format!("<{} bytes>", bytes.len())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let contact = Contact::new()
            .with_name("Test Name")
            .with_email("name@test.com");

        assert_eq!(contact.name.as_deref(), Some("Test Name"));
        assert_eq!(contact.email.as_deref(), Some("name@test.com"));
        assert!(!contact.is_favorite);
        assert!(contact.address.is_none());
        assert!(contact.image.is_none());
    }

    #[test]
    fn test_new_contacts_get_distinct_ids() {
        let a = Contact::new();
        let b = Contact::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_with_id_keeps_identifier() {
        let id = Uuid::new_v4();
        let contact = Contact::with_id(id).with_name("X");
        assert_eq!(contact.id(), id);
    }

    #[test]
    fn test_empty_image_is_absent() {
        let contact = Contact::new().with_image(Vec::new());
        assert!(contact.image.is_none());

        let contact = Contact::new().with_image(vec![0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(contact.image.as_deref(), Some(&[0x89, 0x50, 0x4e, 0x47][..]));
    }

    #[test]
    fn test_debug_summarizes_image() {
        let contact = Contact::new().with_image(vec![7; 2048]);
        let debug_str = format!("{:?}", contact);
        assert!(debug_str.contains("<2048 bytes>"));
        assert!(!debug_str.contains("7, 7, 7"));
    }
}
