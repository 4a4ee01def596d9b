//! JSON shapes exchanged with the contact service
//!
//! ```json
//! {
//!   "contacts": [
//!     { "uuid": "…", "name": "…", "email": "…", "address": "…", "favorite": true }
//!   ]
//! }
//! ```
//!
//! Photos are never transmitted.

use contacts_core::{Contact, Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One contact as the service sends and receives it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPayload {
    /// Canonical cross-system identifier
    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Absent or null reads as `false`
    #[serde(default)]
    pub favorite: Option<bool>,
}

impl From<&Contact> for ContactPayload {
    fn from(contact: &Contact) -> Self {
        Self {
            uuid: Some(contact.id().to_string()),
            name: contact.name.clone(),
            email: contact.email.clone(),
            address: contact.address.clone(),
            favorite: Some(contact.is_favorite),
        }
    }
}

impl TryFrom<ContactPayload> for Contact {
    type Error = Error;

    fn try_from(payload: ContactPayload) -> Result<Self> {
        let raw = payload
            .uuid
            .ok_or_else(|| Error::invalid_input("contact without uuid"))?;
        let id = Uuid::parse_str(&raw)
            .map_err(|e| Error::invalid_input(format!("invalid contact uuid '{}': {}", raw, e)))?;

        let mut contact = Contact::with_id(id).with_favorite(payload.favorite.unwrap_or(false));
        contact.name = payload.name;
        contact.email = payload.email;
        contact.address = payload.address;
        Ok(contact)
    }
}

/// Body of the list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactList {
    #[serde(default)]
    pub contacts: Option<Vec<ContactPayload>>,
}

impl ContactList {
    /// Convert every entry, failing the whole list on the first bad one
    ///
    /// A body without a `contacts` array is invalid rather than empty.
    pub fn into_contacts(self) -> Result<Vec<Contact>> {
        self.contacts
            .ok_or_else(|| Error::invalid_input("response has no 'contacts' array"))?
            .into_iter()
            .map(Contact::try_from)
            .collect()
    }
}
