//! Presence-based diff between two contact collections
//!
//! Only identifiers are compared. Field contents never influence the plan.

use std::collections::HashSet;
use uuid::Uuid;

use crate::contact::Contact;

/// What one reconciliation pass has to write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Local contacts with no remote counterpart, to be created remotely
    pub to_push: Vec<Contact>,
    /// Remote contacts with no local counterpart, to be added locally
    pub to_pull: Vec<Contact>,
}

impl ReconcilePlan {
    /// Compute both one-way differences
    ///
    /// Each identifier appears at most once per direction; when a side lists
    /// the same identifier more than once, the first occurrence wins.
    pub fn compute(local: Vec<Contact>, remote: Vec<Contact>) -> Self {
        let local_ids: HashSet<Uuid> = local.iter().map(Contact::id).collect();
        let remote_ids: HashSet<Uuid> = remote.iter().map(Contact::id).collect();

        Self {
            to_push: missing_from(local, &remote_ids),
            to_pull: missing_from(remote, &local_ids),
        }
    }

    /// Whether the two sides already hold the same identifiers
    pub fn is_empty(&self) -> bool {
        self.to_push.is_empty() && self.to_pull.is_empty()
    }
}

fn missing_from(contacts: Vec<Contact>, other_ids: &HashSet<Uuid>) -> Vec<Contact> {
    let mut seen = HashSet::new();
    contacts
        .into_iter()
        .filter(|contact| !other_ids.contains(&contact.id()) && seen.insert(contact.id()))
        .collect()
}
