//! Identity records and email-keyed lookup.
//!
//! The engine treats identities as opaque references; the only semantics it
//! relies on is equality by email, which is the identity key for participant
//! handling.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of an identity. Admins may update or delete any series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

/// A resolved identity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Email-keyed snapshot of the identities a merge may need.
///
/// Built once per service call; lookups that miss are silently dropped, the
/// one sanctioned silent-drop in the engine.
#[derive(Debug, Default)]
pub struct IdentityDirectory {
    by_email: HashMap<String, Identity>,
    email_by_id: HashMap<Uuid, String>,
}

impl IdentityDirectory {
    pub fn new(identities: impl IntoIterator<Item = Identity>) -> Self {
        let mut by_email = HashMap::new();
        let mut email_by_id = HashMap::new();
        for identity in identities {
            email_by_id.insert(identity.id, identity.email.clone());
            by_email.insert(identity.email.clone(), identity);
        }
        IdentityDirectory {
            by_email,
            email_by_id,
        }
    }

    /// Look up an identity by email.
    pub fn by_email(&self, email: &str) -> Option<&Identity> {
        self.by_email.get(email)
    }

    /// Email of a known identity id.
    pub fn email_of(&self, id: Uuid) -> Option<&str> {
        self.email_by_id.get(&id).map(String::as_str)
    }
}
