//! Domain models for the contact manager bootstrap

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod contact;
pub mod principal;
pub mod role;

pub use contact::{Contact, NewContact};
pub use principal::{NewPrincipal, Principal};
pub use role::{MembershipOutcome, Role};

/// Contact review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Submitted,
    Approved,
    Rejected,
}

/// Contacts that never had a status set count as submitted
impl Default for ContactStatus {
    fn default() -> Self {
        Self::Submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_status_default() {
        assert_eq!(ContactStatus::default(), ContactStatus::Submitted);
    }

    #[test]
    fn test_contact_status_serialization() {
        let json = serde_json::to_string(&ContactStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }
}
