//! Baseline contact records

use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{PersistenceError, Result};
use crate::models::{ContactStatus, NewContact};
use crate::store::RecordSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSeedOutcome {
    /// Contacts were already present; nothing was written
    AlreadySeeded,
    Inserted(u64),
}

/// The fixed baseline contacts, all owned by `owner_id`
pub fn seed_contacts(owner_id: Uuid) -> Vec<NewContact> {
    let contact = |name: &str,
                   address: &str,
                   city: &str,
                   zip: &str,
                   email: &str,
                   status: ContactStatus| NewContact {
        name: name.to_string(),
        address: address.to_string(),
        city: city.to_string(),
        state: "WA".to_string(),
        zip: zip.to_string(),
        email: email.to_string(),
        status,
        owner_id,
    };

    vec![
        contact(
            "Alice Johnson",
            "4567 Oak St",
            "Seattle",
            "98101",
            "alice@example.com",
            ContactStatus::Approved,
        ),
        contact(
            "Bob Smith",
            "789 Elm Ave",
            "Bellevue",
            "98004",
            "bob@example.com",
            ContactStatus::Submitted,
        ),
        contact(
            "Eva Martinez",
            "234 Pine St",
            "Kirkland",
            "98033",
            "eva@example.com",
            ContactStatus::Rejected,
        ),
        contact(
            "Mike Davis",
            "876 Cedar Rd",
            "Issaquah",
            "98027",
            "mike@example.com",
            ContactStatus::Submitted,
        ),
        contact(
            "Sophie Brown",
            "543 Birch Ln",
            "Redmond",
            "98052",
            "sophie@example.com",
            ContactStatus::default(),
        ),
    ]
}

/// Insert the baseline contacts unless any contact exists.
///
/// The guard looks at the whole table, not individual records. Inserts and
/// the commit go through the same session, so a failed run leaves nothing
/// behind and the next run seeds from scratch.
#[instrument(skip(session))]
pub async fn seed_records<S>(session: &mut S, owner_id: Uuid) -> Result<RecordSeedOutcome>
where
    S: RecordSession + ?Sized,
{
    let seeded = session
        .any_records_exist()
        .await
        .map_err(|e| PersistenceError::Query(e.to_string()))?;

    if seeded {
        debug!("contacts already present, skipping");
        return Ok(RecordSeedOutcome::AlreadySeeded);
    }

    let contacts = seed_contacts(owner_id);
    let inserted = session
        .insert_batch(&contacts)
        .await
        .map_err(|e| PersistenceError::Insert(e.to_string()))?;

    session
        .commit()
        .await
        .map_err(|e| PersistenceError::Commit(e.to_string()))?;

    debug!(inserted, "contacts seeded");
    Ok(RecordSeedOutcome::Inserted(inserted))
}
