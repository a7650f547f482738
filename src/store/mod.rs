//! Collaborator capabilities consumed by the seed routine
//!
//! The seed logic only talks to these traits. `postgres` backs them with
//! sqlx, `memory` keeps everything in process for tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{MembershipOutcome, NewContact, NewPrincipal, Principal};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCredentialStore, MemoryRecordStore, MemoryRoleStore};
pub use postgres::{PgCredentialStore, PgRecordStore, PgRoleStore};

/// Looks up and creates login identities
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Case-insensitive lookup by login name
    async fn find_by_name(&self, login: &str) -> Result<Option<Principal>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>>;

    /// Fails when the password is rejected by the store's policy or the name is taken
    async fn create(&self, new_principal: NewPrincipal) -> Result<Principal>;
}

/// Roles and principal-to-role membership
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn role_exists(&self, name: &str) -> Result<bool>;

    /// Atomic create-if-absent. Returns true only when this call created the role.
    async fn create_role(&self, name: &str) -> Result<bool>;

    /// Adding an existing member reports `AlreadyMember` rather than failing
    async fn add_member(&self, principal: &Principal, role: &str) -> Result<MembershipOutcome>;
}

/// Hands out sessions over the contact table
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Session: RecordSession;

    async fn open_session(&self) -> Result<Self::Session>;
}

/// A unit of work over contacts. Dropping it without `commit` discards pending inserts.
#[async_trait]
pub trait RecordSession: Send {
    async fn any_records_exist(&mut self) -> Result<bool>;

    async fn insert_batch(&mut self, records: &[NewContact]) -> Result<u64>;

    async fn commit(&mut self) -> Result<()>;
}
