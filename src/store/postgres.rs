//! sqlx-backed collaborators

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::contact::Contact;
use crate::models::{MembershipOutcome, NewContact, NewPrincipal, Principal, Role};
use crate::store::{CredentialStore, RecordSession, RecordStore, RoleStore};

/// Principals table
#[derive(Clone)]
pub struct PgCredentialStore {
    db_pool: PgPool,
    hash_cost: u32,
}

impl PgCredentialStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self {
            db_pool,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_name(&self, login: &str) -> Result<Option<Principal>> {
        Principal::find_by_name(&self.db_pool, login).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>> {
        Principal::find_by_id(&self.db_pool, id).await
    }

    async fn create(&self, new_principal: NewPrincipal) -> Result<Principal> {
        Principal::create(&self.db_pool, new_principal, self.hash_cost).await
    }
}

/// Roles and principal_roles tables
#[derive(Clone)]
pub struct PgRoleStore {
    db_pool: PgPool,
}

impl PgRoleStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn role_exists(&self, name: &str) -> Result<bool> {
        Role::exists(&self.db_pool, name).await
    }

    async fn create_role(&self, name: &str) -> Result<bool> {
        Role::create_if_absent(&self.db_pool, name).await
    }

    async fn add_member(&self, principal: &Principal, role: &str) -> Result<MembershipOutcome> {
        let role = Role::find_by_name(&self.db_pool, role)
            .await?
            .ok_or_else(|| AppError::NotFound {
                entity: "Role".to_string(),
                id: role.to_string(),
            })?;

        role.add_member(&self.db_pool, principal.id).await
    }
}

/// Contacts table; each session is one transaction
#[derive(Clone)]
pub struct PgRecordStore {
    db_pool: PgPool,
}

impl PgRecordStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    type Session = PgRecordSession;

    async fn open_session(&self) -> Result<PgRecordSession> {
        let tx = self.db_pool.begin().await.map_err(AppError::Database)?;
        Ok(PgRecordSession { tx: Some(tx) })
    }
}

/// Rolls back on drop unless committed
pub struct PgRecordSession {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgRecordSession {
    fn transaction(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| AppError::Internal("record session already committed".to_string()))
    }
}

#[async_trait]
impl RecordSession for PgRecordSession {
    async fn any_records_exist(&mut self) -> Result<bool> {
        let tx = self.transaction()?;
        Contact::any(&mut **tx).await
    }

    async fn insert_batch(&mut self, records: &[NewContact]) -> Result<u64> {
        let tx = self.transaction()?;
        Contact::insert_batch(&mut **tx, records).await
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| AppError::Internal("record session already committed".to_string()))?;
        tx.commit().await.map_err(AppError::Database)
    }
}
