//! In-process collaborators
//!
//! Used as stand-ins in tests. Each store can be told to fail so the
//! abort paths of the seed routine can be driven without a database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::auth::PasswordUtils;
use crate::models::principal::normalize_name;
use crate::models::{Contact, MembershipOutcome, NewContact, NewPrincipal, Principal};
use crate::store::{CredentialStore, RecordSession, RecordStore, RoleStore};

// bcrypt's minimum cost keeps tests fast
const TEST_HASH_COST: u32 = 4;

#[derive(Default)]
pub struct MemoryCredentialStore {
    principals: RwLock<HashMap<Uuid, Principal>>,
    offline: AtomicBool,
    creates: AtomicUsize,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of principals created through this store
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub async fn principal_count(&self) -> usize {
        self.principals.read().await.len()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Storage("credential store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_name(&self, login: &str) -> Result<Option<Principal>> {
        self.check_online()?;
        let key = normalize_name(login);
        let principals = self.principals.read().await;
        let found = principals
            .values()
            .find(|p| p.normalized_user_name == key)
            .cloned();
        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>> {
        self.check_online()?;
        Ok(self.principals.read().await.get(&id).cloned())
    }

    async fn create(&self, new_principal: NewPrincipal) -> Result<Principal> {
        self.check_online()?;
        PasswordUtils::validate_password_strength(&new_principal.password)?;

        let key = normalize_name(&new_principal.user_name);
        let mut principals = self.principals.write().await;
        if principals.values().any(|p| p.normalized_user_name == key) {
            return Err(AppError::Conflict(format!(
                "Principal '{}' already exists",
                new_principal.user_name
            )));
        }

        let principal = Principal {
            id: Uuid::new_v4(),
            user_name: new_principal.user_name,
            normalized_user_name: key,
            email_confirmed: new_principal.email_confirmed,
            password_hash: PasswordUtils::hash_password(&new_principal.password, TEST_HASH_COST)?,
            created_at: Utc::now(),
        };
        principals.insert(principal.id, principal.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);

        Ok(principal)
    }
}

#[derive(Default)]
pub struct MemoryRoleStore {
    roles: RwLock<HashMap<String, String>>,
    members: RwLock<HashSet<(Uuid, String)>>,
    offline: AtomicBool,
    fail_add_member: AtomicBool,
    add_member_calls: AtomicUsize,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Reject membership writes while role lookups keep working
    pub fn set_fail_add_member(&self, fail: bool) {
        self.fail_add_member.store(fail, Ordering::SeqCst);
    }

    pub async fn role_count(&self) -> usize {
        self.roles.read().await.len()
    }

    pub async fn member_count(&self, role: &str) -> usize {
        let key = normalize_name(role);
        self.members
            .read()
            .await
            .iter()
            .filter(|(_, r)| *r == key)
            .count()
    }

    pub async fn is_member(&self, principal_id: Uuid, role: &str) -> bool {
        self.members
            .read()
            .await
            .contains(&(principal_id, normalize_name(role)))
    }

    /// How many times `add_member` reached the store, duplicates included
    pub fn add_member_calls(&self) -> usize {
        self.add_member_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Storage("role store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn role_exists(&self, name: &str) -> Result<bool> {
        self.check_online()?;
        Ok(self.roles.read().await.contains_key(&normalize_name(name)))
    }

    async fn create_role(&self, name: &str) -> Result<bool> {
        self.check_online()?;
        let mut roles = self.roles.write().await;
        let key = normalize_name(name);
        if roles.contains_key(&key) {
            return Ok(false);
        }
        roles.insert(key, name.to_string());
        Ok(true)
    }

    async fn add_member(&self, principal: &Principal, role: &str) -> Result<MembershipOutcome> {
        self.check_online()?;
        self.add_member_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_add_member.load(Ordering::SeqCst) {
            return Err(AppError::Storage("membership write rejected".to_string()));
        }

        let key = normalize_name(role);
        if !self.roles.read().await.contains_key(&key) {
            return Err(AppError::NotFound {
                entity: "Role".to_string(),
                id: role.to_string(),
            });
        }

        if self.members.write().await.insert((principal.id, key)) {
            Ok(MembershipOutcome::Added)
        } else {
            Ok(MembershipOutcome::AlreadyMember)
        }
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<Vec<Contact>>>,
    unavailable: AtomicBool,
    fail_query: Arc<AtomicBool>,
    fail_insert: Arc<AtomicBool>,
    fail_commit: Arc<AtomicBool>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to open sessions
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_fail_query(&self, fail: bool) {
        self.fail_query.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// Committed contacts
    pub async fn records(&self) -> Vec<Contact> {
        self.records.read().await.clone()
    }

    /// Commit a contact directly, outside of any session
    pub async fn push(&self, contact: NewContact) {
        self.records.write().await.push(materialize(contact));
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    type Session = MemoryRecordSession;

    async fn open_session(&self) -> Result<MemoryRecordSession> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Storage("record store unavailable".to_string()));
        }

        Ok(MemoryRecordSession {
            records: Arc::clone(&self.records),
            fail_query: Arc::clone(&self.fail_query),
            fail_insert: Arc::clone(&self.fail_insert),
            fail_commit: Arc::clone(&self.fail_commit),
            pending: Vec::new(),
        })
    }
}

pub struct MemoryRecordSession {
    records: Arc<RwLock<Vec<Contact>>>,
    fail_query: Arc<AtomicBool>,
    fail_insert: Arc<AtomicBool>,
    fail_commit: Arc<AtomicBool>,
    pending: Vec<NewContact>,
}

#[async_trait]
impl RecordSession for MemoryRecordSession {
    async fn any_records_exist(&mut self) -> Result<bool> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(AppError::Storage("contact query rejected".to_string()));
        }
        Ok(!self.pending.is_empty() || !self.records.read().await.is_empty())
    }

    async fn insert_batch(&mut self, records: &[NewContact]) -> Result<u64> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(AppError::Storage("contact insert rejected".to_string()));
        }
        self.pending.extend_from_slice(records);
        Ok(records.len() as u64)
    }

    async fn commit(&mut self) -> Result<()> {
        if self.fail_commit.load(Ordering::SeqCst) {
            self.pending.clear();
            return Err(AppError::Storage("commit rejected".to_string()));
        }

        let mut records = self.records.write().await;
        records.extend(self.pending.drain(..).map(materialize));
        Ok(())
    }
}

fn materialize(contact: NewContact) -> Contact {
    Contact {
        id: Uuid::new_v4(),
        name: contact.name,
        address: contact.address,
        city: contact.city,
        state: contact.state,
        zip: contact.zip,
        email: contact.email,
        status: contact.status,
        owner_id: contact.owner_id,
        created_at: Utc::now(),
    }
}
