//! Idempotent database bootstrap
//!
//! Runs a fixed sequence: ensure the administrator, grant the
//! administrator role, ensure the manager, grant the manager role, then
//! seed the baseline contacts owned by the administrator. Every step is
//! get-or-create, so re-running after a failure converges on the same
//! end state. Nothing created by earlier steps is rolled back.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{PersistenceError, Result};
use crate::models::MembershipOutcome;
use crate::store::{CredentialStore, RecordStore, RoleStore};

pub mod contacts;
pub mod principal;
pub mod role;

pub use contacts::{seed_contacts, seed_records, RecordSeedOutcome};
pub use principal::{ensure_principal, EnsuredPrincipal};
pub use role::{ensure_role_membership, RoleMembershipOutcome};

pub const ADMIN_LOGIN: &str = "test@admin.com";
pub const MANAGER_LOGIN: &str = "test@manager.com";

/// May do anything, including approving contacts
pub const CONTACT_ADMINISTRATORS_ROLE: &str = "ContactAdministrators";
/// May create and edit the contacts they own
pub const CONTACT_MANAGERS_ROLE: &str = "ContactManagers";

/// Collaborators the bootstrap runs against
pub struct SeedServices<'a, C, R, S> {
    pub credentials: &'a C,
    pub roles: &'a R,
    pub records: &'a S,
}

impl<'a, C, R, S> SeedServices<'a, C, R, S>
where
    C: CredentialStore,
    R: RoleStore,
    S: RecordStore,
{
    pub fn new(credentials: &'a C, roles: &'a R, records: &'a S) -> Self {
        Self {
            credentials,
            roles,
            records,
        }
    }
}

/// Logins for the two seeded principals
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub admin_login: String,
    pub manager_login: String,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            admin_login: ADMIN_LOGIN.to_string(),
            manager_login: MANAGER_LOGIN.to_string(),
        }
    }
}

/// Bootstrap steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStep {
    EnsureAdmin,
    GrantAdminRole,
    EnsureManager,
    GrantManagerRole,
    SeedRecords,
    Done,
}

impl fmt::Display for SeedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeedStep::EnsureAdmin => "ensure_admin",
            SeedStep::GrantAdminRole => "grant_admin_role",
            SeedStep::EnsureManager => "ensure_manager",
            SeedStep::GrantManagerRole => "grant_manager_role",
            SeedStep::SeedRecords => "seed_records",
            SeedStep::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything a completed run did
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub admin: EnsuredPrincipal,
    pub admin_role: RoleMembershipOutcome,
    pub manager: EnsuredPrincipal,
    pub manager_role: RoleMembershipOutcome,
    pub records: RecordSeedOutcome,
}

impl SeedReport {
    /// Principals that already existed; their passwords were not touched
    pub fn reused_principals(&self) -> impl Iterator<Item = &EnsuredPrincipal> {
        [&self.admin, &self.manager]
            .into_iter()
            .filter(|p| !p.created)
    }

    /// True when the run found everything in place and wrote nothing
    pub fn is_noop(&self) -> bool {
        self.reused_principals().count() == 2
            && !self.admin_role.role_created
            && !self.manager_role.role_created
            && self.admin_role.membership == MembershipOutcome::AlreadyMember
            && self.manager_role.membership == MembershipOutcome::AlreadyMember
            && self.records == RecordSeedOutcome::AlreadySeeded
    }
}

/// Run the full bootstrap.
///
/// The first failing step aborts the run and its error is returned as is.
/// The record session is held for the whole run and released on return.
#[instrument(skip(services, password))]
pub async fn initialize<C, R, S>(
    services: &SeedServices<'_, C, R, S>,
    options: &SeedOptions,
    password: &str,
) -> Result<SeedReport>
where
    C: CredentialStore,
    R: RoleStore,
    S: RecordStore,
{
    let mut session = services
        .records
        .open_session()
        .await
        .map_err(|e| PersistenceError::SessionUnavailable(e.to_string()))?;

    debug!(step = %SeedStep::EnsureAdmin, "seed step");
    let admin = ensure_principal(services.credentials, &options.admin_login, password).await?;

    debug!(step = %SeedStep::GrantAdminRole, "seed step");
    let admin_role = ensure_role_membership(
        services.credentials,
        services.roles,
        admin.id,
        CONTACT_ADMINISTRATORS_ROLE,
    )
    .await?;

    debug!(step = %SeedStep::EnsureManager, "seed step");
    let manager = ensure_principal(services.credentials, &options.manager_login, password).await?;

    debug!(step = %SeedStep::GrantManagerRole, "seed step");
    let manager_role = ensure_role_membership(
        services.credentials,
        services.roles,
        manager.id,
        CONTACT_MANAGERS_ROLE,
    )
    .await?;

    debug!(step = %SeedStep::SeedRecords, "seed step");
    let records = seed_records(&mut session, admin.id).await?;

    debug!(step = %SeedStep::Done, "seed step");
    Ok(SeedReport {
        admin,
        admin_role,
        manager,
        manager_role,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SeedOptions::default();
        assert_eq!(options.admin_login, "test@admin.com");
        assert_eq!(options.manager_login, "test@manager.com");
    }

    #[test]
    fn test_step_display() {
        assert_eq!(SeedStep::GrantManagerRole.to_string(), "grant_manager_role");
        assert_eq!(SeedStep::Done.to_string(), "done");
    }
}
