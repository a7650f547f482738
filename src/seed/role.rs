//! Get-or-create for roles, plus membership

use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{ProvisioningError, Result};
use crate::models::MembershipOutcome;
use crate::store::{CredentialStore, RoleStore};

/// What `ensure_role_membership` changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleMembershipOutcome {
    pub role: String,
    pub role_created: bool,
    pub membership: MembershipOutcome,
}

/// Make sure `role_name` exists and `principal_id` belongs to it.
///
/// The role is created before the principal is resolved, so a missing
/// principal can still leave a freshly created role behind.
#[instrument(skip(credentials, roles))]
pub async fn ensure_role_membership<C, R>(
    credentials: &C,
    roles: &R,
    principal_id: Uuid,
    role_name: &str,
) -> Result<RoleMembershipOutcome>
where
    C: CredentialStore + ?Sized,
    R: RoleStore + ?Sized,
{
    if role_name.trim().is_empty() {
        return Err(ProvisioningError::InvalidRoleName.into());
    }

    let unavailable = |e: crate::error::AppError| ProvisioningError::RoleSubsystemUnavailable {
        role: role_name.to_string(),
        reason: e.to_string(),
    };

    let role_created = if roles.role_exists(role_name).await.map_err(unavailable)? {
        false
    } else {
        // create_role is itself create-if-absent, so a concurrent creator yields false here
        roles.create_role(role_name).await.map_err(unavailable)?
    };

    let principal = credentials
        .find_by_id(principal_id)
        .await
        .map_err(|e| ProvisioningError::CredentialStoreUnavailable {
            login: principal_id.to_string(),
            reason: e.to_string(),
        })?
        .ok_or(ProvisioningError::PrincipalMissing(principal_id))?;

    let membership = roles
        .add_member(&principal, role_name)
        .await
        .map_err(|e| ProvisioningError::MembershipFailed {
            principal_id,
            role: role_name.to_string(),
            reason: e.to_string(),
        })?;

    debug!(role_created, ?membership, "role membership ensured");
    Ok(RoleMembershipOutcome {
        role: role_name.to_string(),
        role_created,
        membership,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::seed::principal::ensure_principal;
    use crate::store::{MemoryCredentialStore, MemoryRoleStore};

    async fn principal(credentials: &MemoryCredentialStore) -> Uuid {
        ensure_principal(credentials, "test@admin.com", "Passw0rd!")
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_creates_role_and_membership() {
        let credentials = MemoryCredentialStore::new();
        let roles = MemoryRoleStore::new();
        let id = principal(&credentials).await;

        let outcome = ensure_role_membership(&credentials, &roles, id, "ContactAdministrators")
            .await
            .unwrap();

        assert!(outcome.role_created);
        assert_eq!(outcome.membership, MembershipOutcome::Added);
        assert!(roles.is_member(id, "ContactAdministrators").await);
    }

    #[tokio::test]
    async fn test_repeat_is_idempotent() {
        let credentials = MemoryCredentialStore::new();
        let roles = MemoryRoleStore::new();
        let id = principal(&credentials).await;

        ensure_role_membership(&credentials, &roles, id, "ContactAdministrators")
            .await
            .unwrap();
        let outcome = ensure_role_membership(&credentials, &roles, id, "ContactAdministrators")
            .await
            .unwrap();

        assert!(!outcome.role_created);
        assert_eq!(outcome.membership, MembershipOutcome::AlreadyMember);
        assert_eq!(roles.role_count().await, 1);
        assert_eq!(roles.member_count("ContactAdministrators").await, 1);
        // the collaborator is still asked both times
        assert_eq!(roles.add_member_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_principal_leaves_role_only() {
        let credentials = MemoryCredentialStore::new();
        let roles = MemoryRoleStore::new();
        let ghost = Uuid::new_v4();

        let err = ensure_role_membership(&credentials, &roles, ghost, "ContactManagers")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Provisioning(ProvisioningError::PrincipalMissing(id)) if id == ghost
        ));
        assert_eq!(roles.role_count().await, 1);
        assert_eq!(roles.member_count("ContactManagers").await, 0);
        assert_eq!(roles.add_member_calls(), 0);
    }

    #[tokio::test]
    async fn test_role_store_offline() {
        let credentials = MemoryCredentialStore::new();
        let roles = MemoryRoleStore::new();
        let id = principal(&credentials).await;
        roles.set_offline(true);

        let err = ensure_role_membership(&credentials, &roles, id, "ContactManagers")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Provisioning(ProvisioningError::RoleSubsystemUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_membership_write_failure() {
        let credentials = MemoryCredentialStore::new();
        let roles = MemoryRoleStore::new();
        let id = principal(&credentials).await;
        roles.set_fail_add_member(true);

        let err = ensure_role_membership(&credentials, &roles, id, "ContactAdministrators")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Provisioning(ProvisioningError::MembershipFailed { principal_id, .. })
                if principal_id == id
        ));
        // the role from step one stays, the edge does not
        assert_eq!(roles.role_count().await, 1);
        assert!(!roles.is_member(id, "ContactAdministrators").await);

        roles.set_fail_add_member(false);
        let outcome = ensure_role_membership(&credentials, &roles, id, "ContactAdministrators")
            .await
            .unwrap();
        assert!(!outcome.role_created);
        assert_eq!(outcome.membership, MembershipOutcome::Added);
        assert_eq!(roles.member_count("ContactAdministrators").await, 1);
    }

    #[tokio::test]
    async fn test_empty_role_name_rejected() {
        let credentials = MemoryCredentialStore::new();
        let roles = MemoryRoleStore::new();
        let id = principal(&credentials).await;

        let err = ensure_role_membership(&credentials, &roles, id, "")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Provisioning(ProvisioningError::InvalidRoleName)
        ));
        assert_eq!(roles.role_count().await, 0);
    }
}
