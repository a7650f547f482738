//! Error types and handling for the contact manager bootstrap

use thiserror::Error;
use uuid::Uuid;

/// A principal or role could not be established
#[derive(Error, Debug)]
pub enum ProvisioningError {
    #[error("Login must not be empty")]
    InvalidLogin,

    #[error("Role name must not be empty")]
    InvalidRoleName,

    #[error("Credential store unavailable while resolving '{login}': {reason}")]
    CredentialStoreUnavailable { login: String, reason: String },

    /// Usually the password was rejected by the strength policy
    #[error("Principal '{login}' could not be created: {reason}")]
    PrincipalNotCreated { login: String, reason: String },

    #[error("Role subsystem unavailable for role '{role}': {reason}")]
    RoleSubsystemUnavailable { role: String, reason: String },

    #[error("Referenced principal missing: {0}")]
    PrincipalMissing(Uuid),

    #[error("Could not add principal {principal_id} to role '{role}': {reason}")]
    MembershipFailed {
        principal_id: Uuid,
        role: String,
        reason: String,
    },
}

/// The seed contact batch could not be written
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Could not open persistence session: {0}")]
    SessionUnavailable(String),

    #[error("Could not query existing contacts: {0}")]
    Query(String),

    #[error("Could not insert seed contacts: {0}")]
    Insert(String),

    #[error("Could not commit seed contacts: {0}")]
    Commit(String),
}

/// Custom error types for the application
#[derive(Error, Debug)]
pub enum AppError {
    /// Principal or role provisioning failures
    #[error("Provisioning error: {0}")]
    Provisioning(#[from] ProvisioningError),

    /// Seed record persistence failures
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration errors
    #[error("Migration error: {0}")]
    Migration(String),

    /// Backing store errors that are not SQL errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Password rejected by the strength policy
    #[error("Password policy violation: {0}")]
    PasswordPolicy(String),

    /// Not found errors
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Conflict errors (e.g., duplicate entries)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bcrypt errors
    #[error("Bcrypt error: {0}")]
    Bcrypt(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get error code for log records
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Provisioning(_) => "PROVISIONING_ERROR",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Migration(_) => "MIGRATION_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::PasswordPolicy(_) => "PASSWORD_POLICY",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Bcrypt(_) => "BCRYPT_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True for the two bootstrap failure kinds that abort a seed run
    pub fn is_seed_failure(&self) -> bool {
        matches!(self, AppError::Provisioning(_) | AppError::Persistence(_))
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::PasswordUtils;

    #[test]
    fn test_error_codes() {
        let error = AppError::from(ProvisioningError::InvalidLogin);
        assert_eq!(error.error_code(), "PROVISIONING_ERROR");
        assert!(error.is_seed_failure());

        let error = AppError::from(PersistenceError::Commit("disk full".to_string()));
        assert_eq!(error.error_code(), "PERSISTENCE_ERROR");
        assert!(error.is_seed_failure());
    }

    #[test]
    fn test_not_found_error() {
        let error = AppError::NotFound {
            entity: "Role".to_string(),
            id: "ContactManagers".to_string(),
        };
        assert_eq!(error.error_code(), "NOT_FOUND");
        assert_eq!(error.to_string(), "Role not found: ContactManagers");
        assert!(!error.is_seed_failure());
    }

    #[test]
    fn test_bcrypt_failure_code() {
        // a malformed hash fails inside bcrypt, not as a mismatch
        let error = PasswordUtils::verify_password("Passw0rd!", "not-a-hash").unwrap_err();
        assert_eq!(error.error_code(), "BCRYPT_ERROR");
        assert!(!error.is_seed_failure());
    }

    #[test]
    fn test_provisioning_messages() {
        let id = Uuid::new_v4();
        let error = ProvisioningError::PrincipalMissing(id);
        assert_eq!(error.to_string(), format!("Referenced principal missing: {}", id));

        let error = ProvisioningError::PrincipalNotCreated {
            login: "test@admin.com".to_string(),
            reason: "too short".to_string(),
        };
        assert!(error.to_string().contains("test@admin.com"));
    }
}
