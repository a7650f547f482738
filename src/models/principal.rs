//! Principal (login identity) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::auth::PasswordUtils;

/// Principal model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Principal {
    pub id: Uuid,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email_confirmed: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Principal creation request
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub user_name: String,
    pub password: String,
    pub email_confirmed: bool,
}

impl NewPrincipal {
    /// A login that skips the confirmation workflow
    pub fn pre_verified(user_name: &str, password: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            password: password.to_string(),
            email_confirmed: true,
        }
    }
}

/// Case-insensitive lookup key for user and role names
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

impl Principal {
    /// Create a new principal with hashed password
    ///
    /// A name that already exists surfaces as `AppError::Conflict`.
    pub async fn create(
        db: &sqlx::PgPool,
        new_principal: NewPrincipal,
        hash_cost: u32,
    ) -> Result<Self, AppError> {
        PasswordUtils::validate_password_strength(&new_principal.password)?;
        let password_hash = PasswordUtils::hash_password(&new_principal.password, hash_cost)?;

        let principal = sqlx::query_as::<_, Principal>(
            r#"
            INSERT INTO principals (user_name, normalized_user_name, email_confirmed, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (normalized_user_name) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&new_principal.user_name)
        .bind(normalize_name(&new_principal.user_name))
        .bind(new_principal.email_confirmed)
        .bind(password_hash)
        .fetch_optional(db)
        .await
        .map_err(AppError::Database)?;

        principal.ok_or_else(|| {
            AppError::Conflict(format!(
                "Principal '{}' already exists",
                new_principal.user_name
            ))
        })
    }

    /// Find principal by ID
    pub async fn find_by_id(
        db: &sqlx::PgPool,
        principal_id: Uuid,
    ) -> Result<Option<Self>, AppError> {
        let principal = sqlx::query_as::<_, Principal>(
            r#"
            SELECT * FROM principals
            WHERE id = $1
            "#,
        )
        .bind(principal_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::Database)?;

        Ok(principal)
    }

    /// Find principal by user name, ignoring case
    pub async fn find_by_name(
        db: &sqlx::PgPool,
        user_name: &str,
    ) -> Result<Option<Self>, AppError> {
        let principal = sqlx::query_as::<_, Principal>(
            r#"
            SELECT * FROM principals
            WHERE normalized_user_name = $1
            "#,
        )
        .bind(normalize_name(user_name))
        .fetch_optional(db)
        .await
        .map_err(AppError::Database)?;

        Ok(principal)
    }

    /// Verify principal password
    pub fn verify_password(&self, password: &str) -> bool {
        PasswordUtils::verify_password(password, &self.password_hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Test@Admin.com"), "TEST@ADMIN.COM");
        assert_eq!(normalize_name("  test@admin.com "), "TEST@ADMIN.COM");
    }

    #[test]
    fn test_pre_verified() {
        let new_principal = NewPrincipal::pre_verified("test@admin.com", "Passw0rd!");
        assert!(new_principal.email_confirmed);
        assert_eq!(new_principal.user_name, "test@admin.com");
    }

    #[test]
    fn test_principal_password_verification() {
        let principal = Principal {
            id: Uuid::new_v4(),
            user_name: "test@admin.com".to_string(),
            normalized_user_name: normalize_name("test@admin.com"),
            email_confirmed: true,
            password_hash: PasswordUtils::hash_password("Passw0rd!", 4).unwrap(),
            created_at: Utc::now(),
        };

        assert!(principal.verify_password("Passw0rd!"));
        assert!(!principal.verify_password("wrong"));
    }
}
