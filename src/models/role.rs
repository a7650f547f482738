//! Role and role membership models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::principal::normalize_name;

/// Role model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub created_at: DateTime<Utc>,
}

/// Result of adding a principal to a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipOutcome {
    Added,
    AlreadyMember,
}

impl Role {
    /// Check whether a role exists, ignoring case
    pub async fn exists(db: &sqlx::PgPool, name: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM roles WHERE normalized_name = $1)",
        )
        .bind(normalize_name(name))
        .fetch_one(db)
        .await
        .map_err(AppError::Database)?;

        Ok(exists)
    }

    /// Find role by name
    pub async fn find_by_name(db: &sqlx::PgPool, name: &str) -> Result<Option<Self>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT * FROM roles
            WHERE normalized_name = $1
            "#,
        )
        .bind(normalize_name(name))
        .fetch_optional(db)
        .await
        .map_err(AppError::Database)?;

        Ok(role)
    }

    /// Insert the role unless it already exists. Returns true if this call created it.
    pub async fn create_if_absent(db: &sqlx::PgPool, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO roles (name, normalized_name)
            VALUES ($1, $2)
            ON CONFLICT (normalized_name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(normalize_name(name))
        .execute(db)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() == 1)
    }

    /// Add a principal to this role; an existing edge is left untouched
    pub async fn add_member(
        &self,
        db: &sqlx::PgPool,
        principal_id: Uuid,
    ) -> Result<MembershipOutcome, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO principal_roles (principal_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (principal_id, role_id) DO NOTHING
            "#,
        )
        .bind(principal_id)
        .bind(self.id)
        .execute(db)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 1 {
            Ok(MembershipOutcome::Added)
        } else {
            Ok(MembershipOutcome::AlreadyMember)
        }
    }
}
