//! Database migration management

use sqlx::PgPool;
use tracing::{error, info};

use crate::error::AppError;

/// Run all database migrations
pub async fn run_migrations(db_pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    // Create migration tracking table if it doesn't exist
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version VARCHAR(255) PRIMARY KEY,
            applied_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
        );
        "#,
    )
    .execute(db_pool)
    .await
    .map_err(AppError::Database)?;

    for migration in MIGRATIONS {
        let applied = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = $1)",
        )
        .bind(migration.version)
        .fetch_one(db_pool)
        .await
        .map_err(AppError::Database)?;

        if applied {
            info!("Migration {} already applied", migration.version);
            continue;
        }

        info!("Applying migration: {}", migration.version);

        // Apply the script and record it in one transaction
        let mut tx = db_pool.begin().await.map_err(AppError::Database)?;

        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to apply migration {}: {}", migration.version, e);
                AppError::Migration(format!("{}: {}", migration.version, e))
            })?;

        sqlx::query("INSERT INTO schema_migrations (version) VALUES ($1)")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        info!("Migration {} applied successfully", migration.version);
    }

    info!("All migrations completed successfully");
    Ok(())
}

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001_identity_schema",
        sql: include_str!("../migrations/001_identity_schema.sql"),
    },
    Migration {
        version: "002_contacts",
        sql: include_str!("../migrations/002_contacts.sql"),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_ordered_and_unique() {
        let versions: Vec<&str> = MIGRATIONS.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn test_contacts_reference_principals() {
        let contacts = MIGRATIONS
            .iter()
            .find(|m| m.version == "002_contacts")
            .unwrap();
        assert!(contacts.sql.contains("owner_id UUID NOT NULL REFERENCES principals(id)"));
    }
}
