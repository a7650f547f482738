//! Contact records owned by a principal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::ContactStatus;

/// Contact model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub email: String,
    pub status: ContactStatus,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Contact creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub email: String,
    pub status: ContactStatus,
    pub owner_id: Uuid,
}

impl Contact {
    /// Whether any contact row exists at all
    pub async fn any(conn: &mut PgConnection) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM contacts)")
            .fetch_one(conn)
            .await
            .map_err(AppError::Database)?;

        Ok(exists)
    }

    /// Insert all contacts in one statement
    pub async fn insert_batch(
        conn: &mut PgConnection,
        contacts: &[NewContact],
    ) -> Result<u64, AppError> {
        if contacts.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO contacts (name, address, city, state, zip, email, status, owner_id) ",
        );
        builder.push_values(contacts, |mut row, contact| {
            row.push_bind(&contact.name)
                .push_bind(&contact.address)
                .push_bind(&contact.city)
                .push_bind(&contact.state)
                .push_bind(&contact.zip)
                .push_bind(&contact.email)
                .push_bind(contact.status)
                .push_bind(contact.owner_id);
        });

        let result = builder
            .build()
            .execute(conn)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }
}
