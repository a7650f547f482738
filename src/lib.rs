//! Contact Manager Seed - idempotent bootstrap for the contact manager database
//!
//! This crate prepares a fresh database with:
//! - An administrator and a manager principal
//! - The `ContactAdministrators` and `ContactManagers` roles
//! - A fixed set of baseline contacts owned by the administrator
//!
//! Every step is get-or-create, so the bootstrap can be run on every deploy.
//!
//! # Example
//!
//! ```rust,no_run
//! use contact_manager_seed::seed::{self, SeedOptions, SeedServices};
//! use contact_manager_seed::store::{PgCredentialStore, PgRecordStore, PgRoleStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db_pool = sqlx::PgPool::connect("postgres://localhost/contact_manager").await?;
//!     let credentials = PgCredentialStore::new(db_pool.clone());
//!     let roles = PgRoleStore::new(db_pool.clone());
//!     let records = PgRecordStore::new(db_pool);
//!
//!     let services = SeedServices::new(&credentials, &roles, &records);
//!     seed::initialize(&services, &SeedOptions::default(), "Passw0rd!").await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod migrate;
pub mod models;
pub mod seed;
pub mod store;

// Re-export commonly used types
pub use error::{AppError, PersistenceError, ProvisioningError, Result};
pub use models::*;
pub use seed::{initialize, SeedOptions, SeedReport, SeedServices};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
