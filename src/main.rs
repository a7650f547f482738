use std::time::Duration;

use contact_manager_seed::config::{Config, LoggingConfig};
use contact_manager_seed::seed::{self, RecordSeedOutcome, SeedReport, SeedServices};
use contact_manager_seed::store::{PgCredentialStore, PgRecordStore, PgRoleStore};
use contact_manager_seed::{migrate, VERSION};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_tracing(&config.logging);

    info!("Starting contact manager seed v{}", VERSION);

    // Initialize database connection pool
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout))
        .connect(&config.database.connection_url()?)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    info!("Database connection established");

    migrate::run_migrations(&db_pool).await?;

    let credentials =
        PgCredentialStore::new(db_pool.clone()).with_hash_cost(config.seed.bcrypt_cost);
    let roles = PgRoleStore::new(db_pool.clone());
    let records = PgRecordStore::new(db_pool.clone());
    let services = SeedServices::new(&credentials, &roles, &records);

    let result = seed::initialize(
        &services,
        &config.seed.options(),
        &config.seed.user_password,
    )
    .await;

    db_pool.close().await;

    match result {
        Ok(report) => {
            log_report(&report);
            Ok(())
        }
        Err(e) => {
            error!(code = e.error_code(), "Seeding aborted: {}", e);
            Err(e.into())
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("contact_manager_seed={}", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

fn log_report(report: &SeedReport) {
    for principal in [&report.admin, &report.manager] {
        if principal.created {
            info!("Created principal '{}' with ID: {}", principal.login, principal.id);
        } else {
            info!("Principal '{}' already exists", principal.login);
        }
    }

    for principal in report.reused_principals() {
        warn!(
            "Password for existing principal '{}' was left unchanged; seeding does not rotate credentials",
            principal.login
        );
    }

    for role in [&report.admin_role, &report.manager_role] {
        info!(
            role = %role.role,
            created = role.role_created,
            membership = ?role.membership,
            "Role membership ensured"
        );
    }

    match report.records {
        RecordSeedOutcome::Inserted(count) => info!("Seeded {} contacts", count),
        RecordSeedOutcome::AlreadySeeded => info!("Contacts already present, seeding skipped"),
    }

    if report.is_noop() {
        info!("Database already bootstrapped; nothing changed");
    }

    match serde_json::to_string(report) {
        Ok(json) => info!(report = %json, "Seed complete"),
        Err(e) => warn!("Seed complete, but the report could not be serialized: {}", e),
    }
}
