//! Guildkeep bootstrap composition root.

#![forbid(unsafe_code)]

mod bootstrap_config;

use std::sync::Arc;

use guildkeep_application::BootstrapService;
use guildkeep_core::{AppError, AppResult};
use guildkeep_domain::BootstrapPlan;
use guildkeep_infrastructure::{
    PostgresAuditRepository, PostgresPermissionCatalogRepository, PostgresRoleRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::bootstrap_config::{BootstrapCommand, BootstrapConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = BootstrapConfig::load()?;
    let pool = connect_and_migrate(&config).await?;

    match config.command {
        BootstrapCommand::Migrate => info!("migrations applied"),
        BootstrapCommand::Apply => {
            let plan = BootstrapPlan::standard()?;
            build_bootstrap_service(pool).apply(&plan).await?;
        }
        BootstrapCommand::Verify => {
            let plan = BootstrapPlan::standard()?;
            plan.validate()?;
            build_bootstrap_service(pool)
                .verify_role_references(plan.referenced_role_names())
                .await?;
            info!(
                references = plan.referenced_role_names().len(),
                "stored system roles satisfy every role reference"
            );
        }
    }

    Ok(())
}

async fn connect_and_migrate(config: &BootstrapConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}

fn build_bootstrap_service(pool: PgPool) -> BootstrapService {
    let roles = Arc::new(PostgresRoleRepository::new(pool.clone()));

    BootstrapService::new(
        Arc::new(PostgresPermissionCatalogRepository::new(pool.clone())),
        roles.clone(),
        roles,
        Arc::new(PostgresAuditRepository::new(pool)),
    )
}
