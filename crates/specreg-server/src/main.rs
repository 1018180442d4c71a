//! Specification registry server — application entry point.
//!
//! Bootstraps logging, connects to SurrealDB, applies migrations and
//! then waits for shutdown. The HTTP presentation layer attaches to
//! the service crates from here.

use specreg_core::repository::UserGroupRepository;
use specreg_db::repository::SurrealUserGroupRepository;
use specreg_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "specreg=info"
                    .parse()
                    .expect("static directive always parses"),
            ),
        )
        .json()
        .init();

    tracing::info!("Starting specification registry server...");

    let config = DbConfig::from_env();
    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!("Failed to connect to SurrealDB: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = specreg_db::run_migrations(manager.client()).await {
        tracing::error!("Failed to run migrations: {e}");
        std::process::exit(1);
    }

    // Startup summary, and a smoke check that queries work.
    let group_repo = SurrealUserGroupRepository::new(manager.client().clone());
    match group_repo.list_with_counts().await {
        Ok(summaries) => {
            let specifications: u64 = summaries.iter().map(|s| s.specification_count).sum();
            tracing::info!(
                groups = summaries.len(),
                owned_specifications = specifications,
                "Registry ready"
            );
        }
        Err(e) => tracing::warn!("Could not summarize registry contents: {e}"),
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    tracing::info!("Specification registry server stopped.");
}
