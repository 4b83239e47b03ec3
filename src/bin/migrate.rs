use migrations::Migrator;
use opsledger::config;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config()?;
    config::init_tracing(&app_config.log_level, app_config.log_json);

    let mut opts = ConnectOptions::new(app_config.database_url.clone());
    opts.max_connections(app_config.db_max_connections)
        .min_connections(app_config.db_min_connections)
        .connect_timeout(Duration::from_secs(app_config.db_connect_timeout_secs))
        .idle_timeout(Duration::from_secs(app_config.db_idle_timeout_secs));

    let db = Database::connect(opts).await?;

    info!("running pending migrations");
    if let Err(e) = Migrator::up(&db, None).await {
        error!(error = %e, "migration failed");
        return Err(e.into());
    }
    info!("migrations complete");
    Ok(())
}
