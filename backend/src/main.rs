//! Backend entry-point: loads configuration, prepares the store and runs the
//! HTTP server.

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use artmarket::inbound::http::health::HealthState;
use artmarket::inbound::http::token_config::{BuildMode, token_settings_from_env};
use artmarket::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use artmarket::server::{ServerConfig, create_server};
use artmarket::settings::ServerSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|err| eyre!("loading settings: {err}"))?;
    let tokens = token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("loading token settings")?;

    let mut config = ServerConfig::new(settings.bind_addr()?, tokens)
        .with_operation_timeout(settings.operation_timeout())
        .with_public_image_base(settings.public_image_base());
    if let Some(blob) = settings.blob()? {
        config = config.with_blob_store(blob);
    }
    if let Some(database_url) = settings.database_url() {
        config = config.with_db_pool(prepare_database(database_url, &settings).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr(), "starting server");
    let server = create_server(health_state, config)?;
    server.await?;
    Ok(())
}

async fn prepare_database(database_url: &str, settings: &ServerSettings) -> Result<DbPool> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .wrap_err("migration task panicked")??;

    let pool_config = PoolConfig::new(database_url).with_max_size(settings.pool_max_size());
    info!(
        database = %pool_config.redacted_url(),
        applied_migrations = applied,
        "database ready"
    );
    DbPool::new(pool_config)
        .await
        .wrap_err("building connection pool")
}
