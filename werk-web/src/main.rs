//! werk-web - contestant catalog browser
//!
//! Startup order: arguments, config file, tracing, root folder, database,
//! catalog client, HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use werk_common::config::{
    config_file_path, load_toml_config_or_default, RootFolderInitializer, ServiceSettings,
    SettingsOverrides,
};
use werk_common::db::init_database;
use werk_web::catalog::CatalogClient;
use werk_web::db::sessions::purge_expired_sessions;
use werk_web::{build_router, AppState, MODULE_NAME};

#[derive(Debug, Parser)]
#[command(name = "werk-web", version, about = "Contestant catalog browser with personal collections")]
struct Args {
    /// Folder holding werk.db (also WERK_ROOT_FOLDER / WERK_ROOT)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5000
    #[arg(long, env = "WERK_BIND")]
    bind: Option<String>,

    /// Base URL of the catalog API
    #[arg(long, env = "WERK_CATALOG_URL")]
    catalog_url: Option<String>,

    /// TOML config file (default ~/.config/werk/werk-web.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so its log level can apply;
    // the outcome is logged once the subscriber is up.
    let config_path = args.config.clone().or_else(|| config_file_path(MODULE_NAME));
    let (toml, config_source) = load_toml_config_or_default(config_path.as_deref());

    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| toml.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    // Build identification first, before any slow startup work
    info!(
        "Starting werk-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    config_source.log();

    let settings = ServiceSettings::resolve(
        MODULE_NAME,
        SettingsOverrides {
            root_folder: args.root_folder,
            bind_address: args.bind,
            catalog_base_url: args.catalog_url,
            log_level: args.log_level,
        },
        &toml,
    );

    let initializer = RootFolderInitializer::new(settings.root_folder.clone());
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let purged = purge_expired_sessions(&pool).await?;
    if purged > 0 {
        info!("Removed {} expired sessions", purged);
    }

    let catalog = CatalogClient::new(&settings.catalog_base_url, settings.catalog_timeout)?;
    info!(
        "Catalog: {} (timeout {:?})",
        catalog.base_url(),
        settings.catalog_timeout
    );

    let state = AppState::new(pool, Arc::new(catalog), settings.session_ttl_hours);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_address))?;
    info!("werk-web listening on http://{}", settings.bind_address);
    info!("Health check: http://{}/health", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
