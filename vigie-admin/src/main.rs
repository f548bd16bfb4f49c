//! vigie-admin: admin service for affair and press review
//!
//! Serves duplicate affair detection, affair merge/delete and press tier
//! classification over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vigie_common::api::load_shared_secret;
use vigie_common::config::{
    CompiledDefaults, ConfigSource, DataFolderInitializer, DataFolderResolver,
};
use vigie_common::db::init_database;
use vigie_admin::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "vigie-admin")]
#[command(about = "Admin service for Vigie affair and press review")]
#[command(version)]
struct Args {
    /// Data folder holding vigie.db
    #[arg(short, long, env = "VIGIE_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    /// TOML config file (default: platform config location)
    #[arg(short, long, env = "VIGIE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "VIGIE_ADMIN_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "VIGIE_ADMIN_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded before logging so the configured level applies; the source is reported below
    let resolver = DataFolderResolver::new("vigie-admin")
        .with_cli_arg(args.data_folder)
        .with_config_file(args.config);
    let (config, source) = resolver.load_config();

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Build identification comes first so startup is visible before database work
    info!(
        "Starting Vigie Admin (vigie-admin) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match source {
        ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
        ConfigSource::Defaults => info!("No config file found, using defaults"),
        ConfigSource::Invalid(e) => {
            warn!("{}: {} (using defaults)", resolver.module_name(), e)
        }
    }

    let data_folder = resolver.resolve_with(&config);
    let initializer = DataFolderInitializer::new(data_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let shared_secret = match load_shared_secret(&pool).await {
        Ok(0) => {
            warn!("API authentication disabled (shared_secret = 0)");
            0
        }
        Ok(secret) => {
            info!("✓ Loaded shared secret for API authentication");
            secret
        }
        Err(e) => {
            error!("Failed to load shared secret: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool, shared_secret);
    let app = build_router(state);

    let defaults = CompiledDefaults::for_current_platform();
    let host = args
        .host
        .or(config.admin.host)
        .unwrap_or(defaults.admin_host);
    let port = args.port.or(config.admin.port).unwrap_or(defaults.admin_port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("vigie-admin listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
