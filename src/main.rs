//! Grid backend-for-frontend
//!
//! JWT-authenticated HTTP service with role and ACL route guards.

use clap::Parser;
use grid::{
    auth::JwtKeys,
    config::{AppConfig, load_config},
    server::{self, AppState},
    storage,
    telemetry::{self, hostname},
};
use tracing::{error, info};

/// Grid BFF - JWT-guarded HTTP service
#[derive(Parser, Debug)]
#[command(name = "grid")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "GRID_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the configured level
    #[arg(long, env = "GRID_LOG_LEVEL")]
    log_level: Option<String>,

    /// HTTP server host
    #[arg(long, env = "GRID_HOST")]
    host: Option<String>,

    /// HTTP server port
    #[arg(long, env = "GRID_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    // Load configuration; logging needs it, so report failure after init
    let loaded = load_config(args.config.as_deref());

    // Initialize logging
    let fallback = AppConfig::default();
    let settings = loaded.as_ref().unwrap_or(&fallback);
    let env = settings.app.env;
    let level = args
        .log_level
        .as_deref()
        .unwrap_or_else(|| settings.logging.effective_level(env));
    telemetry::init_logging(level, settings.logging.effective_format(env));

    let mut config =
        loaded.inspect_err(|e| error!(error = %e, "Failed to load configuration"))?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!(
        service = %config.app.name,
        env = config.app.env.as_str(),
        hostname = %hostname(),
        version = %config.app.version,
        "Starting grid"
    );

    // Connect to the database (lazily; /health reports when it is down)
    let db = storage::connect(&config.database)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to configure database"))?;

    if config.database.synchronize {
        storage::synchronize(&db)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to synchronize schema"))?;
    }

    // Create token keys
    let keys = JwtKeys::from_config(&config.auth)
        .inspect_err(|e| error!(error = %e, "Failed to create JWT keys"))?;

    let state = AppState::new(db, keys, config.app.clone());
    server::serve(server::app(state), &config.server)
        .await
        .inspect_err(|e| error!(error = %e, "Server error"))?;

    Ok(())
}
