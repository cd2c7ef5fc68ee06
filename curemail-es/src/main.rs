//! curemail-es - Email Scrape Microservice
//!
//! Resolves and persists contact emails for paper authors on behalf of the
//! search client. One batch per paper: cache check, then the deterministic
//! synthetic fallback, every result written back to the shared cache.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use curemail_common::config::Config;
use curemail_es::AppState;

#[derive(Parser, Debug)]
#[command(name = "curemail-es", about = "Author email scrape service")]
struct Args {
    /// Path of the TOML config file
    #[arg(long, default_value = "curemail.toml")]
    config: PathBuf,

    /// Override the bind port from config
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let mut config = Config::resolve(&args.config)?;
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("Starting curemail-es (Email Scrape) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.database_path.display());

    let db_pool = curemail_common::db::init_pool(&config.database_path).await?;
    info!("Database connection established");

    let state = AppState::new(db_pool, config.scrape_delay_ms);
    let app = curemail_es::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
