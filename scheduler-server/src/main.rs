mod config;
mod routes;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use scheduler_core::EventStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Config};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    if args.write_config {
        Config::create_default_config(&config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let mut config = Config::load(&config_path)?;
    config.apply_args(&args);

    init_tracing(&config.server.log_level);

    let store = EventStore::open(&config.database).with_context(|| {
        format!(
            "Failed to open event database {}",
            config.database.path.display()
        )
    })?;

    let static_dir = config.server.static_dir.as_deref();
    if let Some(dir) = static_dir
        && !dir.is_dir()
    {
        warn!(dir = %dir.display(), "static directory not found, static files will 404");
    }

    let app = routes::app(AppState::new(store), static_dir);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "scheduler-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Log to stderr. `RUST_LOG` overrides the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
