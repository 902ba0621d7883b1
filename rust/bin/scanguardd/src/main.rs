//! `scanguardd`: the ScanGuard radar server binary.
//!
//! Usage:
//!   scanguardd [-c <context-name-or-path>] [--listen <addr>]
//!
//! The context name resolves to `/etc/scanguard/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly. Without `-c`
//! the server runs on defaults plus `SCANGUARD_*` environment variables.

mod bootstrap;
mod config;
mod cors;
mod routes;

use clap::Parser;
use radar::RadarModule;
use scanguard_core::Module;
use tracing::info;

use config::ServerConfig;

/// ScanGuard radar server.
#[derive(Parser, Debug)]
#[command(name = "scanguardd", about = "ScanGuard radar server", version)]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Listen address (overrides config and SCANGUARD_LISTEN).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let mut server_config = match &cli.config {
        Some(name) => {
            let path = ServerConfig::resolve_path(name);
            info!("Loading configuration from {}", path.display());
            ServerConfig::load(&path)?
        }
        None => ServerConfig::default(),
    };
    server_config.apply_env()?;
    if let Some(listen) = cli.listen {
        server_config.service.listen = listen;
    }

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    let service = bootstrap::build_service(&server_config)?;
    bootstrap::probe_store(&service);

    let radar_module = RadarModule::new(service);
    info!("Radar module initialized");

    let module_routes = vec![(radar_module.name(), radar_module.routes())];
    let app = routes::build_router(module_routes);

    // Start server.
    let listen = &server_config.service.listen;
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(
        "ScanGuard server listening on {} (mode: {}, environment: {})",
        listen, server_config.service.mode, server_config.service.environment
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("ScanGuard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
