use std::sync::{Arc, LazyLock};

use courier_common::{Signal, logging};
use courier_delivery::{DeliveryOrchestrator, Provider};
use courier_http::HttpServer;
use tokio::sync::broadcast;

mod config;

use config::CourierConfig;

static SHUTDOWN_BROADCAST: LazyLock<broadcast::Sender<Signal>> = LazyLock::new(|| {
    let (sender, _receiver) = broadcast::channel(64);
    sender
});

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = find_config_file()?;
    let config_content = std::fs::read_to_string(&config_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config from {}: {}",
            config_path.display(),
            e
        )
    })?;
    let config: CourierConfig = toml::from_str(&config_content)?;

    run(config).await
}

async fn run(config: CourierConfig) -> anyhow::Result<()> {
    logging::init();

    tracing::info!("Courier starting");

    let providers: Vec<Arc<dyn Provider>> = config
        .providers
        .iter()
        .map(courier_delivery::providers::ProviderConfig::build)
        .collect();

    let orchestrator = Arc::new(DeliveryOrchestrator::new(config.delivery, providers)?);
    let server = HttpServer::new(config.http, orchestrator).await?;

    let ret = tokio::select! {
        r = server.serve(SHUTDOWN_BROADCAST.subscribe()) => {
            r.map_err(anyhow::Error::from)
        }
        r = shutdown() => {
            r
        }
    };

    tracing::info!("Shutting down...");

    ret
}

async fn shutdown() -> anyhow::Result<()> {
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("CTRL+C entered, shutting down");
        }
        _ = terminate.recv() => {
            tracing::info!("Terminate signal received, shutting down");
        }
    };

    SHUTDOWN_BROADCAST
        .send(Signal::Shutdown)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Interrupted, e.to_string()))?;

    Ok(())
}

/// Find the configuration file using the following precedence:
/// 1. `COURIER_CONFIG` environment variable
/// 2. ./courier.config.toml (current working directory)
/// 3. /etc/courier/courier.config.toml (system-wide config)
fn find_config_file() -> anyhow::Result<std::path::PathBuf> {
    if let Ok(env_path) = std::env::var("COURIER_CONFIG") {
        let path = std::path::PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        anyhow::bail!(
            "COURIER_CONFIG points to non-existent file: {}",
            path.display()
        );
    }

    let default_paths = vec![
        std::path::PathBuf::from("./courier.config.toml"),
        std::path::PathBuf::from("/etc/courier/courier.config.toml"),
    ];

    for path in &default_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let paths_tried = default_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    anyhow::bail!(
        "No configuration file found. Tried:\n  - COURIER_CONFIG environment variable\n{paths_tried}"
    )
}
