//! pwsd - PWS Bridge Daemon
//!
//! Exposes a Weather-Underground-style upload endpoint that personal weather
//! stations can post to directly, and relays the mapped readings to a
//! home-automation state-store.
//!
//! Usage:
//!   pwsd <config.toml>
//!
//! The config file names the sink connection and the sensor mappings:
//!
//! ```toml
//! [server]
//! port = 5723
//!
//! [sink]
//! base_url = "http://localhost:8123/"
//! token = "{YOUR TOKEN HERE}"
//!
//! [[sensor]]
//! inputs = ["tempf"]
//! entity_id = "pws_temp"
//! name = "Temperature"
//! unit = "°C"
//! icon = "mdi:thermometer"
//! transform = "fahrenheit_to_celsius"
//!
//! [[sensor]]
//! inputs = ["tempf", "humidity"]
//! entity_id = "pws_heat_index"
//! name = "Heat Index"
//! unit = "°C"
//! icon = "mdi:thermometer"
//! transform = "heat_index_celsius"
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use pws_api::{create_router, AppState};
use pws_core::BridgeConfig;
use pws_sink::SinkClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed command-line arguments
struct Args {
    /// Bridge config file (TOML)
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let mut result = Args { config_path: None };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            a if !a.starts_with('-') => {
                result.config_path = Some(a.to_string());
            }
            _ => {
                tracing::warn!("Unknown argument: {}", arg);
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"pwsd - PWS Bridge Daemon

Usage: pwsd [OPTIONS] <config.toml>

Options:
  -h, --help    Print this help message

The config file defines the listen port/path, the state-store connection,
and the sensor mappings. Example:

  [sink]
  base_url = "http://localhost:8123/"
  token = "{{YOUR TOKEN HERE}}"

  [[sensor]]
  inputs = ["tempf"]
  entity_id = "pws_temp"
  name = "Temperature"
  unit = "°C"
  transform = "fahrenheit_to_celsius"
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pwsd=info,pws_api=info,pws_sink=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting pwsd (PWS Bridge Daemon)");

    let args = parse_args();
    let config_path = match args.config_path {
        Some(path) => path,
        None => {
            print_help();
            anyhow::bail!("missing config file argument");
        }
    };

    tracing::info!("Loading config from: {}", config_path);
    let content = std::fs::read_to_string(&config_path)?;
    let config = BridgeConfig::from_toml_str(&content)?;
    tracing::info!(sensors = config.sensors.len(), "Configuration loaded");

    // The sink session lives for the whole process and is shared by every
    // concurrent sensor update.
    let sink = SinkClient::with_bearer_token_config(
        &config.sink.base_url,
        &config.sink.token,
        Duration::from_secs(config.sink.timeout_secs),
        Duration::from_secs(config.sink.connect_timeout_secs),
    )?;

    let grace = Duration::from_secs(config.server.shutdown_grace_secs);
    let port = config.server.port;
    let state = AppState::new(config, sink);
    let app = create_router(state.clone());

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Updates already in flight get a bounded window to finish; anything
    // still running afterwards is abandoned as stale telemetry.
    tracing::info!("Server stopped, draining in-flight sensor updates");
    state.drain_updates(grace).await;

    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
