//! # Board Node
//!
//! Entry point for the message board gateway.
//!
//! ## Startup Sequence
//!
//! 1. Install logging (`RUST_LOG`, default `info`)
//! 2. Load configuration (JSON file, then `BOARD_*` environment overrides)
//! 3. Validate configuration
//! 4. Serve until Ctrl+C
//!
//! ## Client helper
//!
//! `board-node sign` prints the `x-signature` value a client must send, so
//! the protocol can be exercised from a shell:
//!
//! ```text
//! board-node sign --secret s3cr3t --route create \
//!     --body '{"msg":"hi","tags":["a"]}'
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use board_gateway::{sign_request, BoardGatewayService, GatewayConfig, SharedSecret};

#[derive(Parser, Debug)]
#[command(name = "board-node", version, about = "Message board with signed requests")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP gateway
    Serve {
        /// JSON configuration file
        #[arg(short, long, env = "BOARD_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the signature for a request
    Sign {
        /// Shared secret registered for the key
        #[arg(long)]
        secret: String,
        /// Route label sent in `x-route`
        #[arg(long)]
        route: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
        /// Path parameter as `name=value`, in route order
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Serve { config } => serve(config.as_deref()).await,
        Command::Sign {
            secret,
            route,
            body,
            params,
        } => {
            let body: Option<serde_json::Value> = body
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("--body is not valid JSON")?;
            let signature = sign_request(&SharedSecret::new(secret), &route, body.as_ref(), &params);
            println!("{}", signature);
            Ok(())
        }
    }
}

async fn serve(config_path: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting board node v{}", board_gateway::VERSION);

    let config = load_config(config_path)?;
    let service = BoardGatewayService::new(config).context("invalid configuration")?;

    service
        .start(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await?;

    info!("Board node stopped");
    Ok(())
}

/// Load configuration from an optional JSON file, then apply environment
/// overrides.
fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: GatewayConfig = serde_json::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(
    config: &mut GatewayConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(host) = var("BOARD_HTTP_HOST") {
        config.http.host = host
            .parse()
            .with_context(|| format!("BOARD_HTTP_HOST is not an IP address: {}", host))?;
    }
    if let Some(port) = var("BOARD_HTTP_PORT") {
        config.http.port = port
            .parse()
            .with_context(|| format!("BOARD_HTTP_PORT is not a port: {}", port))?;
    }
    if let Some(origin) = var("BOARD_CORS_ORIGIN") {
        config.cors.allowed_origin = origin;
    }
    if let Some(routes) = var("BOARD_PROTECTED_ROUTES") {
        config.auth.protected_routes = routes
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
    }
    Ok(())
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got {}", raw))
}
