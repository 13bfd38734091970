//! GridWarden - Substation Fault Detection and Breaker Control
//!
//! Real-time fault classification for three-phase distribution feeders.
//! Field devices POST telemetry readings and receive breaker commands;
//! operators monitor and override through the same HTTP surface.
//!
//! # Usage
//!
//! ```bash
//! # Run with built-in defaults
//! cargo run --release
//!
//! # Run against a deployment config
//! GRIDWARDEN_CONFIG=/etc/gridwarden/gridwarden.toml cargo run --release
//!
//! # Drive it with the bundled simulator
//! cargo run --release --bin simulation -- --scenario lg
//! ```
//!
//! # Environment Variables
//!
//! - `GRIDWARDEN_CONFIG`: path to the TOML config file
//! - `GRIDWARDEN_CORS_ORIGINS`: comma-separated dev origins for CORS
//! - `RUST_LOG`: logging level (default: info)
//! - `RESET_DB`: set to "true" to wipe the fault log on startup (for testing)

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gridwarden::api::create_app;
use gridwarden::classifier::ActiveClassifier;
use gridwarden::config::GridConfig;
use gridwarden::engine::DecisionEngine;
use gridwarden::notify::AlertSink;
use gridwarden::pipeline::IngestionPipeline;
use gridwarden::storage::FaultLog;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "gridwarden")]
#[command(about = "Substation fault detection and breaker control service")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default from config: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to the TOML config file (overrides GRIDWARDEN_CONFIG)
    #[arg(short, long)]
    config: Option<String>,

    /// Wipe the fault log on startup.
    /// WARNING: This is destructive and cannot be undone!
    /// Can also be set via RESET_DB=true environment variable.
    #[arg(long)]
    reset_db: bool,
}

// ============================================================================
// Database Reset
// ============================================================================

/// Check if database reset is requested via CLI flag or environment variable.
fn should_reset_db(cli_flag: bool) -> bool {
    if cli_flag {
        return true;
    }
    if let Ok(val) = std::env::var("RESET_DB") {
        let val_lower = val.to_lowercase();
        return val_lower == "true" || val_lower == "1" || val_lower == "yes";
    }
    false
}

/// Remove the fault log directory so a fresh one is created on startup.
fn reset_fault_log(db_path: &str) -> Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        info!("Fault log does not exist, nothing to reset");
        return Ok(());
    }
    warn!(path = %path.display(), "RESET_DB detected, wiping fault log");
    std::fs::remove_dir_all(path).context("Failed to remove fault log directory")?;
    warn!("Fault log removed, a fresh database will be created on startup");
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    // Load deployment configuration
    let mut grid_config = match &args.config {
        Some(path) => GridConfig::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => GridConfig::load(),
    };
    if let Some(addr) = args.addr {
        grid_config.server.bind_addr = addr;
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  GridWarden - Substation Fault Detection");
    info!(
        "  Substation: {} | Line: {} | Policy: {}",
        grid_config.substation.id,
        grid_config.substation.line_id,
        if grid_config.policy.autonomous_trip {
            "autonomous trip"
        } else {
            "detect only"
        }
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Reset check — BEFORE the fault log is opened
    if should_reset_db(args.reset_db) {
        reset_fault_log(&grid_config.storage.db_path)?;
    }

    let fault_log = FaultLog::open(Path::new(&grid_config.storage.db_path))
        .context("Failed to open fault log")?;

    let classifier = ActiveClassifier::from_config(&grid_config);
    let engine = DecisionEngine::new(grid_config.policy.autonomous_trip);
    let alerts = AlertSink::from_config(&grid_config.notify);
    let pipeline = IngestionPipeline::new(
        classifier,
        engine,
        fault_log,
        alerts,
        grid_config.physics.nominal_voltage,
    );

    let bind_addr = grid_config.server.bind_addr.clone();
    let app = create_app(pipeline, Arc::new(grid_config));

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;
    info!("HTTP server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("HTTP server shutting down");
        })
        .await
        .context("HTTP server error")?;

    info!("GridWarden shutdown complete");
    Ok(())
}
