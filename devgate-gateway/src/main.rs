// SPDX-License-Identifier: MIT
//
// Device Gateway: Device Registration and Data Ingestion Service
// Copyright (c) 2025 Valer Bocan, PhD, CSSLP
// Email: valer.bocan@upt.ro
//
// Department of Computer and Information Technology
// Politehnica University of Timisoara
//
// https://github.com/vbocan/device-gateway

//! Device Gateway - registration and ingestion endpoint for IoT devices
//!
//! Devices register once to receive a bearer token, then present their
//! identifier and token on every upload. Device records are kept in an
//! external managed datastore.
//!
//! # Features
//!
//! - Device registration with server-generated 128-bit tokens
//! - Header-based device authentication
//! - Data ingestion endpoint (logged, not persisted)
//! - Prometheus metrics
//! - Health monitoring

use anyhow::{Context, Result};
use clap::Parser;
use devgate_core::{config::GatewayConfig, store};
use devgate_gateway::{build_router, AppState};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "devgate")]
#[command(about = "Device Gateway - Registers IoT devices and ingests their data", long_about = None)]
struct Args {
    /// Path to a YAML configuration file; without it, configuration is read from DEVGATE_* variables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .json()
        .init();

    info!("Device Gateway v{}", devgate_core::VERSION);

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from file: {:?}", path);
            GatewayConfig::from_file(path).context("Failed to load configuration from file")?
        }
        None => {
            info!("Loading configuration from environment variables");
            GatewayConfig::from_env().context("Failed to load configuration from environment")?
        }
    };

    info!("Storage backend: {:?}", config.storage_backend);
    if let Some(url) = &config.datastore_url {
        info!("Datastore: {} (table '{}')", url, config.datastore_table);
    }
    if !config.redact_listed_tokens {
        warn!("/list-devices returns device tokens to unauthenticated callers; set redact_listed_tokens to disable");
    }

    let store = store::from_config(&config).context("Failed to initialize device store")?;
    let addr: std::net::SocketAddr = config
        .listen_address()
        .parse()
        .context("Invalid listen address")?;

    let app = build_router(AppState::new(config, store));

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Device gateway shut down gracefully");
    Ok(())
}
