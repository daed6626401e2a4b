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

//! Device Gateway HTTP service
//!
//! Exposes the REST surface for device registration and data ingestion:
//!
//! - `POST /register-device`: register a device and issue its token
//! - `POST /upload-data`: accept a data payload from an authenticated device
//! - `GET /list-devices`: list registered devices
//! - `GET /health`: liveness probe
//! - `GET /metrics`: Prometheus metrics (optional)

pub mod auth;
pub mod error;
pub mod handlers;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use devgate_core::{config::GatewayConfig, metrics::Metrics, DeviceStore};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use auth::AuthenticatedDevice;
pub use error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub store: Arc<dyn DeviceStore>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: GatewayConfig, store: Arc<dyn DeviceStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            metrics: Metrics::new(),
        }
    }
}

/// Build the HTTP router over the given state
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/register-device", post(handlers::register_device))
        .route("/upload-data", post(handlers::upload_data))
        .route("/list-devices", get(handlers::list_devices))
        .route("/health", get(handlers::health_check));

    if state.config.metrics_enabled {
        router = router.route("/metrics", get(handlers::get_metrics));
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Record request count, failures and latency
async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;

    let status = response.status();
    let failed = status.is_client_error() || status.is_server_error();
    state
        .metrics
        .record_request(start.elapsed().as_micros() as u64, failed);

    response
}
