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

//! Route handlers

use crate::{
    auth::AuthenticatedDevice,
    error::{ApiError, ApiResult},
    AppState,
};
use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use devgate_core::{
    crypto::generate_token,
    protocol::{
        value_kind, DeviceList, MessageResponse, NewDevice, RegisterRequest, RegisterResponse,
        UploadRequest,
    },
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

/// Parse a JSON object body; an empty body yields the default value
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))?;
    if !value.is_object() {
        return Err(ApiError::Validation(
            "Request body must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))
}

/// POST /register-device - Register a device and issue its token
pub async fn register_device(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let request: RegisterRequest = parse_body(&body)?;
    let device_id = request
        .device_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Validation("Device ID is required".to_string()))?;

    match state.store.find_device(&device_id).await {
        Ok(None) => {}
        Ok(Some(_)) => {
            state.metrics.record_registration_conflict();
            return Err(already_registered());
        }
        Err(e) => {
            state.metrics.record_datastore_error();
            return Err(ApiError::dependency("Failed to check device registration", e));
        }
    }

    let device = NewDevice {
        device_id,
        token: generate_token(),
    };

    // The existence check above can race with another registration; the
    // datastore's unique constraint decides.
    if let Err(e) = state.store.insert_device(&device).await {
        if e.is_conflict() {
            state.metrics.record_registration_conflict();
            return Err(already_registered());
        }
        state.metrics.record_datastore_error();
        return Err(ApiError::dependency("Failed to register device", e));
    }

    state.metrics.record_registration();
    info!(device_id = %device.device_id, backend = state.store.backend_name(), "Device registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Device registered successfully".to_string(),
            device_id: device.device_id,
            token: device.token,
        }),
    ))
}

fn already_registered() -> ApiError {
    ApiError::Conflict("Device already registered".to_string())
}

/// POST /upload-data - Accept a payload from an authenticated device
///
/// Payloads are logged and then dropped; nothing is persisted.
pub async fn upload_data(
    State(state): State<AppState>,
    device: AuthenticatedDevice,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let request: UploadRequest = parse_body(&body)?;
    let payload = request
        .payload()
        .ok_or_else(|| ApiError::Validation("Data is required".to_string()))?;

    let serialized = payload.to_string();
    state.metrics.record_upload(serialized.len());
    info!(
        device_id = %device.device_id,
        kind = value_kind(payload),
        bytes = serialized.len(),
        data = %serialized,
        "Received data"
    );

    Ok(Json(MessageResponse::new("Data uploaded successfully")))
}

/// GET /list-devices - List every registered device
pub async fn list_devices(State(state): State<AppState>) -> ApiResult<Json<DeviceList>> {
    let devices = state.store.list_devices().await.map_err(|e| {
        state.metrics.record_datastore_error();
        ApiError::dependency("Failed to fetch devices", e)
    })?;

    let devices = if state.config.redact_listed_tokens {
        devices.iter().map(|d| d.redacted()).collect()
    } else {
        devices
    };

    Ok(Json(DeviceList { devices }))
}

/// GET /health - Simple health check
pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse::new("Device gateway is running"))
}

/// GET /metrics - Prometheus metrics
pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(hyper::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.prometheus_format(),
    )
}
