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

//! Device authentication
//!
//! Protected handlers take an [`AuthenticatedDevice`] argument. Extraction reads
//! the `device` and `token` headers and checks the pair against the datastore
//! before the handler body runs.

use crate::{error::ApiError, AppState};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use devgate_core::crypto::is_well_formed_token;
use tracing::{debug, error};

/// Header carrying the device identifier
pub const DEVICE_HEADER: &str = "device";

/// Header carrying the device token
pub const TOKEN_HEADER: &str = "token";

/// Identity of a device whose credentials were verified
#[derive(Debug, Clone)]
pub struct AuthenticatedDevice {
    pub device_id: String,
}

/// Credential header state
enum Credential<'a> {
    Missing,
    Unreadable,
    Present(&'a str),
}

fn read_header<'a>(headers: &'a HeaderMap, name: &str) -> Credential<'a> {
    match headers.get(name) {
        None => Credential::Missing,
        Some(value) => match value.to_str() {
            Ok("") => Credential::Missing,
            Ok(s) => Credential::Present(s),
            Err(_) => Credential::Unreadable,
        },
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedDevice {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (device_id, token) = match (
            read_header(&parts.headers, DEVICE_HEADER),
            read_header(&parts.headers, TOKEN_HEADER),
        ) {
            (Credential::Missing, _) | (_, Credential::Missing) => {
                state.metrics.record_auth_failure();
                return Err(ApiError::AuthRequired(
                    "Device ID and token are required".to_string(),
                ));
            }
            (Credential::Present(device_id), Credential::Present(token)) => (device_id, token),
            _ => {
                state.metrics.record_auth_failure();
                return Err(invalid_credentials());
            }
        };

        // Issued tokens are always 32 lowercase hex characters
        if !is_well_formed_token(token) {
            debug!(device_id, "Rejecting malformed token");
            state.metrics.record_auth_failure();
            return Err(invalid_credentials());
        }

        match state.store.find_by_credentials(device_id, token).await {
            Ok(Some(device)) => Ok(AuthenticatedDevice {
                device_id: device.device_id,
            }),
            Ok(None) => {
                state.metrics.record_auth_failure();
                Err(invalid_credentials())
            }
            // A failed lookup is reported to the caller as a credential mismatch
            Err(e) => {
                error!(device_id, error = %e, "Credential lookup failed");
                state.metrics.record_datastore_error();
                state.metrics.record_auth_failure();
                Err(invalid_credentials())
            }
        }
    }
}

fn invalid_credentials() -> ApiError {
    ApiError::AuthInvalid("Invalid device credentials".to_string())
}
