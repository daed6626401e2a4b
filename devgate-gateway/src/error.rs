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

//! HTTP-facing error taxonomy
//!
//! Every failure is logged where it is turned into a response. Clients only see
//! the status code and a `{"error": "..."}` body; datastore detail stays in the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devgate_core::protocol::ErrorBody;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required field missing, empty, or body malformed
    #[error("{0}")]
    Validation(String),

    /// Device identifier already registered
    #[error("{0}")]
    Conflict(String),

    /// Credential headers missing
    #[error("{0}")]
    AuthRequired(String),

    /// Credentials do not match any device
    #[error("{0}")]
    AuthInvalid(String),

    /// Datastore call failed
    #[error("{message}")]
    Dependency {
        message: String,
        #[source]
        source: devgate_core::Error,
    },
}

impl ApiError {
    pub fn dependency(message: impl Into<String>, source: devgate_core::Error) -> Self {
        ApiError::Dependency {
            message: message.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthRequired(_) => StatusCode::UNAUTHORIZED,
            ApiError::AuthInvalid(_) => StatusCode::FORBIDDEN,
            ApiError::Dependency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Dependency { message, source } => {
                error!(status = status.as_u16(), error = %source, "{}", message);
            }
            other => {
                warn!(status = status.as_u16(), "{}", other);
            }
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
