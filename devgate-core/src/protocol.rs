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

//! Device records and HTTP payloads
//!
//! Datastore rows use snake_case column names (`device_id`, `token`), while the
//! public API uses camelCase (`deviceId`) for request and registration bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Device record as stored in the datastore
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    /// Caller-supplied unique identifier
    pub device_id: String,

    /// Server-issued secret; `None` only when redacted for listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Row creation time as reported by the datastore, passed through verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Device {
    /// Copy of this record with the token stripped
    pub fn redacted(&self) -> Self {
        Self {
            token: None,
            ..self.clone()
        }
    }
}

/// Row written on registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewDevice {
    pub device_id: String,
    pub token: String,
}

/// Body of `POST /register-device`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "deviceId", default)]
    pub device_id: Option<String>,
}

/// Successful registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    pub token: String,
}

/// Body of `POST /upload-data`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub data: Option<Value>,
}

impl UploadRequest {
    /// Payload if one was supplied with a meaningful value
    pub fn payload(&self) -> Option<&Value> {
        self.data.as_ref().filter(|v| is_present(v))
    }
}

/// Response of `GET /list-devices`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<Device>,
}

/// Plain `{message}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Plain `{error}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Whether a JSON value counts as supplied
///
/// `null`, `false`, zero and the empty string count as absent. Arrays and
/// objects are always present, even when empty.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Short name of a JSON value's kind, for logging
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
