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

//! Error types for the device gateway core
//!
//! Provides a unified error taxonomy using `thiserror` for ergonomic error handling.

pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration validation failed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network communication with the datastore failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Datastore answered with a non-success status
    #[error("Datastore error (HTTP {status}): {message}")]
    Datastore { status: u16, message: String },

    /// Insert rejected because the device identifier already exists
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Check if error means the record already exists
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::UniqueViolation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<::config::ConfigError> for Error {
    fn from(e: ::config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Error::UniqueViolation("sensor-1".into()).is_conflict());

        let err = Error::Datastore {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(!err.is_conflict());
        assert!(!Error::Config("bad".into()).is_conflict());
    }

    #[test]
    fn test_json_error_is_serialization() {
        let err: Error = serde_json::from_str::<Vec<u8>>("not json").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_display() {
        let err = Error::Datastore {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Datastore error (HTTP 500): boom");
    }
}
