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

//! Configuration management for the device gateway

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Prefix shared by all gateway environment variables
pub const ENV_PREFIX: &str = "DEVGATE";

/// Where device records are kept
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Remote PostgREST-compatible datastore
    #[default]
    Rest,
    /// Process-local map, lost on restart
    Memory,
}

/// Device gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Bind host for HTTP server
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port for HTTP server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the datastore service
    #[serde(default)]
    pub datastore_url: Option<String>,

    /// Access key sent with every datastore call
    #[serde(default)]
    pub datastore_key: Option<String>,

    /// Table holding device records
    #[serde(default = "default_table")]
    pub datastore_table: String,

    /// Datastore request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub datastore_timeout_secs: u64,

    /// Storage backend selection
    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Strip tokens from the device listing
    #[serde(default)]
    pub redact_listed_tokens: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            datastore_url: None,
            datastore_key: None,
            datastore_table: default_table(),
            datastore_timeout_secs: default_timeout_secs(),
            storage_backend: StorageBackend::default(),
            redact_listed_tokens: false,
            metrics_enabled: true,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `DEVGATE_*` variables. A bare `PORT` is honoured when
    /// `DEVGATE_PORT` is not set, matching common PaaS conventions.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let mut config: Self = envy::prefixed(format!("{}_", ENV_PREFIX))
            .from_iter(vars.iter().cloned())
            .map_err(|e| Error::Config(format!("Failed to parse environment variables: {}", e)))?;

        let prefixed_port = format!("{}_PORT", ENV_PREFIX);
        if !vars.iter().any(|(k, _)| *k == prefixed_port) {
            if let Some((_, port)) = vars.iter().find(|(k, _)| k == "PORT") {
                config.port = port
                    .trim()
                    .parse()
                    .map_err(|e| Error::Config(format!("Invalid PORT '{}': {}", port, e)))?;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, with `DEVGATE_*` variables
    /// taking precedence over file values
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.datastore_table.trim().is_empty() {
            return Err(Error::Config("datastore_table cannot be empty".to_string()));
        }

        if self.datastore_timeout_secs == 0 {
            return Err(Error::Config("datastore_timeout_secs must be > 0".to_string()));
        }

        if self.storage_backend == StorageBackend::Rest {
            let url = self.datastore_url.as_deref().ok_or_else(|| {
                Error::Config(format!(
                    "datastore_url is required for the rest backend ({}_DATASTORE_URL)",
                    ENV_PREFIX
                ))
            })?;
            let parsed = Url::parse(url)
                .map_err(|e| Error::Config(format!("Invalid datastore_url '{}': {}", url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "datastore_url must use http or https, got '{}'",
                    parsed.scheme()
                )));
            }

            match self.datastore_key.as_deref() {
                Some(key) if !key.is_empty() => {}
                _ => {
                    return Err(Error::Config(format!(
                        "datastore_key is required for the rest backend ({}_DATASTORE_KEY)",
                        ENV_PREFIX
                    )))
                }
            }
        }

        Ok(())
    }

    /// Socket address string the server binds to
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn datastore_timeout(&self) -> Duration {
        Duration::from_secs(self.datastore_timeout_secs)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    crate::DEFAULT_PORT
}

fn default_table() -> String {
    "devices".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}
