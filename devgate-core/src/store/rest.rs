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

//! HTTP client for the managed device datastore
//!
//! Speaks the PostgREST dialect: rows live under `/rest/v1/<table>`, filters are
//! query parameters of the form `column=eq.value`, and every call carries the
//! access key both as `apikey` and as a bearer token.

use super::DeviceStore;
use crate::config::GatewayConfig;
use crate::protocol::{Device, NewDevice};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// PostgreSQL SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Configuration for the REST device store
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Base URL of the datastore service
    pub base_url: Url,
    /// Access key
    pub api_key: String,
    /// Table holding device records
    pub table: String,
    /// Request timeout
    pub timeout: Duration,
}

impl RestStoreConfig {
    pub fn new(base_url: Url, api_key: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            table: table.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Derive store settings from validated gateway configuration
    pub fn from_gateway_config(config: &GatewayConfig) -> Result<Self> {
        let url = config
            .datastore_url
            .as_deref()
            .ok_or_else(|| Error::Config("datastore_url is not set".to_string()))?;
        let key = config
            .datastore_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("datastore_key is not set".to_string()))?;
        let base_url = Url::parse(url)
            .map_err(|e| Error::Config(format!("Invalid datastore_url '{}': {}", url, e)))?;

        Ok(Self {
            timeout: config.datastore_timeout(),
            ..Self::new(base_url, key, config.datastore_table.clone())
        })
    }
}

/// Error payload returned by PostgREST
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Device store backed by a remote PostgREST-compatible datastore
pub struct RestDeviceStore {
    client: Client,
    table_url: Url,
    config: RestStoreConfig,
}

impl RestDeviceStore {
    /// Create a new store client with configuration
    pub fn new(config: RestStoreConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut apikey = HeaderValue::from_str(&config.api_key)
            .map_err(|e| Error::Config(format!("Invalid datastore key: {}", e)))?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| Error::Config(format!("Invalid datastore key: {}", e)))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .use_rustls_tls()
            .build()
            .map_err(Error::Network)?;

        let table_url = Self::build_table_url(&config.base_url, &config.table)?;

        Ok(Self {
            client,
            table_url,
            config,
        })
    }

    /// Build `<base>/rest/v1/<table>`, keeping any path prefix on the base URL
    fn build_table_url(base_url: &Url, table: &str) -> Result<Url> {
        let mut url = base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("datastore_url '{}' cannot be a base", base_url)))?
            .pop_if_empty()
            .extend(["rest", "v1", table]);
        url.set_query(None);
        Ok(url)
    }

    /// URL selecting at most `limit` rows matching all equality filters
    fn select_url(&self, filters: &[(&str, &str)], limit: Option<usize>) -> Url {
        let mut url = self.table_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            for (column, value) in filters {
                query.append_pair(column, &format!("eq.{}", value));
            }
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        url
    }

    /// Fetch rows matching the given filters
    async fn select(&self, filters: &[(&str, &str)], limit: Option<usize>) -> Result<Vec<Device>> {
        let url = self.select_url(filters, limit);
        debug!("Querying {}", self.table_url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Datastore request to {} failed: {}", self.table_url, e);
            Error::Network(e)
        })?;

        let response = Self::check_status(response).await?;
        let body = response.bytes().await?;
        let rows: Vec<Device> = serde_json::from_slice(&body)
            .inspect_err(|e| warn!("Malformed datastore response: {}", e))?;

        debug!("Datastore returned {} row(s)", rows.len());
        Ok(rows)
    }

    /// Fetch the first row matching the given filters
    async fn select_one(&self, filters: &[(&str, &str)]) -> Result<Option<Device>> {
        Ok(self.select(filters, Some(1)).await?.into_iter().next())
    }

    /// Turn non-success statuses into errors
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: PostgrestError = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .message
            .clone()
            .or_else(|| parsed.details.clone())
            .unwrap_or_else(|| body.clone());

        if status == StatusCode::CONFLICT || parsed.code.as_deref() == Some(UNIQUE_VIOLATION) {
            debug!("Datastore reported unique violation: {}", message);
            return Err(Error::UniqueViolation(message));
        }

        warn!("Datastore HTTP error {}: {}", status, message);
        Err(Error::Datastore {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DeviceStore for RestDeviceStore {
    #[instrument(skip(self), fields(table = %self.config.table))]
    async fn find_device(&self, device_id: &str) -> Result<Option<Device>> {
        self.select_one(&[("device_id", device_id)]).await
    }

    #[instrument(skip(self, token), fields(table = %self.config.table))]
    async fn find_by_credentials(&self, device_id: &str, token: &str) -> Result<Option<Device>> {
        self.select_one(&[("device_id", device_id), ("token", token)])
            .await
    }

    #[instrument(skip(self, device), fields(table = %self.config.table, device_id = %device.device_id))]
    async fn insert_device(&self, device: &NewDevice) -> Result<()> {
        let response = self
            .client
            .post(self.table_url.clone())
            .header("Prefer", "return=minimal")
            .json(device)
            .send()
            .await
            .map_err(|e| {
                warn!("Datastore insert to {} failed: {}", self.table_url, e);
                Error::Network(e)
            })?;

        Self::check_status(response).await?;
        debug!("Inserted device {}", device.device_id);
        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.config.table))]
    async fn list_devices(&self) -> Result<Vec<Device>> {
        self.select(&[], None).await
    }

    fn backend_name(&self) -> &'static str {
        "rest"
    }
}
