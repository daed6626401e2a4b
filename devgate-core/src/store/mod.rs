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

//! Device record storage
//!
//! The gateway holds no device state of its own. Every request goes through a
//! [`DeviceStore`], which is either the remote datastore ([`RestDeviceStore`])
//! or a process-local map ([`MemoryDeviceStore`]) for development and tests.

mod memory;
mod rest;

pub use memory::MemoryDeviceStore;
pub use rest::{RestDeviceStore, RestStoreConfig};

use crate::config::{GatewayConfig, StorageBackend};
use crate::protocol::{Device, NewDevice};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Query interface over device records
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Look up a device by identifier
    ///
    /// Returns `Ok(None)` when no record exists; `Err` only when the lookup
    /// itself failed.
    async fn find_device(&self, device_id: &str) -> Result<Option<Device>>;

    /// Look up a device matching both identifier and token
    async fn find_by_credentials(&self, device_id: &str, token: &str) -> Result<Option<Device>>;

    /// Insert a new record
    ///
    /// Fails with [`crate::Error::UniqueViolation`] if the identifier is taken.
    async fn insert_device(&self, device: &NewDevice) -> Result<()>;

    /// Fetch every record
    async fn list_devices(&self) -> Result<Vec<Device>>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Build the store selected by configuration
pub fn from_config(config: &GatewayConfig) -> Result<Arc<dyn DeviceStore>> {
    match config.storage_backend {
        StorageBackend::Rest => {
            let store_config = RestStoreConfig::from_gateway_config(config)?;
            Ok(Arc::new(RestDeviceStore::new(store_config)?))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryDeviceStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_backend() {
        let memory = GatewayConfig {
            storage_backend: StorageBackend::Memory,
            ..Default::default()
        };
        assert_eq!(from_config(&memory).unwrap().backend_name(), "memory");

        let rest = GatewayConfig {
            datastore_url: Some("https://project.example.co".to_string()),
            datastore_key: Some("service-key".to_string()),
            ..Default::default()
        };
        assert_eq!(from_config(&rest).unwrap().backend_name(), "rest");
    }

    #[test]
    fn test_from_config_rejects_incomplete_rest() {
        let rest = GatewayConfig::default();
        assert!(from_config(&rest).is_err());
    }
}
