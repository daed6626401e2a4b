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

//! In-memory device store

use super::DeviceStore;
use crate::crypto::tokens_match;
use crate::protocol::{Device, NewDevice};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Device store backed by a process-local list
///
/// Records keep insertion order. Uniqueness is checked under the write lock,
/// so concurrent inserts of one identifier cannot both succeed.
#[derive(Clone, Default)]
pub struct MemoryDeviceStore {
    devices: Arc<RwLock<Vec<Device>>>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn find_device(&self, device_id: &str) -> Result<Option<Device>> {
        let devices = self.devices.read();
        Ok(devices.iter().find(|d| d.device_id == device_id).cloned())
    }

    async fn find_by_credentials(&self, device_id: &str, token: &str) -> Result<Option<Device>> {
        let devices = self.devices.read();
        Ok(devices
            .iter()
            .find(|d| {
                d.device_id == device_id
                    && d.token.as_deref().is_some_and(|t| tokens_match(t, token))
            })
            .cloned())
    }

    async fn insert_device(&self, device: &NewDevice) -> Result<()> {
        let mut devices = self.devices.write();
        if devices.iter().any(|d| d.device_id == device.device_id) {
            return Err(Error::UniqueViolation(format!(
                "device_id '{}' already exists",
                device.device_id
            )));
        }

        devices.push(Device {
            device_id: device.device_id.clone(),
            token: Some(device.token.clone()),
            created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        });
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        Ok(self.devices.read().clone())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_device(id: &str, token: &str) -> NewDevice {
        NewDevice {
            device_id: id.to_string(),
            token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryDeviceStore::new();
        assert!(store.find_device("sensor-1").await.unwrap().is_none());

        store.insert_device(&new_device("sensor-1", "t1")).await.unwrap();

        let found = store.find_device("sensor-1").await.unwrap().unwrap();
        assert_eq!(found.token.as_deref(), Some("t1"));
        assert!(found.created_at.is_some());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = MemoryDeviceStore::new();
        store.insert_device(&new_device("sensor-1", "t1")).await.unwrap();

        let err = store
            .insert_device(&new_device("sensor-1", "t2"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_credentials_match_both_fields() {
        let store = MemoryDeviceStore::new();
        store.insert_device(&new_device("sensor-1", "t1")).await.unwrap();
        store.insert_device(&new_device("sensor-2", "t2")).await.unwrap();

        assert!(store.find_by_credentials("sensor-1", "t1").await.unwrap().is_some());
        assert!(store.find_by_credentials("sensor-1", "t2").await.unwrap().is_none());
        assert!(store.find_by_credentials("sensor-3", "t1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryDeviceStore::new();
        assert!(store.list_devices().await.unwrap().is_empty());

        for i in 0..5 {
            store
                .insert_device(&new_device(&format!("sensor-{}", i), "t"))
                .await
                .unwrap();
        }

        let ids: Vec<String> = store
            .list_devices()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.device_id)
            .collect();
        assert_eq!(ids, ["sensor-0", "sensor-1", "sensor-2", "sensor-3", "sensor-4"]);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration() {
        let store = MemoryDeviceStore::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_device(&new_device("sensor-1", &format!("t{}", i)))
                    .await
                    .is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }
}
