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

//! Metrics collection and reporting

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

const LATENCY_WINDOW: usize = 10_000;

/// Global metrics collector
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    start_time: Instant,

    // Request metrics
    requests_total: AtomicU64,
    requests_failed: AtomicU64,

    // Device lifecycle
    registrations_total: AtomicU64,
    registration_conflicts: AtomicU64,
    auth_failures: AtomicU64,

    // Ingestion
    uploads_total: AtomicU64,
    bytes_uploaded: AtomicU64,

    // Datastore
    datastore_errors: AtomicU64,

    // Latency tracking (microseconds)
    request_latencies: RwLock<Vec<u64>>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                start_time: Instant::now(),
                requests_total: AtomicU64::new(0),
                requests_failed: AtomicU64::new(0),
                registrations_total: AtomicU64::new(0),
                registration_conflicts: AtomicU64::new(0),
                auth_failures: AtomicU64::new(0),
                uploads_total: AtomicU64::new(0),
                bytes_uploaded: AtomicU64::new(0),
                datastore_errors: AtomicU64::new(0),
                request_latencies: RwLock::new(Vec::with_capacity(LATENCY_WINDOW)),
            }),
        }
    }

    // Request metrics
    pub fn record_request(&self, latency_micros: u64, failed: bool) {
        self.inner.requests_total.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.inner.requests_failed.fetch_add(1, Ordering::Relaxed);
        }

        let mut latencies = self.inner.request_latencies.write();
        latencies.push(latency_micros);
        if latencies.len() > LATENCY_WINDOW {
            latencies.drain(0..LATENCY_WINDOW / 2);
        }
    }

    pub fn requests_total(&self) -> u64 {
        self.inner.requests_total.load(Ordering::Relaxed)
    }

    pub fn requests_failed(&self) -> u64 {
        self.inner.requests_failed.load(Ordering::Relaxed)
    }

    // Device lifecycle
    pub fn record_registration(&self) {
        self.inner.registrations_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration_conflict(&self) {
        self.inner.registration_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_auth_failure(&self) {
        self.inner.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn registrations_total(&self) -> u64 {
        self.inner.registrations_total.load(Ordering::Relaxed)
    }

    pub fn registration_conflicts(&self) -> u64 {
        self.inner.registration_conflicts.load(Ordering::Relaxed)
    }

    pub fn auth_failures(&self) -> u64 {
        self.inner.auth_failures.load(Ordering::Relaxed)
    }

    // Ingestion
    pub fn record_upload(&self, bytes: usize) {
        self.inner.uploads_total.fetch_add(1, Ordering::Relaxed);
        self.inner.bytes_uploaded.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn uploads_total(&self) -> u64 {
        self.inner.uploads_total.load(Ordering::Relaxed)
    }

    pub fn bytes_uploaded(&self) -> u64 {
        self.inner.bytes_uploaded.load(Ordering::Relaxed)
    }

    // Datastore
    pub fn record_datastore_error(&self) {
        self.inner.datastore_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn datastore_errors(&self) -> u64 {
        self.inner.datastore_errors.load(Ordering::Relaxed)
    }

    // Derived metrics
    pub fn uptime_seconds(&self) -> u64 {
        self.inner.start_time.elapsed().as_secs()
    }

    pub fn latency_percentile(&self, percentile: f64) -> Option<u64> {
        let latencies = self.inner.request_latencies.read();
        if latencies.is_empty() {
            return None;
        }

        let mut sorted = latencies.clone();
        sorted.sort_unstable();
        let index = ((sorted.len() as f64 * percentile).ceil() as usize).min(sorted.len() - 1);
        Some(sorted[index])
    }

    pub fn latency_p50(&self) -> Option<u64> {
        self.latency_percentile(0.50)
    }

    pub fn latency_p99(&self) -> Option<u64> {
        self.latency_percentile(0.99)
    }

    /// Generate Prometheus-compatible metrics output
    pub fn prometheus_format(&self) -> String {
        let mut output = String::new();

        let counters = [
            ("devgate_requests_total", "Total number of requests", self.requests_total()),
            ("devgate_requests_failed", "Total number of failed requests", self.requests_failed()),
            ("devgate_registrations_total", "Devices registered", self.registrations_total()),
            (
                "devgate_registration_conflicts_total",
                "Registrations rejected as duplicates",
                self.registration_conflicts(),
            ),
            ("devgate_auth_failures_total", "Rejected device credentials", self.auth_failures()),
            ("devgate_uploads_total", "Accepted data uploads", self.uploads_total()),
            ("devgate_bytes_uploaded", "Serialized bytes of accepted uploads", self.bytes_uploaded()),
            ("devgate_datastore_errors_total", "Failed datastore calls", self.datastore_errors()),
        ];

        for (name, help, value) in counters {
            output.push_str(&format!("# HELP {} {}\n", name, help));
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!("{} {}\n", name, value));
        }

        output.push_str("# HELP devgate_uptime_seconds Service uptime in seconds\n");
        output.push_str("# TYPE devgate_uptime_seconds gauge\n");
        output.push_str(&format!("devgate_uptime_seconds {}\n", self.uptime_seconds()));

        if let Some(p50) = self.latency_p50() {
            output.push_str("# HELP devgate_latency_p50_microseconds Request latency 50th percentile\n");
            output.push_str("# TYPE devgate_latency_p50_microseconds gauge\n");
            output.push_str(&format!("devgate_latency_p50_microseconds {}\n", p50));
        }

        if let Some(p99) = self.latency_p99() {
            output.push_str("# HELP devgate_latency_p99_microseconds Request latency 99th percentile\n");
            output.push_str("# TYPE devgate_latency_p99_microseconds gauge\n");
            output.push_str(&format!("devgate_latency_p99_microseconds {}\n", p99));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();

        metrics.record_registration();
        metrics.record_registration_conflict();
        metrics.record_upload(128);
        metrics.record_upload(64);
        metrics.record_auth_failure();
        metrics.record_datastore_error();
        metrics.record_request(100, false);
        metrics.record_request(200, true);

        assert_eq!(metrics.registrations_total(), 1);
        assert_eq!(metrics.registration_conflicts(), 1);
        assert_eq!(metrics.uploads_total(), 2);
        assert_eq!(metrics.bytes_uploaded(), 192);
        assert_eq!(metrics.auth_failures(), 1);
        assert_eq!(metrics.datastore_errors(), 1);
        assert_eq!(metrics.requests_total(), 2);
        assert_eq!(metrics.requests_failed(), 1);
    }

    #[test]
    fn test_latency_percentiles() {
        let metrics = Metrics::new();
        assert!(metrics.latency_p50().is_none());

        for i in 1..=100 {
            metrics.record_request(i, false);
        }

        let p50 = metrics.latency_p50().unwrap();
        assert!((45..=55).contains(&p50));

        let p99 = metrics.latency_p99().unwrap();
        assert!((95..=100).contains(&p99));
    }

    #[test]
    fn test_prometheus_output() {
        let metrics = Metrics::new();
        metrics.record_registration();

        let text = metrics.prometheus_format();
        assert!(text.contains("# TYPE devgate_registrations_total counter"));
        assert!(text.contains("devgate_registrations_total 1\n"));
        assert!(text.contains("devgate_uptime_seconds"));
        assert!(!text.contains("devgate_latency_p50_microseconds"));
    }
}
