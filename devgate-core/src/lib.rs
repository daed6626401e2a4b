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

//! Device Gateway Core Library
//!
//! This crate provides the foundational types and services for the device gateway:
//! registering IoT devices, issuing their bearer tokens and checking those tokens on
//! later requests. Device records live in an external managed datastore.
//!
//! # Architecture
//!
//! The library is organized into modules representing core concerns:
//! - `protocol`: Device records and HTTP payload shapes
//! - `config`: Configuration management with validation
//! - `store`: Datastore client trait with REST and in-memory backends
//! - `crypto`: Token generation and constant-time comparison
//! - `metrics`: Counters and Prometheus rendering
//! - `error`: Unified error types

pub mod config;
pub mod crypto;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod store;

pub use error::{Error, Result};
pub use store::DeviceStore;

/// Library version reported at startup
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 3000;
