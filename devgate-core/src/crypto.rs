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

//! Device token generation and comparison

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, RngCore};

/// Random bytes per token; hex encoding doubles the length
pub const TOKEN_BYTES: usize = 16;

/// Length of an encoded token
pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// Generate a fresh device token
///
/// Draws 16 bytes from the operating system CSPRNG and returns them
/// lowercase hex-encoded (128 bits of entropy).
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Check that a string has the shape of an issued token
pub fn is_well_formed_token(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Compare two tokens without leaking the mismatch position through timing
pub fn tokens_match(expected: &str, presented: &str) -> bool {
    constant_time_eq(expected.as_bytes(), presented.as_bytes())
}
