// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the memoizing cache

use thiserror::Error;

/// Errors surfaced to callers of the cache API.
///
/// Failures inside the durable tier are deliberately not represented here.
/// A broken durable store is rotated out for a fresh one and the affected
/// lookup proceeds as a miss, so callers see at worst a recomputation.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// An argument could not be canonically encoded into key bytes.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// A configuration value could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// The cache could not be opened at its configured location.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Codec(err.to_string())
    }
}

/// Error returned by a memoized call.
#[derive(Error, Debug)]
pub enum MemoizeError<E> {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The wrapped computation itself failed. Nothing is cached, so the
    /// next call with the same arguments runs the computation again.
    #[error("Computation failed: {0}")]
    Computation(E),
}
