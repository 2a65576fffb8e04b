// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Durable engine types and error handling

use serde::{Deserialize, Serialize};

/// Durable engine selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineKind {
    /// Sled - pure Rust embedded database. The default.
    Sled,

    /// In-memory engine, no durability. Intended for tests.
    Memory,
}

impl Default for EngineKind {
    fn default() -> Self {
        EngineKind::Sled
    }
}

impl std::str::FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(EngineKind::Sled),
            "memory" => Ok(EngineKind::Memory),
            _ => Err(format!(
                "Unknown engine kind: {}. Valid options: sled, memory",
                s
            )),
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngineKind::Sled => "sled",
            EngineKind::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// Error type for engine operations.
///
/// Absence of a key is never an error; reads return `Ok(None)` for it.
/// Every variant here means the store itself misbehaved.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// I/O failure reaching the backing storage.
    #[error("I/O error: {0}")]
    Io(String),

    /// The store's own bytes are unreadable.
    #[error("Corrupted store: {0}")]
    Corruption(String),

    /// Engine-specific failure not covered above.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
