// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache configuration

use crate::engine::EngineKind;
use crate::error::CacheError;
use crate::tier::Mode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a cache context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the durable tier's generation directories.
    pub root: PathBuf,

    /// Engine backing the durable tier.
    pub engine: EngineKind,

    /// Mode used by memoized computations that do not choose their own.
    pub default_mode: Mode,

    /// TTL used by memoized computations that do not choose their own.
    /// `None` (or a zero duration) means entries never expire.
    pub default_ttl: Option<Duration>,

    /// Flush the durable engine after every write. Slower, but entries
    /// survive an abrupt process exit.
    pub flush_after_write: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./memotier"),
            engine: EngineKind::default(),
            default_mode: Mode::default(),
            default_ttl: None,
            flush_after_write: true,
        }
    }
}

impl CacheConfig {
    /// Configuration rooted at `root`, defaults everywhere else.
    pub fn at<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_default_mode(mut self, mode: Mode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_flush_after_write(mut self, flush: bool) -> Self {
        self.flush_after_write = flush;
        self
    }

    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CacheError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
