// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache context
//!
//! The context is the single owner of the two tier instances. Construct one
//! at the composition point of the embedding program and hand it (usually
//! behind an `Arc`) to every memoized computation; there is no ambient
//! process-wide instance.

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::tier::{DiskTier, MemoryTier};
use std::path::PathBuf;

/// Owner of the volatile and durable tier instances.
pub struct CacheContext {
    config: CacheConfig,
    memory: MemoryTier,
    disk: DiskTier,
}

impl CacheContext {
    /// Open a context as described by `config`.
    pub fn open(config: CacheConfig) -> Result<Self, CacheError> {
        let disk = DiskTier::open(
            config.root.clone(),
            config.engine,
            config.flush_after_write,
        )?;
        Ok(Self {
            config,
            memory: MemoryTier::new(),
            disk,
        })
    }

    /// Context rooted at `root` with default configuration.
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Result<Self, CacheError> {
        Self::open(CacheConfig::at(root))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }

    pub fn disk(&self) -> &DiskTier {
        &self.disk
    }

    /// Discard the volatile tier. Durable entries are unaffected; in `Mix`
    /// mode a later lookup promotes them back instead of recomputing.
    pub fn reset_memory(&self) {
        log::debug!("volatile tier reset");
        self.memory.reset();
    }

    /// Rotate the durable tier to a fresh location, discarding its contents.
    pub fn reset_disk(&self) {
        log::debug!("durable tier reset");
        self.disk.reset();
    }
}
