// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache tiers and modes

pub mod disk;
pub mod memory;
pub(crate) mod router;

pub use disk::DiskTier;
pub use memory::MemoryTier;

use serde::{Deserialize, Serialize};

/// One storage layer of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// In-process, lost on restart or reset.
    Memory,
    /// Durable, survives restarts.
    Disk,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tier::Memory => "memory",
            Tier::Disk => "disk",
        };
        write!(f, "{}", name)
    }
}

/// Tier combination a memoized computation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Volatile tier only.
    Memory,

    /// Durable tier only.
    Disk,

    /// Volatile tier first with durable fallback. A durable hit is promoted
    /// back into the volatile tier; writes populate both tiers.
    Mix,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Mix
    }
}

impl Mode {
    pub fn reads_memory(&self) -> bool {
        matches!(self, Mode::Memory | Mode::Mix)
    }

    pub fn reads_disk(&self) -> bool {
        matches!(self, Mode::Disk | Mode::Mix)
    }

    pub fn writes_memory(&self) -> bool {
        matches!(self, Mode::Memory | Mode::Mix)
    }

    pub fn writes_disk(&self) -> bool {
        matches!(self, Mode::Disk | Mode::Mix)
    }

    /// Whether a durable hit is copied back into the volatile tier.
    pub fn promotes(&self) -> bool {
        matches!(self, Mode::Mix)
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Mode::Memory),
            "disk" => Ok(Mode::Disk),
            "mix" => Ok(Mode::Mix),
            _ => Err(format!(
                "Unknown cache mode: {}. Valid options: memory, disk, mix",
                s
            )),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Memory => "memory",
            Mode::Disk => "disk",
            Mode::Mix => "mix",
        };
        write!(f, "{}", name)
    }
}
