// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Engine factory
//!
//! Creates engines from configuration and disposes of durable locations.

use super::types::{EngineKind, EngineResult};
use super::DurableEngine;
use std::path::Path;

/// Open an engine of the given kind at `location`.
///
/// ```ignore
/// let engine = open_engine(EngineKind::Sled, "./cache/gen-00000")?;
/// engine.write(b"key", b"value")?;
/// ```
pub fn open_engine<P: AsRef<Path>>(
    kind: EngineKind,
    location: P,
) -> EngineResult<Box<dyn DurableEngine>> {
    match kind {
        #[cfg(feature = "sled-backend")]
        EngineKind::Sled => {
            let engine = super::sled::SledEngine::open(location)?;
            Ok(Box::new(engine) as Box<dyn DurableEngine>)
        }
        #[cfg(not(feature = "sled-backend"))]
        EngineKind::Sled => Err(super::types::EngineError::Backend(
            "sled backend not enabled in this build".to_string(),
        )),
        EngineKind::Memory => {
            let engine = super::memory::MemoryEngine::open(location)?;
            Ok(Box::new(engine) as Box<dyn DurableEngine>)
        }
    }
}

/// Remove a durable location from the filesystem entirely. Used when a
/// corrupted store is abandoned so its bytes are never read again.
pub fn destroy_location<P: AsRef<Path>>(location: P) -> std::io::Result<()> {
    let path = location.as_ref();
    if path.exists() {
        std::fs::remove_dir_all(path)
    } else {
        Ok(())
    }
}
