// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled engine implementation

use super::types::{EngineError, EngineResult};
use super::DurableEngine;
use std::path::Path;

/// Sled-backed engine. One database per durable location.
pub struct SledEngine {
    db: sled::Db,
}

fn classify(err: sled::Error) -> EngineError {
    match &err {
        sled::Error::Io(e) => EngineError::Io(e.to_string()),
        sled::Error::Corruption { .. } => EngineError::Corruption(err.to_string()),
        _ => EngineError::Backend(err.to_string()),
    }
}

impl DurableEngine for SledEngine {
    fn open<P: AsRef<Path>>(location: P) -> EngineResult<Self> {
        let db = sled::open(location).map_err(classify)?;
        Ok(SledEngine { db })
    }

    fn read(&self, key: &[u8]) -> EngineResult<Option<Vec<u8>>> {
        self.db
            .get(key)
            .map_err(classify)
            .map(|opt| opt.map(|v| v.to_vec()))
    }

    fn write(&self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        self.db.insert(key, value).map_err(classify)?;
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> EngineResult<()> {
        self.db.remove(key).map_err(classify)?;
        Ok(())
    }

    fn remove_prefix(&self, prefix: &[u8]) -> EngineResult<()> {
        // Collect first; removing while the iterator holds the tree is
        // not supported.
        let mut keys = Vec::new();
        for item in self.db.scan_prefix(prefix) {
            let (key, _) = item.map_err(classify)?;
            keys.push(key);
        }
        for key in keys {
            self.db.remove(key).map_err(classify)?;
        }
        Ok(())
    }

    fn clear(&self) -> EngineResult<()> {
        self.db.clear().map_err(classify)
    }

    fn flush(&self) -> EngineResult<()> {
        self.db.flush().map_err(classify)?;
        Ok(())
    }

    fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.db.is_empty())
    }
}
