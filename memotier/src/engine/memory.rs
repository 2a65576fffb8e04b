// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory engine implementation for testing

use super::types::EngineResult;
use super::DurableEngine;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

/// In-memory engine. Nothing is persisted; the location is ignored.
#[derive(Default)]
pub struct MemoryEngine {
    data: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableEngine for MemoryEngine {
    fn open<P: AsRef<Path>>(_location: P) -> EngineResult<Self> {
        Ok(Self::new())
    }

    fn read(&self, key: &[u8]) -> EngineResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn write(&self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> EngineResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn remove_prefix(&self, prefix: &[u8]) -> EngineResult<()> {
        self.data.write().retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }

    fn clear(&self) -> EngineResult<()> {
        self.data.write().clear();
        Ok(())
    }

    fn flush(&self) -> EngineResult<()> {
        // No-op for memory storage
        Ok(())
    }

    fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.data.read().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_remove() {
        let engine = MemoryEngine::new();
        assert_eq!(engine.read(b"k").unwrap(), None);

        engine.write(b"k", b"v1").unwrap();
        assert_eq!(engine.read(b"k").unwrap(), Some(b"v1".to_vec()));

        engine.write(b"k", b"v2").unwrap();
        assert_eq!(engine.read(b"k").unwrap(), Some(b"v2".to_vec()));

        engine.remove(b"k").unwrap();
        assert_eq!(engine.read(b"k").unwrap(), None);
        // Removing again is fine.
        engine.remove(b"k").unwrap();
    }

    #[test]
    fn remove_prefix_leaves_other_keys() {
        let engine = MemoryEngine::new();
        engine.write(b"a/1", b"x").unwrap();
        engine.write(b"a/2", b"y").unwrap();
        engine.write(b"b/1", b"z").unwrap();

        engine.remove_prefix(b"a/").unwrap();
        assert_eq!(engine.read(b"a/1").unwrap(), None);
        assert_eq!(engine.read(b"a/2").unwrap(), None);
        assert_eq!(engine.read(b"b/1").unwrap(), Some(b"z".to_vec()));
    }

    #[test]
    fn clear_empties_the_engine() {
        let engine = MemoryEngine::new();
        engine.write(b"k", b"v").unwrap();
        assert!(!engine.is_empty().unwrap());

        engine.clear().unwrap();
        assert!(engine.is_empty().unwrap());
    }
}
