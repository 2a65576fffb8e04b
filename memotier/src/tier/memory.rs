// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Volatile tier

use crate::entry::Envelope;
use crate::key::CacheKey;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-process tier. Contents are lost on process exit or [`reset`].
///
/// Expiry is not swept in the background; the router checks liveness on
/// read and drops what it finds expired.
///
/// [`reset`]: MemoryTier::reset
#[derive(Default)]
pub struct MemoryTier {
    map: RwLock<HashMap<CacheKey, Envelope>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &CacheKey) -> Option<Envelope> {
        self.map.read().get(key).cloned()
    }

    pub(crate) fn put(&self, key: CacheKey, envelope: Envelope) {
        self.map.write().insert(key, envelope);
    }

    pub(crate) fn remove(&self, key: &CacheKey) {
        self.map.write().remove(key);
    }

    pub(crate) fn remove_prefix(&self, prefix: &[u8]) {
        self.map
            .write()
            .retain(|key, _| !key.as_bytes().starts_with(prefix));
    }

    /// Swap in a brand-new empty map. Readers that already cloned an
    /// envelope keep it; every later call observes the empty map.
    pub fn reset(&self) {
        *self.map.write() = HashMap::new();
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}
