// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache key derivation
//!
//! Keys are derived from a computation's stable identity plus a canonical
//! binary encoding of its call arguments. Equal argument values produce
//! equal keys no matter which instances carry them, and the encoding does
//! not change across process restarts, so keys remain addressable in the
//! durable tier.

use crate::error::CacheError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Separator between the identity bytes and the canonical argument bytes.
/// Keeps two different identities from ever sharing a key prefix.
const IDENTITY_SEPARATOR: u8 = 0x1f;

/// Opaque, deterministic, content-derived cache key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    bytes: Vec<u8>,
}

impl CacheKey {
    /// Derive the key for `identity` called with `args`.
    ///
    /// Arguments are canonicalized structurally through their `Serialize`
    /// implementation. An argument that refuses to encode is an error;
    /// there is no fallback to instance-identity hashing.
    pub fn derive<A>(identity: &str, args: &A) -> Result<Self, CacheError>
    where
        A: Serialize + ?Sized,
    {
        let canonical = bincode::serialize(args).map_err(|err| {
            CacheError::KeyDerivation(format!(
                "arguments for `{}` are not canonically encodable: {}",
                identity, err
            ))
        })?;

        let mut bytes = Self::identity_prefix(identity);
        bytes.extend_from_slice(&canonical);
        Ok(CacheKey { bytes })
    }

    /// Byte prefix shared by every key derived for one identity.
    pub fn identity_prefix(identity: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(identity.len() + 1);
        bytes.extend_from_slice(identity.as_bytes());
        bytes.push(IDENTITY_SEPARATOR);
        bytes
    }

    /// Full key bytes, as stored in the durable tier.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Short stable digest, for log lines only.
    pub fn digest(&self) -> u32 {
        crc32fast::hash(&self.bytes)
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({:08x})", self.digest())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.digest())
    }
}

/// Named-argument bundle with an order-insensitive canonical encoding.
///
/// Entries are keyed by name in a `BTreeMap`, so the derived cache key does
/// not depend on the order arguments were supplied at the call site.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyedArgs {
    entries: BTreeMap<String, Vec<u8>>,
}

impl KeyedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named argument. The value is encoded immediately, so a
    /// non-encodable value is reported here rather than at call time.
    pub fn arg<V>(mut self, name: &str, value: &V) -> Result<Self, CacheError>
    where
        V: Serialize + ?Sized,
    {
        let encoded = bincode::serialize(value).map_err(|err| {
            CacheError::KeyDerivation(format!(
                "named argument `{}` is not canonically encodable: {}",
                name, err
            ))
        })?;
        self.entries.insert(name.to_string(), encoded);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Expands to a stable qualified identity for a memoized computation:
/// the enclosing module path plus the given name.
///
/// ```ignore
/// let cached = Memoized::new(ctx, memo_identity!("lookup"), mode, ttl, lookup);
/// ```
#[macro_export]
macro_rules! memo_identity {
    ($name:expr) => {
        concat!(module_path!(), "::", $name)
    };
}
