// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Memoizing wrappers
//!
//! [`Memoized`] wraps a computation and consults the tiers selected by its
//! mode before running it. On a live hit the computation is not invoked at
//! all; on a miss it runs once for that call, its result is stored per the
//! mode's write policy, and the fresh value is returned.
//!
//! [`OptionMemoized`] does the same for computations that can legitimately
//! produce no value. The "no value" outcome is recorded as a vacant entry
//! and replayed on later calls without rerunning the computation.
//!
//! Concurrent callers that miss on the same key may each run the
//! computation and each store a result; the last write wins. There is no
//! single-flight coalescing.

use crate::context::CacheContext;
use crate::entry::{now_epoch_millis, Envelope};
use crate::error::MemoizeError;
use crate::key::CacheKey;
use crate::tier::router::{self, Lookup};
use crate::tier::{DiskTier, Mode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Plumbing shared by both wrapper flavors.
struct Shared<F> {
    context: Arc<CacheContext>,
    identity: String,
    mode: Mode,
    ttl: Option<Duration>,
    disk_override: Option<DiskTier>,
    compute: F,
}

impl<F> Shared<F> {
    fn disk(&self) -> &DiskTier {
        self.disk_override
            .as_ref()
            .unwrap_or_else(|| self.context.disk())
    }

    fn lookup(&self, key: &CacheKey, now_ms: u64) -> Lookup {
        router::lookup(self.context.memory(), self.disk(), self.mode, key, now_ms)
    }

    fn store(&self, key: &CacheKey, envelope: Envelope) {
        router::store(self.context.memory(), self.disk(), self.mode, key, envelope);
    }

    fn store_encoded<V: Serialize>(&self, key: &CacheKey, value: &V) {
        match bincode::serialize(value) {
            Ok(payload) => {
                self.store(key, Envelope::new(payload, self.ttl, now_epoch_millis()));
            }
            Err(err) => {
                log::warn!(
                    "computed value for {} is not encodable ({}), returning it uncached",
                    key,
                    err
                );
            }
        }
    }

    /// Drop a stale entry from the tiers this mode writes to.
    fn drop_entry(&self, key: &CacheKey) {
        if self.mode.writes_memory() {
            self.context.memory().remove(key);
        }
        if self.mode.writes_disk() {
            if let Err(err) = self.disk().remove(key) {
                log::debug!("could not drop stale entry {}: {}", key, err);
            }
        }
    }

    fn invalidate_all(&self) {
        let prefix = CacheKey::identity_prefix(&self.identity);
        if self.mode.writes_memory() {
            self.context.memory().remove_prefix(&prefix);
        }
        if self.mode.writes_disk() {
            if let Err(err) = self.disk().remove_prefix(&prefix) {
                log::warn!(
                    "invalidation of `{}` failed ({}), resetting durable tier",
                    self.identity,
                    err
                );
                self.disk().reset();
            }
        }
    }

    fn decode<V: DeserializeOwned>(&self, key: &CacheKey, bytes: &[u8]) -> Option<V> {
        match bincode::deserialize(bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                log::debug!(
                    "cached payload for {} no longer decodes ({}), recomputing",
                    key,
                    err
                );
                self.drop_entry(key);
                None
            }
        }
    }
}

/// A memoized computation.
///
/// `A` is the argument shape (any `Serialize` value, typically a tuple),
/// `V` the cached result, `E` the computation's error type.
pub struct Memoized<A, V, E, F> {
    shared: Shared<F>,
    _marker: PhantomData<fn(&A) -> Result<V, E>>,
}

impl<A, V, E, F> Memoized<A, V, E, F>
where
    A: Serialize,
    V: Serialize + DeserializeOwned,
    F: Fn(&A) -> Result<V, E>,
{
    pub fn new(
        context: Arc<CacheContext>,
        identity: impl Into<String>,
        mode: Mode,
        ttl: Option<Duration>,
        compute: F,
    ) -> Self {
        Self {
            shared: Shared {
                context,
                identity: identity.into(),
                mode,
                ttl,
                disk_override: None,
                compute,
            },
            _marker: PhantomData,
        }
    }

    /// Wrap using the context's default mode and TTL.
    pub fn with_defaults(
        context: Arc<CacheContext>,
        identity: impl Into<String>,
        compute: F,
    ) -> Self {
        let mode = context.config().default_mode;
        let ttl = context.config().default_ttl;
        Self::new(context, identity, mode, ttl, compute)
    }

    /// Scope this computation to its own durable store instead of the
    /// context-wide one.
    pub fn over_disk(mut self, disk: DiskTier) -> Self {
        self.shared.disk_override = Some(disk);
        self
    }

    /// Return the cached result for `args`, running the computation only
    /// on a genuine miss.
    pub fn call(&self, args: &A) -> Result<V, MemoizeError<E>> {
        let key = CacheKey::derive(&self.shared.identity, args).map_err(MemoizeError::Cache)?;

        if let Lookup::Hit { payload, .. } = self.shared.lookup(&key, now_epoch_millis()) {
            match payload {
                Some(bytes) => {
                    if let Some(value) = self.shared.decode(&key, &bytes) {
                        return Ok(value);
                    }
                }
                None => {
                    // A vacant entry under a value-producing computation is
                    // a stale shape left by a different wrapper; recompute.
                    log::debug!("vacant entry under {}, recomputing", key);
                    self.shared.drop_entry(&key);
                }
            }
        }

        let value = (self.shared.compute)(args).map_err(MemoizeError::Computation)?;
        self.shared.store_encoded(&key, &value);
        Ok(value)
    }

    /// Remove every cached entry of this computation from the tiers its
    /// mode writes to.
    pub fn invalidate_all(&self) {
        self.shared.invalidate_all();
    }

    pub fn identity(&self) -> &str {
        &self.shared.identity
    }

    pub fn mode(&self) -> Mode {
        self.shared.mode
    }
}

impl<A, V, E, F> fmt::Debug for Memoized<A, V, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("identity", &self.shared.identity)
            .field("mode", &self.shared.mode)
            .field("ttl", &self.shared.ttl)
            .finish_non_exhaustive()
    }
}

/// A memoized computation whose result may legitimately be "no value".
///
/// `None` results are recorded as vacant entries: a later call within the
/// TTL window replays `None` without rerunning the computation, which is
/// observably different from the entry being absent.
pub struct OptionMemoized<A, V, E, F> {
    shared: Shared<F>,
    _marker: PhantomData<fn(&A) -> Result<Option<V>, E>>,
}

impl<A, V, E, F> OptionMemoized<A, V, E, F>
where
    A: Serialize,
    V: Serialize + DeserializeOwned,
    F: Fn(&A) -> Result<Option<V>, E>,
{
    pub fn new(
        context: Arc<CacheContext>,
        identity: impl Into<String>,
        mode: Mode,
        ttl: Option<Duration>,
        compute: F,
    ) -> Self {
        Self {
            shared: Shared {
                context,
                identity: identity.into(),
                mode,
                ttl,
                disk_override: None,
                compute,
            },
            _marker: PhantomData,
        }
    }

    /// Wrap using the context's default mode and TTL.
    pub fn with_defaults(
        context: Arc<CacheContext>,
        identity: impl Into<String>,
        compute: F,
    ) -> Self {
        let mode = context.config().default_mode;
        let ttl = context.config().default_ttl;
        Self::new(context, identity, mode, ttl, compute)
    }

    /// Scope this computation to its own durable store instead of the
    /// context-wide one.
    pub fn over_disk(mut self, disk: DiskTier) -> Self {
        self.shared.disk_override = Some(disk);
        self
    }

    pub fn call(&self, args: &A) -> Result<Option<V>, MemoizeError<E>> {
        let key = CacheKey::derive(&self.shared.identity, args).map_err(MemoizeError::Cache)?;

        if let Lookup::Hit { payload, .. } = self.shared.lookup(&key, now_epoch_millis()) {
            match payload {
                None => return Ok(None),
                Some(bytes) => {
                    if let Some(value) = self.shared.decode(&key, &bytes) {
                        return Ok(Some(value));
                    }
                }
            }
        }

        match (self.shared.compute)(args).map_err(MemoizeError::Computation)? {
            Some(value) => {
                self.shared.store_encoded(&key, &value);
                Ok(Some(value))
            }
            None => {
                self.shared.store(
                    &key,
                    Envelope::vacant(self.shared.ttl, now_epoch_millis()),
                );
                Ok(None)
            }
        }
    }

    pub fn invalidate_all(&self) {
        self.shared.invalidate_all();
    }

    pub fn identity(&self) -> &str {
        &self.shared.identity
    }

    pub fn mode(&self) -> Mode {
        self.shared.mode
    }
}

impl<A, V, E, F> fmt::Debug for OptionMemoized<A, V, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionMemoized")
            .field("identity", &self.shared.identity)
            .field("mode", &self.shared.mode)
            .field("ttl", &self.shared.ttl)
            .finish_non_exhaustive()
    }
}

/// Wrap a computation that cannot fail.
pub fn memoize_infallible<A, V, F>(
    context: Arc<CacheContext>,
    identity: impl Into<String>,
    mode: Mode,
    ttl: Option<Duration>,
    compute: F,
) -> Memoized<A, V, Infallible, impl Fn(&A) -> Result<V, Infallible>>
where
    A: Serialize,
    V: Serialize + DeserializeOwned,
    F: Fn(&A) -> V,
{
    Memoized::new(context, identity, mode, ttl, move |args| Ok(compute(args)))
}
