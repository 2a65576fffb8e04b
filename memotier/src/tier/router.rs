// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-mode tier orchestration
//!
//! Lookups consult the volatile tier first, then the durable tier, as the
//! mode allows. A live durable hit in `Mix` mode is promoted back into the
//! volatile tier. Durable failures are absorbed here: the tier is rotated
//! and the lookup proceeds as a miss, so a broken cache costs at most a
//! recomputation and is never a caller-visible error.
//!
//! Resetting the volatile tier does not force recomputation in `Mix` mode.
//! A later lookup that finds a live durable entry promotes it as usual; the
//! reset discards only the volatile copies.

use crate::entry::Envelope;
use crate::key::CacheKey;
use crate::tier::{DiskTier, MemoryTier, Mode, Tier};

/// Outcome of a tiered lookup.
#[derive(Debug)]
pub(crate) enum Lookup {
    /// A live entry was found. `payload` is `None` for a recorded
    /// no-value result.
    Hit {
        tier: Tier,
        payload: Option<Vec<u8>>,
    },
    Miss,
}

/// Consult the tiers selected by `mode` for a live entry under `key`.
/// An entry present but expired counts as absent and is dropped from the
/// tier it was found in, best-effort.
pub(crate) fn lookup(
    memory: &MemoryTier,
    disk: &DiskTier,
    mode: Mode,
    key: &CacheKey,
    now_ms: u64,
) -> Lookup {
    if mode.reads_memory() {
        if let Some(envelope) = memory.get(key) {
            if envelope.is_live(now_ms) {
                log::debug!("memory hit for {}", key);
                return Lookup::Hit {
                    tier: Tier::Memory,
                    payload: envelope.into_payload(),
                };
            }
            memory.remove(key);
        }
    }

    if mode.reads_disk() {
        match disk.get(key) {
            Ok(Some(envelope)) => {
                if envelope.is_live(now_ms) {
                    log::debug!("disk hit for {}", key);
                    if mode.promotes() {
                        memory.put(key.clone(), envelope.clone());
                    }
                    return Lookup::Hit {
                        tier: Tier::Disk,
                        payload: envelope.into_payload(),
                    };
                }
                if let Err(err) = disk.remove(key) {
                    log::debug!("could not drop expired entry {}: {}", key, err);
                }
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!(
                    "durable read for {} failed ({}), resetting durable tier",
                    key,
                    err
                );
                disk.reset();
            }
        }
    }

    Lookup::Miss
}

/// Store `envelope` into the tiers selected by `mode`. A durable write
/// failure rotates the durable tier and is absorbed; the volatile write
/// still happens in `Mix` mode.
pub(crate) fn store(
    memory: &MemoryTier,
    disk: &DiskTier,
    mode: Mode,
    key: &CacheKey,
    envelope: Envelope,
) {
    if mode.writes_disk() {
        if let Err(err) = disk.put(key, &envelope) {
            log::warn!(
                "durable write for {} failed ({}), resetting durable tier",
                key,
                err
            );
            disk.reset();
        }
    }
    if mode.writes_memory() {
        memory.put(key.clone(), envelope);
    }
}
