// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Durable tier
//!
//! Entries live in numbered generation directories under a root. A reset
//! abandons the current generation and continues in a fresh, empty one, so
//! bytes from a store that was found broken are never read again. Opening
//! the tier reuses the newest generation present on disk, which is how
//! entries survive a process restart.

use crate::engine::{destroy_location, open_engine, DurableEngine, EngineError, EngineKind, EngineResult};
use crate::entry::Envelope;
use crate::error::CacheError;
use crate::key::CacheKey;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const GENERATION_PREFIX: &str = "gen-";

/// Consecutive generations tried before giving up on opening the tier.
const MAX_OPEN_ATTEMPTS: u32 = 3;

struct TierState {
    generation: u64,
    /// `None` while the tier is disabled after a failed rotation. All
    /// operations then behave as misses or no-ops.
    engine: Option<Arc<dyn DurableEngine>>,
}

/// Durable tier backed by a key-value engine.
pub struct DiskTier {
    root: PathBuf,
    kind: EngineKind,
    flush_after_write: bool,
    state: RwLock<TierState>,
}

impl DiskTier {
    /// Open the tier under `root`, reusing the newest generation directory
    /// if one exists. A generation that fails to open is abandoned and the
    /// next one is tried.
    pub fn open<P: Into<PathBuf>>(
        root: P,
        kind: EngineKind,
        flush_after_write: bool,
    ) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| {
            CacheError::Storage(format!(
                "cannot create cache root {}: {}",
                root.display(),
                err
            ))
        })?;

        let mut generation = latest_generation(&root);
        for _ in 0..MAX_OPEN_ATTEMPTS {
            let location = generation_path(&root, generation);
            if let Err(err) = fs::create_dir_all(&location) {
                return Err(CacheError::Storage(format!(
                    "cannot create store location {}: {}",
                    location.display(),
                    err
                )));
            }
            match open_engine(kind, &location) {
                Ok(engine) => {
                    log::debug!("durable tier open at {}", location.display());
                    return Ok(DiskTier {
                        root,
                        kind,
                        flush_after_write,
                        state: RwLock::new(TierState {
                            generation,
                            engine: Some(Arc::from(engine)),
                        }),
                    });
                }
                Err(err) => {
                    log::warn!(
                        "store at {} is unusable ({}), abandoning it",
                        location.display(),
                        err
                    );
                    if let Err(err) = destroy_location(&location) {
                        log::warn!(
                            "could not remove abandoned store {}: {}",
                            location.display(),
                            err
                        );
                    }
                    generation += 1;
                }
            }
        }
        Err(CacheError::Storage(format!(
            "no usable durable store under {}",
            root.display()
        )))
    }

    fn engine(&self) -> Option<Arc<dyn DurableEngine>> {
        self.state.read().engine.clone()
    }

    /// Read and decode the envelope stored under `key`. A decode failure is
    /// reported as corruption, same as an engine failure.
    pub(crate) fn get(&self, key: &CacheKey) -> EngineResult<Option<Envelope>> {
        let Some(engine) = self.engine() else {
            return Ok(None);
        };
        match engine.read(key.as_bytes())? {
            None => Ok(None),
            Some(bytes) => Envelope::from_bytes(&bytes)
                .map(Some)
                .map_err(|err| EngineError::Corruption(err.to_string())),
        }
    }

    pub(crate) fn put(&self, key: &CacheKey, envelope: &Envelope) -> EngineResult<()> {
        let Some(engine) = self.engine() else {
            return Ok(());
        };
        engine.write(key.as_bytes(), &envelope.to_bytes())?;
        if self.flush_after_write {
            engine.flush()?;
        }
        Ok(())
    }

    pub(crate) fn remove(&self, key: &CacheKey) -> EngineResult<()> {
        let Some(engine) = self.engine() else {
            return Ok(());
        };
        engine.remove(key.as_bytes())
    }

    pub(crate) fn remove_prefix(&self, prefix: &[u8]) -> EngineResult<()> {
        let Some(engine) = self.engine() else {
            return Ok(());
        };
        engine.remove_prefix(prefix)
    }

    /// Abandon the current generation and continue in a fresh, empty one.
    ///
    /// The handle swap happens under the write lock, so concurrent readers
    /// either finish against the old engine they already cloned or observe
    /// the new one. The old location is deleted best-effort and its index
    /// is never reused.
    pub fn reset(&self) {
        let mut state = self.state.write();
        let old_location = generation_path(&self.root, state.generation);
        state.engine = None;
        state.generation += 1;

        let location = generation_path(&self.root, state.generation);
        let opened = fs::create_dir_all(&location)
            .map_err(|err| EngineError::Io(err.to_string()))
            .and_then(|_| open_engine(self.kind, &location));
        match opened {
            Ok(engine) => {
                state.engine = Some(Arc::from(engine));
                log::warn!("durable tier moved to {}", location.display());
            }
            Err(err) => {
                log::error!(
                    "durable tier disabled, fresh store at {} failed to open: {}",
                    location.display(),
                    err
                );
            }
        }
        drop(state);

        if let Err(err) = destroy_location(&old_location) {
            log::warn!(
                "could not remove abandoned store {}: {}",
                old_location.display(),
                err
            );
        }
    }

    /// Index of the generation currently serving reads and writes.
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Directory holding the current generation's store.
    pub fn current_location(&self) -> PathBuf {
        generation_path(&self.root, self.state.read().generation)
    }

    pub fn is_empty(&self) -> bool {
        self.engine()
            .map(|engine| engine.is_empty().unwrap_or(true))
            .unwrap_or(true)
    }

    pub fn flush(&self) -> EngineResult<()> {
        match self.engine() {
            Some(engine) => engine.flush(),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, key: &CacheKey, bytes: &[u8]) {
        let engine = self.engine().expect("tier disabled");
        engine.write(key.as_bytes(), bytes).expect("raw write");
    }
}

fn generation_path(root: &Path, generation: u64) -> PathBuf {
    root.join(format!("{}{:05}", GENERATION_PREFIX, generation))
}

/// Newest generation index present under `root`, or 0 for a fresh root.
fn latest_generation(root: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix(GENERATION_PREFIX).map(str::to_string))
        })
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}
