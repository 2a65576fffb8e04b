// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Memotier - a tiered memoizing cache
//!
//! Memotier caches the results of expensive computations across two tiers:
//! a volatile in-process tier and a durable tier backed by an embedded
//! key-value engine.
//!
//! # Features
//!
//! - **Per-call-site modes**: `memory`, `disk`, or `mix` (volatile first,
//!   durable fallback with promotion)
//! - **Content-derived keys**: equal argument values hit the same entry no
//!   matter which instances carry them
//! - **TTL expiry**: lazy, checked on read; unset or zero means no expiry
//! - **Self-healing durable tier**: a corrupted store is rotated out for a
//!   fresh one and the call proceeds as a miss, never as an error
//! - **Embedded storage**: uses Sled for the durable tier by default, with
//!   an in-memory engine for tests
//!
//! # Usage
//!
//! ```ignore
//! let ctx = Arc::new(CacheContext::with_root("./cache")?);
//! let lookup = memoize_infallible(
//!     ctx,
//!     memo_identity!("lookup"),
//!     Mode::Mix,
//!     Some(Duration::from_secs(3)),
//!     |city: &String| expensive_lookup(city),
//! );
//!
//! let a = lookup.call(&"tokyo".to_string())?; // runs the computation
//! let b = lookup.call(&"tokyo".to_string())?; // served from cache
//! assert_eq!(a, b);
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod entry;
pub mod error;
pub mod key;
pub mod memoize;
pub mod tier;

pub use config::CacheConfig;
pub use context::CacheContext;
pub use engine::{DurableEngine, EngineError, EngineKind, EngineResult};
pub use entry::{Envelope, EnvelopeError};
pub use error::{CacheError, MemoizeError};
pub use key::{CacheKey, KeyedArgs};
pub use memoize::{memoize_infallible, Memoized, OptionMemoized};
pub use tier::{DiskTier, MemoryTier, Mode, Tier};

/// Memotier version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Memotier crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
