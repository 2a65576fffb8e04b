//! Durable tier persistence and corruption recovery tests
//!
//! These tests exercise the sled engine for real: entries must survive a
//! context reopen, and a damaged store must be absorbed as a miss and
//! rotated out, never surfaced to the caller. Sled holds a lock on its
//! directory, so contexts are opened one at a time and the tests run
//! serially to keep disk traffic predictable.

#![cfg(feature = "sled-backend")]

#[path = "testutils/mod.rs"]
mod testutils;

use memotier::engine::{DurableEngine, SledEngine};
use memotier::{CacheKey, Memoized, Mode};
use std::convert::Infallible;
use std::fs;
use std::path::Path;
use std::time::Duration;
use testutils::{CallCounter, TestFixture};

const IDENT: &str = "durability::probe";

fn stamped(counter: CallCounter) -> impl Fn(&u32) -> Result<u64, Infallible> {
    move |arg| Ok(((counter.tick() as u64) << 32) | u64::from(*arg))
}

/// Overwrite every file of a store with garbage, the way an interrupted
/// write or failing disk would leave it.
fn corrupt_store_files(location: &Path) {
    for entry in fs::read_dir(location).expect("read store dir") {
        let path = entry.expect("store dir entry").path();
        if path.is_file() {
            fs::write(&path, b"CORRUPTED DATA").expect("overwrite store file");
        }
    }
}

#[test]
#[serial_test::serial]
fn disk_entries_survive_a_reopen() {
    let fixture = TestFixture::new();
    let counter = CallCounter::new();

    let first = {
        let ctx = fixture.sled_context();
        let cached = Memoized::new(ctx, IDENT, Mode::Disk, None, stamped(counter.clone()));
        cached.call(&7).unwrap()
    };
    assert_eq!(counter.count(), 1);

    let ctx = fixture.sled_context();
    let cached = Memoized::new(ctx, IDENT, Mode::Disk, None, stamped(counter.clone()));
    let second = cached.call(&7).unwrap();

    assert_eq!(second, first, "the durable entry must survive the reopen");
    assert_eq!(counter.count(), 1, "no recomputation across the reopen");
}

#[test]
#[serial_test::serial]
fn corrupted_value_bytes_become_a_miss_and_rotate_the_store() {
    let fixture = TestFixture::new();
    let counter = CallCounter::new();

    let (first, location) = {
        let ctx = fixture.sled_context();
        let location = ctx.disk().current_location();
        let cached =
            Memoized::new(ctx.clone(), IDENT, Mode::Disk, None, stamped(counter.clone()));
        (cached.call(&5).unwrap(), location)
    };

    // Plant garbage under the exact key the cache will consult.
    {
        let engine = SledEngine::open(&location).unwrap();
        let key = CacheKey::derive(IDENT, &5u32).unwrap();
        engine.write(key.as_bytes(), b"CORRUPTED DATA").unwrap();
        engine.flush().unwrap();
    }

    let ctx = fixture.sled_context();
    assert_eq!(ctx.disk().generation(), 0);
    let cached = Memoized::new(ctx.clone(), IDENT, Mode::Disk, None, stamped(counter.clone()));

    let second = cached.call(&5).unwrap();
    assert_ne!(second, first, "the damaged entry must not be served");
    assert_eq!(counter.count(), 2, "the corrupted read must recompute");
    assert_eq!(
        ctx.disk().generation(),
        1,
        "the damaged store must be rotated out"
    );

    // The fresh generation is fully usable.
    assert_eq!(cached.call(&5).unwrap(), second);
    assert_eq!(counter.count(), 2);
    assert!(!ctx.disk().is_empty());
}

#[test]
#[serial_test::serial]
fn mix_mode_recovers_after_expiry_over_a_corrupted_store() {
    let fixture = TestFixture::new();
    let counter = CallCounter::new();
    let ttl = Some(Duration::from_millis(250));

    let (first, location) = {
        let ctx = fixture.sled_context();
        let location = ctx.disk().current_location();
        let cached = Memoized::new(ctx, IDENT, Mode::Mix, ttl, stamped(counter.clone()));
        (cached.call(&9).unwrap(), location)
    };

    {
        let engine = SledEngine::open(&location).unwrap();
        let key = CacheKey::derive(IDENT, &9u32).unwrap();
        engine.write(key.as_bytes(), b"CORRUPTED DATA").unwrap();
        engine.flush().unwrap();
    }

    // Let the entry's TTL elapse so the durable tier is the one consulted.
    std::thread::sleep(Duration::from_millis(300));

    let ctx = fixture.sled_context();
    let cached = Memoized::new(ctx.clone(), IDENT, Mode::Mix, ttl, stamped(counter.clone()));

    let second = cached.call(&9).unwrap();
    assert_ne!(second, first);
    assert_eq!(counter.count(), 2);
    assert_eq!(ctx.disk().generation(), 1);

    // The recomputed value is cached again in both tiers.
    assert_eq!(cached.call(&9).unwrap(), second);
    assert_eq!(counter.count(), 2);
    assert!(!ctx.memory().is_empty());
}

#[test]
#[serial_test::serial]
fn wrecked_store_files_do_not_break_a_reopen() {
    let fixture = TestFixture::new();
    let counter = CallCounter::new();

    let (first, location) = {
        let ctx = fixture.sled_context();
        let location = ctx.disk().current_location();
        let cached = Memoized::new(ctx, IDENT, Mode::Disk, None, stamped(counter.clone()));
        (cached.call(&3).unwrap(), location)
    };

    corrupt_store_files(&location);

    // Opening must succeed regardless of what the store files hold; a
    // store that cannot be opened is abandoned for a fresh generation.
    let ctx = fixture.sled_context();
    let cached = Memoized::new(ctx.clone(), IDENT, Mode::Disk, None, stamped(counter.clone()));

    let second = cached.call(&3).unwrap();
    assert_ne!(second, first, "the wrecked entry is gone either way");
    assert_eq!(counter.count(), 2);

    // And the store is usable afterwards.
    assert_eq!(cached.call(&3).unwrap(), second);
    assert_eq!(counter.count(), 2);
    assert!(!ctx.disk().is_empty());
}
