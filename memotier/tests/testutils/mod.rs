//! Test utilities for memotier integration tests
//!
//! Provides isolated cache contexts rooted in temporary directories, plus
//! small helpers for counting how often a computation actually runs.

#![allow(dead_code)]

pub mod test_fixture;

pub use test_fixture::TestFixture;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared invocation counter for observing cache behavior.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation and return the new total.
    pub fn tick(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
