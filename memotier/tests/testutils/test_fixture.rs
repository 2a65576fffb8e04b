//! Test fixture for memotier integration tests
//!
//! Contexts are rooted in a per-fixture temporary directory, so tests are
//! isolated from each other and can run in parallel. The directory lives as
//! long as the fixture, which lets a test drop a context and reopen another
//! at the same root to observe durability.

use memotier::{CacheConfig, CacheContext, EngineKind};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        init_logging();
        TestFixture {
            temp_dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Root directory handed to contexts opened by this fixture.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("cache")
    }

    /// Context backed by the in-memory engine. Fast, no durability.
    pub fn memory_context(&self) -> Arc<CacheContext> {
        let config = CacheConfig::at(self.root()).with_engine(EngineKind::Memory);
        Arc::new(CacheContext::open(config).expect("Failed to open cache context"))
    }

    /// Context backed by sled at this fixture's root. Only one may be open
    /// at a time; drop it before opening another at the same root.
    pub fn sled_context(&self) -> Arc<CacheContext> {
        let config = CacheConfig::at(self.root()).with_engine(EngineKind::Sled);
        Arc::new(CacheContext::open(config).expect("Failed to open cache context"))
    }

    /// Context with custom configuration tweaks applied on top of the
    /// fixture root.
    pub fn context_with(
        &self,
        tweak: impl FnOnce(CacheConfig) -> CacheConfig,
    ) -> Arc<CacheContext> {
        let config = tweak(CacheConfig::at(self.root()));
        Arc::new(CacheContext::open(config).expect("Failed to open cache context"))
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
