// src/watermark.rs
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;

/// The single piece of persisted state: the unix timestamp of the newest item
/// already notified. Monotonically non-decreasing across cycles.
#[async_trait::async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Never fails: missing or unreadable state degrades to 0 (epoch), which
    /// means "everything currently in the feed looks new".
    async fn load(&self) -> u64;

    /// Persist an advanced watermark. The caller is expected to log loudly on
    /// error, since a lost write risks duplicate notifications after restart.
    async fn save(&self, value: u64) -> Result<()>;
}

/// File-backed store: one decimal integer on a single line.
pub struct FileWatermarkStore {
    path: PathBuf,
}

impl FileWatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl WatermarkStore for FileWatermarkStore {
    async fn load(&self) -> u64 {
        match fs::read_to_string(&self.path).await {
            Ok(s) => s.lines().next().unwrap_or("").trim().parse().unwrap_or(0),
            Err(_) => 0,
        }
    }

    async fn save(&self, value: u64) -> Result<()> {
        fs::write(&self.path, format!("{value}\n"))
            .await
            .with_context(|| format!("writing watermark to {}", self.path.display()))
    }
}

// --- Test helper ---
/// In-memory store for tests. Clones share state, so a test can keep a handle
/// after moving the store into the relay.
#[derive(Clone, Default)]
pub struct MemoryWatermarkStore {
    value: Arc<AtomicU64>,
    saves: Arc<AtomicUsize>,
}

impl MemoryWatermarkStore {
    pub fn new(initial: u64) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(initial)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WatermarkStore for MemoryWatermarkStore {
    async fn load(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    async fn save(&self, value: u64) -> Result<()> {
        self.value.store(value, Ordering::SeqCst);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
