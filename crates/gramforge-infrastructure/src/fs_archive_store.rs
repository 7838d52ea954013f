//! Filesystem pool of archived choices snapshots.
//!
//! Snapshots share one directory across all sessions and are named
//! `choices.<serial>`. Serial allocation scans for the maximum existing
//! suffix and adds one; this read-max-then-write-next sequence is a
//! check-then-act race under true concurrency and is documented as
//! best-effort, not atomic. The pool is advisory history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

use gramforge_core::archive::{ArchiveSnapshot, ArchiveStore};
use gramforge_core::error::{GramforgeError, Result};

const SNAPSHOT_PREFIX: &str = "choices.";

/// File system-based archive pool.
pub struct FsArchiveStore {
    pool_dir: PathBuf,
}

impl FsArchiveStore {
    /// Creates a store over the given pool directory. The directory is
    /// created lazily on the first archive call.
    pub fn new(pool_dir: PathBuf) -> Self {
        Self { pool_dir }
    }

    /// Returns the pool directory path.
    pub fn pool_dir(&self) -> &Path {
        &self.pool_dir
    }

    fn serial_of(name: &str) -> Option<u32> {
        name.strip_prefix(SNAPSHOT_PREFIX)?.parse().ok()
    }

    async fn scan(&self) -> Result<Vec<ArchiveSnapshot>> {
        if !fs::try_exists(&self.pool_dir).await? {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        let mut entries = fs::read_dir(&self.pool_dir).await.map_err(|e| {
            GramforgeError::archive(format!(
                "Failed to scan archive pool '{}': {}",
                self.pool_dir.display(),
                e
            ))
        })?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(serial) = name.to_str().and_then(Self::serial_of) else {
                continue;
            };
            let created_at = entry
                .metadata()
                .await
                .ok()
                .and_then(|meta| meta.modified().ok())
                .map(DateTime::<Utc>::from);
            snapshots.push(ArchiveSnapshot {
                serial,
                path: entry.path(),
                created_at,
            });
        }
        snapshots.sort_by_key(|snapshot| snapshot.serial);
        Ok(snapshots)
    }
}

#[async_trait]
impl ArchiveStore for FsArchiveStore {
    async fn next_serial(&self) -> Result<u32> {
        let max = self.scan().await?.last().map(|snapshot| snapshot.serial);
        Ok(max.map_or(1, |m| m + 1))
    }

    async fn archive(&self, choices_path: &Path) -> Result<u32> {
        fs::create_dir_all(&self.pool_dir).await.map_err(|e| {
            GramforgeError::archive(format!(
                "Failed to create archive pool '{}': {}",
                self.pool_dir.display(),
                e
            ))
        })?;

        let serial = self.next_serial().await?;
        let target = self.pool_dir.join(format!("{SNAPSHOT_PREFIX}{serial}"));
        fs::copy(choices_path, &target).await.map_err(|e| {
            GramforgeError::archive(format!(
                "Failed to copy '{}' to snapshot '{}': {}",
                choices_path.display(),
                target.display(),
                e
            ))
        })?;
        tracing::info!(serial, snapshot = %target.display(), "archived choices document");
        Ok(serial)
    }

    async fn snapshots(&self) -> Result<Vec<ArchiveSnapshot>> {
        self.scan().await
    }
}
