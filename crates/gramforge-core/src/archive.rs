//! Archive formats, the snapshot pool seam and the remote archive seam.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};

/// Delivery format for a customized grammar.
///
/// These are the only two recognized values of the `delivery` field; any
/// other value is a user input error, not a fault.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ArchiveFormat {
    Tgz,
    Zip,
}

impl ArchiveFormat {
    /// File extension of the packaged artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Tgz => "tar.gz",
            ArchiveFormat::Zip => "zip",
        }
    }
}

/// One archived snapshot in the shared pool.
#[derive(Debug, Clone)]
pub struct ArchiveSnapshot {
    /// Serial embedded in the entry name (`choices.<serial>`).
    pub serial: u32,
    pub path: PathBuf,
    /// Filesystem modification time, when available.
    pub created_at: Option<DateTime<Utc>>,
}

/// The shared pool of archived choices snapshots.
///
/// Serial allocation is advisory history, not a correctness-critical
/// index: the read-max-then-write-next sequence is best-effort under
/// concurrent callers.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Computes the next serial: one greater than the maximum found in the
    /// pool, `1` when the pool is empty.
    async fn next_serial(&self) -> Result<u32>;

    /// Copies the document into the pool under a freshly allocated serial.
    ///
    /// # Returns
    ///
    /// The serial assigned to the new snapshot.
    async fn archive(&self, choices_path: &Path) -> Result<u32>;

    /// Lists all snapshots in the pool, ordered by serial.
    async fn snapshots(&self) -> Result<Vec<ArchiveSnapshot>>;
}

/// Remote source of pre-built choices archives, keyed by a short
/// identifier.
///
/// Implementations must degrade every network, decompression or protocol
/// fault to `Ok(None)`: a failed retrieval is a no-op for the caller,
/// never a hard failure.
#[async_trait]
pub trait GrammarArchiveSource: Send + Sync {
    /// Fetches the choices text for a reference such as `collage/abc`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(text))`: the archive was retrieved and contained a
    ///   choices entry
    /// - `Ok(None)`: the key was malformed or no data could be retrieved
    async fn fetch(&self, reference: &str) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn archive_format_round_trips_through_strings() {
        assert_eq!(ArchiveFormat::from_str("tgz").unwrap(), ArchiveFormat::Tgz);
        assert_eq!(ArchiveFormat::from_str("zip").unwrap(), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::Tgz.to_string(), "tgz");
    }

    #[test]
    fn unrecognized_formats_are_rejected() {
        assert!(ArchiveFormat::from_str("rar").is_err());
        assert!(ArchiveFormat::from_str("").is_err());
    }
}
