use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default base URL for the remote choices archive source.
pub const DEFAULT_COLLAGE_BASE_URL: &str = "http://www.delph-in.net/matrix/";

/// Prefix a `choices` field value carries when it names a bundled sample.
pub const SAMPLE_PREFIX: &str = "web/sample-choices/";

/// Prefix a `choices` field value carries when it names a remote archive key.
pub const COLLAGE_PREFIX: &str = "collage/";

/// Engine configuration, typically loaded from a TOML file.
///
/// Only the root directory is mandatory in practice; the remaining fields
/// default to the values the engine ships with.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EngineConfig {
    /// Root directory holding `sessions/`, `saved-choices/` and `sample-choices/`.
    pub root_dir: PathBuf,
    /// Base URL of the remote choices archive source.
    #[serde(default = "default_collage_base_url")]
    pub collage_base_url: String,
    /// Upper bound, in seconds, on a remote archive fetch.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_collage_base_url() -> String {
    DEFAULT_COLLAGE_BASE_URL.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

impl EngineConfig {
    /// Creates a configuration rooted at the given directory, with defaults
    /// for everything else.
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            collage_base_url: default_collage_base_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Directory holding one subdirectory per session.
    pub fn sessions_dir(&self) -> PathBuf {
        self.root_dir.join("sessions")
    }

    /// Shared pool of archived choices snapshots.
    pub fn saved_choices_dir(&self) -> PathBuf {
        self.root_dir.join("saved-choices")
    }

    /// Directory holding the bundled sample choices documents.
    pub fn samples_dir(&self) -> PathBuf {
        self.root_dir.join("sample-choices")
    }

    /// Root directory accessor.
    pub fn root(&self) -> &Path {
        &self.root_dir
    }
}
