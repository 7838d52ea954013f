//! Unified path management for gramforge data files.
//!
//! Resolves the platform default locations for the engine root (sessions,
//! archived snapshots, bundled samples) and the configuration file. A
//! configured root always takes precedence over these defaults.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for gramforge.
///
/// # Directory Structure
///
/// ```text
/// ~/.local/share/gramforge/    # Engine root (data dir)
/// ├── sessions/                # One directory per session
/// ├── saved-choices/           # Archived snapshots, choices.<serial>
/// └── sample-choices/          # Bundled sample documents
///
/// ~/.config/gramforge/
/// └── config.toml              # Engine configuration
/// ```
pub struct GramforgePaths;

impl GramforgePaths {
    /// Returns the default engine root directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to the engine root (e.g. `~/.local/share/gramforge/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn default_root() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join("gramforge"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the gramforge configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("gramforge"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
