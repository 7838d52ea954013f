//! Directory-backed session store.
//!
//! Each session is one directory under the sessions root, named by its
//! token and holding at least a `choices` file. Tokens are short numeric
//! strings allocated by rejection sampling against existing directory
//! names; the collision probability is accepted as negligible for the
//! expected token space, and a collision simply re-samples.

use async_trait::async_trait;
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;

use gramforge_core::error::{GramforgeError, Result};
use gramforge_core::session::model::CHOICES_FILE_NAME;
use gramforge_core::session::{ResolvedSession, SessionStore};

/// Inclusive token sampling range.
const TOKEN_RANGE: std::ops::RangeInclusive<u32> = 1000..=9999;

/// File system-based session store.
pub struct FsSessionStore {
    /// Root directory holding one subdirectory per session.
    sessions_dir: PathBuf,
}

impl FsSessionStore {
    /// Creates a new `FsSessionStore`, ensuring the sessions root exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub async fn new(sessions_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&sessions_dir).await.map_err(|e| {
            GramforgeError::io(format!(
                "Failed to create sessions root '{}': {}",
                sessions_dir.display(),
                e
            ))
        })?;
        Ok(Self { sessions_dir })
    }

    /// Returns the sessions root directory path.
    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn session_dir(&self, id: &str) -> PathBuf {
        self.sessions_dir.join(id)
    }

    /// A presented token is only ever used as a directory name, so anything
    /// that is not plain alphanumeric is treated as unknown.
    fn is_valid_token(id: &str) -> bool {
        !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
    }

    fn sample_token() -> String {
        rand::thread_rng().gen_range(TOKEN_RANGE).to_string()
    }

    async fn create_session(&self, id: &str) -> Result<ResolvedSession> {
        let dir = self.session_dir(id);
        fs::create_dir_all(&dir).await.map_err(|e| {
            GramforgeError::session(format!(
                "Failed to create session directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        // The choices document always exists once the session does.
        let choices_path = dir.join(CHOICES_FILE_NAME);
        fs::write(&choices_path, "").await.map_err(|e| {
            GramforgeError::session(format!(
                "Failed to create empty choices document '{}': {}",
                choices_path.display(),
                e
            ))
        })?;
        tracing::info!(session = %id, "allocated new session");
        Ok(ResolvedSession::new(id, dir, true))
    }
}

#[async_trait]
impl SessionStore for FsSessionStore {
    async fn resolve(&self, existing: Option<&str>) -> Result<ResolvedSession> {
        if let Some(id) = existing {
            if Self::is_valid_token(id) && fs::try_exists(self.session_dir(id)).await? {
                return Ok(ResolvedSession::new(id, self.session_dir(id), false));
            }
        }

        // Rejection sampling: loop until a free token is found.
        loop {
            let candidate = Self::sample_token();
            if fs::try_exists(self.session_dir(&candidate)).await? {
                tracing::debug!(token = %candidate, "session token collision, re-sampling");
                continue;
            }
            return self.create_session(&candidate).await;
        }
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        if !Self::is_valid_token(id) {
            return Ok(false);
        }
        Ok(fs::try_exists(self.session_dir(id)).await?)
    }
}
