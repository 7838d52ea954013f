//! Session domain model.

use std::path::{Path, PathBuf};

/// Name of the choices document inside every session directory.
pub const CHOICES_FILE_NAME: &str = "choices";

/// A session resolved (or freshly allocated) for the current request.
///
/// The id is the opaque token the transport layer carries back to the
/// client as a cookie; the directory holds all per-session artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    id: String,
    dir: PathBuf,
    is_new: bool,
}

impl ResolvedSession {
    pub fn new(id: impl Into<String>, dir: impl Into<PathBuf>, is_new: bool) -> Self {
        Self {
            id: id.into(),
            dir: dir.into(),
            is_new,
        }
    }

    /// The opaque session token.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The session's directory of persisted artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the session's choices document. The store guarantees the
    /// file exists (possibly empty) once the session exists.
    pub fn choices_path(&self) -> PathBuf {
        self.dir.join(CHOICES_FILE_NAME)
    }

    /// Whether this request allocated the session.
    pub fn is_new(&self) -> bool {
        self.is_new
    }
}
