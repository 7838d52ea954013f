//! Session store trait.
//!
//! Defines the interface for resolving and allocating sessions. The store
//! is the only component (together with the choices document it creates)
//! that holds state across requests.

use super::model::ResolvedSession;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract registry of sessions with create-if-absent semantics.
///
/// Implementations are responsible for identifier allocation and existence
/// checks only; everything else the engine does to a session goes through
/// the resolved directory.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolves an existing session or allocates a new one.
    ///
    /// If `existing` is absent or does not name a known session, a fresh
    /// identifier is allocated, its directory created, and an empty choices
    /// document written inside it, all before this call returns. Otherwise
    /// the existing session is returned unchanged with `is_new() == false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory or the empty choices
    /// document cannot be created.
    async fn resolve(&self, existing: Option<&str>) -> Result<ResolvedSession>;

    /// Whether a session with this identifier currently exists.
    async fn exists(&self, id: &str) -> Result<bool>;
}
