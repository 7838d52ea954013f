//! Lexicon importer seam.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Imports lexicon entries from the toolbox source files a document
/// references, operating by side effect on the document.
///
/// The engine stages uploaded toolbox files inside the session directory
/// and records their paths in the document before calling this; the
/// importer reads those paths back out of the document.
#[async_trait]
pub trait LexiconImporter: Send + Sync {
    /// Augments the document at `choices_path` with imported lexicon data.
    async fn import(&self, choices_path: &Path) -> Result<()>;
}
