//! Trait seams toward the document engine and the page renderer.
//!
//! The grammar-definition schema, the semantic validation rules and the
//! customization algorithm live behind `DocumentEngine`; page templates
//! live behind `PageRenderer`. Both report faults as explicit `Result`
//! values, and the workflow engine matches on them rather than intercepting
//! anything.

use crate::archive::ArchiveFormat;
use crate::error::{GramforgeError, Result};
use crate::form::FormData;
use crate::validation::ValidationResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// The document engine: field merge, validation and customization.
#[async_trait]
pub trait DocumentEngine: Send + Sync {
    /// Applies the submitted key/value pairs onto the existing document
    /// according to the document's schema and persists the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or rewritten.
    async fn merge_fields(&self, fields: &FormData, choices_path: &Path) -> Result<()>;

    /// Validates the on-disk document and returns field-scoped marks.
    ///
    /// A returned error is a validation *fault* (the validator itself
    /// failed), distinct from a result that merely carries error marks.
    async fn validate(&self, choices_path: &Path) -> Result<ValidationResult>;

    /// Produces the customized grammar for the session and packages it in
    /// the requested archive format.
    ///
    /// # Returns
    ///
    /// The directory the generated artifact was written to.
    async fn customize(&self, session_dir: &Path, format: ArchiveFormat) -> Result<PathBuf>;
}

/// Renders the engine's response pages.
///
/// Template internals are out of the engine's hands; the renderer takes
/// state and returns renderable text.
pub trait PageRenderer: Send + Sync {
    /// The main editing page, carrying the current validation result.
    fn main_page(&self, session_id: &str, vr: &ValidationResult) -> Result<String>;

    /// A named sub-page of the questionnaire.
    fn sub_page(&self, name: &str, session_id: &str, vr: &ValidationResult) -> Result<String>;

    /// The validation-error page shown when customization is refused.
    fn error_page(&self, vr: &ValidationResult) -> Result<String>;

    /// Diagnostic page for a validation fault, carrying the fault context
    /// and the current document.
    fn choices_error_page(&self, choices_path: &Path, fault: &GramforgeError) -> Result<String>;

    /// Diagnostic page for a customization fault.
    fn customize_error_page(&self, choices_path: &Path, fault: &GramforgeError) -> Result<String>;

    /// Example sentences generated from a freshly customized grammar.
    fn sentences_page(
        &self,
        session_dir: &Path,
        grammar_dir: &Path,
        session_id: &str,
    ) -> Result<String>;

    /// The "customization complete" page pointing at the artifact.
    fn custom_page(
        &self,
        session_dir: &Path,
        grammar_dir: &Path,
        format: ArchiveFormat,
    ) -> Result<String>;

    /// More example sentences for one verbal predication.
    fn more_sentences_page(
        &self,
        session_dir: &Path,
        grammar: &str,
        verbpred: &str,
        template: &str,
        session_id: &str,
    ) -> Result<String>;
}
