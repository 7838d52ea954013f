//! Validation results for a choices document.
//!
//! A fresh result is produced per request by the document engine. Marks are
//! field-scoped so a renderer can attach them to the right form control;
//! info marks never block customization, error marks do.

use serde::{Deserialize, Serialize};

/// Severity of one validation mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkSeverity {
    Error,
    Info,
}

/// One field-scoped validation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMark {
    pub field: String,
    pub message: String,
    pub severity: MarkSeverity,
}

/// The outcome of validating a choices document.
///
/// Ephemeral, rebuilt on every request from the on-disk document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    marks: Vec<ValidationMark>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a field-scoped error.
    pub fn err(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.marks.push(ValidationMark {
            field: field.into(),
            message: message.into(),
            severity: MarkSeverity::Error,
        });
    }

    /// Records a field-scoped informational message.
    pub fn info(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.marks.push(ValidationMark {
            field: field.into(),
            message: message.into(),
            severity: MarkSeverity::Info,
        });
    }

    /// True when at least one error mark was recorded. Info marks do not
    /// count.
    pub fn has_errors(&self) -> bool {
        self.marks
            .iter()
            .any(|mark| mark.severity == MarkSeverity::Error)
    }

    /// All marks in insertion order.
    pub fn marks(&self) -> &[ValidationMark] {
        &self.marks
    }

    /// Error marks only.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationMark> {
        self.marks
            .iter()
            .filter(|mark| mark.severity == MarkSeverity::Error)
    }
}
