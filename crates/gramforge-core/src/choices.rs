//! In-memory view of a persisted choices document.
//!
//! The on-disk format is line-oriented `key=value` text. `section=NAME`
//! lines group the keys that follow them; the flat view here keeps the last
//! value seen for each key, which is all the workflow engine needs (it only
//! probes individual keys such as `archive`). Full schema interpretation
//! belongs to the document engine.

use std::collections::BTreeMap;

/// Byte-order marker some clients prepend to UTF-8 uploads. Stripped on
/// every read, never written back.
pub const UTF8_BOM: char = '\u{feff}';

/// Strips a leading UTF-8 BOM, if present.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(UTF8_BOM).unwrap_or(text)
}

/// Parsed key/value view of a choices document.
#[derive(Debug, Clone, Default)]
pub struct ChoicesDocument {
    values: BTreeMap<String, String>,
    line_count: usize,
}

impl ChoicesDocument {
    /// Parses document text. Lines without `=` and blank lines are ignored
    /// here; the document engine's validation reports on them.
    pub fn parse(text: &str) -> Self {
        let text = strip_bom(text);
        let mut values = BTreeMap::new();
        let mut line_count = 0;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            line_count += 1;
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self { values, line_count }
    }

    /// Looks up the last value recorded for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether the document opted in to archival of submitted snapshots.
    pub fn wants_archive(&self) -> bool {
        self.get("archive") == Some("yes")
    }

    /// True when the document has no content lines at all.
    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }

    /// Number of non-blank content lines.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Iterates over all key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
