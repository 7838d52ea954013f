//! Request-scoped form data.
//!
//! A request arrives with query-string fields, body fields and optionally a
//! typed collection of lexicon uploads. Query and body are merged into one
//! mapping with the body winning on key collision.

use std::collections::BTreeMap;

/// Merged key/value pairs from the current request.
///
/// Ephemeral and request-scoped. Body fields take precedence over query
/// fields on key collision (last-writer-wins).
#[derive(Debug, Clone, Default)]
pub struct FormData {
    values: BTreeMap<String, String>,
}

impl FormData {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges query and body fields, body winning on collision.
    pub fn merged<Q, B>(query: Q, body: B) -> Self
    where
        Q: IntoIterator<Item = (String, String)>,
        B: IntoIterator<Item = (String, String)>,
    {
        let mut values = BTreeMap::new();
        for (key, value) in query {
            values.insert(key, value);
        }
        for (key, value) in body {
            values.insert(key, value);
        }
        Self { values }
    }

    /// Looks up a field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether the field is present, regardless of its value.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets a field value, returning the previous one if any.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Iterates over all fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl FromIterator<(String, String)> for FormData {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// One uploaded lexicon source file.
///
/// Uploads travel as an explicit typed collection next to the generic field
/// mapping; the engine never infers them from field-name suffixes. The
/// `field` is the document key the staged file path is written back under.
#[derive(Debug, Clone)]
pub struct LexiconUpload {
    /// Document field the staged path is recorded under (e.g. `tb1_tbfilename`).
    pub field: String,
    /// Original client-side file name, informational only.
    pub filename: String,
    /// Raw uploaded contents.
    pub contents: Vec<u8>,
}

impl LexiconUpload {
    pub fn new(
        field: impl Into<String>,
        filename: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field: field.into(),
            filename: filename.into(),
            contents: contents.into(),
        }
    }

    /// Uploads with no content denote an unused upload slot.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}
