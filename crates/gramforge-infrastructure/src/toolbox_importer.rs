//! Reference toolbox lexicon importer.
//!
//! Reads the staged toolbox source files the document references (fields
//! ending in `tbfilename`), pulls the `\lx` lexeme markers out of them and
//! appends the imported stems to the document.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::fs;

use gramforge_core::choices::{ChoicesDocument, strip_bom};
use gramforge_core::error::{GramforgeError, Result};
use gramforge_core::lexicon::LexiconImporter;

/// Field-name suffix the document schema uses for toolbox source paths.
const TB_FILENAME_SUFFIX: &str = "tbfilename";

static LEXEME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\\lx\s+(\S+)").expect("lexeme pattern"));

/// Toolbox importer operating by side effect on the choices document.
#[derive(Debug, Default)]
pub struct ToolboxLexiconImporter;

impl ToolboxLexiconImporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LexiconImporter for ToolboxLexiconImporter {
    async fn import(&self, choices_path: &Path) -> Result<()> {
        let text = fs::read_to_string(choices_path).await.map_err(|e| {
            GramforgeError::import(format!(
                "Failed to read '{}': {}",
                choices_path.display(),
                e
            ))
        })?;
        let doc = ChoicesDocument::parse(&text);

        let sources: Vec<(String, String)> = doc
            .iter()
            .filter(|(key, value)| key.ends_with(TB_FILENAME_SUFFIX) && !value.is_empty())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        if sources.is_empty() {
            return Ok(());
        }

        let mut lexemes = Vec::new();
        for (field, path) in &sources {
            let contents = fs::read_to_string(path).await.map_err(|e| {
                GramforgeError::import(format!(
                    "Failed to read toolbox source '{path}' for '{field}': {e}"
                ))
            })?;
            for capture in LEXEME_LINE.captures_iter(&contents) {
                lexemes.push(capture[1].to_string());
            }
        }
        if lexemes.is_empty() {
            tracing::debug!("toolbox sources held no lexeme markers");
            return Ok(());
        }

        let mut out = strip_bom(&text).trim_end().to_string();
        out.push_str("\n\nsection=toolbox-lexicon\n");
        for (index, lexeme) in lexemes.iter().enumerate() {
            out.push_str(&format!("tb-lex{}_orth={}\n", index + 1, lexeme));
        }
        fs::write(choices_path, out).await.map_err(|e| {
            GramforgeError::import(format!(
                "Failed to rewrite '{}': {}",
                choices_path.display(),
                e
            ))
        })?;
        tracing::info!(count = lexemes.len(), "imported toolbox lexemes");
        Ok(())
    }
}
