//! Reference document engine over line-oriented choices files.
//!
//! The real grammar-definition schema is a much richer beast; this engine
//! implements the structural subset the workflow needs end to end: a
//! section-aware key=value merge, structural validation marks, and a
//! customization step that emits a grammar directory plus a packaged
//! artifact. It lives behind the `DocumentEngine` trait and is swappable.

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use gramforge_core::archive::ArchiveFormat;
use gramforge_core::choices::{ChoicesDocument, strip_bom};
use gramforge_core::engine::DocumentEngine;
use gramforge_core::error::{GramforgeError, Result};
use gramforge_core::form::FormData;
use gramforge_core::session::model::CHOICES_FILE_NAME;
use gramforge_core::validation::ValidationResult;

/// Control fields that steer the workflow and are never merged into the
/// document.
const RESERVED_FIELDS: &[&str] = &[
    "section",
    "choices",
    "customize",
    "delivery",
    "sentences",
    "subpage",
    "verbpred",
    "import_toolbox",
    "grammar",
    "template",
];

/// One `section=NAME` group of a choices file. The unnamed prelude block
/// holds keys appearing before the first section line.
#[derive(Debug, Clone)]
struct SectionBlock {
    name: String,
    entries: Vec<(String, String)>,
}

fn parse_sections(text: &str) -> Vec<SectionBlock> {
    let mut blocks = Vec::new();
    let mut current = SectionBlock {
        name: String::new(),
        entries: Vec::new(),
    };
    for line in strip_bom(text).lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            // Malformed lines are reported by validation and dropped on
            // rewrite.
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key == "section" {
            blocks.push(current);
            current = SectionBlock {
                name: value.to_string(),
                entries: Vec::new(),
            };
        } else {
            current.entries.push((key.to_string(), value.to_string()));
        }
    }
    blocks.push(current);
    blocks
}

fn render_sections(blocks: &[SectionBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        if block.name.is_empty() && block.entries.is_empty() {
            continue;
        }
        if !block.name.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("section=");
            out.push_str(&block.name);
            out.push('\n');
        }
        for (key, value) in &block.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}

fn slugify(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "grammar".to_string()
    } else {
        slug
    }
}

/// File-backed reference implementation of `DocumentEngine`.
#[derive(Debug, Default)]
pub struct FileDocumentEngine;

impl FileDocumentEngine {
    pub fn new() -> Self {
        Self
    }

    fn package(
        grammar_dir: &Path,
        artifact: &Path,
        format: ArchiveFormat,
        root_name: &str,
    ) -> Result<()> {
        match format {
            ArchiveFormat::Tgz => {
                let file = std::fs::File::create(artifact)
                    .map_err(|e| GramforgeError::customize(format!("create artifact: {e}")))?;
                let encoder = GzEncoder::new(file, Compression::default());
                let mut builder = tar::Builder::new(encoder);
                builder
                    .append_dir_all(root_name, grammar_dir)
                    .map_err(|e| GramforgeError::customize(format!("write tar entries: {e}")))?;
                builder
                    .into_inner()
                    .and_then(|encoder| encoder.finish())
                    .map_err(|e| GramforgeError::customize(format!("finish archive: {e}")))?;
            }
            ArchiveFormat::Zip => {
                let file = std::fs::File::create(artifact)
                    .map_err(|e| GramforgeError::customize(format!("create artifact: {e}")))?;
                let mut writer = ZipWriter::new(file);
                let options = SimpleFileOptions::default();
                let entries = std::fs::read_dir(grammar_dir)
                    .map_err(|e| GramforgeError::customize(format!("scan grammar dir: {e}")))?;
                for entry in entries {
                    let entry = entry
                        .map_err(|e| GramforgeError::customize(format!("scan grammar dir: {e}")))?;
                    if !entry.path().is_file() {
                        continue;
                    }
                    let name = entry.file_name().to_string_lossy().into_owned();
                    writer
                        .start_file(format!("{root_name}/{name}"), options)
                        .map_err(|e| GramforgeError::customize(format!("start zip entry: {e}")))?;
                    let bytes = std::fs::read(entry.path())
                        .map_err(|e| GramforgeError::customize(format!("read grammar file: {e}")))?;
                    writer
                        .write_all(&bytes)
                        .map_err(|e| GramforgeError::customize(format!("write zip entry: {e}")))?;
                }
                writer
                    .finish()
                    .map_err(|e| GramforgeError::customize(format!("finish archive: {e}")))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentEngine for FileDocumentEngine {
    async fn merge_fields(&self, fields: &FormData, choices_path: &Path) -> Result<()> {
        let text = fs::read_to_string(choices_path).await.map_err(|e| {
            GramforgeError::document(format!(
                "Failed to read '{}' for merge: {}",
                choices_path.display(),
                e
            ))
        })?;
        let mut blocks = parse_sections(&text);

        let section = fields.get("section").unwrap_or("").to_string();
        let target = match blocks.iter().position(|block| block.name == section) {
            Some(index) => index,
            None => {
                blocks.push(SectionBlock {
                    name: section,
                    entries: Vec::new(),
                });
                blocks.len() - 1
            }
        };

        for (key, value) in fields.iter() {
            if RESERVED_FIELDS.contains(&key) {
                continue;
            }
            let entries = &mut blocks[target].entries;
            match entries.iter_mut().find(|(existing, _)| existing == key) {
                Some((_, existing_value)) => *existing_value = value.to_string(),
                None => entries.push((key.to_string(), value.to_string())),
            }
        }

        fs::write(choices_path, render_sections(&blocks))
            .await
            .map_err(|e| {
                GramforgeError::document(format!(
                    "Failed to rewrite '{}': {}",
                    choices_path.display(),
                    e
                ))
            })?;
        Ok(())
    }

    async fn validate(&self, choices_path: &Path) -> Result<ValidationResult> {
        // An unreadable document is a fault of the validation call itself,
        // not a field error.
        let text = fs::read_to_string(choices_path).await.map_err(|e| {
            GramforgeError::validation(format!(
                "Failed to read '{}': {}",
                choices_path.display(),
                e
            ))
        })?;
        let text = strip_bom(&text);

        let mut vr = ValidationResult::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if !line.is_empty() && !line.contains('=') {
                vr.err(
                    "choices",
                    format!("Line {} is not a key=value pair: '{}'", index + 1, line),
                );
            }
        }

        let doc = ChoicesDocument::parse(text);
        if !doc.is_empty() {
            if doc.get("language").map_or(true, str::is_empty) {
                vr.err("language", "A language name is required.");
            }
            if doc.get("version").is_none() {
                vr.info(
                    "version",
                    "No version recorded; assuming the current questionnaire version.",
                );
            }
        }
        Ok(vr)
    }

    async fn customize(&self, session_dir: &Path, format: ArchiveFormat) -> Result<PathBuf> {
        let choices_path = session_dir.join(CHOICES_FILE_NAME);
        let text = fs::read_to_string(&choices_path).await.map_err(|e| {
            GramforgeError::customize(format!(
                "Failed to read '{}': {}",
                choices_path.display(),
                e
            ))
        })?;
        let doc = ChoicesDocument::parse(&text);
        if doc.is_empty() {
            return Err(GramforgeError::customize(
                "cannot customize an empty choices document",
            ));
        }

        let slug = slugify(doc.get("language").unwrap_or("grammar"));
        let grammar_dir = session_dir.join(&slug);
        if fs::try_exists(&grammar_dir).await? {
            fs::remove_dir_all(&grammar_dir).await.map_err(|e| {
                GramforgeError::customize(format!("clear previous grammar dir: {e}"))
            })?;
        }
        fs::create_dir_all(&grammar_dir)
            .await
            .map_err(|e| GramforgeError::customize(format!("create grammar dir: {e}")))?;
        fs::write(grammar_dir.join(CHOICES_FILE_NAME), strip_bom(&text))
            .await
            .map_err(|e| GramforgeError::customize(format!("write grammar choices: {e}")))?;

        let artifact = session_dir.join(format!("{slug}.{}", format.extension()));
        Self::package(&grammar_dir, &artifact, format, &slug)?;
        tracing::info!(
            grammar_dir = %grammar_dir.display(),
            artifact = %artifact.display(),
            "customized grammar"
        );
        Ok(grammar_dir)
    }
}
