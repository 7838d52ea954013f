//! Bundled sample choices documents.
//!
//! Sample references arrive verbatim from the form (`web/sample-choices/
//! basic/empty` and the like). The trailing path is resolved against the
//! configured samples directory; names that would escape it are refused.

use std::path::{Component, Path, PathBuf};
use tokio::fs;

use gramforge_core::choices::strip_bom;
use gramforge_core::config::SAMPLE_PREFIX;
use gramforge_core::error::{GramforgeError, Result};

/// Library of bundled sample documents.
pub struct SampleLibrary {
    samples_dir: PathBuf,
}

impl SampleLibrary {
    pub fn new(samples_dir: PathBuf) -> Self {
        Self { samples_dir }
    }

    /// Whether a `choices` field value names a bundled sample.
    pub fn is_sample_reference(reference: &str) -> bool {
        reference.starts_with(SAMPLE_PREFIX)
    }

    fn relative_name(reference: &str) -> Option<&str> {
        reference.strip_prefix(SAMPLE_PREFIX)
    }

    /// Sample names must stay inside the library: relative, no parent or
    /// root components.
    fn is_safe_name(name: &str) -> bool {
        !name.is_empty()
            && Path::new(name)
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
    }

    /// Reads a sample's contents verbatim, stripping any byte-order marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is not a sample, names a path
    /// outside the library, or cannot be read.
    pub async fn read(&self, reference: &str) -> Result<String> {
        let name = Self::relative_name(reference).ok_or_else(|| {
            GramforgeError::document(format!("'{reference}' is not a sample reference"))
        })?;
        if !Self::is_safe_name(name) {
            return Err(GramforgeError::document(format!(
                "sample name '{name}' is not allowed"
            )));
        }

        let path = self.samples_dir.join(name);
        let text = fs::read_to_string(&path).await.map_err(|e| {
            GramforgeError::document(format!(
                "Failed to read sample '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(strip_bom(&text).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn library_with(samples: &[(&str, &str)]) -> (TempDir, SampleLibrary) {
        let temp_dir = TempDir::new().unwrap();
        for (name, contents) in samples {
            let path = temp_dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            fs::write(&path, contents).await.unwrap();
        }
        let library = SampleLibrary::new(temp_dir.path().to_path_buf());
        (temp_dir, library)
    }

    #[tokio::test]
    async fn reads_sample_and_strips_bom() {
        let (_guard, library) =
            library_with(&[("basic/minimal", "\u{feff}language=Breton\n")]).await;

        let text = library
            .read("web/sample-choices/basic/minimal")
            .await
            .unwrap();
        assert_eq!(text, "language=Breton\n");
    }

    #[tokio::test]
    async fn empty_sample_reads_as_empty() {
        let (_guard, library) = library_with(&[("basic/empty", "")]).await;

        let text = library.read("web/sample-choices/basic/empty").await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn traversal_is_refused() {
        let (_guard, library) = library_with(&[]).await;

        let err = library
            .read("web/sample-choices/../../etc/passwd")
            .await
            .unwrap_err();
        assert!(matches!(err, GramforgeError::Document(_)));
    }

    #[tokio::test]
    async fn non_sample_references_are_refused() {
        let (_guard, library) = library_with(&[]).await;
        assert!(library.read("collage/abc").await.is_err());
    }
}
