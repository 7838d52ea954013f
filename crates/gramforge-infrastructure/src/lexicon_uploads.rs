//! Scoped staging of uploaded toolbox lexicon files.
//!
//! Each non-empty upload is materialized as a named temporary file inside
//! the session directory so the importer can read it by path. The guard
//! owns the temp files; dropping it deletes them, so cleanup happens on
//! every exit path, fault or not.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use gramforge_core::error::{GramforgeError, Result};
use gramforge_core::form::LexiconUpload;

/// RAII guard over staged lexicon upload files.
pub struct StagedLexiconUploads {
    files: Vec<NamedTempFile>,
}

impl StagedLexiconUploads {
    /// Materializes each non-empty upload inside `session_dir`.
    ///
    /// # Returns
    ///
    /// The guard plus the `(field, staged path)` rewrites to record in the
    /// document before the import call.
    pub fn stage(
        session_dir: &Path,
        uploads: &[LexiconUpload],
    ) -> Result<(Self, Vec<(String, String)>)> {
        let mut files = Vec::new();
        let mut rewrites = Vec::new();

        for upload in uploads.iter().filter(|upload| !upload.is_empty()) {
            let mut file = tempfile::Builder::new()
                .prefix("toolbox-")
                .tempfile_in(session_dir)
                .map_err(|e| {
                    GramforgeError::import(format!(
                        "Failed to stage lexicon upload for '{}': {}",
                        upload.field, e
                    ))
                })?;
            file.write_all(&upload.contents).map_err(|e| {
                GramforgeError::import(format!(
                    "Failed to write staged lexicon file for '{}': {}",
                    upload.field, e
                ))
            })?;
            file.flush().map_err(|e| {
                GramforgeError::import(format!(
                    "Failed to flush staged lexicon file for '{}': {}",
                    upload.field, e
                ))
            })?;

            rewrites.push((
                upload.field.clone(),
                file.path().to_string_lossy().into_owned(),
            ));
            files.push(file);
        }

        Ok((Self { files }, rewrites))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of the staged files, for logging.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|file| file.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stages_non_empty_uploads_inside_session_dir() {
        let session_dir = TempDir::new().unwrap();
        let uploads = vec![
            LexiconUpload::new("tb1_tbfilename", "lexicon.txt", b"\\lx kita".to_vec()),
            LexiconUpload::new("tb2_tbfilename", "unused.txt", Vec::new()),
        ];

        let (staged, rewrites) =
            StagedLexiconUploads::stage(session_dir.path(), &uploads).unwrap();

        assert_eq!(staged.len(), 1);
        assert_eq!(rewrites.len(), 1);
        assert_eq!(rewrites[0].0, "tb1_tbfilename");
        let staged_path = Path::new(&rewrites[0].1);
        assert!(staged_path.starts_with(session_dir.path()));
        assert_eq!(std::fs::read(staged_path).unwrap(), b"\\lx kita");
    }

    #[test]
    fn drop_releases_every_staged_file() {
        let session_dir = TempDir::new().unwrap();
        let uploads = vec![LexiconUpload::new(
            "tb1_tbfilename",
            "lexicon.txt",
            b"\\lx niri".to_vec(),
        )];

        let staged_path = {
            let (staged, rewrites) =
                StagedLexiconUploads::stage(session_dir.path(), &uploads).unwrap();
            assert!(!staged.is_empty());
            std::path::PathBuf::from(&rewrites[0].1)
        };

        assert!(!staged_path.exists());
    }
}
