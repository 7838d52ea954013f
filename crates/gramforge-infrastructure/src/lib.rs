pub mod collage_source;
pub mod document_engine;
pub mod fs_archive_store;
pub mod fs_session_store;
pub mod lexicon_uploads;
pub mod pages;
pub mod paths;
pub mod sample_library;
pub mod toolbox_importer;

pub use crate::collage_source::CollageArchiveSource;
pub use crate::document_engine::FileDocumentEngine;
pub use crate::fs_archive_store::FsArchiveStore;
pub use crate::fs_session_store::FsSessionStore;
pub use crate::lexicon_uploads::StagedLexiconUploads;
pub use crate::pages::TemplatePageRenderer;
pub use crate::sample_library::SampleLibrary;
pub use crate::toolbox_importer::ToolboxLexiconImporter;
