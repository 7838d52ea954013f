//! End-to-end scenarios for the workflow engine, driven through the real
//! filesystem collaborators with the remote archive source mocked out.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::fs;

use gramforge_application::WorkflowEngine;
use gramforge_core::archive::{ArchiveFormat, GrammarArchiveSource};
use gramforge_core::config::EngineConfig;
use gramforge_core::engine::DocumentEngine;
use gramforge_core::error::{GramforgeError, Result};
use gramforge_core::form::{FormData, LexiconUpload};
use gramforge_core::request::EngineRequest;
use gramforge_core::response::PageKind;
use gramforge_core::validation::ValidationResult;
use gramforge_infrastructure::{
    FileDocumentEngine, FsArchiveStore, FsSessionStore, TemplatePageRenderer,
    ToolboxLexiconImporter,
};

/// Remote archive source with canned behavior.
struct StaticRemote {
    data: Option<String>,
    fail: bool,
}

impl StaticRemote {
    fn unreachable_source() -> Self {
        Self {
            data: None,
            fail: true,
        }
    }

    fn empty_handed() -> Self {
        Self {
            data: None,
            fail: false,
        }
    }

    fn serving(text: &str) -> Self {
        Self {
            data: Some(text.to_string()),
            fail: false,
        }
    }
}

#[async_trait]
impl GrammarArchiveSource for StaticRemote {
    async fn fetch(&self, _reference: &str) -> Result<Option<String>> {
        if self.fail {
            return Err(GramforgeError::internal("connection reset"));
        }
        Ok(self.data.clone())
    }
}

/// Wraps the reference document engine and counts customize calls.
struct CountingEngine {
    inner: FileDocumentEngine,
    customize_calls: AtomicUsize,
}

impl CountingEngine {
    fn new() -> Self {
        Self {
            inner: FileDocumentEngine::new(),
            customize_calls: AtomicUsize::new(0),
        }
    }

    fn customize_count(&self) -> usize {
        self.customize_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentEngine for CountingEngine {
    async fn merge_fields(&self, fields: &FormData, choices_path: &Path) -> Result<()> {
        self.inner.merge_fields(fields, choices_path).await
    }

    async fn validate(&self, choices_path: &Path) -> Result<ValidationResult> {
        self.inner.validate(choices_path).await
    }

    async fn customize(&self, session_dir: &Path, format: ArchiveFormat) -> Result<PathBuf> {
        self.customize_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.customize(session_dir, format).await
    }
}

/// Engine whose validation call itself faults.
struct FaultyValidator;

#[async_trait]
impl DocumentEngine for FaultyValidator {
    async fn merge_fields(&self, _fields: &FormData, _choices_path: &Path) -> Result<()> {
        Ok(())
    }

    async fn validate(&self, _choices_path: &Path) -> Result<ValidationResult> {
        Err(GramforgeError::validation("validator exploded"))
    }

    async fn customize(&self, _session_dir: &Path, _format: ArchiveFormat) -> Result<PathBuf> {
        Err(GramforgeError::customize("should never run"))
    }
}

struct Harness {
    _root: TempDir,
    config: EngineConfig,
    engine: Arc<CountingEngine>,
    workflow: WorkflowEngine,
}

impl Harness {
    async fn new(remote: StaticRemote) -> Self {
        let root = TempDir::new().unwrap();
        let config = EngineConfig::with_root(root.path());
        let engine = Arc::new(CountingEngine::new());
        let workflow = build_workflow(&config, engine.clone(), Arc::new(remote)).await;
        Self {
            _root: root,
            config,
            engine,
            workflow,
        }
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.config.sessions_dir().join(session_id)
    }

    async fn document(&self, session_id: &str) -> String {
        fs::read_to_string(self.session_dir(session_id).join("choices"))
            .await
            .unwrap()
    }

    async fn write_document(&self, session_id: &str, contents: &str) {
        fs::write(self.session_dir(session_id).join("choices"), contents)
            .await
            .unwrap();
    }

    async fn session_count(&self) -> usize {
        let mut count = 0;
        let mut entries = fs::read_dir(self.config.sessions_dir()).await.unwrap();
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }

    async fn snapshot(&self, serial: u32) -> Option<String> {
        fs::read_to_string(
            self.config
                .saved_choices_dir()
                .join(format!("choices.{serial}")),
        )
        .await
        .ok()
    }
}

async fn build_workflow(
    config: &EngineConfig,
    engine: Arc<dyn DocumentEngine>,
    remote: Arc<dyn GrammarArchiveSource>,
) -> WorkflowEngine {
    let sessions = Arc::new(FsSessionStore::new(config.sessions_dir()).await.unwrap());
    WorkflowEngine::new(
        config,
        sessions,
        engine,
        Arc::new(TemplatePageRenderer::new().unwrap()),
        Arc::new(ToolboxLexiconImporter::new()),
        remote,
        Arc::new(FsArchiveStore::new(config.saved_choices_dir())),
    )
}

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn request(session_id: Option<&str>, pairs: &[(&str, &str)]) -> EngineRequest {
    EngineRequest::new(session_id.map(String::from), form(pairs))
}

#[tokio::test]
async fn fresh_request_allocates_exactly_one_session_with_empty_document() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let response = harness.workflow.run(request(None, &[])).await.unwrap();

    assert_eq!(response.page, PageKind::Main);
    assert_eq!(harness.session_count().await, 1);
    assert_eq!(harness.document(&response.session_id).await, "");
    // The response always carries the token the transport echoes back.
    assert!(harness.session_dir(&response.session_id).is_dir());
}

#[tokio::test]
async fn replayed_session_is_reused_and_document_preserved() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(&first.session_id, "language=Kiowa\n")
        .await;

    let second = harness
        .workflow
        .run(request(Some(&first.session_id), &[]))
        .await
        .unwrap();

    assert_eq!(second.session_id, first.session_id);
    assert_eq!(harness.session_count().await, 1);
    assert_eq!(
        harness.document(&second.session_id).await,
        "language=Kiowa\n"
    );
}

#[tokio::test]
async fn failed_remote_import_leaves_document_untouched() {
    let harness = Harness::new(StaticRemote::unreachable_source()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(&first.session_id, "language=Before\n")
        .await;

    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[("choices", "collage/abc")],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::Main);
    assert_eq!(
        harness.document(&first.session_id).await,
        "language=Before\n"
    );
}

#[tokio::test]
async fn empty_handed_remote_import_is_also_a_no_op() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(&first.session_id, "language=Before\n")
        .await;

    harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[("choices", "collage/abcdefg")],
        ))
        .await
        .unwrap();

    assert_eq!(
        harness.document(&first.session_id).await,
        "language=Before\n"
    );
}

#[tokio::test]
async fn successful_remote_import_replaces_the_document() {
    let harness = Harness::new(StaticRemote::serving("language=Fetched\n")).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(&first.session_id, "language=Before\n")
        .await;

    harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[("choices", "collage/abc")],
        ))
        .await
        .unwrap();

    assert_eq!(
        harness.document(&first.session_id).await,
        "language=Fetched\n"
    );
}

#[tokio::test]
async fn empty_sample_sentinel_truncates_the_document() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;
    let samples = harness.config.samples_dir().join("basic");
    fs::create_dir_all(&samples).await.unwrap();
    fs::write(samples.join("empty"), "").await.unwrap();

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(&first.session_id, "language=Stale\n")
        .await;

    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[("choices", "web/sample-choices/basic/empty")],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::Main);
    assert_eq!(harness.document(&first.session_id).await, "");
    // An empty document validates clean: no errors beyond baseline.
    assert!(!response.body.contains("A language name is required."));
}

#[tokio::test]
async fn uploaded_bytes_replace_the_document_directly() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    let upload = request(Some(&first.session_id), &[])
        .with_upload(b"version=34\nsection=general\nlanguage=Uploaded\n".to_vec());

    harness.workflow.run(upload).await.unwrap();

    assert!(
        harness
            .document(&first.session_id)
            .await
            .contains("language=Uploaded")
    );
}

#[tokio::test]
async fn section_save_merges_fields_before_validation() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[("section", "general"), ("language", "Nahuatl")],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::Main);
    let document = harness.document(&first.session_id).await;
    assert!(document.contains("section=general"));
    assert!(document.contains("language=Nahuatl"));
    // Validation observed the merged result: no missing-language error.
    assert!(!response.body.contains("A language name is required."));
}

#[tokio::test]
async fn import_and_save_in_one_request_validate_the_merged_result() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    // The inline replacement alone would fail validation (no language);
    // the same request's field save supplies it.
    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[
                ("choices", "version=34"),
                ("section", "general"),
                ("language", "Mapudungun"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::Main);
    let document = harness.document(&first.session_id).await;
    assert!(document.contains("version=34"));
    assert!(document.contains("language=Mapudungun"));
    assert!(!response.body.contains("A language name is required."));
}

#[tokio::test]
async fn customize_is_refused_without_a_recognized_delivery_format() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(
            &first.session_id,
            "section=general\nlanguage=Tlingit\narchive=yes\n",
        )
        .await;

    for delivery in [None, Some("rar")] {
        let mut pairs = vec![("customize", "customize")];
        if let Some(delivery) = delivery {
            pairs.push(("delivery", delivery));
        }
        let response = harness
            .workflow
            .run(request(Some(&first.session_id), &pairs))
            .await
            .unwrap();

        assert_eq!(response.page, PageKind::ValidationError);
        assert!(response.body.contains("You must specify an archive type."));
    }

    // Refusal happens before any archive entry or customization call.
    assert!(harness.snapshot(1).await.is_none());
    assert_eq!(harness.engine.customize_count(), 0);
}

#[tokio::test]
async fn customize_is_refused_when_validation_fails() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    // Non-empty document with no language: validation records an error.
    harness
        .write_document(&first.session_id, "section=general\narchive=yes\n")
        .await;

    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[("customize", "customize"), ("delivery", "zip")],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::ValidationError);
    assert!(harness.snapshot(1).await.is_none());
    assert_eq!(harness.engine.customize_count(), 0);
}

#[tokio::test]
async fn consecutive_archived_customizations_get_consecutive_serials() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(
            &first.session_id,
            "version=34\nsection=general\nlanguage=First\narchive=yes\n",
        )
        .await;

    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[("customize", "customize"), ("delivery", "tgz")],
        ))
        .await
        .unwrap();
    assert_eq!(response.page, PageKind::CustomizeComplete);

    // The second request also edits the document; the merge lands before
    // the snapshot is taken.
    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[
                ("section", "general"),
                ("language", "Second"),
                ("customize", "customize"),
                ("delivery", "tgz"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.page, PageKind::CustomizeComplete);

    let snapshot_one = harness.snapshot(1).await.unwrap();
    let snapshot_two = harness.snapshot(2).await.unwrap();
    assert!(snapshot_one.contains("language=First"));
    assert!(snapshot_two.contains("language=Second"));
    assert_eq!(harness.engine.customize_count(), 2);
}

#[tokio::test]
async fn documents_without_archive_opt_in_are_not_snapshotted() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(
            &first.session_id,
            "version=34\nsection=general\nlanguage=Koyukon\narchive=no\n",
        )
        .await;

    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[("customize", "customize"), ("delivery", "zip")],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::CustomizeComplete);
    assert!(harness.snapshot(1).await.is_none());
}

#[tokio::test]
async fn customize_with_sentences_resolves_to_the_sentences_page() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(
            &first.session_id,
            "version=34\nsection=general\nlanguage=Washo\n",
        )
        .await;

    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[
                ("customize", "customize"),
                ("delivery", "tgz"),
                ("sentences", "1"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::Sentences);
}

#[tokio::test]
async fn customization_fault_resolves_to_the_diagnostic_page() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    // An empty document validates clean but cannot be customized; the
    // fault becomes a diagnostic response, not an error.
    let response = harness
        .workflow
        .run(request(
            None,
            &[("customize", "customize"), ("delivery", "tgz")],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::CustomizeError);
    assert!(response.body.contains("Customization failed"));
}

#[tokio::test]
async fn validation_fault_is_terminal_even_for_subpage_requests() {
    let root = TempDir::new().unwrap();
    let config = EngineConfig::with_root(root.path());
    let workflow = build_workflow(
        &config,
        Arc::new(FaultyValidator),
        Arc::new(StaticRemote::empty_handed()),
    )
    .await;

    let response = workflow
        .run(request(None, &[("subpage", "lexicon")]))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::ChoicesError);
    assert!(response.body.contains("validator exploded"));
}

#[tokio::test]
async fn subpage_requests_render_the_named_subpage() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let response = harness
        .workflow
        .run(request(None, &[("subpage", "word-order")]))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::SubPage);
    assert!(response.body.contains("word-order"));
}

#[tokio::test]
async fn verbpred_response_survives_the_default_branch() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let response = harness
        .workflow
        .run(request(
            None,
            &[
                ("verbpred", "chase"),
                ("grammar", "grammar-1"),
                ("template", "basic"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::MoreSentences);
    assert!(response.body.contains("chase"));
}

#[tokio::test]
async fn customize_overrides_a_pending_verbpred_response() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    harness
        .write_document(
            &first.session_id,
            "version=34\nsection=general\nlanguage=Shoshone\n",
        )
        .await;

    let response = harness
        .workflow
        .run(request(
            Some(&first.session_id),
            &[
                ("verbpred", "sleep"),
                ("grammar", "grammar-1"),
                ("template", "basic"),
                ("customize", "customize"),
                ("delivery", "zip"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.page, PageKind::CustomizeComplete);
}

#[tokio::test]
async fn toolbox_import_records_lexemes_and_releases_staged_files() {
    let harness = Harness::new(StaticRemote::empty_handed()).await;

    let first = harness.workflow.run(request(None, &[])).await.unwrap();
    let toolbox_request = request(
        Some(&first.session_id),
        &[("import_toolbox", "1"), ("section", "toolbox-import")],
    )
    .with_lexicon_uploads(vec![LexiconUpload::new(
        "tb1_tbfilename",
        "lexicon.txt",
        b"\\lx kita\n\\ge we\n\\lx niri\n".to_vec(),
    )]);

    let response = harness.workflow.run(toolbox_request).await.unwrap();
    assert_eq!(response.page, PageKind::Main);

    let document = harness.document(&first.session_id).await;
    assert!(document.contains("tb-lex1_orth=kita"));
    assert!(document.contains("tb-lex2_orth=niri"));

    // Every staged upload is released once the import returns.
    let mut entries = fs::read_dir(harness.session_dir(&first.session_id))
        .await
        .unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        let name = entry.file_name().to_string_lossy().into_owned();
        assert!(
            !name.starts_with("toolbox-"),
            "staged file '{name}' survived the request"
        );
    }
}
