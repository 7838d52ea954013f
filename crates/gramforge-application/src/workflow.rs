//! The workflow engine.
//!
//! Sequences one request start to finish: session resolution → optional
//! document replacement → optional field save → optional lexicon import →
//! validation → terminal dispatch. The engine holds no state of its own
//! across requests; only the session store and the documents it manages
//! persist.

use std::path::Path;
use std::sync::Arc;
use tokio::fs;

use gramforge_core::archive::{ArchiveFormat, ArchiveStore, GrammarArchiveSource};
use gramforge_core::choices::ChoicesDocument;
use gramforge_core::config::EngineConfig;
use gramforge_core::engine::{DocumentEngine, PageRenderer};
use gramforge_core::error::{GramforgeError, Result};
use gramforge_core::lexicon::LexiconImporter;
use gramforge_core::request::EngineRequest;
use gramforge_core::response::{EngineResponse, PageKind};
use gramforge_core::session::{ResolvedSession, SessionStore};
use gramforge_core::validation::ValidationResult;
use gramforge_infrastructure::{SampleLibrary, StagedLexiconUploads};

use crate::intent::{ReplacementSource, RequestPlan, TerminalIntent};

/// Orchestrates the per-request state machine over a persisted choices
/// document.
pub struct WorkflowEngine {
    sessions: Arc<dyn SessionStore>,
    engine: Arc<dyn DocumentEngine>,
    renderer: Arc<dyn PageRenderer>,
    importer: Arc<dyn LexiconImporter>,
    remote: Arc<dyn GrammarArchiveSource>,
    archive: Arc<dyn ArchiveStore>,
    samples: SampleLibrary,
}

impl WorkflowEngine {
    /// Creates a new `WorkflowEngine` over the given collaborators.
    pub fn new(
        config: &EngineConfig,
        sessions: Arc<dyn SessionStore>,
        engine: Arc<dyn DocumentEngine>,
        renderer: Arc<dyn PageRenderer>,
        importer: Arc<dyn LexiconImporter>,
        remote: Arc<dyn GrammarArchiveSource>,
        archive: Arc<dyn ArchiveStore>,
    ) -> Self {
        Self {
            sessions,
            engine,
            renderer,
            importer,
            remote,
            archive,
            samples: SampleLibrary::new(config.samples_dir()),
        }
    }

    /// Processes one request, returning the terminal response.
    ///
    /// No collaborator fault escapes this method as an error except
    /// renderer failures and session-store failures, which have no page to
    /// fall back to.
    pub async fn run(&self, request: EngineRequest) -> Result<EngineResponse> {
        let session = self.sessions.resolve(request.session_id.as_deref()).await?;
        let choices_path = session.choices_path();
        let plan = RequestPlan::from_request(&request);
        tracing::debug!(
            request_id = %request.request_id,
            session = %session.id(),
            new_session = session.is_new(),
            "processing request"
        );

        if let Some(source) = &plan.replacement {
            self.apply_replacement(source, &choices_path).await?;
        }

        if plan.save_fields {
            if let Err(fault) = self.engine.merge_fields(&request.form, &choices_path).await {
                tracing::warn!(error = %fault, "field merge failed");
                return self.choices_fault_response(&session, &choices_path, fault);
            }
        }

        if plan.import_toolbox {
            if let Err(fault) = self
                .import_lexicons(&request, &session, &choices_path)
                .await
            {
                // Import faults degrade to a no-op; the document keeps
                // whatever state the merge left it in.
                tracing::warn!(error = %fault, "lexicon import failed");
            }
        }

        let pending = match &plan.more_sentences {
            Some(more) => {
                let body = self.renderer.more_sentences_page(
                    session.dir(),
                    &more.grammar,
                    &more.verbpred,
                    &more.template,
                    session.id(),
                )?;
                Some(EngineResponse::new(
                    session.id(),
                    PageKind::MoreSentences,
                    body,
                ))
            }
            None => None,
        };

        // Validation always observes the document after every mutation
        // performed above. A fault here is terminal: no later branch may
        // supersede the diagnostic response.
        let mut vr = match self.engine.validate(&choices_path).await {
            Ok(vr) => vr,
            Err(fault) => {
                tracing::warn!(error = %fault, "validation fault");
                return self.choices_fault_response(&session, &choices_path, fault);
            }
        };

        match plan.terminal {
            TerminalIntent::Customize { wants_sentences } => {
                self.customize(&session, &choices_path, &request, &mut vr, wants_sentences)
                    .await
            }
            TerminalIntent::SubPage(name) => {
                let body = self.renderer.sub_page(&name, session.id(), &vr)?;
                Ok(EngineResponse::new(session.id(), PageKind::SubPage, body))
            }
            TerminalIntent::Default => {
                if let Some(response) = pending {
                    return Ok(response);
                }
                let body = self.renderer.main_page(session.id(), &vr)?;
                Ok(EngineResponse::new(session.id(), PageKind::Main, body))
            }
        }
    }

    /// Applies a document replacement with the at-most-one-write policy:
    /// the document is overwritten only when non-empty data was obtained,
    /// or truncated when the reference denotes the empty sentinel. Any
    /// other outcome leaves the prior document untouched.
    async fn apply_replacement(
        &self,
        source: &ReplacementSource,
        choices_path: &Path,
    ) -> Result<()> {
        let data = match source {
            ReplacementSource::Sample(reference) => match self.samples.read(reference).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(reference, error = %e, "sample read failed");
                    None
                }
            },
            ReplacementSource::Remote(reference) => match self.remote.fetch(reference).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(reference, error = %e, "remote import failed");
                    None
                }
            },
            ReplacementSource::Inline(text) => Some(text.clone()),
            ReplacementSource::Upload(bytes) => {
                // Uploaded bytes replace the document directly.
                fs::write(choices_path, bytes).await?;
                return Ok(());
            }
        };

        match data {
            Some(text) if !text.is_empty() => {
                fs::write(choices_path, text).await?;
            }
            _ if source.is_empty_sentinel() => {
                fs::write(choices_path, "").await?;
            }
            _ => {
                tracing::debug!("no replacement data obtained, document left untouched");
            }
        }
        Ok(())
    }

    /// Stages the uploaded toolbox files, records their paths in the
    /// document, and runs the importer. The staged files are released on
    /// every exit path when the guard drops.
    async fn import_lexicons(
        &self,
        request: &EngineRequest,
        session: &ResolvedSession,
        choices_path: &Path,
    ) -> Result<()> {
        let (staged, rewrites) =
            StagedLexiconUploads::stage(session.dir(), &request.lexicon_uploads)?;
        tracing::debug!(staged = staged.len(), "staged toolbox uploads");

        let mut fields = request.form.clone();
        for (field, path) in rewrites {
            fields.set(field, path);
        }
        self.engine.merge_fields(&fields, choices_path).await?;
        self.importer.import(choices_path).await
    }

    async fn customize(
        &self,
        session: &ResolvedSession,
        choices_path: &Path,
        request: &EngineRequest,
        vr: &mut ValidationResult,
        wants_sentences: bool,
    ) -> Result<EngineResponse> {
        let delivery = request.form.get("delivery").unwrap_or("");
        let format = match delivery.parse::<ArchiveFormat>() {
            Ok(format) => Some(format),
            Err(_) => {
                vr.err("delivery", "You must specify an archive type.");
                None
            }
        };

        let format = match format {
            Some(format) if !vr.has_errors() => format,
            _ => {
                let body = self.renderer.error_page(vr)?;
                return Ok(EngineResponse::new(
                    session.id(),
                    PageKind::ValidationError,
                    body,
                ));
            }
        };

        // Snapshot the document first when it opts in. Archival is
        // advisory history; a failed snapshot does not block customization.
        match fs::read_to_string(choices_path).await {
            Ok(text) if ChoicesDocument::parse(&text).wants_archive() => {
                match self.archive.archive(choices_path).await {
                    Ok(serial) => tracing::debug!(serial, "archived submitted choices"),
                    Err(e) => tracing::warn!(error = %e, "snapshot archival failed"),
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not read document for archive opt-in");
            }
        }

        match self.engine.customize(session.dir(), format).await {
            Ok(grammar_dir) => {
                if wants_sentences {
                    let body =
                        self.renderer
                            .sentences_page(session.dir(), &grammar_dir, session.id())?;
                    Ok(EngineResponse::new(session.id(), PageKind::Sentences, body))
                } else {
                    let body = self
                        .renderer
                        .custom_page(session.dir(), &grammar_dir, format)?;
                    Ok(EngineResponse::new(
                        session.id(),
                        PageKind::CustomizeComplete,
                        body,
                    ))
                }
            }
            Err(fault) => {
                tracing::warn!(error = %fault, "customization fault");
                let body = self.renderer.customize_error_page(choices_path, &fault)?;
                Ok(EngineResponse::new(
                    session.id(),
                    PageKind::CustomizeError,
                    body,
                ))
            }
        }
    }

    fn choices_fault_response(
        &self,
        session: &ResolvedSession,
        choices_path: &Path,
        fault: GramforgeError,
    ) -> Result<EngineResponse> {
        let body = self.renderer.choices_error_page(choices_path, &fault)?;
        Ok(EngineResponse::new(
            session.id(),
            PageKind::ChoicesError,
            body,
        ))
    }
}
