//! Intent routing.
//!
//! The fields present in a request select exactly one terminal action and
//! zero or more preparatory steps (document replacement, field save,
//! lexicon import). Routing only inspects the request; every side effect
//! belongs to the workflow engine.

use gramforge_core::config::{COLLAGE_PREFIX, SAMPLE_PREFIX};
use gramforge_core::form::FormData;
use gramforge_core::request::EngineRequest;

/// Where replacement text for the choices document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementSource {
    /// A bundled sample document named by the reference.
    Sample(String),
    /// A remote archive reference (`collage/<key>`).
    Remote(String),
    /// The field value itself is the replacement text.
    Inline(String),
    /// Raw bytes of an uploaded file, written directly.
    Upload(Vec<u8>),
}

impl ReplacementSource {
    /// Whether the reference explicitly denotes the empty document, in
    /// which case a failed or empty read still truncates.
    pub fn is_empty_sentinel(&self) -> bool {
        match self {
            ReplacementSource::Sample(reference) | ReplacementSource::Remote(reference) => {
                reference.ends_with("/empty")
            }
            _ => false,
        }
    }
}

/// More-sentences generation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoreSentences {
    pub grammar: String,
    pub verbpred: String,
    pub template: String,
}

/// The terminal action selected for the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalIntent {
    Customize { wants_sentences: bool },
    SubPage(String),
    Default,
}

/// Everything the workflow needs to know about what the request asked for.
#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub replacement: Option<ReplacementSource>,
    pub save_fields: bool,
    pub import_toolbox: bool,
    pub more_sentences: Option<MoreSentences>,
    pub terminal: TerminalIntent,
}

impl RequestPlan {
    pub fn from_request(request: &EngineRequest) -> Self {
        let form = &request.form;
        Self {
            replacement: Self::replacement_of(form, request.upload.as_deref()),
            save_fields: form.contains("section"),
            import_toolbox: form.contains("import_toolbox"),
            more_sentences: Self::more_sentences_of(form),
            terminal: Self::terminal_of(form),
        }
    }

    fn replacement_of(form: &FormData, upload: Option<&[u8]>) -> Option<ReplacementSource> {
        if let Some(value) = form.get("choices") {
            if !value.is_empty() {
                if value.starts_with(SAMPLE_PREFIX) {
                    return Some(ReplacementSource::Sample(value.to_string()));
                }
                if value.starts_with(COLLAGE_PREFIX) {
                    return Some(ReplacementSource::Remote(value.to_string()));
                }
                return Some(ReplacementSource::Inline(value.to_string()));
            }
        }
        upload.map(|bytes| ReplacementSource::Upload(bytes.to_vec()))
    }

    fn more_sentences_of(form: &FormData) -> Option<MoreSentences> {
        if !form.contains("verbpred") {
            return None;
        }
        Some(MoreSentences {
            grammar: form.get("grammar").unwrap_or("").to_string(),
            verbpred: form.get("verbpred").unwrap_or("").to_string(),
            template: form.get("template").unwrap_or("").to_string(),
        })
    }

    fn terminal_of(form: &FormData) -> TerminalIntent {
        if form.contains("customize") {
            return TerminalIntent::Customize {
                wants_sentences: form.contains("sentences"),
            };
        }
        if let Some(name) = form.get("subpage") {
            if !name.is_empty() {
                return TerminalIntent::SubPage(name.to_string());
            }
        }
        TerminalIntent::Default
    }
}
