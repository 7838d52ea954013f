//! The engine's inbound request boundary.
//!
//! The transport layer (HTTP, CLI, tests) builds one of these per request;
//! the engine never sees cookies or wire encodings.

use crate::form::{FormData, LexiconUpload};
use uuid::Uuid;

/// One request against the workflow engine.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// Correlation id for tracing; fresh per request.
    pub request_id: Uuid,
    /// Session token presented by the client, if any.
    pub session_id: Option<String>,
    /// Merged query+body fields.
    pub form: FormData,
    /// Raw bytes of an uploaded choices file, if one was attached.
    pub upload: Option<Vec<u8>>,
    /// Typed collection of uploaded lexicon source files.
    pub lexicon_uploads: Vec<LexiconUpload>,
}

impl EngineRequest {
    pub fn new(session_id: Option<String>, form: FormData) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            session_id,
            form,
            upload: None,
            lexicon_uploads: Vec::new(),
        }
    }

    pub fn with_upload(mut self, bytes: Vec<u8>) -> Self {
        self.upload = Some(bytes);
        self
    }

    pub fn with_lexicon_uploads(mut self, uploads: Vec<LexiconUpload>) -> Self {
        self.lexicon_uploads = uploads;
        self
    }
}
