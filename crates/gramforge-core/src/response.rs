//! The engine's outbound response boundary.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Which terminal page the request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PageKind {
    Main,
    SubPage,
    ValidationError,
    ChoicesError,
    CustomizeError,
    Sentences,
    CustomizeComplete,
    MoreSentences,
}

/// One response from the workflow engine.
///
/// The session id is always present so the transport layer can echo it back
/// as the session cookie, whether or not the session was freshly allocated.
#[derive(Debug, Clone)]
pub struct EngineResponse {
    pub session_id: String,
    pub page: PageKind,
    pub body: String,
}

impl EngineResponse {
    pub fn new(session_id: impl Into<String>, page: PageKind, body: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            page,
            body: body.into(),
        }
    }
}
