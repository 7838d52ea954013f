//! Template-backed page renderer.
//!
//! The real questionnaire templates are an external concern; these embedded
//! templates carry the state each page needs (session token, validation
//! marks, fault context) in a minimal HTML shell.

use minijinja::{Environment, context};
use std::path::Path;

use gramforge_core::archive::ArchiveFormat;
use gramforge_core::engine::PageRenderer;
use gramforge_core::error::{GramforgeError, Result};
use gramforge_core::validation::ValidationResult;

const MAIN_TEMPLATE: &str = r#"<!doctype html>
<html><head><title>Grammar questionnaire</title></head><body>
<h1>Grammar questionnaire</h1>
<p>Session {{ session_id }}</p>
{% if marks %}<ul class="marks">
{% for mark in marks %}<li class="{{ mark.severity }}">{{ mark.field }}: {{ mark.message }}</li>
{% endfor %}</ul>{% endif %}
</body></html>
"#;

const SUB_PAGE_TEMPLATE: &str = r#"<!doctype html>
<html><head><title>{{ name }}</title></head><body>
<h1>{{ name }}</h1>
<p>Session {{ session_id }}</p>
{% for mark in marks %}<p class="{{ mark.severity }}">{{ mark.field }}: {{ mark.message }}</p>
{% endfor %}
</body></html>
"#;

const ERROR_TEMPLATE: &str = r#"<!doctype html>
<html><head><title>Invalid choices</title></head><body>
<h1>The choices could not be customized</h1>
<ul>
{% for mark in marks %}<li>{{ mark.field }}: {{ mark.message }}</li>
{% endfor %}</ul>
</body></html>
"#;

const CHOICES_ERROR_TEMPLATE: &str = r#"<!doctype html>
<html><head><title>Validation failed</title></head><body>
<h1>The choices file could not be processed</h1>
<p>{{ fault }}</p>
<pre>{{ document }}</pre>
</body></html>
"#;

const CUSTOMIZE_ERROR_TEMPLATE: &str = r#"<!doctype html>
<html><head><title>Customization failed</title></head><body>
<h1>Customization failed</h1>
<p>{{ fault }}</p>
<pre>{{ document }}</pre>
</body></html>
"#;

const SENTENCES_TEMPLATE: &str = r#"<!doctype html>
<html><head><title>Example sentences</title></head><body>
<h1>Example sentences</h1>
<p>Session {{ session_id }}</p>
<p>Generated from {{ grammar_dir }}</p>
</body></html>
"#;

const CUSTOM_TEMPLATE: &str = r#"<!doctype html>
<html><head><title>Customization complete</title></head><body>
<h1>Your grammar is ready</h1>
<p>Output directory: {{ grammar_dir }}</p>
<p>Delivery format: {{ format }}</p>
</body></html>
"#;

const MORE_SENTENCES_TEMPLATE: &str = r#"<!doctype html>
<html><head><title>More sentences</title></head><body>
<h1>More sentences for {{ verbpred }}</h1>
<p>Session {{ session_id }}</p>
<p>Grammar: {{ grammar }}; template: {{ template }}</p>
</body></html>
"#;

/// Minijinja-backed implementation of `PageRenderer`.
pub struct TemplatePageRenderer {
    env: Environment<'static>,
}

impl TemplatePageRenderer {
    /// Builds the renderer with all page templates registered.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        let templates = [
            ("main", MAIN_TEMPLATE),
            ("sub_page", SUB_PAGE_TEMPLATE),
            ("error", ERROR_TEMPLATE),
            ("choices_error", CHOICES_ERROR_TEMPLATE),
            ("customize_error", CUSTOMIZE_ERROR_TEMPLATE),
            ("sentences", SENTENCES_TEMPLATE),
            ("custom", CUSTOM_TEMPLATE),
            ("more_sentences", MORE_SENTENCES_TEMPLATE),
        ];
        for (name, source) in templates {
            env.add_template(name, source)
                .map_err(|e| GramforgeError::render(format!("template '{name}': {e}")))?;
        }
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| GramforgeError::render(format!("render '{name}': {e}")))
    }

    fn document_text(choices_path: &Path) -> String {
        std::fs::read_to_string(choices_path).unwrap_or_default()
    }
}

impl PageRenderer for TemplatePageRenderer {
    fn main_page(&self, session_id: &str, vr: &ValidationResult) -> Result<String> {
        self.render(
            "main",
            context! { session_id => session_id, marks => vr.marks() },
        )
    }

    fn sub_page(&self, name: &str, session_id: &str, vr: &ValidationResult) -> Result<String> {
        self.render(
            "sub_page",
            context! { name => name, session_id => session_id, marks => vr.marks() },
        )
    }

    fn error_page(&self, vr: &ValidationResult) -> Result<String> {
        self.render("error", context! { marks => vr.marks() })
    }

    fn choices_error_page(&self, choices_path: &Path, fault: &GramforgeError) -> Result<String> {
        self.render(
            "choices_error",
            context! {
                fault => fault.to_string(),
                document => Self::document_text(choices_path),
            },
        )
    }

    fn customize_error_page(&self, choices_path: &Path, fault: &GramforgeError) -> Result<String> {
        self.render(
            "customize_error",
            context! {
                fault => fault.to_string(),
                document => Self::document_text(choices_path),
            },
        )
    }

    fn sentences_page(
        &self,
        _session_dir: &Path,
        grammar_dir: &Path,
        session_id: &str,
    ) -> Result<String> {
        self.render(
            "sentences",
            context! {
                session_id => session_id,
                grammar_dir => grammar_dir.display().to_string(),
            },
        )
    }

    fn custom_page(
        &self,
        _session_dir: &Path,
        grammar_dir: &Path,
        format: ArchiveFormat,
    ) -> Result<String> {
        self.render(
            "custom",
            context! {
                grammar_dir => grammar_dir.display().to_string(),
                format => format.to_string(),
            },
        )
    }

    fn more_sentences_page(
        &self,
        _session_dir: &Path,
        grammar: &str,
        verbpred: &str,
        template: &str,
        session_id: &str,
    ) -> Result<String> {
        self.render(
            "more_sentences",
            context! {
                grammar => grammar,
                verbpred => verbpred,
                template => template,
                session_id => session_id,
            },
        )
    }
}
