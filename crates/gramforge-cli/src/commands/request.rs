use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use gramforge_application::WorkflowEngine;
use gramforge_core::config::EngineConfig;
use gramforge_core::form::{FormData, LexiconUpload};
use gramforge_core::request::EngineRequest;
use gramforge_infrastructure::{
    CollageArchiveSource, FileDocumentEngine, FsArchiveStore, FsSessionStore,
    TemplatePageRenderer, ToolboxLexiconImporter,
};

#[derive(Args)]
pub struct RequestArgs {
    /// Existing session token to replay
    #[arg(long)]
    session: Option<String>,

    /// Form fields as KEY=VALUE pairs (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE")]
    fields: Vec<String>,

    /// File whose raw bytes replace the choices document
    #[arg(long)]
    upload: Option<PathBuf>,

    /// Lexicon uploads as FIELD=PATH pairs (repeatable)
    #[arg(long = "lexicon", value_name = "FIELD=PATH")]
    lexicons: Vec<String>,
}

fn split_pair(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => bail!("'{raw}' is not a KEY=VALUE pair"),
    }
}

/// Builds the engine from the configuration and processes one request.
pub async fn run(config: &EngineConfig, args: RequestArgs) -> Result<()> {
    let sessions = Arc::new(FsSessionStore::new(config.sessions_dir()).await?);
    let workflow = WorkflowEngine::new(
        config,
        sessions,
        Arc::new(FileDocumentEngine::new()),
        Arc::new(TemplatePageRenderer::new()?),
        Arc::new(ToolboxLexiconImporter::new()),
        Arc::new(CollageArchiveSource::new(config)?),
        Arc::new(FsArchiveStore::new(config.saved_choices_dir())),
    );

    let form: FormData = args
        .fields
        .iter()
        .map(|raw| split_pair(raw))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .collect();

    let mut request = EngineRequest::new(args.session, form);
    if let Some(path) = &args.upload {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read upload '{}'", path.display()))?;
        request = request.with_upload(bytes);
    }

    let mut uploads = Vec::new();
    for raw in &args.lexicons {
        let (field, path) = split_pair(raw)?;
        let contents = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read lexicon source '{path}'"))?;
        let filename = PathBuf::from(&path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        uploads.push(LexiconUpload::new(field, filename, contents));
    }
    if !uploads.is_empty() {
        request = request.with_lexicon_uploads(uploads);
    }

    let response = workflow.run(request).await?;
    eprintln!("session: {}", response.session_id);
    eprintln!("page:    {}", response.page);
    println!("{}", response.body);
    Ok(())
}
