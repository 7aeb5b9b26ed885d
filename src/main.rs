use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod models;
mod services;

use models::metadata::MetadataDocument;
use services::{
    workflow::{ResolutionPath, UploadWorkflow},
    zenodo_client::ZenodoClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;
    tracing::debug!("Starting zenodo-upload with config: {:?}", cfg);

    // --- Load metadata ---
    let metadata = MetadataDocument::from_path(&cfg.config_file)?;
    tracing::info!(
        "Loaded metadata for '{}' from {}",
        metadata.title(),
        cfg.config_file.display()
    );

    // --- Upload ---
    let client = ZenodoClient::new(&cfg.server, cfg.token.clone())?;
    let workflow = UploadWorkflow::new(&client, &metadata, cfg.workflow_options());
    let outcomes = workflow.run(&cfg.files).await?;

    for outcome in &outcomes {
        let action = match outcome.path {
            ResolutionPath::NewDeposition => "new deposition".to_string(),
            ResolutionPath::NewVersion { previous } => format!("new version of {previous}"),
        };
        tracing::info!(
            "{} -> deposition {} ({}{}): {}",
            outcome.file.display(),
            outcome.deposition_id,
            action,
            if outcome.published { ", published" } else { "" },
            outcome.record_url
        );
    }

    Ok(())
}
