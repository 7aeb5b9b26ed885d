//! Per-file upload workflow.
//!
//! For each file, in argument order:
//! - resolve an existing deposition by title and creators
//! - found: create a new version, upload, optionally publish
//! - not found: create a deposition, upload, attach metadata, optionally publish
//!
//! The first failure ends the whole batch. Remote depositions created before
//! the failure are left as they are.

use crate::errors::AppResult;
use crate::models::{metadata::MetadataDocument, upload::UploadTarget};
use crate::services::{
    lifecycle::PublishRoute,
    resolver::SearchCriteria,
    zenodo_client::ZenodoClient,
};
use std::path::{Path, PathBuf};

/// Which branch of the workflow a file went through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionPath {
    /// No match; a fresh deposition was created and metadata attached.
    NewDeposition,
    /// A match was found; a new version of `previous` was created.
    NewVersion { previous: u64 },
}

/// What happened to one uploaded file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOutcome {
    pub file: PathBuf,
    pub deposition_id: u64,
    pub record_url: String,
    pub path: ResolutionPath,
    pub published: bool,
}

/// Settings that apply to every file in a batch.
#[derive(Clone, Debug, Default)]
pub struct WorkflowOptions {
    pub owner: Option<String>,
    pub publish: bool,
    pub publish_route: PublishRoute,
}

pub struct UploadWorkflow<'a> {
    client: &'a ZenodoClient,
    metadata: &'a MetadataDocument,
    options: WorkflowOptions,
}

impl<'a> UploadWorkflow<'a> {
    pub fn new(
        client: &'a ZenodoClient,
        metadata: &'a MetadataDocument,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            client,
            metadata,
            options,
        }
    }

    /// Process `files` one after another, stopping at the first error.
    pub async fn run(&self, files: &[PathBuf]) -> AppResult<Vec<UploadOutcome>> {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let outcome = self.process_file(file).await?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Run the whole workflow for one file.
    pub async fn process_file(&self, file: &Path) -> AppResult<UploadOutcome> {
        let target = UploadTarget::new(file)?;

        let criteria = SearchCriteria {
            title: self.metadata.title().to_string(),
            owner: self.options.owner.clone(),
            creators: self.metadata.creator_names(),
        };
        let existing = self.client.search_deposition(&criteria).await?;

        let (handle, path) = match existing {
            Some(found) => {
                let draft = self.client.create_new_version(found.id).await?;
                self.client.upload_file(&target, &draft.bucket_url).await?;
                (draft, ResolutionPath::NewVersion { previous: found.id })
            }
            None => {
                let created = self.client.create_deposition().await?;
                self.client.upload_file(&target, &created.bucket_url).await?;
                self.client
                    .attach_metadata(created.id, self.metadata)
                    .await?;
                (created, ResolutionPath::NewDeposition)
            }
        };
        tracing::info!("File link: {}", handle.record_url);

        if self.options.publish {
            self.client
                .publish(handle.id, self.options.publish_route)
                .await?;
        }

        Ok(UploadOutcome {
            file: target.path,
            deposition_id: handle.id,
            record_url: handle.record_url,
            path,
            published: self.options.publish,
        })
    }
}
