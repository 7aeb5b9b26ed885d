//! Deposition lifecycle calls: create, new version, fetch, attach metadata
//! and publish.
//!
//! Every call here except `fetch_deposition` changes remote state and is not
//! idempotent. Calling `create_deposition` twice creates two depositions.

use crate::models::deposition::{
    Deposition, DepositionHandle, NewVersionResponse, draft_id_from_link,
};
use crate::models::metadata::MetadataDocument;
use crate::services::zenodo_client::{Operation, ZenodoClient, ZenodoError, ZenodoResult};
use clap::ValueEnum;
use serde_json::json;

/// Which URL the publish action is sent to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PublishRoute {
    /// `<server>/<id>/actions/publish`. Skips the `deposit/depositions`
    /// segment every other call uses; kept as the default for compatibility.
    #[default]
    Legacy,
    /// `<server>deposit/depositions/<id>/actions/publish`.
    Deposit,
}

impl ZenodoClient {
    /// `POST deposit/depositions` with an empty JSON body.
    pub async fn create_deposition(&self) -> ZenodoResult<DepositionHandle> {
        tracing::info!("Creating a new deposition...");
        let request = self
            .authorize(self.http().post(self.api_url("deposit/depositions")))
            .json(&json!({}));
        let deposition: Deposition = self
            .send_json(Operation::CreateDeposition, request)
            .await?;

        tracing::info!("Created deposition {}", deposition.id);
        Ok(deposition.into_handle())
    }

    /// Create a new version of `deposition_id` and return the new draft.
    ///
    /// The newversion response only links to the draft, so the draft is
    /// fetched afterwards to learn its bucket.
    pub async fn create_new_version(&self, deposition_id: u64) -> ZenodoResult<DepositionHandle> {
        tracing::info!("Creating a new version of deposition {}...", deposition_id);
        let url = self.api_url(&format!(
            "deposit/depositions/{deposition_id}/actions/newversion"
        ));
        let request = self.authorize(self.http().post(url));
        let response: NewVersionResponse = self.send_json(Operation::NewVersion, request).await?;

        let latest_draft = response.links.latest_draft;
        let draft_id = draft_id_from_link(&latest_draft)
            .ok_or_else(|| ZenodoError::MalformedDraftLink(latest_draft.clone()))?;
        tracing::info!("New draft is deposition {}", draft_id);

        self.fetch_deposition(draft_id).await
    }

    /// `GET deposit/depositions/<id>`
    pub async fn fetch_deposition(&self, deposition_id: u64) -> ZenodoResult<DepositionHandle> {
        let url = self.api_url(&format!("deposit/depositions/{deposition_id}"));
        let request = self.authorize(self.http().get(url));
        let deposition: Deposition = self
            .send_json(Operation::FetchDeposition, request)
            .await?;
        Ok(deposition.into_handle())
    }

    /// `PUT deposit/depositions/<id>` with the full metadata document.
    pub async fn attach_metadata(
        &self,
        deposition_id: u64,
        metadata: &MetadataDocument,
    ) -> ZenodoResult<()> {
        tracing::info!("Uploading metadata for deposition {} ...", deposition_id);
        let url = self.api_url(&format!("deposit/depositions/{deposition_id}"));
        let request = self.authorize(self.http().put(url)).json(metadata);
        self.send(Operation::AttachMetadata, request).await?;
        Ok(())
    }

    /// Publish the deposition. Irreversible on the remote side.
    pub async fn publish(&self, deposition_id: u64, route: PublishRoute) -> ZenodoResult<()> {
        let url = self.publish_url(deposition_id, route);
        tracing::info!("Publishing deposition {}...", deposition_id);
        tracing::debug!(%url, ?route, "publish url");
        let request = self.authorize(self.http().post(url));
        self.send(Operation::Publish, request).await?;
        Ok(())
    }

    fn publish_url(&self, deposition_id: u64, route: PublishRoute) -> String {
        match route {
            PublishRoute::Legacy => format!("{}/{deposition_id}/actions/publish", self.server()),
            PublishRoute::Deposit => self.api_url(&format!(
                "deposit/depositions/{deposition_id}/actions/publish"
            )),
        }
    }
}
