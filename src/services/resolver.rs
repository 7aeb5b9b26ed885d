//! Deposition resolution: find an existing deposition for a title.
//!
//! The search is a best-effort full-text query and the first hit wins. There
//! is no score threshold and no tie-breaking, so two depositions sharing a
//! title and creators resolve to whichever the search engine ranks first.

use crate::models::deposition::{DepositionHandle, SearchResponse};
use crate::services::zenodo_client::{Operation, ZenodoClient, ZenodoResult};

/// What to search for.
#[derive(Clone, Debug, Default)]
pub struct SearchCriteria {
    pub title: String,
    pub owner: Option<String>,
    pub creators: Vec<String>,
}

/// Compose the full-text query for `criteria`.
///
/// `/` is stripped from the result because the search backend cannot
/// tokenize it.
pub fn build_search_query(criteria: &SearchCriteria) -> String {
    let mut query = format!("metadata.title:\"{}\"", criteria.title);

    if let Some(owner) = criteria.owner.as_deref() {
        query.push_str(&format!(" owners:{owner}"));
    }

    if !criteria.creators.is_empty() {
        let names = criteria
            .creators
            .iter()
            .map(|name| format!("\"{name}\""))
            .collect::<Vec<_>>()
            .join(" OR ");
        query.push_str(&format!(" metadata.creators.name:{names}"));
    }

    query.replace('/', "")
}

impl ZenodoClient {
    /// Look up the best matching deposition. `Ok(None)` means nothing matched.
    ///
    /// Unauthenticated, and only the first result page is considered.
    pub async fn search_deposition(
        &self,
        criteria: &SearchCriteria,
    ) -> ZenodoResult<Option<DepositionHandle>> {
        tracing::info!("Searching for depositions...");
        let query = build_search_query(criteria);
        tracing::debug!(%query, "search query");

        let request = self
            .http()
            .get(self.api_url("records"))
            .query(&[("q", query.as_str()), ("sort", "bestmatch")]);
        let response: SearchResponse = self.send_json(Operation::Search, request).await?;

        let hits = response.hits.hits;
        let count = hits.len();
        let Some(deposition) = hits.into_iter().next() else {
            tracing::info!("No records found for search: '{}'", criteria.title);
            return Ok(None);
        };

        tracing::info!("Found `{}` depositions!", count);
        if count > 1 {
            tracing::warn!(
                "{} depositions match '{}'; using the first hit, which may not be the intended one",
                count, criteria.title
            );
        }
        tracing::info!("Best match is deposition: {}", deposition.id);

        Ok(Some(deposition.into_handle()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::zenodo_client::tests::client_for;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn criteria(title: &str, owner: Option<&str>, creators: &[&str]) -> SearchCriteria {
        SearchCriteria {
            title: title.into(),
            owner: owner.map(Into::into),
            creators: creators.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn query_combines_title_owner_and_creators() {
        let query = build_search_query(&criteria("T", Some("O"), &["A", "B"]));
        assert_eq!(
            query,
            r#"metadata.title:"T" owners:O metadata.creators.name:"A" OR "B""#
        );
    }

    #[test]
    fn query_with_title_only() {
        assert_eq!(
            build_search_query(&criteria("Sample Dataset", None, &[])),
            r#"metadata.title:"Sample Dataset""#
        );
    }

    #[test]
    fn query_strips_slashes() {
        let query = build_search_query(&criteria("input/output data", None, &["Lab A/B"]));
        assert_eq!(
            query,
            r#"metadata.title:"inputoutput data" metadata.creators.name:"Lab AB""#
        );
        assert!(!query.contains('/'));
    }

    fn search_mock(server: &mut mockito::ServerGuard, query: &str) -> mockito::Mock {
        server
            .mock("GET", "/api/records")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), query.into()),
                Matcher::UrlEncoded("sort".into(), "bestmatch".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
    }

    #[tokio::test]
    async fn empty_hit_list_resolves_to_none() {
        let mut server = Server::new_async().await;
        let mock = search_mock(
            &mut server,
            r#"metadata.title:"Sample Dataset" metadata.creators.name:"A. Researcher""#,
        )
        .with_body(json!({"hits": {"hits": [], "total": 0}}).to_string())
        .create_async()
        .await;

        let client = client_for(&server);
        let found = client
            .search_deposition(&criteria("Sample Dataset", None, &["A. Researcher"]))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn first_hit_wins() {
        let mut server = Server::new_async().await;
        let body = json!({
            "hits": {"hits": [
                {"id": 42, "links": {
                    "bucket": "https://zenodo.test/api/files/first",
                    "html": "https://zenodo.test/deposit/42"
                }},
                {"id": 7, "links": {
                    "bucket": "https://zenodo.test/api/files/second",
                    "html": "https://zenodo.test/deposit/7"
                }}
            ]}
        });
        let mock = search_mock(&mut server, r#"metadata.title:"T" owners:99"#)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let found = client
            .search_deposition(&criteria("T", Some("99"), &[]))
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(found.id, 42);
        assert_eq!(found.bucket_url, "https://zenodo.test/api/files/first");
        assert_eq!(found.record_url, "https://zenodo.test/record/42");
    }

    #[tokio::test]
    async fn search_failure_propagates_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/records")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .search_deposition(&criteria("T", None, &[]))
            .await
            .unwrap_err();

        assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
    }
}
