//! Typed views of the Zenodo deposition and search responses.
//!
//! Only the fields the uploader actually reads are modelled. Everything else
//! in the payloads is ignored by serde, but a missing required field is a
//! decoding error at the boundary instead of a surprise at the point of use.

use serde::Deserialize;

/// The `(deposition id, bucket URL, record URL)` triple every workflow step
/// operates on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositionHandle {
    /// Numeric deposition id.
    pub id: u64,

    /// Storage endpoint the file bytes are PUT to.
    pub bucket_url: String,

    /// Public record page.
    pub record_url: String,
}

/// Links block shared by search hits and deposition responses.
#[derive(Deserialize, Clone, Debug)]
pub struct DepositionLinks {
    pub bucket: String,
    pub html: String,
}

/// A deposition as returned by `POST deposit/depositions` and
/// `GET deposit/depositions/<id>`. Search hits use the same shape.
#[derive(Deserialize, Clone, Debug)]
pub struct Deposition {
    pub id: u64,
    pub links: DepositionLinks,
}

impl Deposition {
    /// Collapse the response into the handle used by the rest of the workflow.
    pub fn into_handle(self) -> DepositionHandle {
        DepositionHandle {
            id: self.id,
            record_url: record_url_from_html(&self.links.html),
            bucket_url: self.links.bucket,
        }
    }
}

/// `GET records?q=...` response body.
#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    pub hits: SearchHits,
}

#[derive(Deserialize, Debug)]
pub struct SearchHits {
    pub hits: Vec<Deposition>,
}

/// `POST deposit/depositions/<id>/actions/newversion` response body.
///
/// The bucket of the new draft is not part of this payload, only a link to it.
#[derive(Deserialize, Debug)]
pub struct NewVersionResponse {
    pub links: NewVersionLinks,
}

#[derive(Deserialize, Debug)]
pub struct NewVersionLinks {
    pub latest_draft: String,
}

/// Response of a bucket `PUT`. Zenodo reports the stored size and an
/// `md5:<hex>` checksum.
#[derive(Deserialize, Debug, Default)]
pub struct UploadedFile {
    pub key: Option<String>,
    pub size: Option<u64>,
    pub checksum: Option<String>,
}

impl UploadedFile {
    /// Hex digest of the checksum when the server reported an MD5 one.
    pub fn md5_hex(&self) -> Option<&str> {
        self.checksum
            .as_deref()
            .and_then(|checksum| checksum.strip_prefix("md5:"))
    }
}

/// Turn a deposition HTML link into the public record link by replacing the
/// first `deposit` with `record`.
pub fn record_url_from_html(html: &str) -> String {
    html.replacen("deposit", "record", 1)
}

/// Extract the draft id from a `latest_draft` link: its final path segment.
pub fn draft_id_from_link(link: &str) -> Option<u64> {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_url_replaces_deposit_once() {
        assert_eq!(
            record_url_from_html("https://sandbox.zenodo.org/deposit/42"),
            "https://sandbox.zenodo.org/record/42"
        );
        assert_eq!(
            record_url_from_html("https://deposit.example/deposit/7"),
            "https://record.example/deposit/7"
        );
    }

    #[test]
    fn draft_id_is_last_path_segment() {
        assert_eq!(
            draft_id_from_link("https://sandbox.zenodo.org/api/deposit/depositions/1234"),
            Some(1234)
        );
        assert_eq!(
            draft_id_from_link("https://sandbox.zenodo.org/api/deposit/depositions/99/"),
            Some(99)
        );
        assert_eq!(draft_id_from_link("https://sandbox.zenodo.org/api/deposit/"), None);
    }

    #[test]
    fn deposition_requires_bucket_link() {
        let body = r#"{"id": 5, "links": {"html": "https://zenodo.org/deposit/5"}}"#;
        let err = serde_json::from_str::<Deposition>(body).unwrap_err();
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn deposition_collapses_into_handle() {
        let body = r#"{
            "id": 5,
            "title": "ignored",
            "links": {
                "bucket": "https://zenodo.org/api/files/abc",
                "html": "https://zenodo.org/deposit/5"
            }
        }"#;
        let handle = serde_json::from_str::<Deposition>(body).unwrap().into_handle();
        assert_eq!(
            handle,
            DepositionHandle {
                id: 5,
                bucket_url: "https://zenodo.org/api/files/abc".into(),
                record_url: "https://zenodo.org/record/5".into(),
            }
        );
    }

    #[test]
    fn uploaded_file_exposes_md5() {
        let file = UploadedFile {
            checksum: Some("md5:d41d8cd98f00b204e9800998ecf8427e".into()),
            ..Default::default()
        };
        assert_eq!(file.md5_hex(), Some("d41d8cd98f00b204e9800998ecf8427e"));

        let other = UploadedFile {
            checksum: Some("sha256:abc".into()),
            ..Default::default()
        };
        assert_eq!(other.md5_hex(), None);
    }
}
