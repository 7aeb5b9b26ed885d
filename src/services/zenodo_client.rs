//! src/services/zenodo_client.rs
//!
//! ZenodoClient: the HTTP transport shared by every remote operation. It
//! owns the base URL and the access token, turns non-2xx responses into
//! [`ZenodoError::Http`] and decodes JSON bodies into typed responses.
//! The operations themselves live in the sibling modules as further
//! `impl ZenodoClient` blocks.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::{fmt, io};
use thiserror::Error;

/// Default API base when neither `--server` nor `ZENODO_SERVER` is set.
pub const DEFAULT_SERVER: &str = "https://sandbox.zenodo.org/api/";

/// Name of the query parameter carrying the token on authenticated calls.
const TOKEN_PARAM: &str = "access_token";

/// The remote calls the uploader makes. Used to label errors and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Search,
    CreateDeposition,
    NewVersion,
    FetchDeposition,
    UploadFile,
    AttachMetadata,
    Publish,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Search => "search",
            Operation::CreateDeposition => "create deposition",
            Operation::NewVersion => "new version",
            Operation::FetchDeposition => "fetch deposition",
            Operation::UploadFile => "upload file",
            Operation::AttachMetadata => "attach metadata",
            Operation::Publish => "publish",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ZenodoError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("{operation} request failed")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} failed with HTTP {status}: {message}")]
    Http {
        operation: Operation,
        status: StatusCode,
        message: String,
    },
    #[error("{operation} returned an unexpected body")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
    #[error("bucket url `{0}` cannot take a file name")]
    InvalidBucketUrl(String),
    #[error("new version response has no draft id in `latest_draft` link `{0}`")]
    MalformedDraftLink(String),
    #[error("checksum mismatch for `{file}`: local md5 {local}, remote md5 {remote}")]
    ChecksumMismatch {
        file: String,
        local: String,
        remote: String,
    },
    #[error("failed to read `{file}` for upload")]
    Io {
        file: String,
        #[source]
        source: io::Error,
    },
}

impl ZenodoError {
    /// HTTP status of a rejected call, if that is what this error is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ZenodoError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ZenodoResult<T> = Result<T, ZenodoError>;

/// Opaque bearer credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token, rejecting empty or whitespace-only values.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Error body Zenodo sends with 4xx/5xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the Zenodo REST API.
///
/// No timeouts are configured, so a hung server blocks the caller.
#[derive(Clone, Debug)]
pub struct ZenodoClient {
    http: Client,
    server: String,
    token: AccessToken,
}

impl ZenodoClient {
    /// Create a client rooted at `server`. A trailing `/` is added if missing
    /// since every path is appended to the base as-is.
    pub fn new(server: &str, token: AccessToken) -> ZenodoResult<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ZenodoError::Client)?;

        Ok(Self {
            http,
            server: normalize_server(server),
            token,
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// `<server><path>`
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Attach the access token as a query parameter.
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[(TOKEN_PARAM, self.token.expose())])
    }

    /// Send `request`, failing on transport errors and non-2xx statuses.
    pub(crate) async fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> ZenodoResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|source| ZenodoError::Transport { operation, source })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%operation, %status, "request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.message)
            .unwrap_or(body);
        tracing::warn!(%operation, %status, "request rejected: {}", message);

        Err(ZenodoError::Http {
            operation,
            status,
            message,
        })
    }

    /// Send `request` and decode the JSON body into `T`.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> ZenodoResult<T> {
        let response = self.send(operation, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ZenodoError::Transport { operation, source })?;

        serde_json::from_slice(&bytes).map_err(|source| ZenodoError::Decode { operation, source })
    }
}

fn normalize_server(server: &str) -> String {
    let trimmed = server.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}
