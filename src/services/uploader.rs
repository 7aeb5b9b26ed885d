//! File upload into a deposition bucket.
//!
//! The file is streamed as the body of a single PUT, never buffered whole.
//! There is no chunking or resume, so a large file holds the call open until
//! the last byte is sent. The MD5 of the streamed bytes is compared with the
//! checksum Zenodo reports back.

use crate::models::deposition::UploadedFile;
use crate::models::upload::UploadTarget;
use crate::services::zenodo_client::{Operation, ZenodoClient, ZenodoError, ZenodoResult};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{Body, header};
use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use url::Url;

impl ZenodoClient {
    /// `PUT <bucket_url>/<remote name>` with the file contents as the body.
    pub async fn upload_file(
        &self,
        target: &UploadTarget,
        bucket_url: &str,
    ) -> ZenodoResult<UploadedFile> {
        tracing::info!(
            "Uploading {} to Zenodo. This may take some time...",
            target.path.display()
        );
        let io_error = |source: io::Error| ZenodoError::Io {
            file: target.path.display().to_string(),
            source,
        };

        let file = File::open(&target.path).await.map_err(io_error)?;
        let length = file.metadata().await.map_err(io_error)?.len();

        let digest = Arc::new(Mutex::new(md5::Context::new()));
        let tap = Arc::clone(&digest);
        let stream = ReaderStream::new(file).inspect_ok(move |chunk: &Bytes| {
            tap.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .consume(chunk);
        });

        let url = object_url(bucket_url, &target.remote_name)?;
        let request = self
            .authorize(self.http().put(url))
            .header(header::CONTENT_LENGTH, length)
            .body(Body::wrap_stream(stream));
        let response = self.send(Operation::UploadFile, request).await?;

        let body = response
            .bytes()
            .await
            .map_err(|source| ZenodoError::Transport {
                operation: Operation::UploadFile,
                source,
            })?;
        let uploaded = if body.is_empty() {
            UploadedFile::default()
        } else {
            serde_json::from_slice::<UploadedFile>(&body).map_err(|source| ZenodoError::Decode {
                operation: Operation::UploadFile,
                source,
            })?
        };

        let context = {
            let mut guard = digest.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, md5::Context::new())
        };
        let local = format!("{:x}", context.compute());
        if let Some(remote) = uploaded.md5_hex() {
            if !remote.eq_ignore_ascii_case(&local) {
                return Err(ZenodoError::ChecksumMismatch {
                    file: target.remote_name.clone(),
                    local,
                    remote: remote.to_string(),
                });
            }
        }

        tracing::info!(
            "File {} uploaded successfully ({} bytes, md5 {})",
            uploaded.key.as_deref().unwrap_or(&target.remote_name),
            uploaded.size.unwrap_or(length),
            local
        );
        Ok(uploaded)
    }
}

/// `<bucket_url>/<remote_name>` with the name percent-encoded as a single
/// path segment, so `#`, `?` and `%` stay part of the key.
fn object_url(bucket_url: &str, remote_name: &str) -> ZenodoResult<Url> {
    let invalid = || ZenodoError::InvalidBucketUrl(bucket_url.to_string());
    let mut url = Url::parse(bucket_url).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .push(remote_name);
    Ok(url)
}
