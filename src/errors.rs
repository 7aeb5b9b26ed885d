use crate::services::zenodo_client::ZenodoError;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Every way an upload run can fail.
///
/// Configuration problems are detected before any network traffic, a missing
/// upload file before the network calls for that file, and remote failures
/// carry the [`ZenodoError`] that stopped the batch.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(
        "No access token provided!\n\
         Please create an environment variable with the token.\n\
         Variable Name: `ZENODO_ACCESS_TOKEN`"
    )]
    MissingToken,

    #[error("the file with metadata, specified for uploading does not exist: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("failed to read config file {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("please add metadata to the config file {}: {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error(
        "the file, specified for uploading does not exist or is a directory: {}",
        .0.display()
    )]
    UploadFileNotFound(PathBuf),

    #[error("file name is not valid UTF-8 and cannot be used as a remote name: {}", .0.display())]
    UnsupportedFileName(PathBuf),

    #[error(transparent)]
    Zenodo(#[from] ZenodoError),
}

pub type AppResult<T> = Result<T, AppError>;
