//! A local file paired with the name it gets inside the deposition bucket.

use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadTarget {
    /// Local file to read.
    pub path: PathBuf,

    /// Base name of `path`, used unchanged as the key in the bucket.
    pub remote_name: String,
}

impl UploadTarget {
    /// Build a target for `path`, failing if it is not an existing regular file.
    pub fn new(path: &Path) -> AppResult<Self> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        if !path.is_file() {
            return Err(AppError::UploadFileNotFound(path));
        }

        let name = path
            .file_name()
            .map(|name| name.to_str().map(str::to_owned));
        let remote_name = match name {
            Some(Some(name)) => name,
            Some(None) => return Err(AppError::UnsupportedFileName(path)),
            None => return Err(AppError::UploadFileNotFound(path)),
        };

        Ok(Self { path, remote_name })
    }
}
