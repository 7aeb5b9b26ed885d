//! Deposition metadata loaded from the YAML config file.
//!
//! The config file keeps the document under a top-level `zenodo_metadata`
//! key. The uploader only inspects `metadata.title` and the creator names;
//! every other key is carried along untouched and sent to Zenodo verbatim.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fs, io::ErrorKind, path::Path};

/// Key the metadata document lives under in the config file.
pub const CONFIG_ROOT_KEY: &str = "zenodo_metadata";

#[derive(Deserialize, Debug)]
struct ConfigFile {
    zenodo_metadata: Option<MetadataDocument>,
}

/// The document PUT to `deposit/depositions/<id>`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MetadataDocument {
    pub metadata: DepositMetadata,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DepositMetadata {
    pub title: String,
    pub creators: Vec<Creator>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Creator {
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetadataDocument {
    /// Read and validate the config file at `path`.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => AppError::ConfigNotFound(path.to_path_buf()),
            _ => AppError::ConfigRead {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Self::from_yaml(&raw).map_err(|reason| AppError::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse the config text. The error is a human-readable reason.
    pub fn from_yaml(raw: &str) -> Result<Self, String> {
        let config: ConfigFile = serde_yaml::from_str(raw).map_err(|err| err.to_string())?;
        let document = config
            .zenodo_metadata
            .ok_or_else(|| format!("missing top-level `{CONFIG_ROOT_KEY}` key"))?;
        document.validate()?;
        Ok(document)
    }

    fn validate(&self) -> Result<(), String> {
        if self.metadata.title.trim().is_empty() {
            return Err("`metadata.title` must not be empty".into());
        }
        if self.metadata.creators.is_empty() {
            return Err("`metadata.creators` must list at least one creator".into());
        }
        if self.metadata.creators.iter().any(|c| c.name.trim().is_empty()) {
            return Err("every entry in `metadata.creators` needs a `name`".into());
        }
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn creator_names(&self) -> Vec<String> {
        self.metadata
            .creators
            .iter()
            .map(|creator| creator.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const SAMPLE: &str = r#"
zenodo_metadata:
  metadata:
    title: Sample Dataset
    upload_type: dataset
    creators:
      - name: A. Researcher
        affiliation: Somewhere
"#;

    #[test]
    fn loads_document_and_keeps_unknown_keys() {
        let document = MetadataDocument::from_yaml(SAMPLE).unwrap();
        assert_eq!(document.title(), "Sample Dataset");
        assert_eq!(document.creator_names(), vec!["A. Researcher".to_string()]);

        let encoded = serde_json::to_value(&document).unwrap();
        assert_eq!(
            encoded,
            json!({
                "metadata": {
                    "title": "Sample Dataset",
                    "upload_type": "dataset",
                    "creators": [{"name": "A. Researcher", "affiliation": "Somewhere"}]
                }
            })
        );
    }

    #[test]
    fn rejects_missing_root_key() {
        let err = MetadataDocument::from_yaml("other: 1\n").unwrap_err();
        assert!(err.contains("zenodo_metadata"));
    }

    #[test]
    fn rejects_missing_title() {
        let raw = "zenodo_metadata:\n  metadata:\n    creators:\n      - name: A\n";
        let err = MetadataDocument::from_yaml(raw).unwrap_err();
        assert!(err.contains("title"));
    }

    #[test]
    fn rejects_creator_without_name() {
        let raw = "zenodo_metadata:\n  metadata:\n    title: T\n    creators:\n      - affiliation: X\n";
        assert!(MetadataDocument::from_yaml(raw).is_err());
    }

    #[test]
    fn rejects_empty_creator_list() {
        let raw = "zenodo_metadata:\n  metadata:\n    title: T\n    creators: []\n";
        let err = MetadataDocument::from_yaml(raw).unwrap_err();
        assert!(err.contains("creators"));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = MetadataDocument::from_path(&missing).unwrap_err();
        assert!(matches!(err, AppError::ConfigNotFound(path) if path == missing));
    }

    #[test]
    fn from_path_wraps_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "zenodo_metadata: [unclosed").unwrap();
        let err = MetadataDocument::from_path(file.path()).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { .. }));
    }
}
