//! Data models for the upload workflow.
//!
//! Everything here is transient: built from a config file or a Zenodo
//! response, used for one invocation and dropped when the process exits.

pub mod deposition;
pub mod metadata;
pub mod upload;
