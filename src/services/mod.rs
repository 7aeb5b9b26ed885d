//! Remote operations against the Zenodo REST API and the workflow that
//! sequences them.

pub mod lifecycle;
pub mod resolver;
pub mod uploader;
pub mod workflow;
pub mod zenodo_client;
