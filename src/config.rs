use crate::errors::{AppError, AppResult};
use crate::services::{
    lifecycle::PublishRoute,
    workflow::WorkflowOptions,
    zenodo_client::{AccessToken, DEFAULT_SERVER},
};
use clap::Parser;
use std::{env, path::PathBuf};

/// Environment variable holding the Zenodo access token.
pub const TOKEN_VAR: &str = "ZENODO_ACCESS_TOKEN";

/// Environment variable overriding the API base URL.
pub const SERVER_VAR: &str = "ZENODO_SERVER";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub files: Vec<PathBuf>,
    pub config_file: PathBuf,
    pub publish: bool,
    pub publish_route: PublishRoute,
    pub owner: Option<String>,
    pub server: String,
    pub token: AccessToken,
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about = "Upload files to Zenodo.")]
pub struct Args {
    /// Path to the file to be uploaded (repeat for several files)
    #[arg(short = 'f', long = "file", required = true)]
    pub files: Vec<PathBuf>,

    /// Config file with metadata information
    #[arg(short = 'c', long = "config-file")]
    pub config_file: PathBuf,

    /// Publish the deposition after uploading
    #[arg(short = 'p', long)]
    pub publish: bool,

    /// Where the publish action is sent
    #[arg(long, value_enum, default_value_t = PublishRoute::Legacy)]
    pub publish_route: PublishRoute,

    /// Restrict the deposition search to this owner id
    #[arg(long)]
    pub owner: Option<String>,

    /// Zenodo API base URL (overrides ZENODO_SERVER)
    #[arg(long)]
    pub server: Option<String>,
}

impl AppConfig {
    /// Parse CLI args and the process environment into an AppConfig.
    pub fn from_env_and_args() -> AppResult<Self> {
        let args = Args::parse();
        Self::from_parts(args, env::var(TOKEN_VAR).ok(), env::var(SERVER_VAR).ok())
    }

    /// Merge parsed args with environment values. CLI wins over environment,
    /// environment over defaults.
    pub fn from_parts(
        args: Args,
        env_token: Option<String>,
        env_server: Option<String>,
    ) -> AppResult<Self> {
        let token = env_token
            .and_then(AccessToken::new)
            .ok_or(AppError::MissingToken)?;

        let server = args
            .server
            .or(env_server.filter(|value| !value.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_SERVER.into());

        Ok(Self {
            files: args.files,
            config_file: args.config_file,
            publish: args.publish,
            publish_route: args.publish_route,
            owner: args.owner,
            server,
            token,
        })
    }

    pub fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            owner: self.owner.clone(),
            publish: self.publish,
            publish_route: self.publish_route,
        }
    }
}
