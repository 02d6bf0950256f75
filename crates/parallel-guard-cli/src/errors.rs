//! CLI error type and exit-code mapping.

use parallel_guard_rules::RulesError;
use parallel_guard_webhook::WebhookError;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for a rejected document or delivery.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for bad arguments, unreadable input or bad configuration.
pub const EXIT_USAGE: i32 = 2;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("input is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Webhook(#[from] WebhookError),
    #[error("failed to render output: {0}")]
    Render(#[source] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Render(_) => EXIT_FAILURE,
            _ => EXIT_USAGE,
        }
    }
}
