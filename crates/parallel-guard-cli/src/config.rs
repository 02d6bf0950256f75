//! Optional TOML configuration.

use parallel_guard_rules::Limits;
use parallel_guard_webhook::VerifierConfig;
use serde::Deserialize;
use std::path::Path;

use crate::errors::CliError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    pub limits: Limits,
    pub webhook: VerifierConfig,
    pub beta: BetaConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BetaConfig {
    /// Require the full current token instead of its stable prefix.
    pub exact: bool,
}

impl GuardConfig {
    /// Reads `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.limits.validate()?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
