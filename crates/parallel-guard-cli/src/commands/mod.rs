//! Subcommand implementations. Each `run` returns `Ok(true)` on success and
//! `Ok(false)` when the document or delivery is rejected.

pub mod lint_betas;
pub mod rules;
pub mod sign;
pub mod validate;
pub mod verify;

use parallel_guard_rules::{parse_beta_header, BetaHeaderLinter, MatchMode};
use std::io::{self, Read};

use crate::errors::CliError;

/// Reads a file, or stdin when `input` is absent or `-`.
pub fn read_input(input: Option<&str>) -> Result<Vec<u8>, CliError> {
    match input {
        None | Some("-") => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|source| CliError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(buffer)
        }
        Some(path) => std::fs::read(path).map_err(|source| CliError::Read {
            path: path.to_string(),
            source,
        }),
    }
}

/// Flattens repeated `--beta` values, each of which may be a header-style list.
pub fn beta_tokens(values: &[String]) -> Vec<String> {
    let mut tokens = Vec::new();
    for value in values {
        for token in parse_beta_header(value) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }
    tokens
}

pub fn beta_linter(exact: bool) -> BetaHeaderLinter {
    BetaHeaderLinter::new(if exact { MatchMode::Exact } else { MatchMode::Prefix })
}
