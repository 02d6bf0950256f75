//! Lint-betas command implementation.

use parallel_guard_rules::{PayloadKind, ValidationReport, RULESET_VERSION};
use serde_json::Value;

use super::{beta_linter, beta_tokens, read_input};
use crate::config::GuardConfig;
use crate::errors::CliError;
use crate::output;

pub struct LintArgs {
    pub kind: PayloadKind,
    pub input: Option<String>,
    pub betas: Vec<String>,
    pub exact_betas: bool,
    pub json: bool,
}

pub fn run(args: LintArgs, config: &GuardConfig) -> Result<bool, CliError> {
    let bytes = read_input(args.input.as_deref())?;
    let document: Value = serde_json::from_slice(&bytes).map_err(CliError::InvalidJson)?;

    let tokens = beta_tokens(&args.betas);
    let linter = beta_linter(args.exact_betas || config.beta.exact);
    let report = ValidationReport {
        kind: args.kind,
        ruleset_version: RULESET_VERSION.to_string(),
        findings: linter.lint(args.kind, &document, &tokens),
    };
    let accepted = report.is_accepted();
    tracing::debug!(kind = %args.kind, tokens = tokens.len(), accepted, "beta tokens linted");

    if args.json {
        output::print_json(&output::ReportJson::new(&report, accepted))?;
    } else {
        output::print_report(&report, accepted);
    }
    Ok(accepted)
}
