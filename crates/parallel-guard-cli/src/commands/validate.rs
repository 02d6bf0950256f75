//! Validate command implementation.

use parallel_guard_rules::{PayloadKind, PayloadValidator, RuleBook};
use serde_json::Value;

use super::{beta_linter, beta_tokens, read_input};
use crate::config::GuardConfig;
use crate::errors::CliError;
use crate::output;

pub struct ValidateArgs {
    pub kind: PayloadKind,
    pub input: Option<String>,
    pub betas: Vec<String>,
    pub exact_betas: bool,
    pub strict: bool,
    pub json: bool,
}

pub fn run(args: ValidateArgs, config: &GuardConfig) -> Result<bool, CliError> {
    let bytes = read_input(args.input.as_deref())?;
    let document: Value = serde_json::from_slice(&bytes).map_err(CliError::InvalidJson)?;
    let validator = PayloadValidator::new(RuleBook::new(config.limits)?);
    let mut report = validator.report_value(args.kind, &document);

    let tokens = beta_tokens(&args.betas);
    let linter = beta_linter(args.exact_betas || config.beta.exact);
    report.findings.extend(linter.lint(args.kind, &document, &tokens));

    let accepted = report.is_accepted() && !(args.strict && report.warning_count() > 0);
    tracing::info!(
        kind = %args.kind,
        errors = report.error_count(),
        warnings = report.warning_count(),
        strict = args.strict,
        accepted,
        "payload validated"
    );

    if args.json {
        output::print_json(&output::ReportJson::new(&report, accepted))?;
    } else {
        output::print_report(&report, accepted);
    }
    Ok(accepted)
}
