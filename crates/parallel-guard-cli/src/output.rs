//! Output formatting utilities.

use parallel_guard_rules::{PayloadKind, Severity, ValidationFinding, ValidationReport};
use serde::Serialize;

use crate::errors::CliError;

/// JSON document printed by `validate --json` and `lint-betas --json`.
#[derive(Debug, Serialize)]
pub struct ReportJson<'a> {
    pub kind: PayloadKind,
    pub ruleset_version: &'a str,
    pub accepted: bool,
    pub errors: usize,
    pub warnings: usize,
    pub findings: &'a [ValidationFinding],
}

impl<'a> ReportJson<'a> {
    pub fn new(report: &'a ValidationReport, accepted: bool) -> Self {
        Self {
            kind: report.kind,
            ruleset_version: &report.ruleset_version,
            accepted,
            errors: report.error_count(),
            warnings: report.warning_count(),
            findings: &report.findings,
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).map_err(CliError::Render)?;
    println!("{rendered}");
    Ok(())
}

pub fn title(kind: PayloadKind) -> &'static str {
    match kind {
        PayloadKind::Search => "Parallel Search payload validation",
        PayloadKind::Extract => "Parallel Extract payload validation",
        PayloadKind::TaskRun => "Parallel Task run payload validation",
    }
}

/// Renders a finding as `ERROR  path: message` / `WARN   path: message`.
pub fn format_finding(finding: &ValidationFinding) -> String {
    let label = match finding.severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARN",
    };
    format!("{:<7}{}", label, finding)
}

/// Prints the text report: title, counts, errors, warnings, then `OK` when accepted.
pub fn print_report(report: &ValidationReport, accepted: bool) {
    println!("{}", title(report.kind));
    println!("errors={} warnings={}", report.error_count(), report.warning_count());
    for finding in report.errors().chain(report.warnings()) {
        println!("{}", format_finding(finding));
    }
    if accepted {
        println!("OK");
    }
}
