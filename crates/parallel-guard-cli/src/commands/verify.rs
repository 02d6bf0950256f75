//! Verify command implementation.

use parallel_guard_webhook::{inspect, parse_signature_header, VerificationReport};
use serde::Serialize;

use super::read_input;
use crate::config::GuardConfig;
use crate::errors::CliError;
use crate::output;

pub struct VerifyArgs {
    pub secret: String,
    pub webhook_id: String,
    pub timestamp: String,
    pub signatures: Vec<String>,
    pub body_file: Option<String>,
    pub tolerance_seconds: Option<u64>,
    pub now: Option<i64>,
    pub json: bool,
}

#[derive(Serialize)]
struct VerifyJson {
    valid: bool,
    #[serde(flatten)]
    report: VerificationReport,
}

pub fn run(args: VerifyArgs, config: &GuardConfig) -> Result<bool, CliError> {
    let body = read_input(args.body_file.as_deref())?;
    let tolerance = args.tolerance_seconds.unwrap_or(config.webhook.tolerance_seconds);
    let now = args.now.unwrap_or_else(|| chrono::Utc::now().timestamp());

    let report = inspect(
        args.secret.as_bytes(),
        &args.webhook_id,
        &args.timestamp,
        Some(body.as_slice()),
        &candidates(&args.signatures),
        now,
        tolerance,
    );
    let valid = report.result.is_valid();
    tracing::info!(verdict = %report.result, tolerance, "webhook signature checked");

    if args.json {
        output::print_json(&VerifyJson { valid, report })?;
    } else {
        println!("{}", report.result);
        println!("matched_signature={}", report.matched_signature);
        println!("within_tolerance={}", report.within_tolerance);
        println!("age_seconds={}", report.age_seconds);
        println!("candidate_count={}", report.candidate_count);
    }
    Ok(valid)
}

/// Parses each `--signature` value as a header; values that yield no
/// digest are passed through so they count as mismatches.
fn candidates(values: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for value in values {
        let parsed = parse_signature_header(value);
        let parsed = if parsed.is_empty() { vec![value.clone()] } else { parsed };
        for candidate in parsed {
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
    }
    out
}
