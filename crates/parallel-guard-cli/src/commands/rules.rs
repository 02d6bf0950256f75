//! Rules command implementation.

use parallel_guard_rules::{BetaHeaderLinter, PayloadKind, RuleBook};
use serde_json::json;

use crate::config::GuardConfig;
use crate::errors::CliError;
use crate::output;

pub fn run(kind: PayloadKind, json_output: bool, config: &GuardConfig) -> Result<bool, CliError> {
    let book = RuleBook::new(config.limits)?;
    let set = book.rule_set(kind);
    let gates: Vec<_> = BetaHeaderLinter::gates(kind).collect();

    if json_output {
        let rules: Vec<_> = set
            .rules()
            .iter()
            .map(|rule| {
                json!({
                    "id": rule.id,
                    "path": rule.path.as_str(),
                    "kind": rule.kind.to_string(),
                    "severity": rule.severity,
                })
            })
            .collect();
        let betas: Vec<_> = gates
            .iter()
            .map(|gate| {
                json!({
                    "feature": gate.feature,
                    "token": gate.token,
                    "prefix": gate.token.stable_prefix(),
                })
            })
            .collect();
        output::print_json(&json!({
            "kind": kind,
            "version": set.version(),
            "rules": rules,
            "betas": betas,
        }))?;
        return Ok(true);
    }

    println!("{} rules (version {})", kind, set.version());
    println!("{:<8} {:<52} {:<36} {}", "SEVERITY", "ID", "PATH", "CHECK");
    println!("{}", "-".repeat(120));
    for rule in set.rules() {
        println!(
            "{:<8} {:<52} {:<36} {}",
            rule.severity.to_string(),
            rule.id,
            rule.path.as_str(),
            rule.kind
        );
    }
    if !gates.is_empty() {
        println!();
        println!("{:<16} {}", "BETA FEATURE", "TOKEN");
        for gate in gates {
            println!("{:<16} {}", gate.feature, gate.token);
        }
    }
    Ok(true)
}
