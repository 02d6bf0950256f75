use parallel_guard_rules::{validate, PayloadKind, PayloadValidator, Severity, ValidationFinding};
use proptest::prelude::*;
use serde_json::json;

fn check(doc: serde_json::Value) -> Vec<ValidationFinding> {
    validate(PayloadKind::Search, doc.to_string().as_bytes())
}

fn rule_ids(findings: &[ValidationFinding]) -> Vec<&str> {
    findings.iter().map(|f| f.rule_id.as_str()).collect()
}

#[test]
fn objective_alone_is_accepted() {
    let findings = check(json!({"objective": "recent SEC filings about lithium supply"}));
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn empty_request_needs_objective_or_queries() {
    let findings = check(json!({}));
    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.rule_id, "search.objective_or_queries");
    assert_eq!(finding.path.to_string(), "$");
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(
        finding.message,
        "at least one of 'objective' or 'search_queries' is required"
    );
}

#[test]
fn blank_objective_and_empty_queries_do_not_count() {
    let findings = check(json!({"objective": "   ", "search_queries": []}));
    let ids = rule_ids(&findings);
    assert_eq!(ids[0], "search.objective_or_queries");
    assert!(ids.contains(&"search.objective.non_empty"));
    assert!(ids.contains(&"search.search_queries.non_empty"));
}

#[test]
fn queries_alone_are_accepted() {
    let findings = check(json!({"search_queries": ["lithium", "supply chain"]}));
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn max_results_out_of_range_is_a_warning() {
    for value in [0, 25] {
        let findings = check(json!({"objective": "x", "max_results": value}));
        assert_eq!(rule_ids(&findings), vec!["search.max_results.range"]);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].path.to_string(), "$.max_results");
    }
    assert!(check(json!({"objective": "x", "max_results": 20})).is_empty());
}

#[test]
fn too_many_excluded_domains_is_an_error() {
    let domains: Vec<String> = (0..11).map(|i| format!("site{i}.com")).collect();
    let findings = check(json!({
        "objective": "x",
        "source_policy": {"exclude_domains": domains}
    }));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "search.source_policy.exclude_domains.count");
    assert_eq!(findings[0].path.to_string(), "$.source_policy.exclude_domains");
    assert_eq!(findings[0].message, "11 entries exceeds the maximum of 10");
    assert!(findings[0].is_error());

    let domains: Vec<String> = (0..10).map(|i| format!("site{i}.com")).collect();
    let findings = check(json!({
        "objective": "x",
        "source_policy": {"exclude_domains": domains}
    }));
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn domain_entries_must_be_bare_domains() {
    let findings = check(json!({
        "objective": "x",
        "source_policy": {"include_domains": ["sec.gov", "https://nytimes.com/world", ".edu"]}
    }));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "search.source_policy.include_domains.item.format");
    assert_eq!(findings[0].path.to_string(), "$.source_policy.include_domains[1]");
    assert!(findings[0].message.contains("scheme and path"));
}

#[test]
fn unknown_mode_is_rejected() {
    let findings = check(json!({"objective": "x", "mode": "turbo"}));
    assert_eq!(rule_ids(&findings), vec!["search.mode.enum"]);
    assert!(findings[0].message.contains("one-shot"));
}

#[test]
fn deprecated_fields_warn() {
    let findings = check(json!({"objective": "x", "processor": "base", "max_chars_per_result": 1500}));
    assert_eq!(
        rule_ids(&findings),
        vec!["search.processor.deprecated", "search.max_chars_per_result.deprecated"]
    );
    assert!(findings.iter().all(|f| f.severity == Severity::Warning));
}

#[test]
fn small_excerpt_budget_is_clamped() {
    let findings = check(json!({"objective": "x", "excerpts": {"max_chars_per_result": 500}}));
    assert_eq!(rule_ids(&findings), vec!["search.excerpts.max_chars_per_result.clamped"]);
}

#[test]
fn after_date_must_be_a_real_date() {
    let findings = check(json!({"objective": "x", "source_policy": {"after_date": "2025-02-30"}}));
    assert_eq!(rule_ids(&findings), vec!["search.source_policy.after_date.format"]);
}

#[test]
fn short_fetch_policy_max_age_warns() {
    let findings = check(json!({"objective": "x", "fetch_policy": {"max_age_seconds": 60}}));
    assert_eq!(rule_ids(&findings), vec!["search.fetch_policy.max_age_seconds.range"]);
    assert_eq!(findings[0].message, "documented minimum is 600 seconds (10 minutes)");
}

#[test]
fn malformed_and_non_object_documents() {
    let findings = validate(PayloadKind::Search, b"{not json");
    assert_eq!(rule_ids(&findings), vec!["document.malformed"]);
    assert!(findings[0].is_error());

    let findings = validate(PayloadKind::Search, b"[1, 2]");
    assert_eq!(rule_ids(&findings), vec!["document.not_object"]);
}

#[test]
fn reports_from_bytes_and_values_agree() {
    let validator = PayloadValidator::standard();
    let doc = json!({"objective": "x", "max_results": 50});
    let from_bytes = validator.report(PayloadKind::Search, doc.to_string().as_bytes());
    let from_value = validator.report_value(PayloadKind::Search, &doc);
    assert_eq!(rule_ids(&from_bytes.findings), rule_ids(&from_value.findings));
    assert_eq!(from_value.ruleset_version, from_bytes.ruleset_version);
    assert!(from_value.is_accepted());
    assert_eq!(from_value.warning_count(), 1);

    let broken = validator.report(PayloadKind::Search, b"{\"objective\": ");
    assert_eq!(broken.error_count(), 1);
    assert!(!broken.is_accepted());
}

#[test]
fn finding_serializes_with_rendered_path() {
    let findings = check(json!({"objective": "x", "mode": 3}));
    let value = serde_json::to_value(&findings[0]).unwrap();
    assert_eq!(
        value,
        json!({
            "rule_id": "search.mode.type",
            "path": "$.mode",
            "message": "must be a string",
            "severity": "error"
        })
    );
}

proptest! {
    #[test]
    fn any_plain_objective_is_accepted(objective in "[a-z][a-z ]{0,63}") {
        let findings = check(json!({"objective": objective}));
        prop_assert!(findings.is_empty());
    }

    #[test]
    fn validation_is_deterministic(objective in ".{0,32}", max_results in -5i64..40) {
        let doc = json!({"objective": objective, "max_results": max_results});
        prop_assert_eq!(check(doc.clone()), check(doc));
    }
}
