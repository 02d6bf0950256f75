use parallel_guard_rules::{validate_value, PayloadKind, Severity, ValidationFinding};
use serde_json::{json, Value};

fn check(doc: Value) -> Vec<ValidationFinding> {
    validate_value(PayloadKind::Extract, &doc)
}

fn rule_ids(findings: &[ValidationFinding]) -> Vec<&str> {
    findings.iter().map(|f| f.rule_id.as_str()).collect()
}

#[test]
fn focused_excerpt_request_is_accepted() {
    let findings = check(json!({
        "urls": ["https://www.example.com/report"],
        "objective": "quarterly revenue",
        "excerpts": true
    }));
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn full_content_settings_object_counts_as_requested() {
    let findings = check(json!({
        "urls": ["https://www.example.com"],
        "full_content": {"max_chars_per_result": 20000}
    }));
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn content_must_be_requested() {
    for doc in [
        json!({"urls": ["https://example.com"]}),
        json!({"urls": ["https://example.com"], "excerpts": false, "full_content": false}),
    ] {
        let findings = check(doc);
        assert_eq!(rule_ids(&findings), vec!["extract.content_requested"]);
        assert_eq!(findings[0].path.to_string(), "$");
        assert_eq!(
            findings[0].message,
            "no content requested: enable 'excerpts' or 'full_content'"
        );
    }
}

#[test]
fn urls_are_required_and_non_empty() {
    let findings = check(json!({"full_content": true}));
    assert_eq!(rule_ids(&findings), vec!["extract.urls.required"]);
    assert_eq!(findings[0].path.to_string(), "$.urls");
    assert_eq!(findings[0].message, "is required");

    let findings = check(json!({"urls": [], "full_content": true}));
    assert_eq!(rule_ids(&findings), vec!["extract.urls.non_empty"]);

    let findings = check(json!({"urls": null, "full_content": true}));
    assert_eq!(rule_ids(&findings), vec!["extract.urls.required"]);
}

#[test]
fn url_entries_must_be_absolute_http() {
    let findings = check(json!({
        "urls": ["https://ok.example.com", "example.com", 7],
        "full_content": true
    }));
    assert_eq!(
        rule_ids(&findings),
        vec!["extract.urls.item.type", "extract.urls.item.format"]
    );
    assert_eq!(findings[0].path.to_string(), "$.urls[2]");
    assert_eq!(findings[1].path.to_string(), "$.urls[1]");
}

#[test]
fn duplicate_urls_warn_at_the_repeat() {
    let findings = check(json!({
        "urls": ["https://a.example.com", "https://a.example.com"],
        "full_content": true
    }));
    assert_eq!(rule_ids(&findings), vec!["extract.urls.unique"]);
    assert_eq!(findings[0].path.to_string(), "$.urls[1]");
    assert_eq!(findings[0].message, "duplicate URL");
    assert_eq!(findings[0].severity, Severity::Warning);
}

#[test]
fn unfocused_excerpts_warn() {
    let findings = check(json!({"urls": ["https://example.com"], "excerpts": true}));
    assert_eq!(rule_ids(&findings), vec!["extract.excerpts.focus"]);
    assert_eq!(findings[0].path.to_string(), "$.excerpts");
    assert_eq!(findings[0].severity, Severity::Warning);
}

#[test]
fn unknown_fields_warn() {
    let findings = check(json!({
        "urls": ["https://example.com"],
        "full_content": true,
        "max_results": 3
    }));
    assert_eq!(rule_ids(&findings), vec!["extract.known_fields"]);
    assert_eq!(findings[0].path.to_string(), "$.max_results");
}

#[test]
fn content_toggles_must_be_boolean_or_object() {
    let findings = check(json!({"urls": ["https://example.com"], "full_content": "yes"}));
    assert_eq!(rule_ids(&findings), vec!["extract.full_content.type"]);
    assert_eq!(findings[0].message, "must be a boolean or object");
}

#[test]
fn full_content_budget_must_be_positive() {
    let findings = check(json!({
        "urls": ["https://example.com"],
        "full_content": {"max_chars_per_result": 0}
    }));
    assert_eq!(rule_ids(&findings), vec!["extract.full_content.max_chars_per_result.range"]);
    assert!(findings[0].message.contains("> 0"));
}
