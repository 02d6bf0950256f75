use parallel_guard_rules::{
    validate_value, Limits, PayloadKind, PayloadValidator, RuleBook, RulesError, Severity,
    ValidationFinding,
};
use serde_json::{json, Map, Value};

fn check(doc: Value) -> Vec<ValidationFinding> {
    validate_value(PayloadKind::TaskRun, &doc)
}

fn rule_ids(findings: &[ValidationFinding]) -> Vec<&str> {
    findings.iter().map(|f| f.rule_id.as_str()).collect()
}

fn errors(findings: &[ValidationFinding]) -> Vec<&ValidationFinding> {
    findings.iter().filter(|f| f.is_error()).collect()
}

fn closed(properties: Value) -> Value {
    json!({"type": "object", "properties": properties, "additionalProperties": false})
}

fn nested(levels: usize) -> Value {
    let mut node = json!({"type": "string"});
    for level in (0..levels).rev() {
        let mut properties = Map::new();
        properties.insert(format!("l{level}"), node);
        node = closed(Value::Object(properties));
    }
    node
}

#[test]
fn minimal_run_is_accepted() {
    let findings = check(json!({"processor": "base", "input": "What is the capital of France?"}));
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn processor_and_input_are_required() {
    let findings = check(json!({}));
    assert_eq!(
        rule_ids(&findings),
        vec!["task_run.processor.required", "task_run.input.required"]
    );
    assert_eq!(findings[0].path.to_string(), "$.processor");
    assert_eq!(findings[1].path.to_string(), "$.input");
}

#[test]
fn blank_processor_is_rejected() {
    let findings = check(json!({"processor": " ", "input": "q"}));
    let ids: Vec<&str> = errors(&findings).iter().map(|f| f.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["task_run.processor.non_empty"]);
}

#[test]
fn unknown_processor_only_warns() {
    let findings = check(json!({"processor": "mega", "input": "q"}));
    assert_eq!(rule_ids(&findings), vec!["task_run.processor.known"]);
    assert_eq!(findings[0].severity, Severity::Warning);
}

#[test]
fn structured_input_is_accepted() {
    let findings = check(json!({"processor": "core", "input": {"company": "Acme", "year": 2024}}));
    assert!(findings.is_empty(), "{findings:?}");

    let findings = check(json!({"processor": "core", "input": 42}));
    assert_eq!(rule_ids(&findings), vec!["task_run.input.type"]);
}

#[test]
fn task_spec_requires_output_schema() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"input_schema": "a company name"}
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.task_spec.output_schema.required"]);
    assert_eq!(findings[0].path.to_string(), "$.task_spec.output_schema");
}

#[test]
fn text_output_schema_is_accepted() {
    for schema in [json!("the founding year"), json!({"type": "text", "description": "a summary"}), json!({"type": "auto"})] {
        let findings = check(json!({
            "processor": "base",
            "input": "q",
            "task_spec": {"output_schema": schema}
        }));
        assert!(findings.is_empty(), "{findings:?}");
    }
}

#[test]
fn forbidden_keywords_are_reported_per_path() {
    let findings = check(json!({
        "processor": "base",
        "input": {"x": "a"},
        "task_spec": {
            "output_schema": "answer",
            "input_schema": {
                "type": "json",
                "json_schema": closed(json!({
                    "x": {"anyOf": [{"type": "string"}, {"type": "integer"}]},
                    "y": {"type": "string", "not": {"const": ""}}
                }))
            }
        }
    }));
    assert_eq!(
        rule_ids(&findings),
        vec!["task_run.input_schema.forbidden_keyword", "task_run.input_schema.forbidden_keyword"]
    );
    assert_eq!(
        findings[0].path.to_string(),
        "$.task_spec.input_schema.json_schema.properties.x.anyOf"
    );
    assert_eq!(
        findings[1].path.to_string(),
        "$.task_spec.input_schema.json_schema.properties.y.not"
    );
    assert!(findings[0].message.contains("'anyOf'"));
}

#[test]
fn forbidden_keyword_under_array_items_is_located() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {
            "output_schema": "answer",
            "input_schema": {
                "type": "array",
                "items": {"type": "object", "properties": {"z": {"allOf": [{"type": "string"}]}}}
            }
        }
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.input_schema.forbidden_keyword"]);
    assert_eq!(
        findings[0].path.to_string(),
        "$.task_spec.input_schema.items.properties.z.allOf"
    );
}

#[test]
fn forbidden_keyword_under_contains_is_located() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {
            "output_schema": "answer",
            "input_schema": {"type": "array", "contains": {"anyOf": [{"type": "string"}]}}
        }
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.input_schema.forbidden_keyword"]);
    assert_eq!(
        findings[0].path.to_string(),
        "$.task_spec.input_schema.contains.anyOf"
    );
}

#[test]
fn keywords_nested_under_forbidden_keywords_are_named() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {
            "output_schema": "answer",
            "input_schema": {
                "type": "object",
                "oneOf": [{"properties": {"a": {"anyOf": [{"type": "string"}]}}}],
                "propertyNames": {"not": {"const": "anyOf"}}
            }
        }
    }));
    let paths: Vec<String> = findings.iter().map(|f| f.path.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "$.task_spec.input_schema.oneOf",
            "$.task_spec.input_schema.oneOf[0].properties.a.anyOf",
            "$.task_spec.input_schema.propertyNames.not",
        ]
    );
    assert!(findings
        .iter()
        .all(|f| f.rule_id == "task_run.input_schema.forbidden_keyword"));
}

#[test]
fn property_named_like_a_keyword_is_fine() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {
            "output_schema": {
                "type": "json",
                "json_schema": closed(json!({"not": {"type": "string"}, "if": {"type": "boolean"}}))
            }
        }
    }));
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn forbidden_keywords_in_output_schema_are_errors_too() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {
            "output_schema": {
                "type": "json",
                "json_schema": {
                    "type": "object",
                    "properties": {"a": {"type": "string"}},
                    "additionalProperties": false,
                    "oneOf": [{"required": ["a"]}]
                }
            }
        }
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.output_schema.forbidden_keyword"]);
    assert_eq!(findings[0].path.to_string(), "$.task_spec.output_schema.json_schema.oneOf");
}

#[test]
fn depth_cap_reports_first_offending_node() {
    let within = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": {"type": "json", "json_schema": nested(4)}}
    }));
    assert!(within.is_empty(), "{within:?}");

    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": {"type": "json", "json_schema": nested(5)}}
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.output_schema.max_depth"]);
    assert_eq!(
        findings[0].path.to_string(),
        "$.task_spec.output_schema.json_schema.properties.l0.properties.l1.properties.l2.properties.l3.properties.l4"
    );
    assert_eq!(findings[0].message, "schema nesting depth 6 exceeds the maximum of 5");
}

#[test]
fn property_cap_reports_once() {
    let mut properties = Map::new();
    for idx in 0..101 {
        properties.insert(format!("p{idx}"), json!({"type": "string"}));
    }
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": {"type": "json", "json_schema": closed(Value::Object(properties))}}
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.output_schema.max_properties"]);
    assert_eq!(
        findings[0].path.to_string(),
        "$.task_spec.output_schema.json_schema.properties"
    );
}

#[test]
fn custom_limits_tighten_caps() {
    let book = RuleBook::new(Limits {
        schema_max_depth: 2,
        schema_max_properties: 100,
    })
    .unwrap();
    let validator = PayloadValidator::new(book);
    let doc = json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": {"type": "json", "json_schema": nested(2)}}
    });
    let findings = validator.validate_value(PayloadKind::TaskRun, &doc);
    assert_eq!(rule_ids(&findings), vec!["task_run.output_schema.max_depth"]);
}

#[test]
fn zero_limits_are_rejected() {
    let err = RuleBook::new(Limits {
        schema_max_depth: 0,
        schema_max_properties: 100,
    })
    .unwrap_err();
    assert!(matches!(err, RulesError::OutOfBounds { field: "schema_max_depth", .. }));
}

#[test]
fn open_output_objects_warn() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {
            "output_schema": {
                "type": "json",
                "json_schema": {"type": "object", "properties": {"a": {"type": "string"}}}
            }
        }
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.output_schema.closed_objects"]);
    assert_eq!(findings[0].severity, Severity::Warning);
}

#[test]
fn malformed_schema_wrapper_is_an_error() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": {"type": "json"}}
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.output_schema.descriptor"]);

    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": {"type": "yaml", "schema": "x"}}
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.output_schema.descriptor"]);
    assert_eq!(findings[0].path.to_string(), "$.task_spec.output_schema.type");
}

#[test]
fn oversized_task_spec_is_rejected() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": "x".repeat(15_001)}
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.task_spec.size"]);
    assert!(findings[0].message.contains("15000"));
}

#[test]
fn non_ascii_task_spec_is_sized_by_its_escapes() {
    let within = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": "\u{e9}".repeat(2_400)}
    }));
    assert!(within.is_empty(), "{within:?}");

    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": "\u{e9}".repeat(2_600)}
    }));
    assert_eq!(rule_ids(&findings), vec!["task_run.task_spec.size"]);

    let astral = check(json!({
        "processor": "base",
        "input": "q",
        "task_spec": {"output_schema": "\u{1f600}".repeat(1_300)}
    }));
    assert_eq!(rule_ids(&astral), vec!["task_run.task_spec.size"]);
}

#[test]
fn beta_features_do_not_fail_validation() {
    let findings = check(json!({
        "processor": "ultra",
        "input": "q",
        "enable_events": true,
        "mcp_servers": [{"type": "url", "url": "https://mcp.example.com", "name": "docs"}],
        "webhook": {"url": "https://hooks.example.com/parallel", "event_types": ["task_run.status"]}
    }));
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn webhook_and_mcp_shapes_are_checked() {
    let findings = check(json!({
        "processor": "ultra",
        "input": "q",
        "mcp_servers": [{"url": "https://mcp.example.com"}],
        "webhook": {"event_types": ["task_run.done"]}
    }));
    assert_eq!(
        rule_ids(&findings),
        vec![
            "task_run.mcp_servers.name.required",
            "task_run.webhook.url.required",
            "task_run.webhook.event_types.item.enum",
        ]
    );
    assert_eq!(findings[0].path.to_string(), "$.mcp_servers[0].name");
}

#[test]
fn metadata_limits() {
    let findings = check(json!({
        "processor": "base",
        "input": "q",
        "metadata": {"a_very_long_metadata_key": "v", "nested": {"x": 1}}
    }));
    assert_eq!(
        rule_ids(&findings),
        vec!["task_run.metadata.key_length", "task_run.metadata.value.type"]
    );
    assert_eq!(findings[0].path.to_string(), "$.metadata.a_very_long_metadata_key");
    assert_eq!(findings[1].path.to_string(), "$.metadata.nested");
}
