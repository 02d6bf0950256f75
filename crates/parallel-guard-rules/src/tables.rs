//! Bundled rule tables, one per payload kind.
//!
//! Caps and enumerations track the public API documentation snapshot named by
//! [`RULESET_VERSION`](crate::RULESET_VERSION). Rows are evaluated in order.

use std::ops::Bound;

use crate::formats::Format;
use crate::rules::{Limits, RuleKind, ValidationRule, ValueType};
use crate::schema::FORBIDDEN_KEYWORDS;

const SEARCH_MODES: &[&str] = &["one-shot", "agentic", "fast"];
const MAX_RESULTS: f64 = 20.0;
const MAX_QUERIES: usize = 5;
const MAX_OBJECTIVE_CHARS: usize = 5000;
const MAX_QUERY_CHARS: usize = 200;
const MAX_DOMAIN_ENTRIES: usize = 10;
const MIN_EXCERPT_CHARS: f64 = 1000.0;
const MIN_MAX_AGE_SECONDS: f64 = 600.0;

const KNOWN_PROCESSORS: &[&str] = &[
    "lite", "base", "core", "core2x", "pro", "ultra", "ultra2x", "ultra4x", "ultra8x",
    "base-fast", "core-fast", "pro-fast", "vision", "vision_pro", "deep", "deepv2", "fast",
    "nano",
];
const TASK_SPEC_MAX_BYTES: usize = 15_000;
const TASK_SPEC_WITH_INPUT_MAX_BYTES: usize = 18_000;
const METADATA_MAX_KEY_CHARS: usize = 16;
const METADATA_MAX_VALUE_CHARS: usize = 512;
const WEBHOOK_EVENT_TYPES: &[&str] = &["task_run.status"];
const MCP_SERVER_TYPES: &[&str] = &["url"];

const EXTRACT_FIELDS: &[&str] = &[
    "urls",
    "objective",
    "search_queries",
    "fetch_policy",
    "excerpts",
    "full_content",
];
const TASK_RUN_FIELDS: &[&str] = &[
    "processor",
    "metadata",
    "source_policy",
    "task_spec",
    "input",
    "previous_interaction_id",
    "mcp_servers",
    "enable_events",
    "webhook",
];
const TASK_SOURCE_POLICY_FIELDS: &[&str] = &["include_domains", "exclude_domains"];

fn at_least(min: f64) -> RuleKind {
    RuleKind::Range {
        min: Bound::Included(min),
        max: Bound::Unbounded,
    }
}

fn positive() -> RuleKind {
    RuleKind::Range {
        min: Bound::Excluded(0.0),
        max: Bound::Unbounded,
    }
}

/// Search API request rules.
pub fn search() -> Vec<ValidationRule> {
    let mut rules = vec![
        ValidationRule::error(
            "search.objective_or_queries",
            "$",
            RuleKind::MutualRequirement(&["objective", "search_queries"]),
        )
        .with_message("at least one of 'objective' or 'search_queries' is required"),
        ValidationRule::warning("search.processor.deprecated", "processor", RuleKind::Deprecated("$.mode")),
        ValidationRule::warning(
            "search.max_chars_per_result.deprecated",
            "max_chars_per_result",
            RuleKind::Deprecated("$.excerpts.max_chars_per_result"),
        ),
    ];
    rules.extend(query_rules("search", true));
    rules.extend([
        ValidationRule::error("search.mode.type", "mode", RuleKind::Type(ValueType::String)),
        ValidationRule::error("search.mode.enum", "mode", RuleKind::Enum(SEARCH_MODES)),
        ValidationRule::error("search.max_results.type", "max_results", RuleKind::Type(ValueType::Integer)),
        ValidationRule::warning(
            "search.max_results.range",
            "max_results",
            RuleKind::Range {
                min: Bound::Included(1.0),
                max: Bound::Included(MAX_RESULTS),
            },
        ),
        ValidationRule::error("search.excerpts.type", "excerpts", RuleKind::Type(ValueType::Object)),
    ]);
    rules.extend(excerpt_settings_rules("search"));
    rules.extend(source_policy_rules("search"));
    rules.extend([
        ValidationRule::error(
            "search.source_policy.after_date.type",
            "source_policy.after_date",
            RuleKind::Type(ValueType::String),
        ),
        ValidationRule::error(
            "search.source_policy.after_date.format",
            "source_policy.after_date",
            RuleKind::Format(Format::CalendarDate),
        ),
    ]);
    rules.extend(fetch_policy_rules("search"));
    rules
}

/// Extract API request rules.
pub fn extract() -> Vec<ValidationRule> {
    let mut rules = vec![
        ValidationRule::error("extract.urls.required", "urls", RuleKind::Required),
        ValidationRule::error("extract.urls.type", "urls", RuleKind::Type(ValueType::Array)),
        ValidationRule::error("extract.urls.non_empty", "urls", RuleKind::NonEmpty),
        ValidationRule::error("extract.urls.item.type", "urls[]", RuleKind::Type(ValueType::String)),
        ValidationRule::error("extract.urls.item.format", "urls[]", RuleKind::Format(Format::HttpUrl)),
        ValidationRule::warning("extract.urls.unique", "urls", RuleKind::Unique)
            .with_message("duplicate URL"),
    ];
    rules.extend(query_rules("extract", false));
    rules.extend(fetch_policy_rules("extract"));
    rules.push(ValidationRule::error(
        "extract.excerpts.type",
        "excerpts",
        RuleKind::Type(ValueType::BooleanOrObject),
    ));
    rules.extend(excerpt_settings_rules("extract"));
    rules.extend([
        ValidationRule::error(
            "extract.full_content.type",
            "full_content",
            RuleKind::Type(ValueType::BooleanOrObject),
        ),
        ValidationRule::error(
            "extract.full_content.max_chars_per_result.type",
            "full_content.max_chars_per_result",
            RuleKind::Type(ValueType::Integer),
        ),
        ValidationRule::error(
            "extract.full_content.max_chars_per_result.range",
            "full_content.max_chars_per_result",
            positive(),
        ),
        ValidationRule::error(
            "extract.content_requested",
            "$",
            RuleKind::MutualRequirement(&["excerpts", "full_content"]),
        )
        .with_message("no content requested: enable 'excerpts' or 'full_content'"),
        ValidationRule::warning(
            "extract.excerpts.focus",
            "$",
            RuleKind::ConditionalRequirement {
                when: "excerpts",
                then: &["objective", "search_queries"],
            },
        )
        .with_message(
            "excerpts requested without 'objective' or 'search_queries'; likely redundant with full content",
        ),
        ValidationRule::warning("extract.known_fields", "$", RuleKind::KnownFields(EXTRACT_FIELDS)),
    ]);
    rules
}

/// Task run creation rules.
pub fn task_run(limits: &Limits) -> Vec<ValidationRule> {
    let mut rules = vec![
        ValidationRule::error("task_run.processor.required", "processor", RuleKind::Required),
        ValidationRule::error("task_run.processor.type", "processor", RuleKind::Type(ValueType::String)),
        ValidationRule::error("task_run.processor.non_empty", "processor", RuleKind::NonEmpty),
        ValidationRule::warning("task_run.processor.known", "processor", RuleKind::Enum(KNOWN_PROCESSORS))
            .with_message("processor not in the known snapshot set; verify against the docs before shipping"),
        ValidationRule::error("task_run.input.required", "input", RuleKind::Required),
        ValidationRule::error("task_run.input.type", "input", RuleKind::Type(ValueType::StringOrObject)),
        ValidationRule::error("task_run.metadata.type", "metadata", RuleKind::Type(ValueType::Object)),
        ValidationRule::warning(
            "task_run.metadata.key_length",
            "metadata",
            RuleKind::MaxKeyLength(METADATA_MAX_KEY_CHARS),
        ),
        ValidationRule::error("task_run.metadata.value.type", "metadata{}", RuleKind::Type(ValueType::Scalar)),
        ValidationRule::warning(
            "task_run.metadata.value.length",
            "metadata{}",
            RuleKind::MaxLength(METADATA_MAX_VALUE_CHARS),
        ),
    ];
    rules.extend(source_policy_rules("task_run"));
    rules.extend([
        ValidationRule::warning(
            "task_run.source_policy.known_fields",
            "source_policy",
            RuleKind::KnownFields(TASK_SOURCE_POLICY_FIELDS),
        )
        .with_message("not supported by the Task source policy"),
        ValidationRule::error(
            "task_run.previous_interaction_id.type",
            "previous_interaction_id",
            RuleKind::Type(ValueType::String),
        ),
        ValidationRule::error("task_run.task_spec.type", "task_spec", RuleKind::Type(ValueType::StringOrObject)),
        ValidationRule::error("task_run.task_spec.output_schema.required", "task_spec.output_schema", RuleKind::Required),
    ]);
    for (slot, pattern) in [
        ("output_schema", "task_spec.output_schema"),
        ("input_schema", "task_spec.input_schema"),
    ] {
        rules.extend([
            ValidationRule::error(format!("task_run.{slot}.descriptor"), pattern, RuleKind::SchemaDescriptor),
            ValidationRule::error(
                format!("task_run.{slot}.forbidden_keyword"),
                pattern,
                RuleKind::ForbiddenKeyword(FORBIDDEN_KEYWORDS),
            ),
            ValidationRule::error(
                format!("task_run.{slot}.max_depth"),
                pattern,
                RuleKind::MaxDepth(limits.schema_max_depth),
            ),
            ValidationRule::error(
                format!("task_run.{slot}.max_properties"),
                pattern,
                RuleKind::MaxProperties(limits.schema_max_properties),
            ),
        ]);
    }
    rules.extend([
        ValidationRule::warning("task_run.output_schema.closed_objects", "task_spec.output_schema", RuleKind::ClosedObjects),
        ValidationRule::error(
            "task_run.task_spec.size",
            "task_spec",
            RuleKind::MaxSerializedSize {
                limit: TASK_SPEC_MAX_BYTES,
                plus: None,
            },
        ),
        ValidationRule::error(
            "task_run.task_spec.size_with_input",
            "task_spec",
            RuleKind::MaxSerializedSize {
                limit: TASK_SPEC_WITH_INPUT_MAX_BYTES,
                plus: Some("input"),
            },
        ),
        ValidationRule::error("task_run.enable_events.type", "enable_events", RuleKind::Type(ValueType::Boolean)),
        ValidationRule::error("task_run.mcp_servers.type", "mcp_servers", RuleKind::Type(ValueType::Array)),
        ValidationRule::error("task_run.mcp_servers.item.type", "mcp_servers[]", RuleKind::Type(ValueType::Object)),
        ValidationRule::error("task_run.mcp_servers.url.required", "mcp_servers[].url", RuleKind::Required),
        ValidationRule::error("task_run.mcp_servers.url.type", "mcp_servers[].url", RuleKind::Type(ValueType::String)),
        ValidationRule::error("task_run.mcp_servers.url.non_empty", "mcp_servers[].url", RuleKind::NonEmpty),
        ValidationRule::error("task_run.mcp_servers.name.required", "mcp_servers[].name", RuleKind::Required),
        ValidationRule::error("task_run.mcp_servers.name.type", "mcp_servers[].name", RuleKind::Type(ValueType::String)),
        ValidationRule::error("task_run.mcp_servers.name.non_empty", "mcp_servers[].name", RuleKind::NonEmpty),
        ValidationRule::warning("task_run.mcp_servers.type.enum", "mcp_servers[].type", RuleKind::Enum(MCP_SERVER_TYPES)),
        ValidationRule::error(
            "task_run.mcp_servers.headers.type",
            "mcp_servers[].headers",
            RuleKind::Type(ValueType::Object),
        ),
        ValidationRule::error(
            "task_run.mcp_servers.headers.value.type",
            "mcp_servers[].headers{}",
            RuleKind::Type(ValueType::String),
        ),
        ValidationRule::error(
            "task_run.mcp_servers.allowed_tools.type",
            "mcp_servers[].allowed_tools",
            RuleKind::Type(ValueType::Array),
        ),
        ValidationRule::error(
            "task_run.mcp_servers.allowed_tools.item.type",
            "mcp_servers[].allowed_tools[]",
            RuleKind::Type(ValueType::String),
        ),
        ValidationRule::error("task_run.webhook.type", "webhook", RuleKind::Type(ValueType::Object)),
        ValidationRule::error("task_run.webhook.url.required", "webhook.url", RuleKind::Required),
        ValidationRule::error("task_run.webhook.url.type", "webhook.url", RuleKind::Type(ValueType::String)),
        ValidationRule::error("task_run.webhook.url.non_empty", "webhook.url", RuleKind::NonEmpty),
        ValidationRule::error("task_run.webhook.url.format", "webhook.url", RuleKind::Format(Format::HttpUrl)),
        ValidationRule::error(
            "task_run.webhook.event_types.type",
            "webhook.event_types",
            RuleKind::Type(ValueType::Array),
        ),
        ValidationRule::error(
            "task_run.webhook.event_types.item.type",
            "webhook.event_types[]",
            RuleKind::Type(ValueType::String),
        ),
        ValidationRule::warning(
            "task_run.webhook.event_types.item.enum",
            "webhook.event_types[]",
            RuleKind::Enum(WEBHOOK_EVENT_TYPES),
        ),
        ValidationRule::warning("task_run.known_fields", "$", RuleKind::KnownFields(TASK_RUN_FIELDS)),
    ]);
    rules
}

/// `objective` / `search_queries` shape rules shared by Search and Extract.
fn query_rules(prefix: &str, with_caps: bool) -> Vec<ValidationRule> {
    let mut rules = vec![
        ValidationRule::error(format!("{prefix}.objective.type"), "objective", RuleKind::Type(ValueType::String)),
        ValidationRule::error(format!("{prefix}.objective.non_empty"), "objective", RuleKind::NonEmpty),
    ];
    if with_caps {
        rules.push(ValidationRule::warning(
            format!("{prefix}.objective.length"),
            "objective",
            RuleKind::MaxLength(MAX_OBJECTIVE_CHARS),
        ));
    }
    rules.extend([
        ValidationRule::error(
            format!("{prefix}.search_queries.type"),
            "search_queries",
            RuleKind::Type(ValueType::Array),
        ),
        ValidationRule::warning(format!("{prefix}.search_queries.non_empty"), "search_queries", RuleKind::NonEmpty)
            .with_message("empty array is usually not useful"),
    ]);
    if with_caps {
        rules.push(ValidationRule::warning(
            format!("{prefix}.search_queries.count"),
            "search_queries",
            RuleKind::MaxLength(MAX_QUERIES),
        ));
    }
    rules.extend([
        ValidationRule::error(
            format!("{prefix}.search_queries.item.type"),
            "search_queries[]",
            RuleKind::Type(ValueType::String),
        ),
        ValidationRule::error(
            format!("{prefix}.search_queries.item.non_empty"),
            "search_queries[]",
            RuleKind::NonEmpty,
        ),
    ]);
    if with_caps {
        rules.push(ValidationRule::warning(
            format!("{prefix}.search_queries.item.length"),
            "search_queries[]",
            RuleKind::MaxLength(MAX_QUERY_CHARS),
        ));
    }
    rules
}

fn excerpt_settings_rules(prefix: &str) -> Vec<ValidationRule> {
    let mut rules = Vec::new();
    for key in ["max_chars_per_result", "max_chars_total"] {
        let pattern = format!("excerpts.{key}");
        rules.extend([
            ValidationRule::error(format!("{prefix}.excerpts.{key}.type"), &pattern, RuleKind::Type(ValueType::Integer)),
            ValidationRule::error(format!("{prefix}.excerpts.{key}.range"), &pattern, positive()),
            ValidationRule::warning(format!("{prefix}.excerpts.{key}.clamped"), &pattern, at_least(MIN_EXCERPT_CHARS))
                .with_message("values below 1000 are auto-clamped by the API"),
        ]);
    }
    rules
}

fn source_policy_rules(prefix: &str) -> Vec<ValidationRule> {
    let mut rules = vec![ValidationRule::error(
        format!("{prefix}.source_policy.type"),
        "source_policy",
        RuleKind::Type(ValueType::Object),
    )];
    for key in ["include_domains", "exclude_domains"] {
        let list = format!("source_policy.{key}");
        let item = format!("source_policy.{key}[]");
        rules.extend([
            ValidationRule::error(format!("{prefix}.source_policy.{key}.type"), &list, RuleKind::Type(ValueType::Array)),
            ValidationRule::error(
                format!("{prefix}.source_policy.{key}.count"),
                &list,
                RuleKind::MaxLength(MAX_DOMAIN_ENTRIES),
            ),
            ValidationRule::error(
                format!("{prefix}.source_policy.{key}.item.type"),
                &item,
                RuleKind::Type(ValueType::String),
            ),
            ValidationRule::error(
                format!("{prefix}.source_policy.{key}.item.format"),
                &item,
                RuleKind::Format(Format::DomainSelector),
            ),
        ]);
    }
    rules
}

fn fetch_policy_rules(prefix: &str) -> Vec<ValidationRule> {
    vec![
        ValidationRule::error(format!("{prefix}.fetch_policy.type"), "fetch_policy", RuleKind::Type(ValueType::Object)),
        ValidationRule::error(
            format!("{prefix}.fetch_policy.max_age_seconds.type"),
            "fetch_policy.max_age_seconds",
            RuleKind::Type(ValueType::Integer),
        ),
        ValidationRule::warning(
            format!("{prefix}.fetch_policy.max_age_seconds.range"),
            "fetch_policy.max_age_seconds",
            at_least(MIN_MAX_AGE_SECONDS),
        )
        .with_message("documented minimum is 600 seconds (10 minutes)"),
        ValidationRule::error(
            format!("{prefix}.fetch_policy.timeout_seconds.type"),
            "fetch_policy.timeout_seconds",
            RuleKind::Type(ValueType::Number),
        ),
        ValidationRule::error(
            format!("{prefix}.fetch_policy.timeout_seconds.range"),
            "fetch_policy.timeout_seconds",
            positive(),
        ),
        ValidationRule::error(
            format!("{prefix}.fetch_policy.disable_cache_fallback.type"),
            "fetch_policy.disable_cache_fallback",
            RuleKind::Type(ValueType::Boolean),
        ),
    ]
}
