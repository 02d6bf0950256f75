//! The payload validator: applies a [`RuleSet`](crate::RuleSet) to a document.

use serde_json::Value;
use std::collections::BTreeSet;
use std::ops::Bound;
use std::sync::LazyLock;

use crate::finding::{Severity, ValidationFinding, ValidationReport};
use crate::kind::PayloadKind;
use crate::path::{FieldPath, Target};
use crate::rules::{describe_bounds, RuleBook, RuleKind, ValidationRule};
use crate::schema::{self, SchemaBody};

/// Rule id of the finding emitted for unparseable input.
pub const MALFORMED_RULE_ID: &str = "document.malformed";
/// Rule id of the finding emitted when the root is not an object.
pub const NOT_OBJECT_RULE_ID: &str = "document.not_object";

static STANDARD: LazyLock<PayloadValidator> =
    LazyLock::new(|| PayloadValidator::new(RuleBook::default()));

/// Validates `document` (raw JSON bytes) with the bundled rule tables.
pub fn validate(kind: PayloadKind, document: &[u8]) -> Vec<ValidationFinding> {
    PayloadValidator::standard().validate(kind, document)
}

/// Validates an already-parsed document with the bundled rule tables.
pub fn validate_value(kind: PayloadKind, document: &Value) -> Vec<ValidationFinding> {
    PayloadValidator::standard().validate_value(kind, document)
}

/// Applies a [`RuleBook`] to request documents.
#[derive(Debug, Clone)]
pub struct PayloadValidator {
    book: RuleBook,
}

impl PayloadValidator {
    /// Creates a validator over the given rule book.
    pub fn new(book: RuleBook) -> Self {
        Self { book }
    }

    /// Process-wide validator with default limits.
    pub fn standard() -> &'static PayloadValidator {
        &STANDARD
    }

    /// The rule book in use.
    pub fn book(&self) -> &RuleBook {
        &self.book
    }

    /// Validates raw JSON bytes. Unparseable input yields one malformed finding.
    pub fn validate(&self, kind: PayloadKind, document: &[u8]) -> Vec<ValidationFinding> {
        match serde_json::from_slice::<Value>(document) {
            Ok(value) => self.validate_value(kind, &value),
            Err(err) => vec![ValidationFinding::new(
                MALFORMED_RULE_ID,
                FieldPath::root(),
                format!("document is not valid JSON: {err}"),
                Severity::Error,
            )],
        }
    }

    /// Validates a parsed document, evaluating every rule.
    pub fn validate_value(&self, kind: PayloadKind, document: &Value) -> Vec<ValidationFinding> {
        if !document.is_object() {
            return vec![ValidationFinding::new(
                NOT_OBJECT_RULE_ID,
                FieldPath::root(),
                "payload must be a JSON object",
                Severity::Error,
            )];
        }
        let mut findings = Vec::new();
        for rule in self.book.rule_set(kind).rules() {
            for target in rule.path.select(document) {
                evaluate(rule, &target, document, &mut findings);
            }
        }
        findings
    }

    /// Validates raw JSON bytes and wraps the findings in a report.
    pub fn report(&self, kind: PayloadKind, document: &[u8]) -> ValidationReport {
        self.wrap(kind, self.validate(kind, document))
    }

    /// Validates a parsed document and wraps the findings in a report.
    pub fn report_value(&self, kind: PayloadKind, document: &Value) -> ValidationReport {
        self.wrap(kind, self.validate_value(kind, document))
    }

    fn wrap(&self, kind: PayloadKind, findings: Vec<ValidationFinding>) -> ValidationReport {
        ValidationReport {
            kind,
            ruleset_version: self.book.rule_set(kind).version().to_string(),
            findings,
        }
    }
}

/// Truthiness used by mutual and conditional requirements.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) | Some(Value::Number(_)) => true,
    }
}

fn evaluate(rule: &ValidationRule, target: &Target<'_>, document: &Value, out: &mut Vec<ValidationFinding>) {
    let mut emit = |path: FieldPath, generated: String| {
        let message = rule.message.map(str::to_string).unwrap_or(generated);
        out.push(ValidationFinding::new(rule.id.clone(), path, message, rule.severity));
    };

    let value = match (&rule.kind, target.value) {
        (RuleKind::Required, None) => {
            emit(target.path.clone(), "is required".to_string());
            return;
        }
        (_, None) => return,
        (_, Some(value)) => value,
    };

    match &rule.kind {
        RuleKind::Required => {}
        RuleKind::Type(ty) => {
            if !ty.matches(value) {
                emit(target.path.clone(), format!("must be {}", ty.describe()));
            }
        }
        RuleKind::NonEmpty => {
            let empty = match value {
                Value::String(s) => s.trim().is_empty(),
                Value::Array(items) => items.is_empty(),
                _ => false,
            };
            if empty {
                emit(target.path.clone(), "must not be empty".to_string());
            }
        }
        RuleKind::Enum(allowed) => {
            if let Value::String(s) = value {
                if !allowed.contains(&s.as_str()) {
                    emit(target.path.clone(), format!("must be one of [{}]", allowed.join(", ")));
                }
            }
        }
        RuleKind::Range { min, max } => {
            if let Some(number) = value.as_f64() {
                if !within(number, *min, *max) {
                    emit(target.path.clone(), format!("{} is outside the allowed range ({})", value, describe_bounds(*min, *max)));
                }
            }
        }
        RuleKind::MaxLength(cap) => {
            let measured = match value {
                Value::String(s) => Some((s.chars().count(), "chars")),
                Value::Array(items) => Some((items.len(), "entries")),
                Value::Number(n) => Some((n.to_string().chars().count(), "chars")),
                Value::Bool(b) => Some((b.to_string().len(), "chars")),
                _ => None,
            };
            if let Some((len, unit)) = measured {
                if len > *cap {
                    emit(target.path.clone(), format!("{len} {unit} exceeds the maximum of {cap}"));
                }
            }
        }
        RuleKind::MaxKeyLength(cap) => {
            if let Value::Object(map) = value {
                for key in map.keys().filter(|k| k.chars().count() > *cap) {
                    emit(target.path.push_field(key), format!("key length exceeds {cap} characters"));
                }
            }
        }
        RuleKind::MaxDepth(cap) => {
            if let SchemaBody::Json { node, path } = schema::resolve(value, &target.path) {
                let mut first = None;
                schema::walk(node, &path, &mut |visited| {
                    if first.is_none() && visited.depth > *cap {
                        first = Some((visited.path.clone(), visited.depth));
                    }
                });
                if let Some((path, depth)) = first {
                    emit(path, format!("schema nesting depth {depth} exceeds the maximum of {cap}"));
                }
            }
        }
        RuleKind::MaxProperties(cap) => {
            if let SchemaBody::Json { node, path } = schema::resolve(value, &target.path) {
                let mut total = 0usize;
                let mut first = None;
                schema::walk(node, &path, &mut |visited| {
                    total += schema::property_count(visited.node);
                    if first.is_none() && total > *cap {
                        first = Some(visited.path.push_field("properties"));
                    }
                });
                if let Some(path) = first {
                    emit(path, format!("total schema properties exceed the maximum of {cap}"));
                }
            }
        }
        RuleKind::MutualRequirement(keys) => {
            if let Value::Object(map) = value {
                if !keys.iter().any(|key| is_truthy(map.get(*key))) {
                    emit(target.path.clone(), format!("at least one of {} is required", quoted(keys)));
                }
            }
        }
        RuleKind::ConditionalRequirement { when, then } => {
            if let Value::Object(map) = value {
                let satisfied = then.iter().any(|key| map.get(*key).is_some_and(|v| !v.is_null()));
                if is_truthy(map.get(*when)) && !satisfied {
                    emit(
                        target.path.push_field(when),
                        format!("'{when}' requires at least one of {}", quoted(then)),
                    );
                }
            }
        }
        RuleKind::ForbiddenKeyword(keywords) => {
            if let SchemaBody::Json { node, path } = schema::resolve(value, &target.path) {
                for (path, keyword) in schema::find_keywords(node, &path, keywords) {
                    emit(path, format!("uses unsupported JSON Schema keyword '{keyword}'"));
                }
            }
        }
        RuleKind::Format(format) => {
            if let Value::String(s) = value {
                if let Some(violation) = format.check(s) {
                    emit(target.path.clone(), violation);
                }
            }
        }
        RuleKind::Unique => {
            if let Value::Array(items) = value {
                let mut seen = BTreeSet::new();
                for (idx, item) in items.iter().enumerate() {
                    if !seen.insert(item.to_string()) {
                        emit(target.path.push_index(idx), "duplicate entry".to_string());
                    }
                }
            }
        }
        RuleKind::Deprecated(replacement) => {
            emit(target.path.clone(), format!("deprecated; prefer {replacement}"));
        }
        RuleKind::KnownFields(known) => {
            if let Value::Object(map) = value {
                for key in map.keys().filter(|k| !known.contains(&k.as_str())) {
                    emit(target.path.push_field(key), "unknown field for the current request snapshot".to_string());
                }
            }
        }
        RuleKind::SchemaDescriptor => {
            if let SchemaBody::Invalid { path, reason } = schema::resolve(value, &target.path) {
                emit(path, reason);
            }
        }
        RuleKind::ClosedObjects => {
            if let SchemaBody::Json { node, path } = schema::resolve(value, &target.path) {
                let mut open = Vec::new();
                schema::walk(node, &path, &mut |visited| {
                    let closed = visited.node.get("additionalProperties") == Some(&Value::Bool(false));
                    if schema::is_object_node(visited.node) && !closed {
                        open.push(visited.path.clone());
                    }
                });
                for path in open {
                    emit(path, "set additionalProperties to false for more stable outputs".to_string());
                }
            }
        }
        RuleKind::MaxSerializedSize { limit, plus } => {
            let mut size = serialized_len(value);
            if let Some(other) = plus {
                match document.get(*other) {
                    Some(extra) => size += serialized_len(extra),
                    None => return,
                }
            }
            if size > *limit {
                let subject = match plus {
                    Some(other) => format!("combined serialized size with '{other}'"),
                    None => "serialized size".to_string(),
                };
                emit(target.path.clone(), format!("{subject} {size} exceeds the limit of {limit} bytes"));
            }
        }
    }
}

fn within(number: f64, min: Bound<f64>, max: Bound<f64>) -> bool {
    let above = match min {
        Bound::Included(lo) => number >= lo,
        Bound::Excluded(lo) => number > lo,
        Bound::Unbounded => true,
    };
    let below = match max {
        Bound::Included(hi) => number <= hi,
        Bound::Excluded(hi) => number < hi,
        Bound::Unbounded => true,
    };
    above && below
}

/// Compact JSON length with non-ASCII characters counted as `\uXXXX` escapes.
fn serialized_len(value: &Value) -> usize {
    serde_json::to_string(value)
        .map(|text| text.chars().map(escaped_width).sum())
        .unwrap_or(0)
}

fn escaped_width(c: char) -> usize {
    if c.is_ascii() {
        1
    } else {
        // Astral characters escape as a surrogate pair.
        6 * c.len_utf16()
    }
}

fn quoted(keys: &[&str]) -> String {
    keys.iter()
        .map(|k| format!("'{k}'"))
        .collect::<Vec<_>>()
        .join(" or ")
}
