//! Rule types and the versioned rule book.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::Bound;

use crate::errors::RulesError;
use crate::finding::Severity;
use crate::formats::Format;
use crate::kind::PayloadKind;
use crate::path::FieldPattern;
use crate::tables;

/// Version of the bundled rule tables (API documentation snapshot).
pub const RULESET_VERSION: &str = "2026-02";

/// JSON value shapes accepted by `type` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// JSON string.
    String,
    /// Integral JSON number.
    Integer,
    /// Any JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON object.
    Object,
    /// JSON array.
    Array,
    /// String or object (task inputs and specs).
    StringOrObject,
    /// Boolean or settings object (extract content toggles).
    BooleanOrObject,
    /// String, number or boolean.
    Scalar,
}

impl ValueType {
    /// True when `value` has this shape.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ValueType::String => value.is_string(),
            ValueType::Integer => value.is_i64() || value.is_u64(),
            ValueType::Number => value.is_number(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Object => value.is_object(),
            ValueType::Array => value.is_array(),
            ValueType::StringOrObject => value.is_string() || value.is_object(),
            ValueType::BooleanOrObject => value.is_boolean() || value.is_object(),
            ValueType::Scalar => value.is_string() || value.is_number() || value.is_boolean(),
        }
    }

    /// Phrase used in messages (`must be ...`).
    pub fn describe(self) -> &'static str {
        match self {
            ValueType::String => "a string",
            ValueType::Integer => "an integer",
            ValueType::Number => "a number",
            ValueType::Boolean => "a boolean",
            ValueType::Object => "an object",
            ValueType::Array => "an array",
            ValueType::StringOrObject => "a string or object",
            ValueType::BooleanOrObject => "a boolean or object",
            ValueType::Scalar => "a string, number, or boolean",
        }
    }
}

/// What a rule checks, with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// The member must be present and non-null.
    Required,
    /// The value must have the given shape.
    Type(ValueType),
    /// Strings must not be blank; arrays must not be empty.
    NonEmpty,
    /// Strings must be one of the listed values.
    Enum(&'static [&'static str]),
    /// Numbers must lie within the bounds.
    Range {
        /// Lower bound.
        min: Bound<f64>,
        /// Upper bound.
        max: Bound<f64>,
    },
    /// Strings (in chars), arrays (in entries) or stringified scalars must not exceed the cap.
    MaxLength(usize),
    /// Object member names must not exceed the cap.
    MaxKeyLength(usize),
    /// Schema nesting depth cap; the schema root has depth 1.
    MaxDepth(usize),
    /// Cap on the total number of declared schema properties.
    MaxProperties(usize),
    /// At least one of the listed members of the object must be truthy.
    MutualRequirement(&'static [&'static str]),
    /// When `when` is truthy, at least one of `then` must be present.
    ConditionalRequirement {
        /// Triggering member.
        when: &'static str,
        /// Members of which one is required.
        then: &'static [&'static str],
    },
    /// Schema keywords that must not appear.
    ForbiddenKeyword(&'static [&'static str]),
    /// Strings must match the format.
    Format(Format),
    /// Array entries must be distinct.
    Unique,
    /// The member should not be used; names its replacement.
    Deprecated(&'static str),
    /// Object members outside the list are reported.
    KnownFields(&'static [&'static str]),
    /// The value must be a well-formed schema descriptor.
    SchemaDescriptor,
    /// Schema object nodes should set `additionalProperties: false`.
    ClosedObjects,
    /// Cap on compact ASCII-escaped serialized size, optionally adding a root member's size.
    MaxSerializedSize {
        /// Cap in characters; each non-ASCII character counts as its `\uXXXX` escape.
        limit: usize,
        /// Root member whose serialized size is added.
        plus: Option<&'static str>,
    },
}

impl RuleKind {
    /// Kind name as listed in rule tables.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Type(_) => "type",
            RuleKind::NonEmpty => "nonEmpty",
            RuleKind::Enum(_) => "enum",
            RuleKind::Range { .. } => "range",
            RuleKind::MaxLength(_) => "maxLength",
            RuleKind::MaxKeyLength(_) => "maxKeyLength",
            RuleKind::MaxDepth(_) => "maxDepth",
            RuleKind::MaxProperties(_) => "maxProperties",
            RuleKind::MutualRequirement(_) => "mutualRequirement",
            RuleKind::ConditionalRequirement { .. } => "conditionalRequirement",
            RuleKind::ForbiddenKeyword(_) => "forbiddenKeyword",
            RuleKind::Format(_) => "format",
            RuleKind::Unique => "unique",
            RuleKind::Deprecated(_) => "deprecated",
            RuleKind::KnownFields(_) => "knownFields",
            RuleKind::SchemaDescriptor => "schemaDescriptor",
            RuleKind::ClosedObjects => "closedObjects",
            RuleKind::MaxSerializedSize { .. } => "maxSerializedSize",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Type(ty) => write!(f, "type({})", ty.describe()),
            RuleKind::Enum(values) => write!(f, "enum({})", values.join("|")),
            RuleKind::Range { min, max } => write!(f, "range({})", describe_bounds(*min, *max)),
            RuleKind::MaxLength(n)
            | RuleKind::MaxKeyLength(n)
            | RuleKind::MaxDepth(n)
            | RuleKind::MaxProperties(n) => write!(f, "{}({})", self.name(), n),
            RuleKind::MutualRequirement(keys) => write!(f, "mutualRequirement({})", keys.join("|")),
            RuleKind::ConditionalRequirement { when, then } => {
                write!(f, "conditionalRequirement({} -> {})", when, then.join("|"))
            }
            RuleKind::ForbiddenKeyword(keys) => write!(f, "forbiddenKeyword({})", keys.join("|")),
            RuleKind::Format(format) => write!(f, "format({})", format.name()),
            RuleKind::Deprecated(replacement) => write!(f, "deprecated({})", replacement),
            RuleKind::KnownFields(keys) => write!(f, "knownFields({})", keys.len()),
            RuleKind::MaxSerializedSize { limit, plus } => match plus {
                Some(other) => write!(f, "maxSerializedSize({} with {})", limit, other),
                None => write!(f, "maxSerializedSize({})", limit),
            },
            _ => f.write_str(self.name()),
        }
    }
}

/// Renders numeric bounds as `> 0`, `>= 600`, `between 1 and 20`.
pub(crate) fn describe_bounds(min: Bound<f64>, max: Bound<f64>) -> String {
    match (min, max) {
        (Bound::Included(lo), Bound::Included(hi)) => format!("between {} and {}", lo, hi),
        (lo, Bound::Unbounded) => match lo {
            Bound::Included(lo) => format!(">= {}", lo),
            Bound::Excluded(lo) => format!("> {}", lo),
            Bound::Unbounded => "any value".to_string(),
        },
        (Bound::Unbounded, hi) => match hi {
            Bound::Included(hi) => format!("<= {}", hi),
            Bound::Excluded(hi) => format!("< {}", hi),
            Bound::Unbounded => "any value".to_string(),
        },
        (lo, hi) => format!("{} and {}", describe_bounds(lo, Bound::Unbounded), describe_bounds(Bound::Unbounded, hi)),
    }
}

/// One row of a rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    /// Stable rule identifier (`search.max_results.range`).
    pub id: String,
    /// Where the rule applies.
    pub path: FieldPattern,
    /// What the rule checks.
    pub kind: RuleKind,
    /// Severity of every finding this rule emits.
    pub severity: Severity,
    /// Replaces the generated message when set.
    pub message: Option<&'static str>,
}

impl ValidationRule {
    /// Error-severity rule.
    pub fn error(id: impl Into<String>, path: &str, kind: RuleKind) -> Self {
        Self::new(id, path, kind, Severity::Error)
    }

    /// Warning-severity rule.
    pub fn warning(id: impl Into<String>, path: &str, kind: RuleKind) -> Self {
        Self::new(id, path, kind, Severity::Warning)
    }

    fn new(id: impl Into<String>, path: &str, kind: RuleKind, severity: Severity) -> Self {
        Self {
            id: id.into(),
            path: FieldPattern::parse(path),
            kind,
            severity,
            message: None,
        }
    }

    /// Overrides the generated message.
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Caps that callers may tune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Maximum JSON Schema nesting depth (root is 1).
    pub schema_max_depth: usize,
    /// Maximum total declared properties per JSON Schema.
    pub schema_max_properties: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            schema_max_depth: 5,
            schema_max_properties: 100,
        }
    }
}

impl Limits {
    /// Checks that every cap is usable.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.schema_max_depth == 0 {
            return Err(RulesError::OutOfBounds {
                field: "schema_max_depth",
                value: self.schema_max_depth,
            });
        }
        if self.schema_max_properties == 0 {
            return Err(RulesError::OutOfBounds {
                field: "schema_max_properties",
                value: self.schema_max_properties,
            });
        }
        Ok(())
    }
}

/// Immutable rule table for one payload kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    kind: PayloadKind,
    version: &'static str,
    rules: Vec<ValidationRule>,
}

impl RuleSet {
    /// Builds the bundled rule table for `kind`.
    pub fn standard(kind: PayloadKind, limits: &Limits) -> Self {
        let rules = match kind {
            PayloadKind::Search => tables::search(),
            PayloadKind::Extract => tables::extract(),
            PayloadKind::TaskRun => tables::task_run(limits),
        };
        Self::from_rules(kind, RULESET_VERSION, rules)
    }

    /// Wraps a custom table.
    pub fn from_rules(kind: PayloadKind, version: &'static str, rules: Vec<ValidationRule>) -> Self {
        Self { kind, version, rules }
    }

    /// Payload kind the table applies to.
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// Table version.
    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }
}

/// One rule set per payload kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBook {
    search: RuleSet,
    extract: RuleSet,
    task_run: RuleSet,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::build(&Limits::default())
    }
}

impl RuleBook {
    /// Builds the bundled tables with the given limits.
    pub fn new(limits: Limits) -> Result<Self, RulesError> {
        limits.validate()?;
        Ok(Self::build(&limits))
    }

    fn build(limits: &Limits) -> Self {
        let book = Self {
            search: RuleSet::standard(PayloadKind::Search, limits),
            extract: RuleSet::standard(PayloadKind::Extract, limits),
            task_run: RuleSet::standard(PayloadKind::TaskRun, limits),
        };
        tracing::debug!(
            version = RULESET_VERSION,
            search = book.search.rules.len(),
            extract = book.extract.rules.len(),
            task_run = book.task_run.rules.len(),
            "rule book initialized"
        );
        book
    }

    /// Assembles a book from prebuilt sets.
    pub fn from_sets(search: RuleSet, extract: RuleSet, task_run: RuleSet) -> Self {
        Self {
            search,
            extract,
            task_run,
        }
    }

    /// Rule set for `kind`.
    pub fn rule_set(&self, kind: PayloadKind) -> &RuleSet {
        match kind {
            PayloadKind::Search => &self.search,
            PayloadKind::Extract => &self.extract,
            PayloadKind::TaskRun => &self.task_run,
        }
    }
}
