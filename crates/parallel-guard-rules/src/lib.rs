//! Versioned request-payload rules for the Parallel Search, Extract and Task APIs.
//!
//! [`PayloadValidator`] applies a [`RuleSet`] to a candidate request document
//! and returns an ordered list of [`ValidationFinding`]s; [`BetaHeaderLinter`]
//! cross-checks gated feature usage against presented `parallel-beta` tokens.
//! Both are pure functions over immutable inputs.
//!
#![deny(missing_docs)]

/// Beta capability tokens and the feature gate table.
pub mod beta;
/// Configuration errors.
pub mod errors;
/// Findings and reports.
pub mod finding;
/// String format checks (domains, URLs, dates).
pub mod formats;
/// Request kinds.
pub mod kind;
/// Field paths and rule-table selectors.
pub mod path;
/// Rule types, limits and the rule book.
pub mod rules;
/// JSON Schema descriptor resolution and traversal.
pub mod schema;
/// Bundled rule tables.
pub mod tables;
/// The rule engine.
pub mod validator;

pub use beta::{
    parse_beta_header, BetaHeaderLinter, CapabilityToken, FeatureDetector, FeatureGate, MatchMode,
    FEATURE_GATES,
};
pub use errors::RulesError;
pub use finding::{Severity, ValidationFinding, ValidationReport};
pub use formats::Format;
pub use kind::PayloadKind;
pub use path::{FieldPath, FieldPattern};
pub use rules::{Limits, RuleBook, RuleKind, RuleSet, ValidationRule, ValueType, RULESET_VERSION};
pub use schema::FORBIDDEN_KEYWORDS;
pub use validator::{validate, validate_value, PayloadValidator};
