//! Beta capability tokens and the header linter.
//!
//! Features that sit behind a `parallel-beta` token are listed in
//! [`FEATURE_GATES`]. Adding a new beta is a new table row; the linter itself
//! has no per-feature branches.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use crate::finding::{Severity, ValidationFinding};
use crate::kind::PayloadKind;
use crate::path::FieldPath;
use crate::validator::is_truthy;

static DATE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}$").expect("invalid regex"));

/// A beta identifier such as `events-sse-2025-07-24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CapabilityToken(pub &'static str);

impl CapabilityToken {
    /// The full token.
    pub fn as_str(self) -> &'static str {
        self.0
    }

    /// Token minus its trailing date stamp (`events-sse-2025-07-24` -> `events-sse-`).
    ///
    /// Tokens without a date stamp are their own prefix.
    pub fn stable_prefix(self) -> &'static str {
        match DATE_SUFFIX.find(self.0) {
            Some(m) if m.start() > 0 => &self.0[..m.start()],
            _ => self.0,
        }
    }

    /// True when a presented token satisfies this one under `mode`.
    pub fn is_satisfied_by(self, presented: &str, mode: MatchMode) -> bool {
        let presented = presented.trim();
        match mode {
            MatchMode::Prefix => presented.starts_with(self.stable_prefix()),
            MatchMode::Exact => presented == self.0,
        }
    }
}

impl fmt::Display for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// How presented tokens are compared with the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Any token sharing the stable prefix is accepted.
    #[default]
    Prefix,
    /// Only the current token is accepted.
    Exact,
}

/// Decides whether a document uses a gated feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureDetector {
    /// The named root member is truthy.
    Truthy(&'static str),
    /// The named root member is present and not null.
    Present(&'static str),
    /// The endpoint itself is gated.
    Always,
}

impl FeatureDetector {
    fn detect(self, document: &Value) -> Option<FieldPath> {
        match self {
            FeatureDetector::Truthy(member) => {
                is_truthy(document.get(member)).then(|| FieldPath::root().push_field(member))
            }
            FeatureDetector::Present(member) => document
                .get(member)
                .filter(|value| !value.is_null())
                .map(|_| FieldPath::root().push_field(member)),
            FeatureDetector::Always => Some(FieldPath::root()),
        }
    }
}

/// One row of the feature → token table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureGate {
    /// Feature name; also the rule id suffix.
    pub feature: &'static str,
    /// Request kind the gate applies to.
    pub kind: PayloadKind,
    /// Usage predicate.
    pub detector: FeatureDetector,
    /// Current capability token.
    pub token: CapabilityToken,
}

impl FeatureGate {
    /// Rule id of findings raised for this gate.
    pub fn rule_id(&self) -> String {
        format!("beta.{}", self.feature)
    }
}

/// Gated features, current snapshot.
pub const FEATURE_GATES: &[FeatureGate] = &[
    FeatureGate {
        feature: "enable_events",
        kind: PayloadKind::TaskRun,
        detector: FeatureDetector::Truthy("enable_events"),
        token: CapabilityToken("events-sse-2025-07-24"),
    },
    FeatureGate {
        feature: "mcp_servers",
        kind: PayloadKind::TaskRun,
        detector: FeatureDetector::Present("mcp_servers"),
        token: CapabilityToken("mcp-server-2025-07-17"),
    },
    FeatureGate {
        feature: "webhook",
        kind: PayloadKind::TaskRun,
        detector: FeatureDetector::Present("webhook"),
        token: CapabilityToken("webhook-2025-08-12"),
    },
    FeatureGate {
        feature: "extract",
        kind: PayloadKind::Extract,
        detector: FeatureDetector::Always,
        token: CapabilityToken("search-extract-2025-10-10"),
    },
];

/// Splits a `parallel-beta` header value into tokens, dropping blanks.
pub fn parse_beta_header(header: &str) -> BTreeSet<String> {
    header
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lints with prefix matching.
pub fn lint<S: AsRef<str>>(kind: PayloadKind, document: &Value, present: &[S]) -> Vec<ValidationFinding> {
    BetaHeaderLinter::default().lint(kind, document, present)
}

/// Cross-checks gated feature usage against presented tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BetaHeaderLinter {
    mode: MatchMode,
}

impl BetaHeaderLinter {
    /// Creates a linter with the given match mode.
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    /// The configured match mode.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Gates that apply to `kind`, in table order.
    pub fn gates(kind: PayloadKind) -> impl Iterator<Item = &'static FeatureGate> {
        FEATURE_GATES.iter().filter(move |gate| gate.kind == kind)
    }

    /// Returns one error finding per used feature without a matching token.
    pub fn lint<S: AsRef<str>>(
        &self,
        kind: PayloadKind,
        document: &Value,
        present: &[S],
    ) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();
        if !document.is_object() {
            return findings;
        }
        for gate in Self::gates(kind) {
            let Some(path) = gate.detector.detect(document) else {
                continue;
            };
            let satisfied = present
                .iter()
                .any(|token| gate.token.is_satisfied_by(token.as_ref(), self.mode));
            if satisfied {
                continue;
            }
            tracing::debug!(feature = gate.feature, %kind, "beta token missing");
            let message = match self.mode {
                MatchMode::Prefix => format!(
                    "feature '{}' requires a parallel-beta token starting with '{}' (current: {})",
                    gate.feature,
                    gate.token.stable_prefix(),
                    gate.token
                ),
                MatchMode::Exact => format!(
                    "feature '{}' requires the parallel-beta token '{}' (prefix '{}')",
                    gate.feature,
                    gate.token,
                    gate.token.stable_prefix()
                ),
            };
            findings.push(ValidationFinding::new(gate.rule_id(), path, message, Severity::Error));
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_prefixes() {
        assert_eq!(CapabilityToken("events-sse-2025-07-24").stable_prefix(), "events-sse-");
        assert_eq!(CapabilityToken("search-extract-2025-10-10").stable_prefix(), "search-extract-");
        assert_eq!(CapabilityToken("undated").stable_prefix(), "undated");
    }

    #[test]
    fn header_parsing_drops_blanks() {
        let tokens = parse_beta_header(" webhook-2025-08-12, ,events-sse-2025-07-24,,");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("webhook-2025-08-12"));
        assert!(tokens.contains("events-sse-2025-07-24"));
    }

    #[test]
    fn presence_detector_ignores_null_only() {
        let detector = FeatureDetector::Present("mcp_servers");
        assert_eq!(
            detector.detect(&serde_json::json!({"mcp_servers": []})),
            Some(FieldPath::root().push_field("mcp_servers"))
        );
        assert_eq!(detector.detect(&serde_json::json!({"mcp_servers": null})), None);
        assert_eq!(detector.detect(&serde_json::json!({})), None);
    }

    #[test]
    fn exact_mode_requires_current_token() {
        let token = CapabilityToken("webhook-2025-08-12");
        assert!(token.is_satisfied_by("webhook-2026-01-01", MatchMode::Prefix));
        assert!(!token.is_satisfied_by("webhook-2026-01-01", MatchMode::Exact));
        assert!(token.is_satisfied_by(" webhook-2025-08-12 ", MatchMode::Exact));
    }
}
