//! Finding and report types shared by the validator and the beta linter.

use serde::Serialize;
use std::fmt;

use crate::kind::PayloadKind;
use crate::path::FieldPath;

/// Severity of a rule, fixed per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Structural or required-field violation; the document is rejected.
    Error,
    /// Best-practice deviation; advisory only.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// One defect reported against a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    /// Identifier of the rule that fired.
    pub rule_id: String,
    /// Location of the offending value.
    pub path: FieldPath,
    /// Human-readable description.
    pub message: String,
    /// Severity inherited from the rule.
    pub severity: Severity,
}

impl ValidationFinding {
    /// Creates a finding.
    pub fn new(
        rule_id: impl Into<String>,
        path: FieldPath,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            path,
            message: message.into(),
            severity,
        }
    }

    /// True for error-severity findings.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Findings for one document together with the rule set that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Request kind the document was validated as.
    pub kind: PayloadKind,
    /// Version of the rule tables applied.
    pub ruleset_version: String,
    /// Ordered findings.
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    /// Number of error-severity findings.
    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    /// Number of warning-severity findings.
    pub fn warning_count(&self) -> usize {
        self.findings.len() - self.error_count()
    }

    /// True when no error-severity finding was produced.
    pub fn is_accepted(&self) -> bool {
        self.error_count() == 0
    }

    /// Error findings in report order.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(|f| f.is_error())
    }

    /// Warning findings in report order.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(|f| !f.is_error())
    }
}
