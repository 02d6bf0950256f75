//! Request kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::RulesError;

/// Request kind a document is validated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadKind {
    /// Search API request.
    Search,
    /// Extract API request.
    Extract,
    /// Task run creation request.
    TaskRun,
}

impl PayloadKind {
    /// Every payload kind, in rule-book order.
    pub const ALL: [PayloadKind; 3] = [PayloadKind::Search, PayloadKind::Extract, PayloadKind::TaskRun];

    /// Stable textual name (`search`, `extract`, `task-run`).
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadKind::Search => "search",
            PayloadKind::Extract => "extract",
            PayloadKind::TaskRun => "task-run",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadKind {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(PayloadKind::Search),
            "extract" => Ok(PayloadKind::Extract),
            "task-run" | "task_run" | "taskrun" | "task" => Ok(PayloadKind::TaskRun),
            _ => Err(RulesError::UnknownKind(s.to_string())),
        }
    }
}
