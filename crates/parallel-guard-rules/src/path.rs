//! Field paths into request documents.
//!
//! A [`FieldPattern`] is the rule-table form (`source_policy.include_domains[]`);
//! selecting it against a document yields concrete [`FieldPath`]s
//! (`$.source_policy.include_domains[0]`) paired with the value found there.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Concrete location inside a document, rendered JSONPath-style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The document root (`$`).
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a child path for an object member.
    pub fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(field.to_string()));
        Self { segments }
    }

    /// Returns a child path for an array element.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    /// True for the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    EachElement,
    EachMember,
}

/// Rule-table selector: dot-separated keys, `[]` fans out over array
/// elements, `{}` over object member values. `$` or `""` is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPattern {
    raw: String,
    steps: Vec<Step>,
}

/// A value reached by a [`FieldPattern`].
///
/// `value` is `None` when the final member is absent or `null` while its
/// parent object exists; required-field rules key off that.
#[derive(Debug, Clone)]
pub struct Target<'a> {
    /// Concrete path of the target.
    pub path: FieldPath,
    /// Value at the path, if present.
    pub value: Option<&'a Value>,
}

impl FieldPattern {
    /// Parses a selector such as `mcp_servers[].headers{}`.
    pub fn parse(pattern: &str) -> Self {
        let raw = pattern.trim();
        let body = raw.strip_prefix('$').unwrap_or(raw);
        let body = body.strip_prefix('.').unwrap_or(body);
        let mut steps = Vec::new();
        for part in body.split('.').filter(|p| !p.is_empty()) {
            let mut name = part;
            let mut suffixes = Vec::new();
            loop {
                if let Some(rest) = name.strip_suffix("[]") {
                    suffixes.push(Step::EachElement);
                    name = rest;
                } else if let Some(rest) = name.strip_suffix("{}") {
                    suffixes.push(Step::EachMember);
                    name = rest;
                } else {
                    break;
                }
            }
            if !name.is_empty() {
                steps.push(Step::Key(name.to_string()));
            }
            steps.extend(suffixes.into_iter().rev());
        }
        Self {
            raw: if body.is_empty() { "$".to_string() } else { body.to_string() },
            steps,
        }
    }

    /// The selector as written in the rule table.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolves the selector against `document`.
    ///
    /// Targets whose intermediate values are missing or of the wrong shape
    /// are silently skipped.
    pub fn select<'a>(&self, document: &'a Value) -> Vec<Target<'a>> {
        let mut frontier = vec![Target {
            path: FieldPath::root(),
            value: Some(document),
        }];
        for step in &self.steps {
            let mut next = Vec::new();
            for target in frontier {
                let Some(value) = target.value else {
                    continue;
                };
                match (step, value) {
                    (Step::Key(key), Value::Object(map)) => next.push(Target {
                        path: target.path.push_field(key),
                        value: map.get(key.as_str()).filter(|v| !v.is_null()),
                    }),
                    (Step::EachElement, Value::Array(items)) => {
                        for (idx, item) in items.iter().enumerate() {
                            next.push(Target {
                                path: target.path.push_index(idx),
                                value: Some(item),
                            });
                        }
                    }
                    (Step::EachMember, Value::Object(map)) => {
                        for (key, child) in map {
                            next.push(Target {
                                path: target.path.push_field(key),
                                value: Some(child),
                            });
                        }
                    }
                    _ => {}
                }
            }
            frontier = next;
        }
        frontier
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
