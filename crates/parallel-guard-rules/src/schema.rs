//! JSON Schema descriptors embedded in task specs.
//!
//! A descriptor is either shorthand text, an `auto`/`text` wrapper, a
//! `{"type": "json", "json_schema": {...}}` wrapper, or a plain JSON Schema
//! object. [`resolve`] finds the schema body (if any). [`walk`] visits its
//! nodes for depth and size checks and [`find_keywords`] scans every subschema
//! position, so keyword checks never mistake a property *named* `not` for the
//! `not` keyword.

use serde_json::{Map, Value};

use crate::path::FieldPath;

/// Keywords the Task API does not accept in JSON Schemas.
pub const FORBIDDEN_KEYWORDS: &[&str] = &[
    "anyOf",
    "oneOf",
    "allOf",
    "not",
    "if",
    "then",
    "else",
    "dependentSchemas",
    "dependentRequired",
    "patternProperties",
];

const SCHEMA_TYPES: &[&str] = &["object", "array", "string", "number", "integer", "boolean", "null"];

const SCHEMA_MARKERS: &[&str] = &[
    "properties",
    "items",
    "prefixItems",
    "required",
    "additionalProperties",
    "$defs",
    "definitions",
];

/// What a schema descriptor resolves to.
#[derive(Debug, Clone)]
pub enum SchemaBody<'a> {
    /// Text shorthand or wrapper without a structural schema.
    Opaque,
    /// A JSON Schema to walk, with the path of its root node.
    Json {
        /// Root node of the schema.
        node: &'a Value,
        /// Path of the root node.
        path: FieldPath,
    },
    /// The descriptor itself is malformed.
    Invalid {
        /// Path of the offending value.
        path: FieldPath,
        /// Why it was rejected.
        reason: String,
    },
}

/// Resolves a descriptor found at `path`.
pub fn resolve<'a>(descriptor: &'a Value, path: &FieldPath) -> SchemaBody<'a> {
    let map = match descriptor {
        Value::String(_) => return SchemaBody::Opaque,
        Value::Object(map) => map,
        _ => {
            return SchemaBody::Invalid {
                path: path.clone(),
                reason: "must be a string or object".to_string(),
            }
        }
    };

    let declared = map.get("type");
    let declared_str = declared.and_then(Value::as_str);

    if let Some(inner) = map.get("json_schema") {
        if !matches!(declared, None | Some(Value::Null)) && declared_str != Some("json") {
            return SchemaBody::Invalid {
                path: path.push_field("type"),
                reason: "must be 'json' when json_schema is present".to_string(),
            };
        }
        let inner_path = path.push_field("json_schema");
        return if inner.is_object() {
            SchemaBody::Json {
                node: inner,
                path: inner_path,
            }
        } else {
            SchemaBody::Invalid {
                path: inner_path,
                reason: "must be an object".to_string(),
            }
        };
    }

    match declared {
        None | Some(Value::Null) => {
            if looks_like_schema(map) {
                SchemaBody::Json {
                    node: descriptor,
                    path: path.clone(),
                }
            } else {
                SchemaBody::Opaque
            }
        }
        Some(Value::String(ty)) => match ty.as_str() {
            "auto" | "text" => SchemaBody::Opaque,
            "json" => SchemaBody::Invalid {
                path: path.clone(),
                reason: "type 'json' requires a nested 'json_schema' object".to_string(),
            },
            other if SCHEMA_TYPES.contains(&other) => SchemaBody::Json {
                node: descriptor,
                path: path.clone(),
            },
            other => SchemaBody::Invalid {
                path: path.push_field("type"),
                reason: format!("unrecognized schema type '{other}'"),
            },
        },
        // `"type": ["string", "null"]` style unions are plain JSON Schema.
        Some(Value::Array(_)) => SchemaBody::Json {
            node: descriptor,
            path: path.clone(),
        },
        Some(_) => SchemaBody::Invalid {
            path: path.push_field("type"),
            reason: "must be a string".to_string(),
        },
    }
}

fn looks_like_schema(map: &Map<String, Value>) -> bool {
    map.keys().any(|key| {
        SCHEMA_MARKERS.contains(&key.as_str()) || FORBIDDEN_KEYWORDS.contains(&key.as_str())
    })
}

/// Keywords whose value is a single subschema.
const SUBSCHEMA_KEYWORDS: &[&str] = &[
    "items",
    "additionalItems",
    "additionalProperties",
    "unevaluatedItems",
    "unevaluatedProperties",
    "contains",
    "propertyNames",
    "not",
    "if",
    "then",
    "else",
];

/// Keywords whose value is an array of subschemas.
const SUBSCHEMA_LIST_KEYWORDS: &[&str] = &["items", "prefixItems", "anyOf", "oneOf", "allOf"];

/// Keywords whose value maps names (or patterns) to subschemas.
const SUBSCHEMA_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// Finds every use of `keywords` in a schema, including inside the
/// subschemas of other matched keywords.
///
/// Member names under `properties`-like maps and values of data keywords
/// (`const`, `enum`, `default`, `examples`) are never treated as keywords.
/// A node's own keywords are reported before its subschemas.
pub fn find_keywords(root: &Value, path: &FieldPath, keywords: &[&str]) -> Vec<(FieldPath, String)> {
    let mut hits = Vec::new();
    scan_keywords(root, path, keywords, &mut hits);
    hits
}

fn scan_keywords(value: &Value, path: &FieldPath, keywords: &[&str], hits: &mut Vec<(FieldPath, String)>) {
    let Value::Object(node) = value else {
        return;
    };
    for key in node.keys().filter(|key| keywords.contains(&key.as_str())) {
        hits.push((path.push_field(key), key.clone()));
    }
    for (key, child) in node {
        let key = key.as_str();
        let base = path.push_field(key);
        match child {
            Value::Object(_) if SUBSCHEMA_KEYWORDS.contains(&key) => {
                scan_keywords(child, &base, keywords, hits);
            }
            Value::Object(entries) if SUBSCHEMA_MAP_KEYWORDS.contains(&key) => {
                for (name, sub) in entries {
                    scan_keywords(sub, &base.push_field(name), keywords, hits);
                }
            }
            Value::Array(children) if SUBSCHEMA_LIST_KEYWORDS.contains(&key) => {
                for (idx, sub) in children.iter().enumerate() {
                    scan_keywords(sub, &base.push_index(idx), keywords, hits);
                }
            }
            _ => {}
        }
    }
}

/// A schema node reached by [`walk`].
#[derive(Debug, Clone)]
pub struct SchemaNode<'a> {
    /// The node's JSON object.
    pub node: &'a Map<String, Value>,
    /// Path of the node.
    pub path: FieldPath,
    /// Nesting depth; the schema root is 1.
    pub depth: usize,
}

/// Visits every schema object node in pre-order.
///
/// Children are reached through `properties`, `items`, `prefixItems`,
/// `additionalProperties`, `$defs` and `definitions`. Combinator subschemas
/// are not entered; [`find_keywords`] covers those for keyword checks.
pub fn walk<'a>(root: &'a Value, path: &FieldPath, visit: &mut dyn FnMut(&SchemaNode<'a>)) {
    walk_node(root, path.clone(), 1, visit);
}

fn walk_node<'a>(
    value: &'a Value,
    path: FieldPath,
    depth: usize,
    visit: &mut dyn FnMut(&SchemaNode<'a>),
) {
    let Value::Object(node) = value else {
        return;
    };
    visit(&SchemaNode {
        node,
        path: path.clone(),
        depth,
    });

    if let Some(Value::Object(props)) = node.get("properties") {
        let base = path.push_field("properties");
        for (name, child) in props {
            walk_node(child, base.push_field(name), depth + 1, visit);
        }
    }
    match node.get("items") {
        Some(child @ Value::Object(_)) => walk_node(child, path.push_field("items"), depth + 1, visit),
        Some(Value::Array(children)) => {
            let base = path.push_field("items");
            for (idx, child) in children.iter().enumerate() {
                walk_node(child, base.push_index(idx), depth + 1, visit);
            }
        }
        _ => {}
    }
    if let Some(Value::Array(children)) = node.get("prefixItems") {
        let base = path.push_field("prefixItems");
        for (idx, child) in children.iter().enumerate() {
            walk_node(child, base.push_index(idx), depth + 1, visit);
        }
    }
    if let Some(child @ Value::Object(_)) = node.get("additionalProperties") {
        walk_node(child, path.push_field("additionalProperties"), depth + 1, visit);
    }
    for defs in ["$defs", "definitions"] {
        if let Some(Value::Object(entries)) = node.get(defs) {
            let base = path.push_field(defs);
            for (name, child) in entries {
                walk_node(child, base.push_field(name), depth + 1, visit);
            }
        }
    }
}

/// Number of properties declared directly on a node.
pub fn property_count(node: &Map<String, Value>) -> usize {
    match node.get("properties") {
        Some(Value::Object(props)) => props.len(),
        _ => 0,
    }
}

/// True when the node describes an object.
pub fn is_object_node(node: &Map<String, Value>) -> bool {
    match node.get("type") {
        Some(Value::String(ty)) => ty == "object",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("object")),
        None => node.contains_key("properties"),
        _ => false,
    }
}
