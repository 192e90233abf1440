//! Example-value synthesis from a response schema.

use crate::graph::{NodeId, NodeRef};
use serde_json::{Map, Value};
use std::collections::HashSet;

const DATE_TIME_EXAMPLE: &str = "2024-01-01T00:00:00Z";
const STRING_EXAMPLE: &str = "string_value";

/// Build an illustrative value for `schema`.
///
/// An `example` member is returned verbatim. Otherwise the value follows the declared type:
/// objects get every declared property, arrays a single synthesized item, strings a date-time,
/// the first enum value or a placeholder, numbers `0`, booleans `true`, anything else `null`.
/// A schema reached again through its own properties yields `null`.
#[must_use]
pub fn synthesize_example(schema: NodeRef<'_>) -> Value {
    let mut on_path = HashSet::new();
    example(schema, &mut on_path)
}

fn example(schema: NodeRef<'_>, on_path: &mut HashSet<NodeId>) -> Value {
    if let Some(example) = schema.get("example") {
        return example.to_value();
    }
    if !schema.is_object() || !on_path.insert(schema.id()) {
        return Value::Null;
    }

    let out = match declared_type(schema) {
        Some("object") => object_example(schema, on_path),
        Some("array") => {
            let item = schema
                .get("items")
                .map_or(Value::Null, |items| example(items, on_path));
            Value::Array(vec![item])
        }
        Some("string") => string_example(schema),
        Some("integer" | "number") => Value::from(0),
        Some("boolean") => Value::Bool(true),
        Some(_) => Value::Null,
        None => composite_example(schema, on_path),
    };

    on_path.remove(&schema.id());
    out
}

/// `type` may be a string or (JSON Schema 2020-12) a list; the first non-null entry wins.
/// Without `type`, `properties` implies an object and `items` an array.
fn declared_type<'g>(schema: NodeRef<'g>) -> Option<&'g str> {
    if let Some(t) = schema.get("type") {
        if let Some(s) = t.as_str() {
            return Some(s);
        }
        if let Some(s) = t.items().filter_map(NodeRef::as_str).find(|s| *s != "null") {
            return Some(s);
        }
    }
    if schema.get("properties").is_some() {
        return Some("object");
    }
    if schema.get("items").is_some() {
        return Some("array");
    }
    None
}

fn object_example(schema: NodeRef<'_>, on_path: &mut HashSet<NodeId>) -> Value {
    let mut out = Map::new();
    if let Some(props) = schema.get("properties") {
        for (name, prop) in props.entries() {
            out.insert(name.to_string(), example(prop, on_path));
        }
    }
    Value::Object(out)
}

fn string_example(schema: NodeRef<'_>) -> Value {
    if schema.str_field("format") == Some("date-time") {
        return Value::String(DATE_TIME_EXAMPLE.to_string());
    }
    if let Some(first) = schema.get("enum").and_then(|e| e.items().next()) {
        return first.to_value();
    }
    Value::String(STRING_EXAMPLE.to_string())
}

/// Untyped schemas: merge `allOf` parts, or take the first `oneOf`/`anyOf` branch.
fn composite_example(schema: NodeRef<'_>, on_path: &mut HashSet<NodeId>) -> Value {
    if let Some(parts) = schema.get("allOf") {
        let mut merged = Map::new();
        for part in parts.items() {
            match example(part, on_path) {
                Value::Object(map) => merged.extend(map),
                Value::Null => {}
                other => return other,
            }
        }
        return Value::Object(merged);
    }
    for key in ["oneOf", "anyOf"] {
        if let Some(first) = schema.get(key).and_then(|v| v.items().next()) {
            return example(first, on_path);
        }
    }
    Value::Null
}
