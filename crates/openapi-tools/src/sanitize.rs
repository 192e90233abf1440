//! Bounded, cycle-safe conversion of projected output into JSON.
//!
//! The normalizer builds a [`Shape`]: fresh structure mixed with handles into the document graph.
//! [`Sanitizer::sanitize`] turns it into a plain [`Value`], replacing anything deeper than the
//! depth limit with a truncation marker and any graph node already open on the current recursion
//! path with a circular-reference marker. Both rules together guarantee termination on cyclic
//! graphs.

use crate::graph::{DocumentGraph, Node, NodeId};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const CIRCULAR_MARKER: &str = "[Circular Reference]";

#[must_use]
pub fn truncation_marker(max_depth: usize) -> String {
    format!("[Truncated: max depth {max_depth} exceeded]")
}

/// Output under construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// An owned JSON value.
    Value(Value),
    /// A node of the document graph, rendered with identity tracking.
    Node(NodeId),
    Array(Vec<Shape>),
    Object(IndexMap<String, Shape>),
}

impl Shape {
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Shape::Value(Value::String(s.into()))
    }

    #[must_use]
    pub fn object() -> IndexMap<String, Shape> {
        IndexMap::new()
    }
}

impl From<Value> for Shape {
    fn from(value: Value) -> Self {
        Shape::Value(value)
    }
}

/// Depth-limited renderer over one graph. The circular-reference set lives only for the
/// duration of one [`Sanitizer::sanitize`] call.
#[derive(Debug)]
pub struct Sanitizer<'g> {
    graph: &'g DocumentGraph,
    max_depth: usize,
}

impl<'g> Sanitizer<'g> {
    #[must_use]
    pub fn new(graph: &'g DocumentGraph, max_depth: usize) -> Self {
        Self { graph, max_depth }
    }

    /// Render `shape` with the root at depth 0. Values at depth `max_depth + 1` become the
    /// truncation marker.
    #[must_use]
    pub fn sanitize(&self, shape: &Shape) -> Value {
        let mut on_path = HashSet::new();
        self.shape(shape, 0, &mut on_path)
    }

    fn shape(&self, shape: &Shape, depth: usize, on_path: &mut HashSet<NodeId>) -> Value {
        if depth > self.max_depth {
            return Value::String(truncation_marker(self.max_depth));
        }
        match shape {
            Shape::Value(v) => bounded_value(v, depth, self.max_depth),
            Shape::Node(id) => self.node(*id, depth, on_path),
            Shape::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|s| self.shape(s, depth + 1, on_path))
                    .collect(),
            ),
            Shape::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, s)| (k.clone(), self.shape(s, depth + 1, on_path)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    fn node(&self, id: NodeId, depth: usize, on_path: &mut HashSet<NodeId>) -> Value {
        if depth > self.max_depth {
            return Value::String(truncation_marker(self.max_depth));
        }
        let node = self.graph.node(id);
        if let Some(scalar) = node.scalar_value() {
            return scalar;
        }
        if !on_path.insert(id) {
            return Value::String(CIRCULAR_MARKER.to_string());
        }
        let out = match node {
            Node::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|child| self.node(*child, depth + 1, on_path))
                    .collect(),
            ),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, child)| (k.clone(), self.node(*child, depth + 1, on_path)))
                    .collect::<Map<String, Value>>(),
            ),
            _ => Value::Null,
        };
        on_path.remove(&id);
        out
    }
}

/// Depth-limit a plain JSON value. Plain values cannot contain cycles.
#[must_use]
pub fn sanitize_value(value: &Value, max_depth: usize) -> Value {
    bounded_value(value, 0, max_depth)
}

fn bounded_value(value: &Value, depth: usize, max_depth: usize) -> Value {
    if depth > max_depth {
        return Value::String(truncation_marker(max_depth));
    }
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| bounded_value(v, depth + 1, max_depth))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), bounded_value(v, depth + 1, max_depth)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use serde_json::json;

    /// `{ "name": "root", "self": <root> }`
    fn self_referencing_graph() -> DocumentGraph {
        let mut builder = GraphBuilder::default();
        let root = builder.reserve();
        let name = builder.push(Node::String("root".into()));
        let mut map = IndexMap::new();
        map.insert("name".to_string(), name);
        map.insert("self".to_string(), root);
        builder.set(root, Node::Object(map));
        builder.finish(root)
    }

    #[test]
    fn self_reference_becomes_marker() {
        let graph = self_referencing_graph();
        let out = Sanitizer::new(&graph, 20).sanitize(&Shape::Node(graph.root().id()));
        assert_eq!(out, json!({ "name": "root", "self": CIRCULAR_MARKER }));
    }

    #[test]
    fn shared_nodes_are_not_circular() {
        let mut builder = GraphBuilder::default();
        let leaf_name = builder.push(Node::String("pet".into()));
        let mut leaf = IndexMap::new();
        leaf.insert("type".to_string(), leaf_name);
        let shared = builder.push(Node::Object(leaf));
        let mut root = IndexMap::new();
        root.insert("a".to_string(), shared);
        root.insert("b".to_string(), shared);
        let root = builder.push(Node::Object(root));
        let graph = builder.finish(root);

        let out = Sanitizer::new(&graph, 20).sanitize(&Shape::Node(root));
        assert_eq!(out, json!({ "a": { "type": "pet" }, "b": { "type": "pet" } }));
    }

    #[test]
    fn cycle_below_fresh_structure_terminates() {
        let graph = self_referencing_graph();
        let mut wrapper = Shape::object();
        wrapper.insert("schema".to_string(), Shape::Node(graph.root().id()));
        wrapper.insert("again".to_string(), Shape::Node(graph.root().id()));
        let out = Sanitizer::new(&graph, 20).sanitize(&Shape::Object(wrapper));
        assert_eq!(out["schema"]["self"], json!(CIRCULAR_MARKER));
        assert_eq!(out["again"]["name"], json!("root"));
    }

    #[test]
    fn truncates_exactly_past_max_depth() {
        let value = json!({ "a": { "b": { "c": { "d": 1 } } } });
        let out = sanitize_value(&value, 2);
        assert_eq!(
            out,
            json!({ "a": { "b": { "c": truncation_marker(2) } } })
        );
    }

    #[test]
    fn truncation_applies_to_scalars_and_graph_nodes() {
        let value = json!([[1, [2]]]);
        assert_eq!(sanitize_value(&value, 1), json!([[truncation_marker(1), truncation_marker(1)]]));

        let graph = self_referencing_graph();
        let out = Sanitizer::new(&graph, 0).sanitize(&Shape::Node(graph.root().id()));
        assert_eq!(out, json!({ "name": truncation_marker(0), "self": truncation_marker(0) }));
    }

    #[test]
    fn marker_names_the_limit() {
        assert_eq!(truncation_marker(7), "[Truncated: max depth 7 exceeded]");
    }
}
