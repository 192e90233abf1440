//! Arena-backed JSON graph.
//!
//! A resolved description document is not a tree: two `$ref`s to the same definition point at the
//! same node, and recursive schemas form cycles. Nodes live in a flat arena and refer to their
//! children by [`NodeId`], so identity survives resolution and cycles are representable.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

/// Index of a node in a [`DocumentGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<NodeId>),
    Object(IndexMap<String, NodeId>),
}

impl Node {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "a boolean",
            Node::Number(_) => "a number",
            Node::String(_) => "a string",
            Node::Array(_) => "an array",
            Node::Object(_) => "an object",
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&IndexMap<String, NodeId>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[NodeId]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Scalar nodes convert directly; composites need the graph.
    pub(crate) fn scalar_value(&self) -> Option<Value> {
        match self {
            Node::Null => Some(Value::Null),
            Node::Bool(b) => Some(Value::Bool(*b)),
            Node::Number(n) => Some(Value::Number(n.clone())),
            Node::String(s) => Some(Value::String(s.clone())),
            Node::Array(_) | Node::Object(_) => None,
        }
    }
}

/// An immutable document graph with a designated root.
#[derive(Debug, Clone)]
pub struct DocumentGraph {
    nodes: Vec<Node>,
    root: NodeId,
}

impl DocumentGraph {
    /// Build a plain tree from a JSON value. `$ref` objects are kept as-is.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut builder = GraphBuilder::default();
        let root = builder.push_value(value);
        builder.finish(root)
    }

    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        self.node_ref(self.root)
    }

    #[must_use]
    pub fn node_ref(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { graph: self, id }
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Incremental graph construction. Nodes can be reserved before their content is known, which is
/// how the resolver ties cycles.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
}

impl GraphBuilder {
    /// Allocate a placeholder node to be filled in later with [`GraphBuilder::set`].
    pub fn reserve(&mut self) -> NodeId {
        self.push(Node::Null)
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn set(&mut self, id: NodeId, node: Node) {
        self.nodes[id.0] = node;
    }

    pub fn push_value(&mut self, value: &Value) -> NodeId {
        match value {
            Value::Null => self.push(Node::Null),
            Value::Bool(b) => self.push(Node::Bool(*b)),
            Value::Number(n) => self.push(Node::Number(n.clone())),
            Value::String(s) => self.push(Node::String(s.clone())),
            Value::Array(items) => {
                let ids = items.iter().map(|v| self.push_value(v)).collect();
                self.push(Node::Array(ids))
            }
            Value::Object(map) => {
                let ids = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.push_value(v)))
                    .collect();
                self.push(Node::Object(ids))
            }
        }
    }

    #[must_use]
    pub fn finish(self, root: NodeId) -> DocumentGraph {
        DocumentGraph {
            nodes: self.nodes,
            root,
        }
    }
}

/// Borrowed handle to one node, with convenience accessors for document ingestion.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'g> {
    graph: &'g DocumentGraph,
    id: NodeId,
}

impl<'g> NodeRef<'g> {
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn graph(self) -> &'g DocumentGraph {
        self.graph
    }

    #[must_use]
    pub fn node(self) -> &'g Node {
        self.graph.node(self.id)
    }

    #[must_use]
    pub fn kind_name(self) -> &'static str {
        self.node().kind_name()
    }

    #[must_use]
    pub fn is_object(self) -> bool {
        matches!(self.node(), Node::Object(_))
    }

    /// Member of an object node.
    #[must_use]
    pub fn get(self, key: &str) -> Option<NodeRef<'g>> {
        let id = *self.node().as_object()?.get(key)?;
        Some(self.graph.node_ref(id))
    }

    #[must_use]
    pub fn as_str(self) -> Option<&'g str> {
        match self.node() {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self.node() {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String member of an object node.
    #[must_use]
    pub fn str_field(self, key: &str) -> Option<&'g str> {
        self.get(key).and_then(NodeRef::as_str)
    }

    #[must_use]
    pub fn bool_field(self, key: &str) -> Option<bool> {
        self.get(key).and_then(NodeRef::as_bool)
    }

    /// Object members in document order; empty for non-objects.
    pub fn entries(self) -> impl Iterator<Item = (&'g str, NodeRef<'g>)> + 'g {
        let graph = self.graph;
        self.node()
            .as_object()
            .into_iter()
            .flat_map(IndexMap::iter)
            .map(move |(k, id)| (k.as_str(), graph.node_ref(*id)))
    }

    /// Array elements; empty for non-arrays.
    pub fn items(self) -> impl Iterator<Item = NodeRef<'g>> + 'g {
        let graph = self.graph;
        self.node()
            .as_array()
            .into_iter()
            .flatten()
            .map(move |id| graph.node_ref(*id))
    }

    /// Strings of an array member, skipping non-string elements.
    #[must_use]
    pub fn string_list(self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|list| {
                list.items()
                    .filter_map(NodeRef::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The target of a `{"$ref": "..."}` object.
    #[must_use]
    pub fn reference(self) -> Option<&'g str> {
        self.str_field("$ref")
    }

    /// Convert to a JSON value. A node reached again on the current path becomes `null`.
    #[must_use]
    pub fn to_value(self) -> Value {
        let mut on_path = HashSet::new();
        self.to_value_guarded(&mut on_path)
    }

    fn to_value_guarded(self, on_path: &mut HashSet<NodeId>) -> Value {
        if let Some(v) = self.node().scalar_value() {
            return v;
        }
        if !on_path.insert(self.id) {
            return Value::Null;
        }
        let out = match self.node() {
            Node::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|id| self.graph.node_ref(*id).to_value_guarded(on_path))
                    .collect(),
            ),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, id)| (k.clone(), self.graph.node_ref(*id).to_value_guarded(on_path)))
                    .collect::<Map<String, Value>>(),
            ),
            _ => Value::Null,
        };
        on_path.remove(&self.id);
        out
    }
}
