//! `$ref` resolver.
//!
//! Dereferences a description document, and every document it references, into one
//! [`DocumentGraph`].
//!
//! Supported references:
//! - Local refs (`#/...`)
//! - Relative refs (`./common.yaml#/...`), resolved against the document that contains them
//! - Absolute URL refs (`https://example.com/common.yaml#/...`)
//!
//! Each location (document URL + JSON pointer) becomes exactly one node. A `$ref` is linked to
//! the node of the location it points at, so shared definitions keep their identity and
//! recursive schemas become cycles in the graph. Only a reference chain that never reaches a
//! value (`A -> B -> A`) is an error.

use crate::error::ResolutionError;
use crate::graph::{DocumentGraph, GraphBuilder, Node, NodeId};
use apidoc_http_tools::fetch::Fetcher;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

type Result<T> = std::result::Result<T, ResolutionError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Location {
    doc: Url,
    pointer: String,
}

impl Location {
    fn display(&self) -> String {
        format!("{}#{}", self.doc, self.pointer)
    }

    fn child(&self, token: &str) -> Self {
        let escaped = token.replace('~', "~0").replace('/', "~1");
        Self {
            doc: self.doc.clone(),
            pointer: format!("{}/{escaped}", self.pointer),
        }
    }
}

/// Resolve `url` into a self-contained graph within `budget`.
///
/// # Errors
///
/// Returns [`ResolutionError::Timeout`] if the whole resolution exceeds `budget`, or the first
/// fetch, parse, or reference error encountered.
pub async fn resolve(fetcher: &Fetcher, url: &Url, budget: Duration) -> Result<DocumentGraph> {
    let resolution = Resolution::new(fetcher);
    if let Ok(res) = tokio::time::timeout(budget, resolution.run(url)).await {
        res
    } else {
        Err(ResolutionError::Timeout {
            timeout_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// State for one resolution. Dropped when the call completes; nothing is shared across calls.
struct Resolution<'a> {
    fetcher: &'a Fetcher,
    docs: HashMap<Url, Arc<Value>>,
    linked: HashMap<Location, NodeId>,
    builder: GraphBuilder,
    pending: Vec<(NodeId, Location)>,
}

impl<'a> Resolution<'a> {
    fn new(fetcher: &'a Fetcher) -> Self {
        Self {
            fetcher,
            docs: HashMap::new(),
            linked: HashMap::new(),
            builder: GraphBuilder::default(),
            pending: Vec::new(),
        }
    }

    async fn run(mut self, url: &Url) -> Result<DocumentGraph> {
        let root = Location {
            doc: strip_fragment(url.clone()),
            pointer: String::new(),
        };
        let root_id = self.link(root).await?;

        while let Some((id, loc)) = self.pending.pop() {
            self.materialize(id, &loc).await?;
        }

        tracing::debug!(
            documents = self.docs.len(),
            locations = self.linked.len(),
            "resolved description document"
        );
        Ok(self.builder.finish(root_id))
    }

    /// Return the node for `loc`, following `$ref` chains to a concrete value. New nodes are
    /// reserved and queued for materialization.
    async fn link(&mut self, loc: Location) -> Result<NodeId> {
        let mut chain: Vec<Location> = Vec::new();
        let mut seen: HashSet<Location> = HashSet::new();
        let mut cur = loc;

        let id = loop {
            if let Some(id) = self.linked.get(&cur).copied() {
                break id;
            }
            if !seen.insert(cur.clone()) {
                chain.push(cur);
                return Err(ResolutionError::Circular {
                    chain: chain.iter().map(Location::display).collect(),
                });
            }

            let doc = self.load(&cur.doc).await?;
            let value = lookup(&doc, &cur)?;
            let next = match reference_of(value) {
                Some(reference) => Some(parse_ref(&cur.doc, reference)?),
                None => None,
            };
            chain.push(cur.clone());

            match next {
                Some(target) => cur = target,
                None => {
                    let id = self.builder.reserve();
                    self.pending.push((id, cur));
                    break id;
                }
            }
        };

        for loc in chain {
            self.linked.insert(loc, id);
        }
        Ok(id)
    }

    /// Fill a reserved node with the value at `loc`, linking its children.
    async fn materialize(&mut self, id: NodeId, loc: &Location) -> Result<()> {
        let doc = self.load(&loc.doc).await?;
        let value = lookup(&doc, loc)?;

        let node = match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(n.clone()),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => {
                let mut ids = Vec::with_capacity(items.len());
                for i in 0..items.len() {
                    ids.push(self.link(loc.child(&i.to_string())).await?);
                }
                Node::Array(ids)
            }
            Value::Object(map) => {
                let mut ids = IndexMap::with_capacity(map.len());
                for key in map.keys() {
                    let child = self.link(loc.child(key)).await?;
                    ids.insert(key.clone(), child);
                }
                Node::Object(ids)
            }
        };

        self.builder.set(id, node);
        Ok(())
    }

    async fn load(&mut self, url: &Url) -> Result<Arc<Value>> {
        if let Some(doc) = self.docs.get(url) {
            return Ok(Arc::clone(doc));
        }

        let content = self.fetcher.fetch_text(url).await?;
        let parsed = parse_document(&content).map_err(|message| ResolutionError::Parse {
            url: url.to_string(),
            message,
        })?;

        let parsed = Arc::new(parsed);
        self.docs.insert(url.clone(), Arc::clone(&parsed));
        Ok(parsed)
    }
}

/// Parse a document body as JSON, then as YAML. Bare scalars (an HTML page parses as a YAML
/// string) are rejected.
fn parse_document(content: &str) -> std::result::Result<Value, String> {
    let value: Value = serde_json::from_str(content).or_else(|json_err| {
        serde_yaml::from_str(content)
            .map_err(|yaml_err| format!("not JSON ({json_err}) or YAML ({yaml_err})"))
    })?;
    if value.is_object() || value.is_array() {
        Ok(value)
    } else {
        Err("expected a JSON or YAML object at the document root".to_string())
    }
}

fn lookup<'v>(doc: &'v Value, loc: &Location) -> Result<&'v Value> {
    doc.pointer(&loc.pointer)
        .ok_or_else(|| ResolutionError::Dangling {
            reference: loc.display(),
            url: loc.doc.to_string(),
            pointer: loc.pointer.clone(),
        })
}

fn reference_of(value: &Value) -> Option<&str> {
    value.as_object()?.get("$ref")?.as_str()
}

fn parse_ref(current: &Url, reference: &str) -> Result<Location> {
    let (doc_part, fragment) = match reference.split_once('#') {
        Some((d, f)) => (d, f),
        None => (reference, ""),
    };

    if !fragment.is_empty() && !fragment.starts_with('/') {
        return Err(ResolutionError::InvalidReference {
            reference: reference.to_string(),
            message: "fragment must be a JSON pointer starting with '/'".to_string(),
        });
    }

    let doc = if doc_part.is_empty() {
        current.clone()
    } else {
        let joined = current
            .join(doc_part)
            .map_err(|e| ResolutionError::InvalidReference {
                reference: reference.to_string(),
                message: format!("cannot resolve against {current}: {e}"),
            })?;
        strip_fragment(joined)
    };

    // Pointers inside a URI fragment are percent-encoded.
    let pointer = urlencoding::decode(fragment).map_err(|e| ResolutionError::InvalidReference {
        reference: reference.to_string(),
        message: format!("fragment is not valid percent-encoded UTF-8: {e}"),
    })?;

    Ok(Location {
        doc,
        pointer: pointer.into_owned(),
    })
}

fn strip_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}
