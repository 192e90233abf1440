//! Tool-level composition: the text each tool returns for a loaded document.

use crate::document::ApiDocument;
use crate::error::Result;
use crate::filter::PathFilter;
use crate::loader::{DocumentSource, LoadedDocument};
use crate::mock::synthesize_example;
use crate::normalize::project_operation;
use crate::sanitize::{Sanitizer, Shape};
use crate::typegen::synthesize_types;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use url::Url;

pub const DEFAULT_MAX_DEPTH: usize = 20;
pub const DEFAULT_LIMIT_PATHS: usize = 50;
pub const DEFAULT_LIMIT_OPS: usize = 200;

/// Options for [`read_api`]. Limits of `0` mean unlimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub keyword: Option<String>,
    pub tag: Option<String>,
    pub generate_types: bool,
    pub generate_mock: bool,
    pub max_depth: usize,
    pub limit_paths: usize,
    pub limit_ops: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            keyword: None,
            tag: None,
            generate_types: true,
            generate_mock: false,
            max_depth: DEFAULT_MAX_DEPTH,
            limit_paths: DEFAULT_LIMIT_PATHS,
            limit_ops: DEFAULT_LIMIT_OPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub name: String,
    pub description: String,
}

/// Plain-text reachability summary for `health-check`.
///
/// # Errors
///
/// Returns [`crate::error::OpenApiToolsError::Document`] if the document has no dialect marker.
pub fn health_report(loaded: &LoadedDocument, url: &Url) -> Result<String> {
    let doc = ApiDocument::from_graph(&loaded.graph)?;
    let mut out = String::new();
    let _ = writeln!(out, "API description at {url} is reachable.");
    let _ = writeln!(
        out,
        "Format: {} {}",
        doc.dialect.name(),
        doc.dialect.version()
    );
    let _ = writeln!(
        out,
        "Title: {}",
        doc.info.title.as_deref().unwrap_or("(untitled)")
    );
    let _ = writeln!(
        out,
        "API version: {}",
        doc.info.version.as_deref().unwrap_or("(unspecified)")
    );
    let _ = writeln!(out, "Paths: {}", doc.paths.len());
    let _ = writeln!(out, "Operations: {}", doc.operation_count());
    match &loaded.source {
        DocumentSource::Resolved => {
            let _ = write!(out, "References: fully resolved");
        }
        DocumentSource::Fallback { resolution_error } => {
            let _ = write!(
                out,
                "References: not expanded (raw fallback read; resolution failed: {resolution_error})"
            );
        }
    }
    Ok(out)
}

/// Declared tags plus every tag used by an operation, de-duplicated and sorted by name.
/// A declared description wins over an undeclared (empty) one.
///
/// # Errors
///
/// Returns [`crate::error::OpenApiToolsError::Document`] if the document has no dialect marker.
pub fn tag_catalog(loaded: &LoadedDocument) -> Result<Vec<TagSummary>> {
    let doc = ApiDocument::from_graph(&loaded.graph)?;
    let mut tags: BTreeMap<String, String> = BTreeMap::new();

    for tag in &doc.tags {
        let description = tag.description.clone().unwrap_or_default();
        let slot = tags.entry(tag.name.clone()).or_default();
        if slot.is_empty() {
            *slot = description;
        }
    }
    for op in doc.paths.iter().flat_map(|p| &p.operations) {
        for name in &op.tags {
            tags.entry(name.clone()).or_default();
        }
    }

    Ok(tags
        .into_iter()
        .map(|(name, description)| TagSummary { name, description })
        .collect())
}

/// `list-tags` output: pretty-printed JSON array of `{name, description}`.
///
/// # Errors
///
/// Returns an error if the document has no dialect marker.
pub fn list_tags_json(loaded: &LoadedDocument) -> Result<String> {
    let tags = tag_catalog(loaded)?;
    Ok(serde_json::to_string_pretty(&tags)?)
}

/// `read-api` output: filtered, bounded JSON summary, optionally followed by type definitions.
///
/// When no path matches, a plain diagnostic naming the filters is returned instead and neither
/// mock nor type synthesis runs.
///
/// # Errors
///
/// Returns an error if the document has no dialect marker.
pub fn read_api(loaded: &LoadedDocument, url: &Url, options: &ReadOptions) -> Result<String> {
    let doc = ApiDocument::from_graph(&loaded.graph)?;
    let filter = PathFilter::new(options.keyword.as_deref(), options.tag.as_deref());
    let filtered = filter.apply(&doc.paths);

    if filtered.match_count == 0 {
        return Ok(no_match_diagnostic(&filter, doc.paths.len()));
    }

    let mut paths = Shape::object();
    let mut returned_ops = 0usize;
    let mut ops_truncated = false;
    let paths_truncated = options.limit_paths != 0 && filtered.match_count > options.limit_paths;

    let kept = if options.limit_paths == 0 {
        filtered.entries.len()
    } else {
        options.limit_paths
    };
    for entry in filtered.entries.iter().take(kept) {
        let mut methods = Shape::object();
        for op in &entry.operations {
            if options.limit_ops != 0 && returned_ops >= options.limit_ops {
                ops_truncated = true;
                break;
            }
            let mut projected = project_operation(op);
            if options.generate_mock
                && let Some(schema) = op.first_success_schema()
            {
                projected.insert(
                    "mockResponse".into(),
                    Shape::Value(synthesize_example(schema)),
                );
            }
            methods.insert(op.method.as_str().to_string(), Shape::Object(projected));
            returned_ops += 1;
        }
        // A path whose first operation is already past the limit is dropped; a path with no
        // operations at all is still reported.
        if ops_truncated && methods.is_empty() {
            break;
        }
        paths.insert(entry.path.clone(), Shape::Object(methods));
        if ops_truncated {
            break;
        }
    }

    let returned_paths = paths.len();
    let paths_truncated =
        paths_truncated || (ops_truncated && returned_paths < filtered.match_count);
    let sanitized = Sanitizer::new(&loaded.graph, options.max_depth).sanitize(&Shape::Object(paths));

    let mut meta = json!({
        "title": doc.info.title.as_deref().unwrap_or_default(),
        "version": doc.info.version.as_deref().unwrap_or_default(),
        "specVersion": doc.dialect.version(),
        "dialect": doc.dialect.name(),
        "source": loaded.source.label(),
        "filters": {
            "keyword": filter.keyword(),
            "tag": filter.tag(),
        },
        "totalPaths": doc.paths.len(),
        "matchedPaths": filtered.match_count,
        "returnedPaths": returned_paths,
        "returnedOperations": returned_ops,
        "truncated": {
            "paths": paths_truncated,
            "operations": ops_truncated,
        },
        "limits": {
            "maxDepth": options.max_depth,
            "limitPaths": options.limit_paths,
            "limitOps": options.limit_ops,
        },
    });
    if let (DocumentSource::Fallback { resolution_error }, Value::Object(map)) =
        (&loaded.source, &mut meta)
    {
        map.insert(
            "resolutionError".into(),
            Value::String(resolution_error.clone()),
        );
    }

    let output = json!({
        "_meta": meta,
        "baseUrl": doc.base_url(url),
        "paths": sanitized,
    });
    let mut text = serde_json::to_string_pretty(&output)?;

    if options.generate_types {
        text.push_str("\n\n");
        text.push_str(&type_section(&doc));
    }
    Ok(text)
}

/// Type definitions, or an inline diagnostic when synthesis fails.
fn type_section(doc: &ApiDocument<'_>) -> String {
    match synthesize_types(doc.schema_table) {
        Ok(types) => types,
        Err(e) => {
            tracing::warn!(error = %e, "type generation failed");
            format!("// Type generation failed: {e}\n")
        }
    }
}

fn no_match_diagnostic(filter: &PathFilter, total_paths: usize) -> String {
    format!(
        "No paths matched the given filters ({}). The document has {total_paths} path(s). \
         Try a broader keyword, check the tag name with list-tags, or omit the filters.",
        filter.describe()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DocumentGraph;

    fn loaded(doc: &Value) -> LoadedDocument {
        LoadedDocument {
            graph: DocumentGraph::from_value(doc),
            source: DocumentSource::Resolved,
        }
    }

    fn url() -> Url {
        Url::parse("https://docs.example.com/openapi.json").unwrap()
    }

    fn petstore() -> Value {
        json!({
            "openapi": "3.0.3",
            "info": { "title": "Petstore", "version": "1.2.3" },
            "servers": [{ "url": "https://petstore.example.com/v3" }],
            "tags": [
                { "name": "store", "description": "Orders" },
                { "name": "pet", "description": "Pets" }
            ],
            "paths": {
                "/pets": {
                    "get": { "summary": "List pets", "tags": ["pet"],
                             "responses": { "200": { "description": "ok", "content": {
                                 "application/json": { "schema": {
                                     "type": "array", "items": { "type": "object", "properties": {
                                         "id": { "type": "integer" } } } } } } } } },
                    "post": { "summary": "Create a pet", "tags": ["pet", "admin"] }
                },
                "/store/orders": {
                    "get": { "summary": "List orders", "tags": ["store"] }
                },
                "/users": {
                    "get": { "summary": "List users", "tags": ["user"] }
                }
            },
            "components": { "schemas": {
                "Pet": { "type": "object", "properties": { "id": { "type": "integer" } } }
            } }
        })
    }

    fn json_part(text: &str) -> Value {
        let end = text.find("\n\n").unwrap_or(text.len());
        serde_json::from_str(&text[..end]).unwrap()
    }

    #[test]
    fn health_report_summarizes_document() {
        let text = health_report(&loaded(&petstore()), &url()).unwrap();
        assert!(text.contains("Format: OpenAPI 3.0.3"));
        assert!(text.contains("Title: Petstore"));
        assert!(text.contains("API version: 1.2.3"));
        assert!(text.contains("Paths: 3"));
        assert!(text.contains("Operations: 4"));
        assert!(text.contains("fully resolved"));
    }

    #[test]
    fn tag_catalog_unions_declared_and_used() {
        let tags = tag_catalog(&loaded(&petstore())).unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["admin", "pet", "store", "user"]);
        assert_eq!(tags[1].description, "Pets");
        assert_eq!(tags[0].description, "");
    }

    #[test]
    fn read_api_default_output() {
        let text = read_api(&loaded(&petstore()), &url(), &ReadOptions::default()).unwrap();
        let out = json_part(&text);
        assert_eq!(out["baseUrl"], "https://petstore.example.com/v3");
        assert_eq!(out["_meta"]["title"], "Petstore");
        assert_eq!(out["_meta"]["source"], "resolved");
        assert_eq!(out["_meta"]["matchedPaths"], 3);
        assert_eq!(out["_meta"]["returnedOperations"], 4);
        assert!(out["_meta"].get("resolutionError").is_none());
        assert!(out["paths"]["/pets"]["get"].get("mockResponse").is_none());
        assert!(text.contains("export interface Pet {"));
    }

    #[test]
    fn read_api_mock_and_no_types() {
        let options = ReadOptions {
            keyword: Some("pets".into()),
            generate_types: false,
            generate_mock: true,
            ..ReadOptions::default()
        };
        let text = read_api(&loaded(&petstore()), &url(), &options).unwrap();
        assert!(!text.contains("export"));
        let out: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(out["paths"]["/pets"]["get"]["mockResponse"], json!([{ "id": 0 }]));
        assert!(out["paths"]["/pets"]["post"].get("mockResponse").is_none());
        assert_eq!(out["_meta"]["filters"], json!({ "keyword": "pets", "tag": null }));
    }

    #[test]
    fn read_api_limits() {
        let options = ReadOptions {
            limit_paths: 2,
            limit_ops: 0,
            generate_types: false,
            ..ReadOptions::default()
        };
        let out: Value =
            serde_json::from_str(&read_api(&loaded(&petstore()), &url(), &options).unwrap())
                .unwrap();
        assert_eq!(out["_meta"]["returnedPaths"], 2);
        assert_eq!(out["_meta"]["truncated"]["paths"], true);
        assert_eq!(out["_meta"]["truncated"]["operations"], false);

        let options = ReadOptions {
            limit_paths: 0,
            limit_ops: 1,
            generate_types: false,
            ..ReadOptions::default()
        };
        let out: Value =
            serde_json::from_str(&read_api(&loaded(&petstore()), &url(), &options).unwrap())
                .unwrap();
        assert_eq!(out["_meta"]["returnedOperations"], 1);
        assert_eq!(out["_meta"]["returnedPaths"], 1);
        assert_eq!(out["_meta"]["truncated"]["operations"], true);
        assert!(out["paths"]["/pets"].get("post").is_none());
    }

    #[test]
    fn matched_path_without_operations_is_kept() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/users": { "parameters": [{ "name": "org", "in": "query" }] },
                "/users/{id}": { "get": { "summary": "Get a user" } }
            }
        });
        let options = ReadOptions {
            keyword: Some("user".into()),
            generate_types: false,
            ..ReadOptions::default()
        };
        let out = json_part(&read_api(&loaded(&doc), &url(), &options).unwrap());
        assert_eq!(out["_meta"]["matchedPaths"], 2);
        assert_eq!(out["_meta"]["returnedPaths"], 2);
        assert_eq!(out["_meta"]["truncated"]["paths"], false);
        assert_eq!(out["_meta"]["truncated"]["operations"], false);
        assert_eq!(out["paths"]["/users"], json!({}));
        assert_eq!(out["paths"]["/users/{id}"]["get"]["summary"], "Get a user");
    }

    #[test]
    fn zero_matches_return_diagnostic_text() {
        let options = ReadOptions {
            keyword: Some("nothing-matches-this".into()),
            tag: Some("pet".into()),
            generate_mock: true,
            ..ReadOptions::default()
        };
        let text = read_api(&loaded(&petstore()), &url(), &options).unwrap();
        assert!(text.starts_with("No paths matched"));
        assert!(text.contains("keyword=\"nothing-matches-this\""));
        assert!(text.contains("tag=\"pet\""));
        assert!(serde_json::from_str::<Value>(&text).is_err());
        assert!(!text.contains("export"));
    }

    #[test]
    fn type_failure_is_inlined() {
        let mut doc = petstore();
        doc["components"]["schemas"] = json!(["broken"]);
        let text = read_api(&loaded(&doc), &url(), &ReadOptions::default()).unwrap();
        assert!(text.contains("// Type generation failed: schema definition table is an array"));
        assert_eq!(json_part(&text)["_meta"]["matchedPaths"], 3);
    }

    #[test]
    fn fallback_source_is_reported() {
        let loaded = LoadedDocument {
            graph: DocumentGraph::from_value(&petstore()),
            source: DocumentSource::Fallback {
                resolution_error: "HTTP 404 Not Found from https://x/common.yaml".into(),
            },
        };
        let text = read_api(&loaded, &url(), &ReadOptions::default()).unwrap();
        let out = json_part(&text);
        assert_eq!(out["_meta"]["source"], "fallback");
        assert!(out["_meta"]["resolutionError"]
            .as_str()
            .unwrap()
            .contains("404"));

        let health = health_report(&loaded, &url()).unwrap();
        assert!(health.contains("raw fallback read"));
    }
}
