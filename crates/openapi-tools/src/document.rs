//! Typed view of a description document.
//!
//! The dialect is detected once, at ingestion, and both Swagger 2 and OpenAPI 3 documents are
//! converted into the same model. Downstream stages never branch on the dialect again except
//! where the output itself differs (response `content` vs `schema`).
//!
//! Schemas are not copied: they stay as [`NodeRef`] handles into the graph so that identity
//! (and cycles) are preserved for the sanitizer and the synthesizers.

use crate::error::{OpenApiToolsError, Result};
use crate::graph::{DocumentGraph, Node, NodeRef};
use std::collections::HashMap;
use url::Url;

const DEFAULT_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    Swagger2 { version: String },
    OpenApi3 { version: String },
}

impl Dialect {
    /// Detect the dialect from the root `openapi` / `swagger` marker.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiToolsError::Document`] when neither marker is present.
    pub fn detect(root: NodeRef<'_>) -> Result<Self> {
        if let Some(version) = root.get("openapi").and_then(version_text) {
            return Ok(Dialect::OpenApi3 { version });
        }
        if let Some(version) = root.get("swagger").and_then(version_text) {
            return Ok(Dialect::Swagger2 { version });
        }
        Err(OpenApiToolsError::Document(format!(
            "root is {} without an 'openapi' or 'swagger' version field",
            root.kind_name()
        )))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Swagger2 { .. } => "Swagger",
            Dialect::OpenApi3 { .. } => "OpenAPI",
        }
    }

    #[must_use]
    pub fn version(&self) -> &str {
        match self {
            Dialect::Swagger2 { version } | Dialect::OpenApi3 { version } => version,
        }
    }

    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(self, Dialect::Swagger2 { .. })
    }
}

/// Version markers are usually strings, but `swagger: 2.0` in YAML is a number.
fn version_text(node: NodeRef<'_>) -> Option<String> {
    match node.node() {
        Node::String(s) => Some(s.clone()),
        Node::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Trace,
    ];

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == token)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
    pub title: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    pub description: Option<String>,
}

/// Where the API is served. Swagger 2 uses `host`/`basePath`/`schemes`, OpenAPI 3 `servers`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerMetadata {
    pub host: Option<String>,
    pub base_path: Option<String>,
    pub schemes: Vec<String>,
    /// Server URLs with `{variable}` placeholders replaced by their defaults.
    pub server_urls: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ApiDocument<'g> {
    pub dialect: Dialect,
    pub info: Info,
    pub tags: Vec<TagInfo>,
    pub servers: ServerMetadata,
    pub paths: Vec<PathEntry<'g>>,
    /// `components.schemas` (OpenAPI 3) or `definitions` (Swagger 2).
    pub schema_table: Option<NodeRef<'g>>,
}

#[derive(Debug, Clone)]
pub struct PathEntry<'g> {
    pub path: String,
    pub operations: Vec<Operation<'g>>,
}

#[derive(Debug, Clone)]
pub struct Operation<'g> {
    pub method: HttpMethod,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter<'g>>,
    pub request_body: Option<RequestBody<'g>>,
    pub responses: Vec<Response<'g>>,
}

#[derive(Debug, Clone)]
pub enum Parameter<'g> {
    Defined(ParameterSpec<'g>),
    /// A `$ref` left unexpanded (raw fallback read).
    Reference(String),
}

#[derive(Debug, Clone)]
pub struct ParameterSpec<'g> {
    pub name: String,
    pub location: String,
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<ValueSchema<'g>>,
}

/// The value schema of a parameter.
#[derive(Debug, Clone)]
pub enum ValueSchema<'g> {
    /// An explicit `schema` member (or the schema of the first `content` media type).
    Explicit(NodeRef<'g>),
    /// Synthesized from the legacy flat `type`/`format`/`items`/`enum`/`default` members.
    Flat(FlatSchema<'g>),
}

#[derive(Debug, Clone)]
pub struct FlatSchema<'g> {
    pub type_name: String,
    pub format: Option<String>,
    pub items: Option<NodeRef<'g>>,
    pub enum_values: Option<NodeRef<'g>>,
    pub default: Option<NodeRef<'g>>,
}

#[derive(Debug, Clone)]
pub struct RequestBody<'g> {
    pub required: bool,
    pub description: Option<String>,
    pub content: BodyContent<'g>,
}

#[derive(Debug, Clone)]
pub enum BodyContent<'g> {
    /// The content-type map of an OpenAPI 3 `requestBody` (or a `$ref` to one).
    Map(NodeRef<'g>),
    /// Built from a Swagger 2 `in: body` parameter.
    Synthesized {
        media_type: String,
        schema: Option<NodeRef<'g>>,
    },
}

#[derive(Debug, Clone)]
pub struct Response<'g> {
    pub status: String,
    pub description: Option<String>,
    pub body: ResponseBody<'g>,
    /// Set when the response is an unexpanded `$ref`.
    pub reference: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ResponseBody<'g> {
    /// OpenAPI 3 content-type map.
    Content(NodeRef<'g>),
    /// Swagger 2 flat schema.
    Schema(NodeRef<'g>),
    Empty,
}

impl<'g> Response<'g> {
    /// The schema used for mock data: the first media type's schema, or the flat schema.
    #[must_use]
    pub fn primary_schema(&self) -> Option<NodeRef<'g>> {
        match self.body {
            ResponseBody::Content(content) => {
                let (_, media) = content.entries().next()?;
                media.get("schema")
            }
            ResponseBody::Schema(schema) => Some(schema),
            ResponseBody::Empty => None,
        }
    }
}

impl<'g> Operation<'g> {
    /// Schema of the first 2xx response, in document order.
    #[must_use]
    pub fn first_success_schema(&self) -> Option<NodeRef<'g>> {
        self.responses
            .iter()
            .find(|r| r.status.starts_with('2'))
            .and_then(Response::primary_schema)
    }
}

impl<'g> ApiDocument<'g> {
    /// Ingest a document graph.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiToolsError::Document`] if the root carries no dialect marker.
    pub fn from_graph(graph: &'g DocumentGraph) -> Result<Self> {
        let root = graph.root();
        let dialect = Dialect::detect(root)?;

        let info = root
            .get("info")
            .map(|info| Info {
                title: info.str_field("title").map(str::to_string),
                version: info.str_field("version").map(str::to_string),
            })
            .unwrap_or_default();

        let tags = root
            .get("tags")
            .into_iter()
            .flat_map(NodeRef::items)
            .filter_map(|tag| {
                Some(TagInfo {
                    name: tag.str_field("name")?.to_string(),
                    description: tag.str_field("description").map(str::to_string),
                })
            })
            .collect();

        let servers = ServerMetadata {
            host: root.str_field("host").map(str::to_string),
            base_path: root.str_field("basePath").map(str::to_string),
            schemes: root.string_list("schemes"),
            server_urls: root
                .get("servers")
                .into_iter()
                .flat_map(NodeRef::items)
                .filter_map(expand_server_url)
                .collect(),
        };

        let schema_table = if dialect.is_legacy() {
            root.get("definitions")
        } else {
            root.get("components").and_then(|c| c.get("schemas"))
        };

        let doc_consumes = root.string_list("consumes");
        let paths = root
            .get("paths")
            .into_iter()
            .flat_map(NodeRef::entries)
            .map(|(path, item)| PathEntry {
                path: path.to_string(),
                operations: ingest_path_item(item, &dialect, &doc_consumes),
            })
            .collect();

        Ok(Self {
            dialect,
            info,
            tags,
            servers,
            paths,
            schema_table,
        })
    }

    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.paths.iter().map(|p| p.operations.len()).sum()
    }

    /// Base URL the API is served from; empty when the document declares none.
    ///
    /// A legacy `host` wins, using the first declared scheme or the fetch URL's scheme. Otherwise
    /// the first server URL is used, resolved against `fetch_url` when it is relative.
    #[must_use]
    pub fn base_url(&self, fetch_url: &Url) -> String {
        if let Some(host) = self.servers.host.as_deref().filter(|h| !h.is_empty()) {
            let scheme = self
                .servers
                .schemes
                .first()
                .map_or_else(|| fetch_url.scheme(), String::as_str);
            let base_path = self.servers.base_path.as_deref().unwrap_or("");
            return format!("{scheme}://{host}{base_path}");
        }

        let Some(server) = self.servers.server_urls.first() else {
            return String::new();
        };
        if server.starts_with("http://") || server.starts_with("https://") {
            return server.clone();
        }
        let mut base = fetch_url.clone();
        base.set_fragment(None);
        base.set_query(None);
        base.join(server)
            .map_or_else(|_| server.clone(), |u| u.to_string())
    }
}

fn expand_server_url(server: NodeRef<'_>) -> Option<String> {
    let mut url = server.str_field("url")?.to_string();
    if let Some(vars) = server.get("variables") {
        for (name, var) in vars.entries() {
            if let Some(default) = var.str_field("default") {
                url = url.replace(&format!("{{{name}}}"), default);
            }
        }
    }
    Some(url)
}

fn ingest_path_item<'g>(
    item: NodeRef<'g>,
    dialect: &Dialect,
    doc_consumes: &[String],
) -> Vec<Operation<'g>> {
    let shared_params: Vec<NodeRef<'g>> = item
        .get("parameters")
        .into_iter()
        .flat_map(NodeRef::items)
        .collect();

    item.entries()
        .filter_map(|(key, op)| {
            let method = HttpMethod::parse(key)?;
            op.is_object()
                .then(|| ingest_operation(method, op, &shared_params, dialect, doc_consumes))
        })
        .collect()
}

fn ingest_operation<'g>(
    method: HttpMethod,
    op: NodeRef<'g>,
    shared_params: &[NodeRef<'g>],
    dialect: &Dialect,
    doc_consumes: &[String],
) -> Operation<'g> {
    let own_params: Vec<NodeRef<'g>> = op
        .get("parameters")
        .into_iter()
        .flat_map(NodeRef::items)
        .collect();
    let parameters = merge_parameters(shared_params, &own_params);

    let request_body = match op.get("requestBody") {
        Some(body) => Some(modern_request_body(body)),
        None => legacy_body_parameter(&parameters, op, doc_consumes),
    };

    let responses = op
        .get("responses")
        .into_iter()
        .flat_map(NodeRef::entries)
        .map(|(status, response)| ingest_response(status, response, dialect))
        .collect();

    Operation {
        method,
        summary: op.str_field("summary").map(str::to_string),
        description: op.str_field("description").map(str::to_string),
        operation_id: op.str_field("operationId").map(str::to_string),
        tags: op.string_list("tags"),
        parameters,
        request_body,
        responses,
    }
}

/// Path-item parameters first, then operation parameters; an operation parameter with the same
/// `(name, in)` replaces the path-item one in place.
fn merge_parameters<'g>(shared: &[NodeRef<'g>], own: &[NodeRef<'g>]) -> Vec<Parameter<'g>> {
    let mut merged: Vec<Parameter<'g>> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for node in shared.iter().chain(own) {
        let param = ingest_parameter(*node);
        let key = match &param {
            Parameter::Defined(spec) => Some((spec.name.clone(), spec.location.clone())),
            Parameter::Reference(_) => None,
        };
        match key {
            Some(key) => match index.get(&key) {
                Some(&i) => merged[i] = param,
                None => {
                    index.insert(key, merged.len());
                    merged.push(param);
                }
            },
            None => merged.push(param),
        }
    }

    merged
}

fn ingest_parameter(node: NodeRef<'_>) -> Parameter<'_> {
    if let Some(reference) = node.reference() {
        return Parameter::Reference(reference.to_string());
    }
    Parameter::Defined(ParameterSpec {
        name: node.str_field("name").unwrap_or_default().to_string(),
        location: node.str_field("in").unwrap_or_default().to_string(),
        required: node.bool_field("required").unwrap_or(false),
        description: node.str_field("description").map(str::to_string),
        schema: value_schema(node),
    })
}

/// Explicit `schema` first, then the legacy flat fields, then the first `content` entry.
fn value_schema(param: NodeRef<'_>) -> Option<ValueSchema<'_>> {
    if let Some(schema) = param.get("schema") {
        return Some(ValueSchema::Explicit(schema));
    }
    if let Some(type_name) = param.str_field("type") {
        return Some(ValueSchema::Flat(FlatSchema {
            type_name: type_name.to_string(),
            format: param.str_field("format").map(str::to_string),
            items: param.get("items"),
            enum_values: param.get("enum"),
            default: param.get("default"),
        }));
    }
    let (_, media) = param.get("content")?.entries().next()?;
    media.get("schema").map(ValueSchema::Explicit)
}

fn modern_request_body(body: NodeRef<'_>) -> RequestBody<'_> {
    RequestBody {
        required: body.bool_field("required").unwrap_or(false),
        description: body.str_field("description").map(str::to_string),
        content: BodyContent::Map(body.get("content").unwrap_or(body)),
    }
}

fn legacy_body_parameter<'g>(
    parameters: &[Parameter<'g>],
    op: NodeRef<'g>,
    doc_consumes: &[String],
) -> Option<RequestBody<'g>> {
    let body = parameters.iter().find_map(|p| match p {
        Parameter::Defined(spec) if spec.location == "body" => Some(spec),
        _ => None,
    })?;

    let media_type = op
        .string_list("consumes")
        .into_iter()
        .next()
        .or_else(|| doc_consumes.first().cloned())
        .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

    let schema = match &body.schema {
        Some(ValueSchema::Explicit(schema)) => Some(*schema),
        Some(ValueSchema::Flat(_)) | None => None,
    };

    Some(RequestBody {
        required: body.required,
        description: body.description.clone(),
        content: BodyContent::Synthesized { media_type, schema },
    })
}

fn ingest_response<'g>(status: &str, response: NodeRef<'g>, dialect: &Dialect) -> Response<'g> {
    let body = match dialect {
        Dialect::OpenApi3 { .. } => response
            .get("content")
            .map_or(ResponseBody::Empty, ResponseBody::Content),
        Dialect::Swagger2 { .. } => response
            .get("schema")
            .map_or(ResponseBody::Empty, ResponseBody::Schema),
    };
    Response {
        status: status.to_string(),
        description: response.str_field("description").map(str::to_string),
        body,
        reference: response.reference().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetch_url() -> Url {
        Url::parse("https://docs.example.com/api/openapi.json").unwrap()
    }

    #[test]
    fn detects_dialects() {
        let g = DocumentGraph::from_value(&json!({ "openapi": "3.1.0" }));
        assert_eq!(
            Dialect::detect(g.root()).unwrap(),
            Dialect::OpenApi3 {
                version: "3.1.0".into()
            }
        );

        let g = DocumentGraph::from_value(&json!({ "swagger": 2.0 }));
        let d = Dialect::detect(g.root()).unwrap();
        assert!(d.is_legacy());
        assert_eq!(d.version(), "2.0");

        let g = DocumentGraph::from_value(&json!({ "info": {} }));
        assert!(matches!(
            Dialect::detect(g.root()),
            Err(OpenApiToolsError::Document(_))
        ));
    }

    #[test]
    fn only_recognized_methods_become_operations() {
        let g = DocumentGraph::from_value(&json!({
            "openapi": "3.0.0",
            "paths": {
                "/users": {
                    "summary": "path summary",
                    "parameters": [],
                    "x-internal": { "summary": "nope" },
                    "post": { "summary": "create" },
                    "get": { "summary": "list" }
                }
            }
        }));
        let doc = ApiDocument::from_graph(&g).unwrap();
        let methods: Vec<HttpMethod> = doc.paths[0].operations.iter().map(|o| o.method).collect();
        assert_eq!(methods, vec![HttpMethod::Post, HttpMethod::Get]);
        assert_eq!(doc.operation_count(), 2);
    }

    #[test]
    fn operation_params_override_path_params() {
        let g = DocumentGraph::from_value(&json!({
            "openapi": "3.0.0",
            "paths": {
                "/users/{id}": {
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "description": "shared" },
                        { "name": "trace", "in": "header" }
                    ],
                    "get": {
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "description": "own" },
                            { "name": "id", "in": "query" }
                        ]
                    }
                }
            }
        }));
        let doc = ApiDocument::from_graph(&g).unwrap();
        let params = &doc.paths[0].operations[0].parameters;
        let described: Vec<(String, String, Option<String>)> = params
            .iter()
            .map(|p| match p {
                Parameter::Defined(s) => (s.name.clone(), s.location.clone(), s.description.clone()),
                Parameter::Reference(r) => (r.clone(), String::new(), None),
            })
            .collect();
        assert_eq!(
            described,
            vec![
                ("id".into(), "path".into(), Some("own".into())),
                ("trace".into(), "header".into(), None),
                ("id".into(), "query".into(), None),
            ]
        );
    }

    #[test]
    fn flat_parameter_schema_is_synthesized() {
        let g = DocumentGraph::from_value(&json!({
            "swagger": "2.0",
            "paths": { "/pets": { "get": { "parameters": [
                { "name": "limit", "in": "query", "type": "integer", "format": "int32", "default": 20 },
                { "name": "status", "in": "query", "type": "array", "items": { "type": "string" }, "enum": ["a"] },
                { "name": "opaque", "in": "query" }
            ] } } }
        }));
        let doc = ApiDocument::from_graph(&g).unwrap();
        let params = &doc.paths[0].operations[0].parameters;

        let Parameter::Defined(limit) = &params[0] else {
            panic!("expected defined parameter");
        };
        let Some(ValueSchema::Flat(flat)) = &limit.schema else {
            panic!("expected flat schema");
        };
        assert_eq!(flat.type_name, "integer");
        assert_eq!(flat.format.as_deref(), Some("int32"));
        assert_eq!(flat.default.map(NodeRef::to_value), Some(json!(20)));

        let Parameter::Defined(status) = &params[1] else {
            panic!("expected defined parameter");
        };
        let Some(ValueSchema::Flat(flat)) = &status.schema else {
            panic!("expected flat schema");
        };
        assert_eq!(flat.items.map(NodeRef::to_value), Some(json!({ "type": "string" })));
        assert_eq!(flat.enum_values.map(NodeRef::to_value), Some(json!(["a"])));

        let Parameter::Defined(opaque) = &params[2] else {
            panic!("expected defined parameter");
        };
        assert!(opaque.schema.is_none());
    }

    #[test]
    fn legacy_body_parameter_becomes_request_body() {
        let g = DocumentGraph::from_value(&json!({
            "swagger": "2.0",
            "consumes": ["application/xml"],
            "paths": {
                "/a": { "post": { "parameters": [
                    { "name": "body", "in": "body", "required": true, "description": "payload",
                      "schema": { "type": "object" } }
                ] } },
                "/b": { "post": { "consumes": ["text/plain"], "parameters": [
                    { "name": "body", "in": "body", "schema": { "type": "string" } }
                ] } },
                "/c": { "get": {} }
            }
        }));
        let doc = ApiDocument::from_graph(&g).unwrap();

        let a = doc.paths[0].operations[0].request_body.as_ref().unwrap();
        assert!(a.required);
        assert_eq!(a.description.as_deref(), Some("payload"));
        let BodyContent::Synthesized { media_type, schema } = &a.content else {
            panic!("expected synthesized body");
        };
        assert_eq!(media_type, "application/xml");
        assert_eq!(schema.map(NodeRef::to_value), Some(json!({ "type": "object" })));

        let b = doc.paths[1].operations[0].request_body.as_ref().unwrap();
        assert!(matches!(
            &b.content,
            BodyContent::Synthesized { media_type, .. } if media_type == "text/plain"
        ));

        assert!(doc.paths[2].operations[0].request_body.is_none());
    }

    #[test]
    fn responses_follow_dialect() {
        let modern = DocumentGraph::from_value(&json!({
            "openapi": "3.0.0",
            "paths": { "/x": { "get": { "responses": {
                "404": { "description": "missing" },
                "200": { "description": "ok", "content": {
                    "application/json": { "schema": { "type": "integer" } },
                    "text/plain": { "schema": { "type": "string" } }
                } }
            } } } }
        }));
        let doc = ApiDocument::from_graph(&modern).unwrap();
        let op = &doc.paths[0].operations[0];
        assert!(matches!(op.responses[0].body, ResponseBody::Empty));
        assert_eq!(
            op.first_success_schema().map(NodeRef::to_value),
            Some(json!({ "type": "integer" }))
        );

        let legacy = DocumentGraph::from_value(&json!({
            "swagger": "2.0",
            "paths": { "/x": { "get": { "responses": {
                "201": { "description": "created", "schema": { "type": "boolean" } }
            } } } }
        }));
        let doc = ApiDocument::from_graph(&legacy).unwrap();
        let op = &doc.paths[0].operations[0];
        assert!(matches!(op.responses[0].body, ResponseBody::Schema(_)));
        assert_eq!(
            op.first_success_schema().map(NodeRef::to_value),
            Some(json!({ "type": "boolean" }))
        );
    }

    #[test]
    fn base_url_from_legacy_host() {
        let g = DocumentGraph::from_value(&json!({
            "swagger": "2.0",
            "host": "api.example.com",
            "basePath": "/v1",
            "schemes": ["https", "http"]
        }));
        let doc = ApiDocument::from_graph(&g).unwrap();
        assert_eq!(doc.base_url(&fetch_url()), "https://api.example.com/v1");

        let g = DocumentGraph::from_value(&json!({ "swagger": "2.0", "host": "h.example.com" }));
        let doc = ApiDocument::from_graph(&g).unwrap();
        let http = Url::parse("http://docs.example.com/swagger.json").unwrap();
        assert_eq!(doc.base_url(&http), "http://h.example.com");
    }

    #[test]
    fn base_url_from_servers() {
        let g = DocumentGraph::from_value(&json!({
            "openapi": "3.0.0",
            "servers": [
                { "url": "https://{region}.example.com/v2", "variables": { "region": { "default": "eu" } } },
                { "url": "https://other.example.com" }
            ]
        }));
        let doc = ApiDocument::from_graph(&g).unwrap();
        assert_eq!(doc.base_url(&fetch_url()), "https://eu.example.com/v2");

        let g = DocumentGraph::from_value(&json!({
            "openapi": "3.0.0",
            "servers": [{ "url": "/api/v3" }]
        }));
        let doc = ApiDocument::from_graph(&g).unwrap();
        assert_eq!(doc.base_url(&fetch_url()), "https://docs.example.com/api/v3");

        let g = DocumentGraph::from_value(&json!({ "openapi": "3.0.0" }));
        let doc = ApiDocument::from_graph(&g).unwrap();
        assert_eq!(doc.base_url(&fetch_url()), "");
    }

    #[test]
    fn unresolved_parameter_refs_are_kept() {
        let g = DocumentGraph::from_value(&json!({
            "openapi": "3.0.0",
            "paths": { "/x": { "get": { "parameters": [
                { "$ref": "#/components/parameters/Limit" }
            ] } } }
        }));
        let doc = ApiDocument::from_graph(&g).unwrap();
        assert!(matches!(
            &doc.paths[0].operations[0].parameters[0],
            Parameter::Reference(r) if r == "#/components/parameters/Limit"
        ));
    }
}
