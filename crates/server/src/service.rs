//! MCP tool surface: `health-check`, `list-tags` and `read-api`.
//!
//! Failures inside a tool are returned as successful protocol responses with `is_error` set;
//! only an unknown tool name is reported as a protocol error.

use crate::args::{ArgsError, ArgsValidator, HealthCheckArgs, ListTagsArgs, ReadApiArgs};
use crate::config::ServerConfig;
use apidoc_http_tools::safety::redact_url;
use apidoc_openapi_tools::error::Result as ToolsResult;
use apidoc_openapi_tools::loader::DocumentLoader;
use apidoc_openapi_tools::report::{ReadOptions, health_report, list_tags_json, read_api};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    Tool, ToolAnnotations,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

pub const HEALTH_CHECK: &str = "health-check";
pub const LIST_TAGS: &str = "list-tags";
pub const READ_API: &str = "read-api";

const REMEDIATION_HINT: &str = "Check that the URL is reachable and serves an OpenAPI 3.x or \
Swagger 2.0 document as JSON or YAML. If $ref resolution keeps failing, call again with \
use_fallback=true to read the document without expanding references.";

const INSTRUCTIONS: &str = "Reads OpenAPI/Swagger documents by URL. Call health-check to confirm \
a document is reachable, list-tags to discover its tag vocabulary, then read-api with a keyword \
and/or tag to get resolved operations, a base URL and optional TypeScript definitions.";

#[derive(Debug)]
struct Validators {
    health_check: ArgsValidator<HealthCheckArgs>,
    list_tags: ArgsValidator<ListTagsArgs>,
    read_api: ArgsValidator<ReadApiArgs>,
}

/// The MCP server handler.
#[derive(Debug, Clone)]
pub struct ApiDocService {
    config: Arc<ServerConfig>,
    validators: Arc<Validators>,
}

impl ApiDocService {
    /// # Errors
    ///
    /// Returns [`ArgsError::Schema`] if an argument schema fails to compile.
    pub fn new(config: Arc<ServerConfig>) -> Result<Self, ArgsError> {
        let validators = Validators {
            health_check: ArgsValidator::new()?,
            list_tags: ArgsValidator::new()?,
            read_api: ArgsValidator::new()?,
        };
        Ok(Self {
            config,
            validators: Arc::new(validators),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The three tools with their argument schemas.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        vec![
            tool(
                HEALTH_CHECK,
                "Check that an OpenAPI/Swagger document is reachable and report its format \
                 version, title and endpoint counts.",
                self.validators.health_check.schema(),
                "API document health check",
            ),
            tool(
                LIST_TAGS,
                "List every tag of an OpenAPI/Swagger document (declared or used by an \
                 operation) as a JSON array of {name, description}, sorted by name.",
                self.validators.list_tags.schema(),
                "List API tags",
            ),
            tool(
                READ_API,
                "Read the operations of an OpenAPI/Swagger document with all $refs resolved, \
                 filtered by keyword and/or tag, with optional mock responses and TypeScript \
                 type definitions.",
                self.validators.read_api.schema(),
                "Read API operations",
            ),
        ]
    }

    /// Run the tool called `name`.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_params` error only for an unknown tool name.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match name {
            HEALTH_CHECK => match self.validators.health_check.validate(arguments) {
                Ok((_, url)) => {
                    let started = log_call(name, &url);
                    finish(name, &url, started, self.health_check(&url).await)
                }
                Err(e) => rejected(name, &e),
            },
            LIST_TAGS => match self.validators.list_tags.validate(arguments) {
                Ok((args, url)) => {
                    let started = log_call(name, &url);
                    let outcome = self.list_tags(&url, args.use_fallback).await;
                    finish(name, &url, started, outcome)
                }
                Err(e) => rejected(name, &e),
            },
            READ_API => match self.validators.read_api.validate(arguments) {
                Ok((args, url)) => {
                    let started = log_call(name, &url);
                    let options = ReadOptions::from(&args);
                    let outcome = self.read_api(&url, args.use_fallback, &options).await;
                    finish(name, &url, started, outcome)
                }
                Err(e) => rejected(name, &e),
            },
            other => {
                return Err(ErrorData::invalid_params(
                    format!("unknown tool: {other}"),
                    None,
                ));
            }
        };
        Ok(result)
    }

    fn loader(&self) -> DocumentLoader {
        DocumentLoader::new(self.config.fetcher())
    }

    async fn health_check(&self, url: &Url) -> ToolsResult<String> {
        let loaded = self.loader().load(url, true).await?;
        health_report(&loaded, url)
    }

    async fn list_tags(&self, url: &Url, use_fallback: bool) -> ToolsResult<String> {
        let loaded = self.loader().load(url, use_fallback).await?;
        list_tags_json(&loaded)
    }

    async fn read_api(
        &self,
        url: &Url,
        use_fallback: bool,
        options: &ReadOptions,
    ) -> ToolsResult<String> {
        let loaded = self.loader().load(url, use_fallback).await?;
        read_api(&loaded, url, options)
    }
}

fn rejected(name: &str, err: &ArgsError) -> CallToolResult {
    tracing::info!(tool = name, error = %err, "rejected tool arguments");
    CallToolResult::error(vec![Content::text(format!("Invalid arguments: {err}"))])
}

fn log_call(name: &str, url: &Url) -> Instant {
    tracing::info!(tool = name, url = %redact_url(url), "tool call");
    Instant::now()
}

fn finish(name: &str, url: &Url, started: Instant, outcome: ToolsResult<String>) -> CallToolResult {
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match outcome {
        Ok(text) => {
            tracing::debug!(tool = name, elapsed_ms, bytes = text.len(), "tool call done");
            CallToolResult::success(vec![Content::text(text)])
        }
        Err(e) => {
            tracing::error!(
                tool = name,
                url = %redact_url(url),
                elapsed_ms,
                error = %e,
                "tool call failed"
            );
            CallToolResult::error(vec![Content::text(format!(
                "Error: {e}\n\n{REMEDIATION_HINT}"
            ))])
        }
    }
}

fn tool(name: &'static str, description: &'static str, schema: &JsonObject, title: &str) -> Tool {
    let mut tool = Tool::new(name, description, Arc::new(schema.clone()));
    tool.annotations = Some(ToolAnnotations {
        title: Some(title.to_string()),
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        idempotent_hint: Some(true),
        open_world_hint: Some(true),
    });
    tool
}

impl ServerHandler for ApiDocService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "apidoc-mcp".to_string(),
                version: self.config.version.clone(),
                title: Some("API documentation reader".to_string()),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tools(),
            ..Default::default()
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move { self.call(&request.name, request.arguments).await }
    }
}
