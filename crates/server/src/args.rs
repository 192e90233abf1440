//! Tool argument types and their validation.
//!
//! Each argument type derives its JSON Schema with `schemars`. Incoming arguments are checked
//! against that schema with `jsonschema` before they are deserialized, so every invalid field is
//! reported at once and no network access happens for a rejected call.

use apidoc_openapi_tools::report::{
    DEFAULT_LIMIT_OPS, DEFAULT_LIMIT_PATHS, DEFAULT_MAX_DEPTH, ReadOptions,
};
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    #[error("{}", .issues.join("; "))]
    Invalid { issues: Vec<String> },

    #[error("failed to compile argument schema: {0}")]
    Schema(String),
}

/// Arguments for `health-check`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HealthCheckArgs {
    /// Absolute http(s) URL of the OpenAPI or Swagger document.
    pub url: String,
}

/// Arguments for `list-tags`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTagsArgs {
    /// Absolute http(s) URL of the OpenAPI or Swagger document.
    pub url: String,

    /// Read the document without expanding references if resolution fails.
    #[serde(default = "default_true")]
    pub use_fallback: bool,
}

/// Arguments for `read-api`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadApiArgs {
    /// Absolute http(s) URL of the OpenAPI or Swagger document.
    pub url: String,

    /// Read the document without expanding references if resolution fails.
    #[serde(default = "default_true")]
    pub use_fallback: bool,

    /// Case-insensitive substring matched against path, summary and description.
    #[serde(default)]
    pub keyword: Option<String>,

    /// Exact (case-sensitive) tag an operation must carry.
    #[serde(default)]
    pub tag: Option<String>,

    /// Append TypeScript definitions for the document's schema table.
    #[serde(default = "default_true")]
    pub generate_types: bool,

    /// Add a synthesized `mockResponse` to each operation with a success schema.
    #[serde(default)]
    pub generate_mock: bool,

    /// Nesting depth after which output is truncated.
    #[serde(default = "default_max_depth")]
    #[schemars(range(min = 1, max = 100))]
    pub max_depth: usize,

    /// Maximum number of paths in the output (0 = unlimited).
    #[serde(default = "default_limit_paths")]
    #[schemars(range(min = 0, max = 10000))]
    pub limit_paths: usize,

    /// Maximum number of operations in the output (0 = unlimited).
    #[serde(default = "default_limit_ops")]
    #[schemars(range(min = 0, max = 10000))]
    pub limit_ops: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_limit_paths() -> usize {
    DEFAULT_LIMIT_PATHS
}

fn default_limit_ops() -> usize {
    DEFAULT_LIMIT_OPS
}

impl From<&ReadApiArgs> for ReadOptions {
    fn from(args: &ReadApiArgs) -> Self {
        Self {
            keyword: args.keyword.clone(),
            tag: args.tag.clone(),
            generate_types: args.generate_types,
            generate_mock: args.generate_mock,
            max_depth: args.max_depth,
            limit_paths: args.limit_paths,
            limit_ops: args.limit_ops,
        }
    }
}

/// The input schema of `T` as an MCP tool schema object.
#[must_use]
pub fn input_schema<T: JsonSchema>() -> JsonObject {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(map)) => map,
        _ => JsonObject::new(),
    }
}

/// Compiled validator for one argument type.
pub struct ArgsValidator<T> {
    schema: JsonObject,
    validator: jsonschema::Validator,
    _args: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for ArgsValidator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgsValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl<T> ArgsValidator<T>
where
    T: JsonSchema + DeserializeOwned,
{
    /// # Errors
    ///
    /// Returns [`ArgsError::Schema`] if the derived schema does not compile.
    pub fn new() -> Result<Self, ArgsError> {
        let schema = input_schema::<T>();
        let validator = jsonschema::validator_for(&Value::Object(schema.clone()))
            .map_err(|e| ArgsError::Schema(e.to_string()))?;
        Ok(Self {
            schema,
            validator,
            _args: PhantomData,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &JsonObject {
        &self.schema
    }

    /// Check `arguments` against the schema and the `url` field against the URL rules, then
    /// deserialize them.
    ///
    /// # Errors
    ///
    /// Returns [`ArgsError::Invalid`] listing every schema violation and URL problem.
    pub fn validate(&self, arguments: Option<JsonObject>) -> Result<(T, Url), ArgsError> {
        let instance = Value::Object(arguments.unwrap_or_default());
        let mut issues: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|e| {
                let path = e.instance_path().to_string();
                let field = path.trim_start_matches('/');
                if field.is_empty() {
                    e.to_string()
                } else {
                    format!("{field}: {e}")
                }
            })
            .collect();

        let url = match instance.get("url").and_then(Value::as_str).map(parse_document_url) {
            Some(Ok(url)) => Some(url),
            Some(Err(reason)) => {
                issues.push(format!("url: {reason}"));
                None
            }
            None => None,
        };
        if !issues.is_empty() {
            return Err(ArgsError::Invalid { issues });
        }
        let Some(url) = url else {
            return Err(ArgsError::Invalid {
                issues: vec!["url: missing".to_string()],
            });
        };

        let args: T = serde_json::from_value(instance).map_err(|e| ArgsError::Invalid {
            issues: vec![e.to_string()],
        })?;
        Ok((args, url))
    }
}

fn parse_document_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("'{raw}' is not a valid URL ({e})"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!(
            "'{raw}' must use http or https (found scheme '{other}')"
        )),
    }
}
