//! Error types for `apidoc-openapi-tools`.

use apidoc_http_tools::fetch::FetchError;
use thiserror::Error;

/// Failure to turn a document URL into a fully dereferenced graph.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to parse document {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Invalid $ref '{reference}': {message}")]
    InvalidReference { reference: String, message: String },

    #[error("Unresolved $ref '{reference}' (document {url}, missing pointer '{pointer}')")]
    Dangling {
        reference: String,
        url: String,
        pointer: String,
    },

    #[error("Circular $ref chain never reaches a value: {}", chain.join(" -> "))]
    Circular { chain: Vec<String> },

    #[error("Reference resolution timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

/// Main error type for the document pipeline.
#[derive(Error, Debug)]
pub enum OpenApiToolsError {
    #[error("Failed to resolve API description: {0}")]
    Resolution(#[from] ResolutionError),

    /// Resolution failed and so did the raw fallback read.
    #[error("Resolution failed: {resolution}. Fallback read also failed: {fallback}")]
    Compound {
        resolution: ResolutionError,
        fallback: FetchError,
    },

    /// The fetched JSON is not an OpenAPI 3 or Swagger 2 document.
    #[error("Not an API description document: {0}")]
    Document(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type-definition synthesis failure. Never fatal; rendered as a comment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeSynthesisError {
    #[error("schema definition table is {found}, expected an object")]
    NotATable { found: &'static str },

    #[error("definition '{name}' is {found}, expected a schema object")]
    InvalidDefinition { name: String, found: &'static str },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, OpenApiToolsError>;
