//! MCP server exposing three read-only tools over OpenAPI/Swagger documents.
//!
//! - `health-check`: reachability, format version, title and endpoint counts
//! - `list-tags`: the document's tag vocabulary
//! - `read-api`: filtered, fully resolved operations with optional mock responses and
//!   TypeScript definitions
//!
//! The document pipeline lives in `apidoc-openapi-tools`; this crate owns configuration,
//! argument validation and the rmcp handler.

pub mod args;
pub mod config;
pub mod service;
