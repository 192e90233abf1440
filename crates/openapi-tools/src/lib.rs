//! API description tooling behind the apidoc MCP tools.
//!
//! The pipeline for one tool call is:
//! [`loader`] (resolve, or fall back to a raw read) → [`document`] (dialect ingestion) →
//! [`filter`] → [`normalize`] → [`sanitize`] → [`mock`] / [`typegen`].
//! [`report`] composes these into the text returned by each tool.
//!
//! Nothing here holds state across calls; every invocation fetches and builds its own graph.

pub mod document;
pub mod error;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod mock;
pub mod normalize;
pub mod report;
pub mod resolver;
pub mod sanitize;
pub mod typegen;
