//! Shared HTTP fetching utilities.
//!
//! This crate is used by `apidoc-openapi-tools` for both reference resolution (text fetches of
//! root and external documents) and the raw fallback read (strict JSON fetch).
//!
//! It intentionally contains **no** description-document semantics.

pub mod fetch;
pub mod safety;
