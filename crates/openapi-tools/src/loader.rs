//! Document acquisition: full resolution, with a one-shot raw read as fallback.

use crate::error::{OpenApiToolsError, ResolutionError, Result};
use crate::graph::DocumentGraph;
use crate::resolver;
use apidoc_http_tools::fetch::{FetchError, Fetcher};
use std::time::Duration;
use url::Url;

/// How the graph of a [`LoadedDocument`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Every reference was expanded.
    Resolved,
    /// Resolution failed; the raw document was read with references left in place.
    Fallback { resolution_error: String },
}

impl DocumentSource {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            DocumentSource::Resolved => "resolved",
            DocumentSource::Fallback { .. } => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub graph: DocumentGraph,
    pub source: DocumentSource,
}

#[derive(Debug, Clone)]
pub struct DocumentLoader {
    fetcher: Fetcher,
    budget: Duration,
}

impl DocumentLoader {
    /// Loader whose resolution budget equals the fetcher's per-request timeout.
    #[must_use]
    pub fn new(fetcher: Fetcher) -> Self {
        let budget = fetcher.timeout();
        Self { fetcher, budget }
    }

    #[must_use]
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Fully dereference the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] on fetch, parse, reference, or budget failure.
    pub async fn resolve(&self, url: &Url) -> std::result::Result<DocumentGraph, ResolutionError> {
        resolver::resolve(&self.fetcher, url, self.budget).await
    }

    /// Read the document at `url` as strict JSON, without expanding references.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of the single fetch attempt.
    pub async fn read_raw(&self, url: &Url) -> std::result::Result<DocumentGraph, FetchError> {
        let value = self.fetcher.fetch_json(url).await?;
        Ok(DocumentGraph::from_value(&value))
    }

    /// Resolve `url`, degrading to [`DocumentLoader::read_raw`] once when allowed.
    ///
    /// # Errors
    ///
    /// Without fallback, returns [`OpenApiToolsError::Resolution`]. With fallback, returns
    /// [`OpenApiToolsError::Compound`] carrying both failures when the raw read fails too.
    pub async fn load(&self, url: &Url, use_fallback: bool) -> Result<LoadedDocument> {
        let resolution = match self.resolve(url).await {
            Ok(graph) => {
                return Ok(LoadedDocument {
                    graph,
                    source: DocumentSource::Resolved,
                });
            }
            Err(e) => e,
        };

        if !use_fallback {
            return Err(OpenApiToolsError::Resolution(resolution));
        }

        tracing::warn!(
            url = %url,
            error = %resolution,
            "reference resolution failed; reading raw document"
        );

        match self.read_raw(url).await {
            Ok(graph) => Ok(LoadedDocument {
                graph,
                source: DocumentSource::Fallback {
                    resolution_error: resolution.to_string(),
                },
            }),
            Err(fallback) => Err(OpenApiToolsError::Compound {
                resolution,
                fallback,
            }),
        }
    }
}
