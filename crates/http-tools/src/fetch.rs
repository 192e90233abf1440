//! Document fetching with a hard wall-clock timeout.
//!
//! Every fetch races the transfer against a timer. When the timer wins, the in-flight request
//! future is dropped, which aborts the underlying connection.

use crate::safety::{OutboundHttpSafety, redact_url, sanitize_reqwest_error};
use mime::Mime;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default per-fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Number of body characters echoed back in a content-type diagnostic.
const PREVIEW_CHARS: usize = 200;

const ACCEPT_DOCUMENTS: &str = "application/json, application/yaml;q=0.9, */*;q=0.8";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("HTTP {status} {reason} from {url}")]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Expected JSON from {url} but content-type was '{declared}'. Body starts with: {preview}")]
    ContentType {
        url: String,
        declared: String,
        preview: String,
    },

    #[error("Response from {url} is not valid JSON: {message}")]
    Parse { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Outbound HTTP blocked: {0}")]
    Blocked(String),

    #[error("Response from {url} is too large: {detail}")]
    TooLarge { url: String, detail: String },
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// HTTP fetcher shared by the resolver and the fallback reader.
///
/// Cheap to clone; the underlying `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    safety: OutboundHttpSafety,
}

impl Fetcher {
    #[must_use]
    pub fn new(timeout: Duration, safety: OutboundHttpSafety) -> Self {
        let client = Client::builder()
            .user_agent(concat!("apidoc-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(client, timeout, safety)
    }

    #[must_use]
    pub fn with_client(client: Client, timeout: Duration, safety: OutboundHttpSafety) -> Self {
        Self {
            client,
            timeout,
            safety,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch a URL and parse its body as JSON.
    ///
    /// The response must be 2xx and declare a JSON content type (`application/json` or any
    /// `+json` suffix type).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`], [`FetchError::HttpStatus`], [`FetchError::ContentType`],
    /// [`FetchError::Parse`], or a transport/policy error.
    pub async fn fetch_json(&self, url: &Url) -> Result<Value> {
        self.with_deadline(url, self.fetch_json_inner(url)).await
    }

    /// Fetch a URL and return its body as text, without content-type checks.
    ///
    /// Used for documents that may legitimately be served as YAML or `text/plain`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`], [`FetchError::HttpStatus`], or a transport/policy error.
    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        self.with_deadline(url, self.fetch_text_inner(url)).await
    }

    async fn with_deadline<T>(
        &self,
        url: &Url,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        if let Ok(res) = tokio::time::timeout(self.timeout, fut).await {
            res
        } else {
            tracing::debug!(url = %redact_url(url), "fetch timed out");
            Err(FetchError::Timeout {
                url: redact_url(url),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }

    async fn fetch_json_inner(&self, url: &Url) -> Result<Value> {
        let resp = self.send(url).await?;
        let declared = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = read_body_limited(resp, self.safety.max_response_bytes, url).await?;

        if !declared.as_deref().is_some_and(is_json_content_type) {
            return Err(FetchError::ContentType {
                url: redact_url(url),
                declared: declared.unwrap_or_else(|| "<none>".to_string()),
                preview: body_preview(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| FetchError::Parse {
            url: redact_url(url),
            message: e.to_string(),
        })
    }

    async fn fetch_text_inner(&self, url: &Url) -> Result<String> {
        let resp = self.send(url).await?;
        let body = read_body_limited(resp, self.safety.max_response_bytes, url).await?;
        String::from_utf8(body).map_err(|_| FetchError::Parse {
            url: redact_url(url),
            message: "response body is not valid UTF-8".to_string(),
        })
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response> {
        self.safety.check_url(url)?;

        tracing::debug!(url = %redact_url(url), "fetching document");
        let resp = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_DOCUMENTS)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: redact_url(url),
                message: sanitize_reqwest_error(&e),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: redact_url(url),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(resp)
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT, OutboundHttpSafety::permissive())
    }
}

/// Whether a declared content type indicates a JSON body.
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
    match content_type.parse::<Mime>() {
        Ok(m) => {
            m.subtype().as_str() == "json" || m.suffix().is_some_and(|s| s.as_str() == "json")
        }
        Err(_) => content_type.to_ascii_lowercase().contains("json"),
    }
}

fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.trim().chars().take(PREVIEW_CHARS).collect()
}

async fn read_body_limited(
    mut response: reqwest::Response,
    max_bytes: Option<usize>,
    url: &Url,
) -> Result<Vec<u8>> {
    let transport = |e: reqwest::Error| FetchError::Transport {
        url: redact_url(url),
        message: sanitize_reqwest_error(&e),
    };

    let Some(max) = max_bytes else {
        let bytes = response.bytes().await.map_err(transport)?;
        return Ok(bytes.to_vec());
    };

    if let Some(len) = response.content_length()
        && len > max as u64
    {
        return Err(FetchError::TooLarge {
            url: redact_url(url),
            detail: format!("{len} bytes (limit {max})"),
        });
    }

    let mut out: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(transport)? {
        if out.len().saturating_add(chunk.len()) > max {
            return Err(FetchError::TooLarge {
                url: redact_url(url),
                detail: format!("exceeded {max} bytes"),
            });
        }
        out.extend_from_slice(&chunk);
    }

    Ok(out)
}
