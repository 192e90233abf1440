//! Shared helpers for integration tests.
//!
//! [`DocumentServer`] serves canned documents from an in-process HTTP server bound to an
//! ephemeral localhost port, and counts how often each path was requested.

use anyhow::Context as _;
use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A canned HTTP response served at a fixed path.
#[derive(Debug, Clone)]
pub struct Fixture {
    path: String,
    status: u16,
    content_type: String,
    body: String,
    delay: Option<Duration>,
}

impl Fixture {
    /// Serve `body` as `application/json`.
    #[must_use]
    pub fn json(path: &str, body: &serde_json::Value) -> Self {
        Self::text(path, "application/json", body.to_string())
    }

    /// Serve `body` verbatim with the given content type.
    #[must_use]
    pub fn text(path: &str, content_type: &str, body: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            content_type: content_type.to_string(),
            body: body.into(),
            delay: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sleep before responding (for timeout tests).
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type HitCounters = Arc<HashMap<String, AtomicUsize>>;

/// In-process HTTP server for fixture documents. Shuts down on drop.
#[derive(Debug)]
pub struct DocumentServer {
    base_url: String,
    hits: HitCounters,
    shutdown: Option<oneshot::Sender<()>>,
}

impl DocumentServer {
    /// Bind `127.0.0.1:0` and start serving the fixtures.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(fixtures: Vec<Fixture>) -> anyhow::Result<Self> {
        let hits: HitCounters = Arc::new(
            fixtures
                .iter()
                .map(|f| (f.path.clone(), AtomicUsize::new(0)))
                .collect(),
        );

        let mut app = Router::new();
        for fixture in fixtures {
            let path = fixture.path.clone();
            let counters = Arc::clone(&hits);
            app = app.route(
                &path,
                get(move || serve_fixture(fixture.clone(), Arc::clone(&counters))),
            );
        }

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind document server")?;
        let addr = listener
            .local_addr()
            .context("read document server address")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move {
            let _ = server.await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            hits,
            shutdown: Some(shutdown_tx),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a fixture path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Number of requests served for a fixture path so far.
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .get(path)
            .map_or(0, |c| c.load(Ordering::SeqCst))
    }
}

impl Drop for DocumentServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_fixture(fixture: Fixture, hits: HitCounters) -> impl IntoResponse {
    if let Some(counter) = hits.get(&fixture.path) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
    if let Some(delay) = fixture.delay {
        tokio::time::sleep(delay).await;
    }
    let status =
        StatusCode::from_u16(fixture.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, fixture.content_type)],
        fixture.body,
    )
}
