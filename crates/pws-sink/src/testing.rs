//! Test utilities for the bridge
//!
//! Provides an in-process stand-in for the state-store plus a small test
//! server wrapper, so integration tests can drive the whole pipeline
//! without a real sink.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;

use crate::error::Result;
use crate::types::StateUpdate;

/// One update captured by [`SinkRecorder`].
#[derive(Debug, Clone)]
pub struct RecordedUpdate {
    /// The entity path segment as posted, e.g. "sensor.pws_temp"
    pub entity: String,
    pub update: StateUpdate,
}

/// A mock state-store that records every state update it receives.
///
/// Individual entities can be marked as failing to exercise per-update
/// failure isolation.
#[derive(Clone, Default)]
pub struct SinkRecorder {
    updates: Arc<Mutex<Vec<RecordedUpdate>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl SinkRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond 500 to updates for the given entity, e.g. "sensor.pws_temp".
    pub fn fail_entity(&self, entity: &str) {
        self.failing.lock().unwrap().insert(entity.to_string());
    }

    /// Snapshot of everything recorded so far.
    pub fn recorded(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Number of updates recorded so far.
    pub fn count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Build the mock state-store router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/states/{entity}", post(record_state))
            .with_state(self.clone())
    }
}

async fn record_state(
    State(recorder): State<SinkRecorder>,
    Path(entity): Path<String>,
    Json(update): Json<StateUpdate>,
) -> StatusCode {
    if recorder.failing.lock().unwrap().contains(&entity) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    recorder
        .updates
        .lock()
        .unwrap()
        .push(RecordedUpdate { entity, update });
    StatusCode::OK
}

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Serve an axum router on an ephemeral local port.
    pub async fn start(router: Router) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Wait for a condition with timeout.
///
/// Fire-and-forget dispatches finish after the inbound response; tests poll
/// the recorder with this instead of sleeping fixed amounts.
pub async fn wait_for<F, Fut>(condition: F, timeout: Duration) -> bool
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;

    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    false
}
