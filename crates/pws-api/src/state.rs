//! Application state shared across all inbound requests

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use pws_core::BridgeConfig;
use pws_sink::SinkClient;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Shared state: the immutable configuration, the long-lived sink session,
/// and the set of in-flight sensor updates.
///
/// Updates are spawned as explicit task objects rather than detached, so
/// shutdown can drain them with a bounded wait instead of silently dropping
/// whatever happened to be in flight.
#[derive(Clone)]
pub struct AppState {
    config: Arc<BridgeConfig>,
    sink: Arc<SinkClient>,
    updates: Arc<Mutex<JoinSet<()>>>,
}

impl AppState {
    /// Create the state from a validated configuration and a ready session.
    ///
    /// The state holds a reference to the sink session; the caller owns its
    /// lifecycle.
    pub fn new(config: BridgeConfig, sink: SinkClient) -> Self {
        Self {
            config: Arc::new(config),
            sink: Arc::new(sink),
            updates: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn sink(&self) -> Arc<SinkClient> {
        Arc::clone(&self.sink)
    }

    /// Track one spawned sensor update.
    ///
    /// Finished entries are reaped opportunistically here so the set does
    /// not grow with the lifetime of the process.
    pub async fn spawn_update<F>(&self, update: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut updates = self.updates.lock().await;
        while updates.try_join_next().is_some() {}
        updates.spawn(update);
    }

    /// Number of updates currently tracked (finished but unreaped included).
    pub async fn in_flight(&self) -> usize {
        self.updates.lock().await.len()
    }

    /// Best-effort drain of in-flight updates at shutdown.
    ///
    /// Waits up to `grace` for the tracked tasks to finish, then aborts
    /// whatever is left; abandoned updates are latest-value telemetry and
    /// the next upload replaces them.
    pub async fn drain_updates(&self, grace: Duration) {
        let mut updates = self.updates.lock().await;
        let deadline = tokio::time::Instant::now() + grace;

        loop {
            match tokio::time::timeout_at(deadline, updates.join_next()).await {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        abandoned = updates.len(),
                        "Shutdown grace elapsed, aborting in-flight sensor updates"
                    );
                    updates.abort_all();
                    break;
                }
            }
        }
    }
}
