//! pws-api - HTTP layer and dispatch engine for the PWS bridge
//!
//! This crate wires the configured upload path to the fan-out dispatch
//! engine. The engine acknowledges every upload immediately and relays each
//! mapped value to the sink as an independent, fire-and-forget update.
//!
//! # Usage
//!
//! ```ignore
//! use pws_api::{create_router, AppState};
//!
//! let sink = SinkClient::with_bearer_token(&config.sink.base_url, &config.sink.token)?;
//! let state = AppState::new(config, sink);
//! let router = create_router(state);
//! ```

pub mod dispatch;
pub mod handlers;
pub mod state;

pub use state::AppState;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the bridge router with the given application state.
///
/// The upload route comes from the configuration; the specific query
/// parameters it consumes are entirely determined by the configured sensor
/// definitions.
pub fn create_router(state: AppState) -> Router {
    let upload_path = state.config().server.path.clone();

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Weather-station upload endpoint
        .route(&upload_path, get(handlers::receive_update))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
