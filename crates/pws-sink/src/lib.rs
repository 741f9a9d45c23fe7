//! pws-sink - REST client for the state-store receiving sensor updates
//!
//! The bridge keeps one long-lived, already-authenticated [`SinkClient`] for
//! the whole process and shares it across all concurrent sensor updates; the
//! point of the shared session is connection reuse, not correctness.

pub mod client;
pub mod error;
pub mod testing;
pub mod types;

pub use client::SinkClient;
pub use error::{Result, SinkError};
pub use types::{StateAttributes, StateUpdate};
