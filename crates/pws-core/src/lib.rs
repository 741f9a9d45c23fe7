//! pws-core - Core types for the personal-weather-station bridge
//!
//! This crate holds everything the bridge needs that is independent of HTTP:
//! the declarative sensor configuration, the unit-conversion transforms over
//! exact decimals, and the error taxonomy shared by the dispatch pipeline.

pub mod config;
pub mod convert;
pub mod error;
pub mod station;

pub use config::{BridgeConfig, ConfigError, ParameterDefinition, ServerConfig, SinkConfig};
pub use convert::{InputBinding, InputValues, Transform};
pub use error::TransformError;
