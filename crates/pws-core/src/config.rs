//! Bridge configuration
//!
//! The configuration is loaded from a TOML file once at startup, validated,
//! and shared read-only for the process lifetime. Validation failures are
//! fatal: a bad mapping must never make it into the dispatch path.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convert::{InputBinding, Transform};

/// Errors detected while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document did not parse into the expected shape
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The inbound listen path must be absolute
    #[error("listen path '{0}' must start with '/'")]
    InvalidListenPath(String),

    /// Two sensor definitions target the same sink entity
    #[error("duplicate sensor entity id '{0}'")]
    DuplicateEntityId(String),

    /// A sensor definition names no input parameters
    #[error("sensor '{0}' names no input parameters")]
    NoInputs(String),

    /// A sensor definition lists the same input parameter twice
    #[error("sensor '{0}' lists input '{1}' more than once")]
    DuplicateInput(String, String),

    /// A sensor without a transform must map exactly one input
    #[error("sensor '{0}' has no transform and must name exactly one input")]
    PassthroughArity(String),

    /// A single-input transform was given more than one input
    #[error("sensor '{0}': transform expects exactly one input, got {1}")]
    SoleInputArity(String, usize),

    /// A transform's named input is not listed by the definition
    #[error("sensor '{0}': transform requires input '{1}'")]
    UnboundInput(String, String),
}

/// Declarative mapping from raw upload parameters to one sink sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Raw upload parameters consumed by this sensor, in declaration order
    pub inputs: Vec<String>,
    /// Entity id of the destination sensor in the sink
    pub entity_id: String,
    /// Friendly name shown by the sink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unit of measurement reported with the state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Icon reported with the state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Conversion applied to the inputs; absent passes the sole raw value
    /// through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

/// Inbound listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the upload endpoint listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path the weather station uploads to
    #[serde(default = "default_path")]
    pub path: String,
    /// Bounded wait for in-flight sensor updates at shutdown
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            path: default_path(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

fn default_port() -> u16 {
    5723
}

fn default_path() -> String {
    "/weatherstation/updateweatherstation.php".to_string()
}

fn default_shutdown_grace() -> u64 {
    5
}

/// Outbound sink connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Base URL of the state-store, e.g. "http://localhost:8123/"
    pub base_url: String,
    /// Long-lived bearer token for the state-store API
    pub token: String,
    /// Per-request timeout for outbound state updates
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Connection timeout for outbound state updates
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Full bridge configuration: listener, sink session, and sensor mappings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub sink: SinkConfig,
    /// Sensor definitions in dispatch order
    #[serde(default, rename = "sensor")]
    pub sensors: Vec<ParameterDefinition>,
}

impl BridgeConfig {
    /// Parse and validate a TOML configuration document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the dispatch engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.server.path.starts_with('/') {
            return Err(ConfigError::InvalidListenPath(self.server.path.clone()));
        }

        let mut seen_entities = HashSet::new();

        for def in &self.sensors {
            if def.inputs.is_empty() {
                return Err(ConfigError::NoInputs(def.entity_id.clone()));
            }

            let mut seen_inputs = HashSet::new();
            for input in &def.inputs {
                if !seen_inputs.insert(input.as_str()) {
                    return Err(ConfigError::DuplicateInput(
                        def.entity_id.clone(),
                        input.clone(),
                    ));
                }
            }

            if !seen_entities.insert(def.entity_id.as_str()) {
                return Err(ConfigError::DuplicateEntityId(def.entity_id.clone()));
            }

            match def.transform {
                None => {
                    if def.inputs.len() != 1 {
                        return Err(ConfigError::PassthroughArity(def.entity_id.clone()));
                    }
                }
                Some(transform) => match transform.binding() {
                    InputBinding::Sole => {
                        if def.inputs.len() != 1 {
                            return Err(ConfigError::SoleInputArity(
                                def.entity_id.clone(),
                                def.inputs.len(),
                            ));
                        }
                    }
                    InputBinding::Named(names) => {
                        for name in names {
                            if !def.inputs.iter().any(|i| i == name) {
                                return Err(ConfigError::UnboundInput(
                                    def.entity_id.clone(),
                                    (*name).to_string(),
                                ));
                            }
                        }
                    }
                },
            }
        }

        Ok(())
    }
}
