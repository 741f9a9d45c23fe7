//! Wire types for the state-store REST API

use serde::{Deserialize, Serialize};

/// Attribute metadata sent alongside a state value.
///
/// Absent configuration metadata is sent as an empty string rather than
/// omitted, which is what the state-store expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAttributes {
    pub unit_of_measurement: String,
    pub icon: String,
    pub friendly_name: String,
}

/// One sensor state update: `POST /api/states/sensor.<id>` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// The new state, already rendered to its wire form
    pub state: String,
    pub attributes: StateAttributes,
}
