//! Per-sensor update computation and delivery
//!
//! Each qualifying sensor definition becomes one independent task per
//! upload: compute the value, build the payload, post it, and contain any
//! failure within that task.

use std::collections::HashMap;

use pws_core::{InputValues, ParameterDefinition, TransformError};
use pws_sink::{SinkClient, StateAttributes, StateUpdate};

/// Extract the definition's named inputs from the raw query.
///
/// Returns `None` if any required input is absent: partial data must not
/// produce a spurious or defaulted sensor value.
pub fn collect_inputs(
    def: &ParameterDefinition,
    raw: &HashMap<String, String>,
) -> Option<Vec<(String, String)>> {
    def.inputs
        .iter()
        .map(|name| raw.get(name).map(|value| (name.clone(), value.clone())))
        .collect()
}

/// Build the outbound payload for one sensor from its raw inputs.
///
/// Passthrough definitions relay the sole raw value unchanged; transformed
/// definitions parse their inputs to decimals first. Absent presentation
/// metadata is sent as empty strings.
pub fn build_update(
    def: &ParameterDefinition,
    raw_inputs: &[(String, String)],
) -> Result<StateUpdate, TransformError> {
    let state = match def.transform {
        Some(transform) => transform.apply(&InputValues::from_raw(raw_inputs)?)?.to_string(),
        None => raw_inputs
            .first()
            .map(|(_, value)| value.clone())
            .unwrap_or_default(),
    };

    Ok(StateUpdate {
        state,
        attributes: StateAttributes {
            unit_of_measurement: def.unit.clone().unwrap_or_default(),
            icon: def.icon.clone().unwrap_or_default(),
            friendly_name: def.name.clone().unwrap_or_default(),
        },
    })
}

/// Compute and deliver one sensor update.
///
/// Every failure is terminal for this update alone: it is logged with the
/// entity id and dropped. Sibling updates and the inbound acknowledgement
/// are never affected, and nothing is retried.
pub async fn update_sensor(
    def: &ParameterDefinition,
    raw_inputs: Vec<(String, String)>,
    sink: &SinkClient,
) {
    let update = match build_update(def, &raw_inputs) {
        Ok(update) => update,
        Err(e) => {
            tracing::error!(sensor = %def.entity_id, error = %e, "Failed to compute sensor value");
            return;
        }
    };

    tracing::info!(sensor = %def.entity_id, state = %update.state, "Updating sink sensor");

    if let Err(e) = sink.set_sensor_state(&def.entity_id, &update).await {
        tracing::error!(sensor = %def.entity_id, error = %e, "Failed to update sink sensor");
    }
}
