//! Inbound upload handler
//!
//! One handler, because the upload protocol is one endpoint: the station
//! GETs its readings as query parameters and expects an unconditional OK.

use std::collections::HashMap;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;

use crate::dispatch;
use crate::state::AppState;

/// Receive one weather-station upload and fan out sensor updates.
///
/// The acknowledgement never waits on outbound results and never reflects
/// downstream failures; missing or malformed query parameters only cause
/// the affected sensor definitions to be skipped.
pub async fn receive_update(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> StatusCode {
    let raw: HashMap<String, String> = query.as_deref().map(parse_query).unwrap_or_default();

    for def in &state.config().sensors {
        match dispatch::collect_inputs(def, &raw) {
            Some(raw_inputs) => {
                let def = def.clone();
                let sink = state.sink();
                state
                    .spawn_update(async move {
                        dispatch::update_sensor(&def, raw_inputs, &sink).await;
                    })
                    .await;
            }
            None => {
                tracing::debug!(sensor = %def.entity_id, "Skipping sensor, required inputs absent");
            }
        }
    }

    StatusCode::OK
}

/// Decode query parameters; a later duplicate key wins.
fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}
