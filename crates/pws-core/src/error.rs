//! Per-update error types for the dispatch pipeline

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while computing one sensor value.
///
/// These are contained within the update that raised them: the failing
/// update is logged and dropped, sibling updates and the inbound response
/// are unaffected.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Humidity outside the physical 0-100% range
    #[error("humidity must be in the range 0-100%, got {0}")]
    HumidityOutOfRange(Decimal),

    /// A raw value was present but is not a decimal number
    #[error("input '{name}' is not a decimal number: '{value}'")]
    InvalidNumber { name: String, value: String },

    /// A named input required by the transform was not supplied
    #[error("required input '{0}' missing")]
    MissingInput(String),
}
