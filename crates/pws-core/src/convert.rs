//! Unit conversions and the transform vocabulary
//!
//! All arithmetic runs on [`rust_decimal::Decimal`] so that rounding behaves
//! like exact base-10 math rather than binary floating point. Results are
//! rescaled after rounding so a one-decimal result always prints as e.g.
//! `37.0`, never `37`.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::station;

/// Round half-even to `dp` decimal places and pin the scale so the value
/// prints with exactly `dp` places.
fn round_to(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp(dp);
    rounded.rescale(dp);
    rounded
}

/// Convert a temperature from Fahrenheit to Celsius, rounded to 1 dp.
pub fn convert_f_to_c(value: Decimal) -> Decimal {
    round_to((value - dec!(32)) * dec!(5) / dec!(9), 1)
}

/// Convert a length from inches to millimetres, rounded to 2 dp.
pub fn convert_in_to_mm(value: Decimal) -> Decimal {
    round_to(value * dec!(25.4), 2)
}

/// Convert a speed from miles per hour to kilometres per hour, rounded to 1 dp.
pub fn convert_mph_to_kph(value: Decimal) -> Decimal {
    round_to(value * dec!(1.609344), 1)
}

/// Calculate the heat index ("feels like" temperature) in Fahrenheit.
///
/// Below 40°F the heat index is the temperature itself. Otherwise the simple
/// average estimate is used, falling through to the 9-term Rothfusz
/// regression (with the NWS low- and high-humidity corrections) when the
/// estimate exceeds 79°F. Rounded to 1 dp.
pub fn calculate_heat_index(tempf: Decimal, humidity: Decimal) -> Result<Decimal, TransformError> {
    if humidity < Decimal::ZERO || humidity > dec!(100) {
        return Err(TransformError::HumidityOutOfRange(humidity));
    }

    if tempf < dec!(40) {
        return Ok(round_to(tempf, 1));
    }

    let hi_temp = dec!(61) + (tempf - dec!(68)) * dec!(1.2) + humidity * dec!(0.094);
    let hi_final = dec!(0.5) * (tempf + hi_temp);

    if hi_final <= dec!(79) {
        return Ok(round_to(hi_final, 1));
    }

    let t = tempf;
    let r = humidity;
    let t2 = t * t;
    let r2 = r * r;

    let mut heat_idx = dec!(-42.379)
        + dec!(2.04901523) * t
        + dec!(10.14333127) * r
        - dec!(0.22475541) * t * r
        - dec!(0.00683783) * t2
        - dec!(0.05481717) * r2
        + dec!(0.00122874) * t2 * r
        + dec!(0.00085282) * t * r2
        - dec!(0.00000199) * t2 * r2;

    if r <= dec!(13) && t >= dec!(79) && t <= dec!(112) {
        // (17 - |t - 95|) is non-negative over the guarded range
        let adj1 = (dec!(13) - r) / dec!(4);
        let adj2 = ((dec!(17) - (t - dec!(95)).abs()) / dec!(17))
            .sqrt()
            .unwrap_or_default();
        heat_idx -= adj1 * adj2;
    } else if r > dec!(85) && t >= dec!(79) && t <= dec!(87) {
        let adj1 = (r - dec!(85)) / dec!(10);
        let adj2 = (dec!(87) - t) / dec!(5);
        heat_idx -= adj1 * adj2;
    }

    Ok(round_to(heat_idx, 1))
}

/// Calculate the heat index in Celsius.
pub fn calculate_heat_index_c(
    tempf: Decimal,
    humidity: Decimal,
) -> Result<Decimal, TransformError> {
    Ok(convert_f_to_c(calculate_heat_index(tempf, humidity)?))
}

// =============================================================================
// Transform selection
// =============================================================================

/// The input shape a transform expects, declared statically so it can be
/// checked once at configuration load rather than per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBinding {
    /// Exactly one input parameter, of any name
    Sole,
    /// A fixed set of named inputs that must all be listed
    Named(&'static [&'static str]),
}

/// A named transform a sensor definition can select in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// °F → °C
    FahrenheitToCelsius,
    /// in → mm
    InchesToMillimetres,
    /// mph → km/h
    MphToKph,
    /// Heat index in °F from temperature and humidity
    HeatIndex,
    /// Heat index in °C from temperature and humidity
    HeatIndexCelsius,
}

impl Transform {
    /// The input binding this transform requires.
    pub fn binding(&self) -> InputBinding {
        match self {
            Transform::HeatIndex | Transform::HeatIndexCelsius => {
                InputBinding::Named(&[station::TEMP_F, station::HUMIDITY])
            }
            _ => InputBinding::Sole,
        }
    }

    /// Evaluate the transform against the parsed inputs for one dispatch.
    pub fn apply(&self, inputs: &InputValues) -> Result<Decimal, TransformError> {
        match self {
            Transform::FahrenheitToCelsius => Ok(convert_f_to_c(sole(inputs)?)),
            Transform::InchesToMillimetres => Ok(convert_in_to_mm(sole(inputs)?)),
            Transform::MphToKph => Ok(convert_mph_to_kph(sole(inputs)?)),
            Transform::HeatIndex => {
                let (t, r) = heat_index_inputs(inputs)?;
                calculate_heat_index(t, r)
            }
            Transform::HeatIndexCelsius => {
                let (t, r) = heat_index_inputs(inputs)?;
                calculate_heat_index_c(t, r)
            }
        }
    }
}

fn sole(inputs: &InputValues) -> Result<Decimal, TransformError> {
    inputs
        .sole()
        .ok_or_else(|| TransformError::MissingInput("<sole input>".to_string()))
}

fn heat_index_inputs(inputs: &InputValues) -> Result<(Decimal, Decimal), TransformError> {
    let t = inputs
        .get(station::TEMP_F)
        .ok_or_else(|| TransformError::MissingInput(station::TEMP_F.to_string()))?;
    let r = inputs
        .get(station::HUMIDITY)
        .ok_or_else(|| TransformError::MissingInput(station::HUMIDITY.to_string()))?;
    Ok((t, r))
}

// =============================================================================
// Parsed inputs
// =============================================================================

/// Name-keyed decimal inputs for one dispatch, in definition order.
///
/// Owned by a single update task; never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputValues {
    values: Vec<(String, Decimal)>,
}

impl InputValues {
    /// Parse raw string values into decimals, keeping definition order.
    pub fn from_raw(pairs: &[(String, String)]) -> Result<Self, TransformError> {
        let mut values = Vec::with_capacity(pairs.len());
        for (name, raw) in pairs {
            let value = raw
                .parse::<Decimal>()
                .map_err(|_| TransformError::InvalidNumber {
                    name: name.clone(),
                    value: raw.clone(),
                })?;
            values.push((name.clone(), value));
        }
        Ok(Self { values })
    }

    /// Look up an input by name.
    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// The value of the only input, if there is exactly one.
    pub fn sole(&self) -> Option<Decimal> {
        match self.values.as_slice() {
            [(_, v)] => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_f_to_c_body_temperature() {
        // 98.6°F is exactly 37°C; the printed value keeps one decimal place
        let c = convert_f_to_c(dec!(98.6));
        assert_eq!(c, dec!(37.0));
        assert_eq!(c.to_string(), "37.0");
    }

    #[test]
    fn test_f_to_c_freezing_point() {
        assert_eq!(convert_f_to_c(dec!(32)).to_string(), "0.0");
    }

    #[test]
    fn test_in_to_mm() {
        assert_eq!(convert_in_to_mm(dec!(1)), dec!(25.40));
        assert_eq!(convert_in_to_mm(dec!(0.02)), dec!(0.51));
    }

    #[test]
    fn test_mph_to_kph() {
        assert_eq!(convert_mph_to_kph(dec!(10)), dec!(16.1));
        assert_eq!(convert_mph_to_kph(dec!(0)).to_string(), "0.0");
    }

    #[test]
    fn test_heat_index_below_forty_is_identity() {
        assert_eq!(calculate_heat_index(dec!(35), dec!(50)).unwrap(), dec!(35));
        assert_eq!(calculate_heat_index(dec!(12.4), dec!(99)).unwrap(), dec!(12.4));
    }

    #[test]
    fn test_heat_index_simple_average_path() {
        // 76°F / 60%: estimate = 0.5*(76 + 61 + 9.6 + 5.64) = 76.12 ≤ 79
        assert_eq!(
            calculate_heat_index(dec!(76), dec!(60)).unwrap(),
            dec!(76.1)
        );
    }

    #[test]
    fn test_heat_index_rothfusz_path() {
        // 95°F / 50% exceeds the 79°F estimate threshold; NWS tables give 105°F
        assert_eq!(
            calculate_heat_index(dec!(95), dec!(50)).unwrap(),
            dec!(105.2)
        );
    }

    #[test]
    fn test_heat_index_rejects_humidity_out_of_range() {
        assert!(calculate_heat_index(dec!(95), dec!(101)).is_err());
        assert!(calculate_heat_index(dec!(95), dec!(-1)).is_err());
        // regardless of temperature, including the identity branch
        assert!(calculate_heat_index(dec!(20), dec!(150)).is_err());
    }

    #[test]
    fn test_heat_index_celsius_composition() {
        // round(105.2°F → °C, 1) = 40.7
        assert_eq!(
            calculate_heat_index_c(dec!(95), dec!(50)).unwrap(),
            dec!(40.7)
        );
    }

    #[test]
    fn test_transform_apply_sole_input() {
        let inputs =
            InputValues::from_raw(&[("tempf".to_string(), "98.6".to_string())]).unwrap();
        assert_eq!(
            Transform::FahrenheitToCelsius.apply(&inputs).unwrap(),
            dec!(37.0)
        );
    }

    #[test]
    fn test_transform_apply_heat_index_by_name() {
        // lookup is name-keyed, so declaration order must not matter
        let inputs = InputValues::from_raw(&[
            ("humidity".to_string(), "50".to_string()),
            ("tempf".to_string(), "95".to_string()),
        ])
        .unwrap();
        assert_eq!(
            Transform::HeatIndexCelsius.apply(&inputs).unwrap(),
            dec!(40.7)
        );
    }

    #[test]
    fn test_from_raw_rejects_garbage() {
        let err = InputValues::from_raw(&[("tempf".to_string(), "hot".to_string())])
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidNumber { .. }));
    }

    #[test]
    fn test_bindings() {
        assert_eq!(Transform::MphToKph.binding(), InputBinding::Sole);
        assert_eq!(
            Transform::HeatIndex.binding(),
            InputBinding::Named(&["tempf", "humidity"])
        );
    }
}
