//! Conventional upload-parameter names and units
//!
//! Weather stations that speak the Weather-Underground-style upload protocol
//! send their readings under these query-parameter names. Configurations are
//! not limited to this set; it just saves spelling them out.

/// Temperature in degrees Fahrenheit
pub const TEMP_F: &str = "tempf";
/// Dew point in degrees Fahrenheit
pub const DEWPOINT_F: &str = "dewptf";
/// Relative humidity, 0-100
pub const HUMIDITY: &str = "humidity";
/// Wind chill in degrees Fahrenheit
pub const WIND_CHILL_F: &str = "windchillf";
/// Wind speed in miles per hour
pub const WIND_SPEED_MPH: &str = "windspeedmph";
/// Wind gust in miles per hour
pub const WIND_GUST_MPH: &str = "windgustmph";
/// Wind direction in degrees
pub const WIND_DIRECTION: &str = "winddir";
/// Current rain rate in inches
pub const RAIN_CURRENT_IN: &str = "rainin";
/// Rain accumulated today in inches
pub const RAIN_TODAY_IN: &str = "dailyrainin";
/// Solar radiation in watts per square metre
pub const SOLAR_RADIATION: &str = "solarradiation";
/// UV index
pub const UV_INDEX: &str = "UV";

/// Degrees Celsius
pub const UOM_CELSIUS: &str = "°C";
/// Watts per square metre
pub const UOM_WATTS_PER_SQ_METRE: &str = "w/m2";
/// Millimetres
pub const UOM_MILLIMETRE: &str = "mm";
/// Millimetres per hour
pub const UOM_MILLIMETRE_PER_HOUR: &str = "mm/h";
/// Kilometres per hour
pub const UOM_KILOMETRE_PER_HOUR: &str = "km/h";
