//! Typed message schemas
//!
//! Each kind re-parses the full datagram into its own serde shape,
//! built from the WeatherFlow UDP reference:
//! <https://weatherflow.github.io/Tempest/api/udp/v143/>
//!
//! The numeric payloads are fixed-position arrays. All position reads
//! go through [`at`], which turns a too-short array into an absent
//! field instead of an error, so one missing column never sinks the
//! rest of a record.

use crate::error::DecodeError;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Bounds-checked positional accessor
///
/// Returns `None` when the array is too short to hold `index`. This is
/// the only way pipeline code reads positional values.
pub fn at(values: &[f64], index: usize) -> Option<f64> {
    values.get(index).copied()
}

/// Convert an epoch-seconds wire value to an instant
///
/// Non-finite or out-of-range values yield `None`, which callers treat
/// the same as a missing timestamp column. Range includes the
/// nanosecond-representation bound the encoder needs later.
pub fn epoch_time(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp(seconds as i64, 0)
        .filter(|t| t.timestamp_nanos_opt().is_some())
}

fn typed_error(kind: &'static str, err: serde_json::Error) -> DecodeError {
    DecodeError::TypedDecode {
        kind,
        reason: err.to_string(),
    }
}

/// `rapid_wind`: one 3-second wind sample
///
/// `ob` is `[epoch seconds, speed m/s, direction degrees]`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RapidWind {
    pub serial_number: String,
    pub hub_sn: String,
    #[serde(rename = "ob")]
    pub observation: Vec<f64>,
}

impl RapidWind {
    /// Positions in the `ob` vector
    pub const TIME: usize = 0;
    pub const SPEED: usize = 1;
    pub const DIRECTION: usize = 2;

    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(payload).map_err(|e| typed_error("rapid_wind", e))
    }

    pub fn speed(&self) -> Option<f64> {
        at(&self.observation, Self::SPEED)
    }

    pub fn direction(&self) -> Option<f64> {
        at(&self.observation, Self::DIRECTION)
    }
}

/// `hub_status`: hub firmware/radio health report
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HubStatus {
    pub serial_number: String,
    pub firmware_revision: String,
    pub uptime: i64,
    pub rssi: f64,
    pub timestamp: u64,
    pub reset_flags: String,
    pub seq: i64,
    pub radio_stats: Vec<i64>,
    // the 'fs' and 'mqtt_stats' fields are for internal use only and
    // are not decoded
}

impl HubStatus {
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(payload).map_err(|e| typed_error("hub_status", e))
    }
}

/// `device_status`: per-sensor status report
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DeviceStatus {
    pub serial_number: String,
    pub timestamp: i64,
    pub uptime: i64,
    pub voltage: f64,
    pub firmware_revision: i32,
    pub rssi: f64,
    pub hub_rssi: f64,
    pub sensor_status: i32,
}

impl DeviceStatus {
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(payload).map_err(|e| typed_error("device_status", e))
    }
}

/// `evt_strike`: a detected lightning strike
///
/// `evt` is `[epoch seconds, distance km, energy]`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LightningStrikeEvent {
    pub serial_number: String,
    pub evt: Vec<f64>,
}

impl LightningStrikeEvent {
    /// Positions in the `evt` vector
    pub const TIME: usize = 0;
    pub const DISTANCE_KM: usize = 1;
    pub const ENERGY: usize = 2;

    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(payload).map_err(|e| typed_error("evt_strike", e))
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        at(&self.evt, Self::TIME).and_then(epoch_time)
    }

    pub fn distance_km(&self) -> Option<f64> {
        at(&self.evt, Self::DISTANCE_KM)
    }

    pub fn energy(&self) -> Option<f64> {
        at(&self.evt, Self::ENERGY)
    }
}

/// Column positions of one `obs_st` observation row
///
/// This table is the single description of the row layout; everything
/// else indexes through it.
pub mod obs_column {
    pub const TIME: usize = 0;
    pub const WIND_LULL: usize = 1;
    pub const WIND_AVG: usize = 2;
    pub const WIND_GUST: usize = 3;
    pub const WIND_DIR: usize = 4;
    pub const WIND_SAMPLE_INTERVAL: usize = 5;
    pub const STATION_PRESSURE: usize = 6;
    pub const AIR_TEMP: usize = 7;
    pub const RELATIVE_HUMIDITY: usize = 8;
    pub const ILLUMINANCE: usize = 9;
    pub const UV: usize = 10;
    pub const SOLAR_RADIATION: usize = 11;
    pub const RAIN_PREVIOUS_MINUTE: usize = 12;
    pub const PRECIPITATION_TYPE: usize = 13;
    pub const LIGHTNING_AVG_DISTANCE: usize = 14;
    pub const LIGHTNING_STRIKE_COUNT: usize = 15;
    pub const BATTERY: usize = 16;
    pub const REPORT_INTERVAL: usize = 17;
}

/// Metric field name → row column, for the `observation` metric
///
/// Declared as data so the whole emission set is visible (and testable)
/// in one place.
pub const OBS_METRIC_COLUMNS: &[(&str, usize)] = &[
    ("temperature", obs_column::AIR_TEMP),
    ("humidity", obs_column::RELATIVE_HUMIDITY),
    ("pressure", obs_column::STATION_PRESSURE),
    ("wind_spd", obs_column::WIND_AVG),
    ("wind_gust", obs_column::WIND_GUST),
    ("wind_lull", obs_column::WIND_LULL),
    ("wind_dir", obs_column::WIND_DIR),
    ("rain_previous_min", obs_column::RAIN_PREVIOUS_MINUTE),
    ("lightning_strikes", obs_column::LIGHTNING_STRIKE_COUNT),
    ("uv", obs_column::UV),
    ("illuminance", obs_column::ILLUMINANCE),
    ("solar_radiation", obs_column::SOLAR_RADIATION),
];

/// `obs_st`: a batch of full station observations
///
/// One report can carry several rows, each an independent sampled
/// instant; rows become independent metrics.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StationObservation {
    pub serial_number: String,
    #[serde(rename = "obs")]
    pub observations: Vec<Vec<f64>>,
}

impl StationObservation {
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(payload).map_err(|e| typed_error("obs_st", e))
    }

    /// The instant a row was sampled, if its time column is usable
    pub fn row_time(row: &[f64]) -> Option<DateTime<Utc>> {
        at(row, obs_column::TIME).and_then(epoch_time)
    }
}
