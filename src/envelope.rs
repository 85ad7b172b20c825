//! Envelope decoding
//!
//! Every Tempest UDP broadcast is a JSON object carrying at least
//! `serial_number` and `type`. The envelope is decoded first to pick
//! the typed schema; the payload is then re-parsed by that schema.

use crate::error::DecodeError;
use serde::Deserialize;
use std::fmt;

/// The known message kinds, plus a forward-compatibility catch-all
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// 3-second wind sample
    RapidWind,
    /// Hub radio/firmware status
    HubStatus,
    /// Sensor device status
    DeviceStatus,
    /// Full station observation batch
    StationObservation,
    /// Lightning strike event
    LightningStrike,
    /// Anything this build does not recognize
    Unknown(String),
}

impl MessageKind {
    /// Map a wire `type` value to a kind
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "rapid_wind" => MessageKind::RapidWind,
            "hub_status" => MessageKind::HubStatus,
            "device_status" => MessageKind::DeviceStatus,
            "obs_st" => MessageKind::StationObservation,
            "evt_strike" => MessageKind::LightningStrike,
            other => MessageKind::Unknown(other.to_string()),
        }
    }

    /// The wire `type` value for this kind
    pub fn as_wire(&self) -> &str {
        match self {
            MessageKind::RapidWind => "rapid_wind",
            MessageKind::HubStatus => "hub_status",
            MessageKind::DeviceStatus => "device_status",
            MessageKind::StationObservation => "obs_st",
            MessageKind::LightningStrike => "evt_strike",
            MessageKind::Unknown(other) => other,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// The routing fields common to every Tempest message
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Envelope {
    /// Serial number of the reporting device
    pub serial_number: String,
    /// Wire message type
    #[serde(rename = "type")]
    pub message_type: String,
}

impl Envelope {
    /// Decode the envelope portion of a raw datagram
    ///
    /// Only `serial_number` and `type` are examined here; kind-specific
    /// fields are left for the typed decoders.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(payload).map_err(|e| DecodeError::MalformedEnvelope {
            reason: e.to_string(),
        })
    }

    /// The message kind this envelope routes to
    pub fn kind(&self) -> MessageKind {
        MessageKind::from_wire(&self.message_type)
    }
}
