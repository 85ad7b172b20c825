//! # Tempest - WeatherFlow UDP to line protocol
//!
//! Decodes the JSON broadcasts a WeatherFlow Tempest hub sends on the
//! local network and re-emits each one as an InfluxDB line-protocol
//! metric, ready for a telegraf `inputs.execd` collector.
//!
//! ## Pipeline
//!
//! datagram bytes → envelope decode (kind + station) → typed decode →
//! metric build (tolerant positional extraction) → line-protocol
//! encode → output sink.
//!
//! ## Quick Start
//!
//! ```rust
//! use tempest::{LogDiagnostics, Pipeline};
//!
//! let mut out = Vec::new();
//! let mut pipeline = Pipeline::new(&mut out, LogDiagnostics);
//!
//! let datagram = br#"{"serial_number":"AR-00004049","type":"rapid_wind","hub_sn":"HB-00000001","ob":[1493322445,2.3,128]}"#;
//! pipeline.process_datagram(datagram);
//!
//! drop(pipeline);
//! let line = String::from_utf8(out).unwrap();
//! assert!(line.starts_with("wind,hub=HB-00000001,station=AR-00004049 "));
//! ```
//!
//! ## Modules
//!
//! - [`envelope`]: message-kind sniffing and routing
//! - [`message`]: per-kind typed schemas and the positional accessor
//! - [`metric`]: metric accumulation with declared numeric kinds
//! - [`encode`]: line-protocol serialization
//! - [`pipeline`]: dispatch, tolerant field population, output
//! - [`error`]: decode/encode error taxonomy

// Modules
pub mod encode;
pub mod envelope;
pub mod error;
pub mod message;
pub mod metric;
pub mod pipeline;

// Re-exports for convenient access
pub use encode::LineEncoder;
pub use envelope::{Envelope, MessageKind};
pub use error::{DecodeError, EncodeError, Result, TempestError};
pub use message::{
    DeviceStatus, HubStatus, LightningStrikeEvent, RapidWind, StationObservation,
};
pub use metric::{FieldValue, Metric};
pub use pipeline::{Diagnostics, LogDiagnostics, Pipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// UDP port the hub broadcasts on
pub const DEFAULT_PORT: u16 = 50222;

/// Largest datagram the hub is known to send
///
/// Receive buffers of this size never truncate; a truncated read shows
/// up downstream as a malformed envelope.
pub const MAX_DATAGRAM_BYTES: usize = 2000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_pipeline() {
        let mut pipeline = Pipeline::new(Vec::new(), LogDiagnostics);
        pipeline.process_datagram(
            br#"{"serial_number":"ST-00000001","type":"hub_status","firmware_revision":"17","uptime":32,"rssi":-17.0,"timestamp":1510855923,"reset_flags":"BOR,PIN","seq":1}"#,
        );
        let (out, _) = pipeline.into_parts();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("hub_status,hub=ST-00000001 "));
        assert!(text.ends_with('\n'));
    }
}
