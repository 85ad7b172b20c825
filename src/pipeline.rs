//! The decode-dispatch-encode pipeline
//!
//! One datagram goes in; zero or more newline-terminated line-protocol
//! lines come out on the output sink. Every failure mode short of a
//! broken transport is contained here: bad datagrams, short rows, and
//! unencodable metrics each cost at most their own record and leave a
//! note with the diagnostics sink.

use crate::encode::LineEncoder;
use crate::envelope::{Envelope, MessageKind};
use crate::error::{DecodeError, EncodeError};
use crate::message::{
    at, DeviceStatus, HubStatus, LightningStrikeEvent, RapidWind, StationObservation,
    OBS_METRIC_COLUMNS,
};
use crate::metric::Metric;
use chrono::{DateTime, Utc};
use std::io;

/// Where the pipeline reports dropped input
///
/// Passed in explicitly rather than reaching for a process-global
/// logger, so tests can assert on exactly what was reported. The
/// production implementation is [`LogDiagnostics`].
pub trait Diagnostics {
    /// A whole datagram was dropped (envelope or typed decode failure)
    fn datagram_dropped(&mut self, err: &DecodeError, payload: &[u8]);

    /// A `type` value this build does not recognize; not an error
    fn unknown_kind(&mut self, station: &str, kind: &str);

    /// A single metric could not be encoded; siblings continue
    fn metric_dropped(&mut self, name: &str, err: &EncodeError);

    /// The output sink rejected a line
    fn write_failed(&mut self, name: &str, err: &io::Error);
}

/// [`Diagnostics`] implementation backed by the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn datagram_dropped(&mut self, err: &DecodeError, payload: &[u8]) {
        // keep the raw payload visible for diagnosis
        log::warn!("dropping datagram: {err}: {}", String::from_utf8_lossy(payload));
    }

    fn unknown_kind(&mut self, station: &str, kind: &str) {
        log::info!("received unknown message type {kind} from {station}");
    }

    fn metric_dropped(&mut self, name: &str, err: &EncodeError) {
        log::warn!("unable to encode {name} metric: {err}");
    }

    fn write_failed(&mut self, name: &str, err: &io::Error) {
        log::warn!("unable to write {name} metric: {err}");
    }
}

/// Build the `wind` metric for a `rapid_wind` sample
pub fn wind_metric(wind: &RapidWind, now: DateTime<Utc>) -> Metric {
    let mut metric = Metric::new("wind", now)
        .with_tag("hub", &wind.hub_sn)
        .with_tag("station", &wind.serial_number);
    metric.add_field_if_present("wind_speed", wind.speed());
    metric.add_field_if_present("wind_dir", wind.direction());
    metric
}

/// Build the `hub_status` metric for a hub report
pub fn hub_status_metric(hub: &HubStatus, now: DateTime<Utc>) -> Metric {
    Metric::new("hub_status", now)
        .with_tag("hub", &hub.serial_number)
        .with_field("seq", hub.seq)
        .with_field("rssi", hub.rssi)
        .with_field("uptime", hub.uptime)
}

/// Build the `device_status` metric for a sensor report
pub fn device_status_metric(status: &DeviceStatus, now: DateTime<Utc>) -> Metric {
    Metric::new("device_status", now)
        .with_tag("station", &status.serial_number)
        .with_field("sensor_status", status.sensor_status)
        .with_field("rssi", status.rssi)
        .with_field("hub_rssi", status.hub_rssi)
        .with_field("battery", status.voltage)
}

/// Build the `lightning_strike` metric for a strike event
///
/// Stamped with the strike's own time when the vector carries one.
pub fn lightning_strike_metric(strike: &LightningStrikeEvent, now: DateTime<Utc>) -> Metric {
    let mut metric = Metric::new("lightning_strike", strike.time().unwrap_or(now))
        .with_tag("station", &strike.serial_number);
    metric.add_field_if_present("distance_km", strike.distance_km());
    metric.add_field_if_present("energy", strike.energy());
    metric
}

/// Build one `observation` metric per row of an `obs_st` batch
///
/// Rows missing their time column all fall back to the same captured
/// `now`, keeping the batch coherent.
pub fn observation_metrics(obs: &StationObservation, now: DateTime<Utc>) -> Vec<Metric> {
    obs.observations
        .iter()
        .map(|row| {
            let timestamp = StationObservation::row_time(row).unwrap_or(now);
            let mut metric =
                Metric::new("observation", timestamp).with_tag("station", &obs.serial_number);
            for (field, column) in OBS_METRIC_COLUMNS {
                metric.add_field_if_present(*field, at(row, *column));
            }
            metric
        })
        .collect()
}

/// The single-threaded datagram pipeline
///
/// Owns the output sink and the diagnostics sink for the life of the
/// process; each datagram is processed completely before the next.
pub struct Pipeline<W: io::Write, D: Diagnostics> {
    out: W,
    diagnostics: D,
    encoder: LineEncoder,
}

impl<W: io::Write, D: Diagnostics> Pipeline<W, D> {
    /// Create a pipeline with an unlimited-line-length encoder
    pub fn new(out: W, diagnostics: D) -> Self {
        Self::with_encoder(out, diagnostics, LineEncoder::new())
    }

    /// Create a pipeline with a specific encoder configuration
    pub fn with_encoder(out: W, diagnostics: D, encoder: LineEncoder) -> Self {
        Self {
            out,
            diagnostics,
            encoder,
        }
    }

    /// Process one datagram end to end
    ///
    /// Never fails: malformed input is reported to the diagnostics
    /// sink and dropped. The capture of `now` happens once here so
    /// every record in the datagram shares the same fallback instant.
    pub fn process_datagram(&mut self, payload: &[u8]) {
        let envelope = match Envelope::decode(payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                self.diagnostics.datagram_dropped(&err, payload);
                return;
            }
        };

        let now = Utc::now();
        match envelope.kind() {
            MessageKind::RapidWind => match RapidWind::decode(payload) {
                Ok(wind) => self.emit(wind_metric(&wind, now)),
                Err(err) => self.diagnostics.datagram_dropped(&err, payload),
            },
            MessageKind::HubStatus => match HubStatus::decode(payload) {
                Ok(hub) => self.emit(hub_status_metric(&hub, now)),
                Err(err) => self.diagnostics.datagram_dropped(&err, payload),
            },
            MessageKind::DeviceStatus => match DeviceStatus::decode(payload) {
                Ok(status) => self.emit(device_status_metric(&status, now)),
                Err(err) => self.diagnostics.datagram_dropped(&err, payload),
            },
            MessageKind::StationObservation => match StationObservation::decode(payload) {
                Ok(obs) => {
                    for metric in observation_metrics(&obs, now) {
                        self.emit(metric);
                    }
                }
                Err(err) => self.diagnostics.datagram_dropped(&err, payload),
            },
            MessageKind::LightningStrike => match LightningStrikeEvent::decode(payload) {
                Ok(strike) => self.emit(lightning_strike_metric(&strike, now)),
                Err(err) => self.diagnostics.datagram_dropped(&err, payload),
            },
            MessageKind::Unknown(kind) => {
                self.diagnostics.unknown_kind(&envelope.serial_number, &kind);
            }
        }
    }

    /// Encode and write one metric
    ///
    /// A field-less metric is dropped here without calling the encoder;
    /// line protocol has no representation for it.
    fn emit(&mut self, metric: Metric) {
        if !metric.has_fields() {
            self.diagnostics.metric_dropped(
                metric.name(),
                &EncodeError::EmptyFieldSet {
                    name: metric.name().to_string(),
                },
            );
            return;
        }

        let line = match self.encoder.encode(&metric) {
            Ok(line) => line,
            Err(err) => {
                self.diagnostics.metric_dropped(metric.name(), &err);
                return;
            }
        };

        if let Err(err) = self
            .out
            .write_all(line.as_bytes())
            .and_then(|()| self.out.write_all(b"\n"))
        {
            self.diagnostics.write_failed(metric.name(), &err);
        }
    }

    /// Consume the pipeline and recover the output and diagnostics sinks
    pub fn into_parts(self) -> (W, D) {
        (self.out, self.diagnostics)
    }
}
