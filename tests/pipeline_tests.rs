//! Integration tests for the full decode-dispatch-encode path
//!
//! These drive the public API only: raw datagram bytes in, line
//! protocol text and diagnostics out.

use std::io;
use tempest::{
    DecodeError, Diagnostics, EncodeError, LineEncoder, Metric, Pipeline,
};

/// Diagnostics sink that counts what it was told
#[derive(Debug, Default)]
struct Recorder {
    dropped: usize,
    unknown: Vec<(String, String)>,
    metric_errors: Vec<EncodeError>,
}

impl Diagnostics for Recorder {
    fn datagram_dropped(&mut self, _err: &DecodeError, _payload: &[u8]) {
        self.dropped += 1;
    }

    fn unknown_kind(&mut self, station: &str, kind: &str) {
        self.unknown.push((station.to_string(), kind.to_string()));
    }

    fn metric_dropped(&mut self, _name: &str, err: &EncodeError) {
        self.metric_errors.push(err.clone());
    }

    fn write_failed(&mut self, _name: &str, _err: &io::Error) {
        panic!("write to Vec failed");
    }
}

fn process(payloads: &[&[u8]]) -> (Vec<String>, Recorder) {
    let mut pipeline = Pipeline::new(Vec::new(), Recorder::default());
    for payload in payloads {
        pipeline.process_datagram(payload);
    }
    let (out, recorder) = pipeline.into_parts();
    let lines = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    (lines, recorder)
}

#[test]
fn obs_st_emits_one_observation_per_row() {
    let mut rows = Vec::new();
    for i in 0..5 {
        rows.push(format!(
            "[{},0.18,0.22,0.27,144,6,1017.57,22.37,50.26,328,0.03,3,0.0,0,0,0,2.41,1]",
            1588948614 + i * 60
        ));
    }
    let payload = format!(
        r#"{{"serial_number":"ST-00000512","type":"obs_st","hub_sn":"HB-00013030","obs":[{}],"firmware_revision":129}}"#,
        rows.join(",")
    );

    let (lines, recorder) = process(&[payload.as_bytes()]);
    assert_eq!(lines.len(), 5);
    for line in &lines {
        assert!(line.starts_with("observation,station=ST-00000512 "));
    }
    assert_eq!(recorder.dropped, 0);
    assert!(recorder.metric_errors.is_empty());
}

#[test]
fn short_row_drops_humidity_and_keeps_siblings() {
    // length 8: index 8 (relative humidity) is just out of reach
    let (lines, _) = process(&[br#"{"serial_number":"ST-00000512","type":"obs_st","obs":[[1588948614,0.18,0.22,0.27,144,6,1017.57,22.37]]}"#]);
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(!line.contains("humidity"));
    assert!(line.contains("temperature=22.37"));
    assert!(line.contains("pressure=1017.57"));
    assert!(line.contains("wind_spd=0.22"));
    assert!(line.contains("wind_gust=0.27"));
    assert!(line.contains("wind_lull=0.18"));
    assert!(line.contains("wind_dir=144"));
}

#[test]
fn hub_status_literal_round_trip() {
    let (lines, _) = process(&[br#"{"serial_number":"ST-00000001","type":"hub_status","firmware_revision":"17","uptime":32,"rssi":-17.0,"timestamp":1510855923,"reset_flags":"BOR,PIN","seq":1}"#]);
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.starts_with("hub_status,hub=ST-00000001 "));
    assert!(line.contains("seq=1i"));
    // float kind preserved: no integer suffix on rssi
    assert!(line.contains("rssi=-17,") || line.contains("rssi=-17 "));

    let timestamp = line.rsplit(' ').next().unwrap();
    assert!(timestamp.parse::<i64>().is_ok());
    assert_eq!(timestamp.len(), 19); // nanosecond epoch magnitude
}

#[test]
fn rapid_wind_literal_round_trip() {
    let (lines, recorder) = process(&[br#"{"serial_number":"AR-00004049","type":"rapid_wind","hub_sn":"HB-00000001","ob":[1493322445,2.3,128]}"#]);
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.starts_with("wind,hub=HB-00000001,station=AR-00004049 "));
    assert!(line.contains("wind_speed=2.3"));
    assert!(line.contains("wind_dir=128"));
    assert_eq!(recorder.dropped, 0);
}

#[test]
fn bogus_kind_yields_no_metrics_and_one_diagnostic() {
    let (lines, recorder) = process(&[br#"{"serial_number":"AR-00004049","type":"bogus_kind"}"#]);
    assert!(lines.is_empty());
    assert_eq!(
        recorder.unknown,
        vec![("AR-00004049".to_string(), "bogus_kind".to_string())]
    );
}

#[test]
fn encoding_is_idempotent() {
    let metric = Metric::new(
        "observation",
        chrono_timestamp(1588948614),
    )
    .with_tag("station", "ST-00000512")
    .with_field("temperature", 22.37)
    .with_field("lightning_strikes", 3.0);

    let encoder = LineEncoder::new();
    assert_eq!(encoder.encode(&metric).unwrap(), encoder.encode(&metric).unwrap());
}

#[test]
fn line_too_long_is_deterministic() {
    let metric = Metric::new("observation", chrono_timestamp(1588948614))
        .with_tag("station", "ST-00000512")
        .with_field("temperature", 22.37);

    let line = LineEncoder::new().encode(&metric).unwrap();
    let tight = LineEncoder::with_max_line_bytes(line.len() - 1);
    for _ in 0..3 {
        assert!(matches!(
            tight.encode(&metric),
            Err(EncodeError::LineTooLong { .. })
        ));
    }
}

#[test]
fn mixed_traffic_stays_ordered_and_isolated() {
    let (lines, recorder) = process(&[
        br#"{"serial_number":"AR-00004049","type":"rapid_wind","hub_sn":"HB-00000001","ob":[1493322445,2.3,128]}"#,
        b"}} not json",
        br#"{"serial_number":"AR-00004049","type":"evt_strike","hub_sn":"HB-00000001","evt":[1493322445,27,3848]}"#,
        br#"{"serial_number":"AR-00004049","type":"bogus_kind"}"#,
        br#"{"serial_number":"AR-00004049","type":"device_status","timestamp":1510855923,"uptime":2189,"voltage":3.50,"firmware_revision":17,"rssi":-17,"hub_rssi":-87,"sensor_status":0}"#,
    ]);

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("wind,"));
    assert!(lines[1].starts_with("lightning_strike,"));
    assert!(lines[2].starts_with("device_status,"));
    assert_eq!(recorder.dropped, 1);
    assert_eq!(recorder.unknown.len(), 1);
}

fn chrono_timestamp(secs: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(secs, 0).unwrap()
}
