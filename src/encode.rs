//! Line-protocol encoding
//!
//! Renders one [`Metric`] to one line of InfluxDB line protocol:
//!
//! ```text
//! measurement[,tag_key=tag_value]* field_key=value[,field_key=value]* timestamp
//! ```
//!
//! Escaping, numeric suffixes, and the line-length limit follow the
//! telegraf serializer contract: keys and tag values escape `,`, ` `
//! and `=`; the measurement escapes `,` and ` `; string field values
//! are double-quoted with `"` and `\` escaped; signed integers get an
//! `i` suffix, unsigned a `u` suffix, floats no suffix; timestamps are
//! epoch nanoseconds.

use crate::error::EncodeError;
use crate::metric::{FieldValue, Metric};
use std::fmt::Write;

/// Line-protocol encoder
///
/// Stateless apart from configuration, so one instance serves the
/// whole pipeline. Encoding the same metric twice produces identical
/// bytes.
#[derive(Debug, Clone, Default)]
pub struct LineEncoder {
    /// Maximum encoded line length in bytes; `None` means unlimited
    max_line_bytes: Option<usize>,
}

impl LineEncoder {
    /// Create an encoder with no line-length limit
    pub fn new() -> Self {
        Self {
            max_line_bytes: None,
        }
    }

    /// Create an encoder that rejects lines longer than `max` bytes
    ///
    /// The limit counts the line itself, not the trailing newline.
    /// Over-limit metrics fail with [`EncodeError::LineTooLong`];
    /// nothing is ever truncated.
    pub fn with_max_line_bytes(max: usize) -> Self {
        Self {
            max_line_bytes: Some(max),
        }
    }

    /// The configured limit, if any
    pub fn max_line_bytes(&self) -> Option<usize> {
        self.max_line_bytes
    }

    /// Encode a metric to one line, without the trailing newline
    pub fn encode(&self, metric: &Metric) -> Result<String, EncodeError> {
        if metric.name().is_empty() {
            return Err(EncodeError::EmptyMeasurement);
        }

        let mut line = String::new();
        escape_measurement(&mut line, metric.name());

        for (key, value) in metric.tags() {
            line.push(',');
            escape_key(&mut line, key);
            line.push('=');
            escape_key(&mut line, value);
        }

        line.push(' ');
        let mut wrote_field = false;
        for (key, value) in metric.fields() {
            // Non-finite floats have no line-protocol representation;
            // skip the field, keep the metric.
            if let FieldValue::Float(f) = value {
                if !f.is_finite() {
                    continue;
                }
            }
            if wrote_field {
                line.push(',');
            }
            escape_key(&mut line, key);
            line.push('=');
            write_field_value(&mut line, value);
            wrote_field = true;
        }

        if !wrote_field {
            return Err(EncodeError::EmptyFieldSet {
                name: metric.name().to_string(),
            });
        }

        let nanos = metric.timestamp().timestamp_nanos_opt().unwrap_or(0);
        let _ = write!(line, " {nanos}");

        if let Some(max) = self.max_line_bytes {
            if line.len() > max {
                return Err(EncodeError::LineTooLong {
                    length: line.len(),
                    max,
                });
            }
        }

        Ok(line)
    }
}

fn escape_measurement(out: &mut String, name: &str) {
    for c in name.chars() {
        if c == ',' || c == ' ' {
            out.push('\\');
        }
        out.push(c);
    }
}

fn escape_key(out: &mut String, key: &str) {
    for c in key.chars() {
        if c == ',' || c == ' ' || c == '=' {
            out.push('\\');
        }
        out.push(c);
    }
}

fn write_field_value(out: &mut String, value: &FieldValue) {
    match value {
        // Display for f64 is the shortest representation that round-trips,
        // so full precision is preserved and -17.0 renders as "-17"
        FieldValue::Float(f) => {
            let _ = write!(out, "{f}");
        }
        FieldValue::Int(i) => {
            let _ = write!(out, "{i}i");
        }
        FieldValue::UInt(u) => {
            let _ = write!(out, "{u}u");
        }
        FieldValue::Str(s) => {
            out.push('"');
            for c in s.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
    }
}
