//! Metric construction
//!
//! A [`Metric`] is accumulated incrementally by the pipeline and then
//! handed to the encoder whole. Field values carry an explicit numeric
//! kind; the encoder renders whatever kind was declared here and never
//! re-types a value from its magnitude.

use chrono::{DateTime, Utc};

/// A field value with its declared type
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Rendered in full precision with no suffix
    Float(f64),
    /// Rendered with an `i` suffix
    Int(i64),
    /// Rendered with a `u` suffix
    UInt(u64),
    /// Rendered quoted, with `"` and `\` escaped
    Str(String),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::UInt(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

/// One metric instance: name, tags, fields, timestamp
///
/// Tags and fields keep insertion order, so encoding the same metric
/// twice yields byte-identical text. Keys are unique; writing a key a
/// second time replaces the earlier value in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    name: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
    timestamp: DateTime<Utc>,
}

impl Metric {
    /// Create a metric with an explicit timestamp
    pub fn new(name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp,
        }
    }

    /// Create a metric stamped with the current time
    pub fn now(name: impl Into<String>) -> Self {
        Self::new(name, Utc::now())
    }

    /// Measurement name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timestamp this metric reports
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Tags in insertion order
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Fields in insertion order
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Whether at least one field has been added
    ///
    /// The encoder rejects a field-less metric, so callers check this
    /// before encoding.
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Add a tag, chaining
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_tag(key, value);
        self
    }

    /// Add a field, chaining
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.add_field(key, value);
        self
    }

    /// Add a tag
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        upsert(&mut self.tags, key.into(), value.into());
    }

    /// Add a field
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        upsert(&mut self.fields, key.into(), value.into());
    }

    /// Add a field only if the extraction produced a value
    ///
    /// This is the tolerant-population primitive: an absent positional
    /// read skips one field and touches nothing else.
    pub fn add_field_if_present(
        &mut self,
        key: impl Into<String>,
        value: Option<impl Into<FieldValue>>,
    ) {
        if let Some(value) = value {
            self.add_field(key, value);
        }
    }
}

fn upsert<V>(entries: &mut Vec<(String, V)>, key: String, value: V) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}
