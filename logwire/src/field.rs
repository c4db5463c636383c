//! Named fields attached to a log line.

use crate::trace::{SpanContext, TraceContextProvider};
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;
use std::time::Duration;

/// A named value attached to a log entry.
///
/// Names need not be unique. Fields keep the order they were supplied in,
/// and that order is preserved in the encoded record's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Attribute key.
    pub key: String,
    /// Value before encoding.
    pub value: Value,
}

impl Field {
    /// Creates a field from anything convertible into a [`Value`].
    ///
    /// # Example
    ///
    /// ```
    /// use logwire::{Field, Value};
    ///
    /// let field = Field::new("answer", 42);
    /// assert_eq!(field.value, Value::Int(42));
    /// ```
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// String field.
    #[must_use]
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::Str(value.into()))
    }

    /// Boolean field.
    #[must_use]
    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, value)
    }

    /// 64-bit signed integer field.
    #[must_use]
    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, value)
    }

    /// 64-bit unsigned integer field. Values above `i64::MAX` wrap on encoding.
    #[must_use]
    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, value)
    }

    /// 32-bit float field, widened to 64 bits on encoding.
    #[must_use]
    pub fn float32(key: impl Into<String>, value: f32) -> Self {
        Self::new(key, value)
    }

    /// 64-bit float field.
    #[must_use]
    pub fn float64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, value)
    }

    /// Complex number with 32-bit parts.
    #[must_use]
    pub fn complex64(key: impl Into<String>, re: f32, im: f32) -> Self {
        Self::new(key, Value::Complex64(re, im))
    }

    /// Complex number with 64-bit parts.
    #[must_use]
    pub fn complex128(key: impl Into<String>, re: f64, im: f64) -> Self {
        Self::new(key, Value::Complex128(re, im))
    }

    /// Byte string field.
    #[must_use]
    pub fn bytes(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(key, Value::Bytes(value.into()))
    }

    /// Duration field, rendered like `2s` or `1.5ms`.
    #[must_use]
    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, value)
    }

    /// Timestamp field, rendered as RFC 3339 with nanoseconds.
    #[must_use]
    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::new(key, value)
    }

    /// Field holding the `Display` rendering of a value.
    #[must_use]
    pub fn display(key: impl Into<String>, value: &impl Display) -> Self {
        Self::new(key, Value::Str(value.to_string()))
    }

    /// Error field under the conventional `error` key.
    #[must_use]
    pub fn error(err: &(dyn std::error::Error + '_)) -> Self {
        Self::new("error", Value::Str(err.to_string()))
    }

    /// Array of values.
    #[must_use]
    pub fn array(key: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(key, Value::Array(values.into_iter().collect()))
    }

    /// Inline object, encoded as a key-value list.
    #[must_use]
    pub fn object(key: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Self::new(
            key,
            Value::Object(fields.into_iter().map(|f| (f.key, f.value)).collect()),
        )
    }

    /// Struct, map or sequence captured as compact JSON.
    #[must_use]
    pub fn reflect<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Self {
        Self::new(key, Value::reflect(value))
    }

    /// Value of unknown shape; scalars keep their type, composites become JSON.
    #[must_use]
    pub fn any<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Self {
        Self::new(key, Value::any(value))
    }

    /// Trace context field.
    ///
    /// When the context is present and valid its IDs populate the record's
    /// trace and span IDs; otherwise the field is dropped from the record.
    #[must_use]
    pub fn span_ctx(ctx: Option<SpanContext>) -> Self {
        Self::new(String::new(), Value::SpanContext(ctx))
    }

    /// Trace context field resolved from a provider.
    #[must_use]
    pub fn span_ctx_from(provider: &impl TraceContextProvider) -> Self {
        Self::span_ctx(provider.active_span())
    }
}
