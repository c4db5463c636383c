//! Field values and their wire encoding.
//!
//! [`Value`] is the closed set of shapes a caller can attach to a log line.
//! [`encode`] is the single dispatch table that maps each shape onto a
//! [`WireValue`], the tagged union mirroring the OTLP `AnyValue` schema.
//! Encoding is total: a value that cannot be represented faithfully degrades
//! to a string instead of failing.

mod capture;

use crate::trace::SpanContext;
use chrono::{DateTime, SecondsFormat, Utc};
use opentelemetry_proto::tonic::common::v1::{
    any_value, AnyValue, ArrayValue, KeyValue, KeyValueList,
};
use serde::Serialize;
use std::time::Duration;

/// Key of the trace ID entry in an encoded span context.
pub const TRACE_ID_KEY: &str = "trace_id";

/// Key of the span ID entry in an encoded span context.
pub const SPAN_ID_KEY: &str = "span_id";

/// Encoded value, one variant per OTLP `AnyValue` case plus `Skip`.
///
/// `Skip` marks a value that must be left out of the record entirely; it
/// never reaches the wire as an empty entry.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// Omit the enclosing field.
    Skip,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered array.
    Array(Vec<WireValue>),
    /// Ordered key-value list.
    KvList(Vec<(String, WireValue)>),
}

impl WireValue {
    /// Returns `true` for the `Skip` variant.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    /// Converts into the protobuf `AnyValue`, or `None` for `Skip`.
    ///
    /// Skipped elements inside arrays and key-value lists are dropped.
    #[must_use]
    pub fn into_any_value(self) -> Option<AnyValue> {
        let value = match self {
            Self::Skip => return None,
            Self::Bool(b) => any_value::Value::BoolValue(b),
            Self::Int(i) => any_value::Value::IntValue(i),
            Self::Double(d) => any_value::Value::DoubleValue(d),
            Self::String(s) => any_value::Value::StringValue(s),
            Self::Bytes(b) => any_value::Value::BytesValue(b),
            Self::Array(values) => any_value::Value::ArrayValue(ArrayValue {
                values: values.into_iter().filter_map(Self::into_any_value).collect(),
            }),
            Self::KvList(pairs) => any_value::Value::KvlistValue(KeyValueList {
                values: pairs
                    .into_iter()
                    .filter_map(|(key, value)| key_value(key, value))
                    .collect(),
            }),
        };
        Some(AnyValue { value: Some(value) })
    }
}

/// Builds a protobuf attribute, or `None` if the value is skipped.
pub(crate) fn key_value(key: String, value: WireValue) -> Option<KeyValue> {
    value.into_any_value().map(|value| KeyValue {
        key,
        value: Some(value),
    })
}

/// A field value as supplied at the log call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Trace context marker. `None` or an invalid context is skipped.
    SpanContext(Option<SpanContext>),
    /// Boolean.
    Bool(bool),
    /// Any signed integer width.
    Int(i64),
    /// Any unsigned integer width, including `usize`.
    Uint(u64),
    /// 32-bit float, widened on encoding.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Complex number with 32-bit parts `(re, im)`.
    Complex64(f32, f32),
    /// Complex number with 64-bit parts `(re, im)`.
    Complex128(f64, f64),
    /// String.
    Str(String),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Elapsed time.
    Duration(Duration),
    /// Point in time.
    Time(DateTime<Utc>),
    /// Array of nested values.
    Array(Vec<Value>),
    /// Inline object, encoded as a key-value list.
    Object(Vec<(String, Value)>),
    /// Composite value captured through serde, encoded as compact JSON.
    Json(serde_json::Value),
}

impl Value {
    /// Captures a struct, map or sequence as JSON.
    ///
    /// Struct fields keep declaration order and honour `#[serde(rename)]`;
    /// maps keep their iteration order. Serialization errors degrade to a
    /// string describing the failure.
    pub fn reflect<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => Self::Json(json),
            Err(e) => Self::Str(format!("json encoding failed: {e}")),
        }
    }

    /// Captures a value of unknown shape.
    ///
    /// Scalars are dispatched on their runtime type to the native variant:
    /// `f32` stays `F32`, NaN and infinities stay floats, and non-empty
    /// `u8` sequences become `Bytes`. Everything else, including `None`, unit
    /// and empty sequences, is treated like [`Value::reflect`].
    ///
    /// `std::time::Duration` serializes as a struct here; use
    /// [`Field::duration`](crate::Field::duration) for the `2s` rendering.
    pub fn any<T: Serialize + ?Sized>(value: &T) -> Self {
        value
            .serialize(capture::ScalarCapture)
            .unwrap_or_else(|_| Self::reflect(value))
    }
}

/// Encodes a field value into its wire representation.
///
/// Unsigned integers above `i64::MAX` wrap when narrowed to the signed wire
/// integer. 32-bit floats are widened with `f64::from`, so values that are not
/// exact in 32 bits show their binary expansion (`2.71f32` becomes
/// `2.7100000381469727`).
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn encode(value: Value) -> WireValue {
    match value {
        Value::SpanContext(Some(ctx)) if ctx.is_valid() => WireValue::KvList(vec![
            (
                TRACE_ID_KEY.to_string(),
                WireValue::String(ctx.trace_id().to_string()),
            ),
            (
                SPAN_ID_KEY.to_string(),
                WireValue::String(ctx.span_id().to_string()),
            ),
        ]),
        Value::SpanContext(_) => WireValue::Skip,
        Value::Bool(b) => WireValue::Bool(b),
        Value::Int(i) => WireValue::Int(i),
        Value::Uint(u) => WireValue::Int(u as i64),
        Value::F32(f) => WireValue::Double(f64::from(f)),
        Value::F64(f) => WireValue::Double(f),
        Value::Complex64(re, im) => WireValue::String(format_complex(&re, &im)),
        Value::Complex128(re, im) => WireValue::String(format_complex(&re, &im)),
        Value::Str(s) => WireValue::String(s),
        Value::Bytes(b) => WireValue::Bytes(b),
        Value::Duration(d) => WireValue::String(format!("{d:?}")),
        Value::Time(t) => WireValue::String(t.to_rfc3339_opts(SecondsFormat::Nanos, true)),
        Value::Array(values) => WireValue::Array(
            values
                .into_iter()
                .map(encode)
                .filter(|v| !v.is_skip())
                .collect(),
        ),
        Value::Object(pairs) => WireValue::KvList(
            pairs
                .into_iter()
                .map(|(key, value)| (key, encode(value)))
                .filter(|(_, v)| !v.is_skip())
                .collect(),
        ),
        Value::Json(json) => WireValue::String(json.to_string()),
    }
}

/// Renders `(re±imi)` using shortest round-trip float formatting.
fn format_complex(re: &dyn std::fmt::Display, im: &dyn std::fmt::Display) -> String {
    let im = im.to_string();
    if im.starts_with('-') {
        format!("({re}{im}i)")
    } else {
        format!("({re}+{im}i)")
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                #[allow(clippy::cast_possible_wrap, clippy::cast_lossless, clippy::unnecessary_cast)]
                fn from(v: $t) -> Self {
                    Self::$variant(v as $wide)
                }
            }
        )*
    };
}

impl_from_int!(Int as i64: i8, i16, i32, i64, isize);
impl_from_int!(Uint as u64: u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Self::Duration(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Time(v)
    }
}

impl From<SpanContext> for Value {
    fn from(v: SpanContext) -> Self {
        Self::SpanContext(Some(v))
    }
}

impl From<Option<SpanContext>> for Value {
    fn from(v: Option<SpanContext>) -> Self {
        Self::SpanContext(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{SpanId, TraceId};
    use chrono::TimeZone;
    use prost::Message;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Bar {
        key: String,
        val: f64,
    }

    fn bars() -> Vec<Bar> {
        vec![
            Bar {
                key: "pi".to_string(),
                val: std::f64::consts::PI,
            },
            Bar {
                key: "tau".to_string(),
                val: std::f64::consts::TAU,
            },
        ]
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(true.into()), WireValue::Bool(true));
        assert_eq!(encode(42i32.into()), WireValue::Int(42));
        assert_eq!(encode((-7i8).into()), WireValue::Int(-7));
        assert_eq!(encode(1usize.into()), WireValue::Int(1));
        assert_eq!(encode(3.14f64.into()), WireValue::Double(3.14));
        assert_eq!(
            encode("passes".into()),
            WireValue::String("passes".to_string())
        );
        assert_eq!(
            encode(vec![0u8, 1, 2].into()),
            WireValue::Bytes(vec![0, 1, 2])
        );
    }

    #[test]
    fn test_encode_f32_widening_noise() {
        assert_eq!(
            encode(2.71f32.into()),
            WireValue::Double(2.710_000_038_146_972_7)
        );
    }

    #[test]
    fn test_encode_u64_overflow_wraps() {
        assert_eq!(encode(u64::MAX.into()), WireValue::Int(-1));
        assert_eq!(encode((1u64 << 63).into()), WireValue::Int(i64::MIN));
    }

    #[test]
    fn test_encode_complex() {
        assert_eq!(
            encode(Value::Complex128(3.14, -2.71)),
            WireValue::String("(3.14-2.71i)".to_string())
        );
        assert_eq!(
            encode(Value::Complex64(1.5, 2.0)),
            WireValue::String("(1.5+2i)".to_string())
        );
        assert_eq!(
            encode(Value::Complex128(0.0, 0.0)),
            WireValue::String("(0+0i)".to_string())
        );
    }

    #[test]
    fn test_encode_duration_and_time() {
        assert_eq!(
            encode(Duration::from_secs(2).into()),
            WireValue::String("2s".to_string())
        );
        assert_eq!(
            encode(Duration::from_micros(1500).into()),
            WireValue::String("1.5ms".to_string())
        );

        let t = Utc.with_ymd_and_hms(2018, 6, 19, 16, 33, 42).unwrap()
            + chrono::Duration::nanoseconds(99);
        assert_eq!(
            encode(t.into()),
            WireValue::String("2018-06-19T16:33:42.000000099Z".to_string())
        );
    }

    #[test]
    fn test_reflect_struct_is_compact_json_in_declaration_order() {
        #[derive(Serialize)]
        struct Foo {
            #[serde(rename = "aee")]
            a: String,
            #[serde(rename = "bee")]
            b: i64,
            #[serde(rename = "cee")]
            c: f64,
            #[serde(rename = "dee")]
            d: Vec<Bar>,
        }

        let foo = Foo {
            a: "lol".to_string(),
            b: 123,
            c: 0.9999,
            d: bars(),
        };

        assert_eq!(
            encode(Value::reflect(&foo)),
            WireValue::String(
                r#"{"aee":"lol","bee":123,"cee":0.9999,"dee":[{"key":"pi","val":3.141592653589793},{"key":"tau","val":6.283185307179586}]}"#
                    .to_string()
            )
        );
    }

    #[test]
    fn test_reflect_map_keeps_iteration_order() {
        let mut map = BTreeMap::new();
        map.insert("b", 2);
        map.insert("a", 1);
        assert_eq!(
            encode(Value::reflect(&map)),
            WireValue::String(r#"{"a":1,"b":2}"#.to_string())
        );

        let inserted = json!({"zeta": 1, "alpha": {"y": true, "x": null}});
        assert_eq!(
            encode(Value::reflect(&inserted)),
            WireValue::String(r#"{"zeta":1,"alpha":{"y":true,"x":null}}"#.to_string())
        );
    }

    #[test]
    fn test_reflect_unencodable_degrades_to_string() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "tuple keys are not JSON");

        let encoded = encode(Value::reflect(&map));
        assert!(
            matches!(encoded, WireValue::String(ref s) if s.starts_with("json encoding failed")),
            "unexpected encoding: {encoded:?}"
        );
    }

    #[test]
    fn test_any_dispatches_on_runtime_shape() {
        assert_eq!(Value::any(&true), Value::Bool(true));
        assert_eq!(Value::any(&-5i16), Value::Int(-5));
        assert_eq!(Value::any(&u64::MAX), Value::Uint(u64::MAX));
        assert_eq!(Value::any(&0.5f64), Value::F64(0.5));
        assert_eq!(Value::any("hi"), Value::Str("hi".to_string()));

        assert_eq!(
            encode(Value::any(&bars()[0])),
            WireValue::String(r#"{"key":"pi","val":3.141592653589793}"#.to_string())
        );
        assert_eq!(
            encode(Value::any(&bars())),
            WireValue::String(
                r#"[{"key":"pi","val":3.141592653589793},{"key":"tau","val":6.283185307179586}]"#
                    .to_string()
            )
        );
        assert_eq!(
            encode(Value::any(&None::<i32>)),
            WireValue::String("null".to_string())
        );
    }

    #[test]
    fn test_any_keeps_non_json_floats_as_doubles() {
        assert!(matches!(encode(Value::any(&f64::NAN)), WireValue::Double(d) if d.is_nan()));
        assert_eq!(
            encode(Value::any(&f64::INFINITY)),
            WireValue::Double(f64::INFINITY)
        );
        assert_eq!(
            encode(Value::any(&f64::NEG_INFINITY)),
            WireValue::Double(f64::NEG_INFINITY)
        );
        assert_eq!(Value::any(&2.71f32), Value::F32(2.71));
        assert_eq!(
            encode(Value::any(&Some(1.5f64))),
            WireValue::Double(1.5)
        );
    }

    #[test]
    fn test_any_byte_buffers_become_bytes() {
        assert_eq!(
            encode(Value::any(&vec![1u8, 2])),
            WireValue::Bytes(vec![1, 2])
        );
        assert_eq!(
            encode(Value::any(&[0xdeu8, 0xad][..])),
            WireValue::Bytes(vec![0xde, 0xad])
        );
        assert_eq!(
            encode(Value::any(&[7u8, 8, 9])),
            WireValue::Bytes(vec![7, 8, 9])
        );

        assert_eq!(
            encode(Value::any(&vec![1u16, 2])),
            WireValue::String("[1,2]".to_string())
        );
        assert_eq!(
            encode(Value::any(&Vec::<u8>::new())),
            WireValue::String("[]".to_string())
        );
    }

    #[test]
    fn test_any_duration_is_a_json_struct() {
        assert_eq!(
            encode(Value::any(&Duration::from_secs(2))),
            WireValue::String(r#"{"secs":2,"nanos":0}"#.to_string())
        );
    }

    #[test]
    fn test_span_context_encoding() {
        let ctx = SpanContext::new(TraceId::from_bytes([0xab; 16]), SpanId::from_bytes([0x01; 8]));

        assert_eq!(
            encode(ctx.into()),
            WireValue::KvList(vec![
                (
                    "trace_id".to_string(),
                    WireValue::String("abababababababababababababababab".to_string())
                ),
                (
                    "span_id".to_string(),
                    WireValue::String("0101010101010101".to_string())
                ),
            ])
        );
        assert_eq!(encode(Value::SpanContext(None)), WireValue::Skip);
        assert_eq!(encode(SpanContext::default().into()), WireValue::Skip);
    }

    #[test]
    fn test_nested_skips_are_dropped() {
        let value = Value::Object(vec![
            ("kept".to_string(), Value::Int(1)),
            ("gone".to_string(), Value::SpanContext(None)),
            (
                "list".to_string(),
                Value::Array(vec![Value::SpanContext(None), Value::Bool(false)]),
            ),
        ]);

        assert_eq!(
            encode(value),
            WireValue::KvList(vec![
                ("kept".to_string(), WireValue::Int(1)),
                (
                    "list".to_string(),
                    WireValue::Array(vec![WireValue::Bool(false)])
                ),
            ])
        );
    }

    #[test]
    fn test_skip_has_no_any_value() {
        assert!(WireValue::Skip.into_any_value().is_none());
        assert!(key_value("k".to_string(), WireValue::Skip).is_none());
    }

    #[test]
    fn test_protobuf_decode_recovers_primitives() {
        let cases = [
            (Value::Bool(true), any_value::Value::BoolValue(true)),
            (Value::Int(i64::MIN), any_value::Value::IntValue(i64::MIN)),
            (Value::F32(0.1), any_value::Value::DoubleValue(f64::from(0.1f32))),
            (
                Value::Str("héllo".to_string()),
                any_value::Value::StringValue("héllo".to_string()),
            ),
            (
                Value::Bytes(vec![0xff, 0x00]),
                any_value::Value::BytesValue(vec![0xff, 0x00]),
            ),
        ];

        for (input, expected) in cases {
            let bytes = encode(input).into_any_value().unwrap().encode_to_vec();
            let decoded = AnyValue::decode(bytes.as_slice()).unwrap();
            assert_eq!(decoded.value, Some(expected));
        }
    }
}
