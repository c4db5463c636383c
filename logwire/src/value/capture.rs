//! Scalar capture for [`Value::any`](super::Value::any).
//!
//! A serializer that accepts exactly one scalar and maps it onto the native
//! [`Value`] variant. Anything compound, and `None`/unit, is refused with
//! [`NotScalar`] so the caller can fall back to JSON.

use super::Value;
use serde::ser::{self, Impossible, Serialize, SerializeSeq, SerializeTuple, Serializer};
use std::fmt;

/// The value is not a scalar this serializer captures.
#[derive(Debug)]
pub(super) struct NotScalar;

impl fmt::Display for NotScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("not a scalar")
    }
}

impl std::error::Error for NotScalar {}

impl ser::Error for NotScalar {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Self
    }
}

/// Captures one scalar as a [`Value`].
pub(super) struct ScalarCapture;

impl Serializer for ScalarCapture {
    type Ok = Value;
    type Error = NotScalar;
    type SerializeSeq = ByteSeq;
    type SerializeTuple = ByteSeq;
    type SerializeTupleStruct = Impossible<Value, NotScalar>;
    type SerializeTupleVariant = Impossible<Value, NotScalar>;
    type SerializeMap = Impossible<Value, NotScalar>;
    type SerializeStruct = Impossible<Value, NotScalar>;
    type SerializeStructVariant = Impossible<Value, NotScalar>;

    fn serialize_bool(self, v: bool) -> Result<Value, NotScalar> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, NotScalar> {
        Ok(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<Value, NotScalar> {
        Ok(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<Value, NotScalar> {
        Ok(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<Value, NotScalar> {
        Ok(v.into())
    }

    fn serialize_u8(self, v: u8) -> Result<Value, NotScalar> {
        Ok(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<Value, NotScalar> {
        Ok(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<Value, NotScalar> {
        Ok(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<Value, NotScalar> {
        Ok(v.into())
    }

    fn serialize_f32(self, v: f32) -> Result<Value, NotScalar> {
        Ok(Value::F32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, NotScalar> {
        Ok(Value::F64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, NotScalar> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, NotScalar> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, NotScalar> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, NotScalar> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, NotScalar> {
        Ok(Value::Str(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, NotScalar> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Value, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ByteSeq, NotScalar> {
        Ok(ByteSeq(Vec::with_capacity(len.unwrap_or(0))))
    }

    fn serialize_tuple(self, len: usize) -> Result<ByteSeq, NotScalar> {
        Ok(ByteSeq(Vec::with_capacity(len)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, NotScalar> {
        Err(NotScalar)
    }
}

/// Collects a non-empty sequence or array whose elements are all `u8`.
///
/// serde writes `Vec<u8>`, `[u8]` and `[u8; N]` element by element, so byte
/// buffers only reach `serialize_bytes` through wrappers like `serde_bytes`.
pub(super) struct ByteSeq(Vec<u8>);

impl ByteSeq {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NotScalar> {
        self.0.push(value.serialize(ByteOnly)?);
        Ok(())
    }

    fn finish(self) -> Result<Value, NotScalar> {
        if self.0.is_empty() {
            return Err(NotScalar);
        }
        Ok(Value::Bytes(self.0))
    }
}

impl SerializeSeq for ByteSeq {
    type Ok = Value;
    type Error = NotScalar;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NotScalar> {
        self.push(value)
    }

    fn end(self) -> Result<Value, NotScalar> {
        self.finish()
    }
}

impl SerializeTuple for ByteSeq {
    type Ok = Value;
    type Error = NotScalar;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NotScalar> {
        self.push(value)
    }

    fn end(self) -> Result<Value, NotScalar> {
        self.finish()
    }
}

/// Accepts a single `u8` and nothing else.
struct ByteOnly;

impl Serializer for ByteOnly {
    type Ok = u8;
    type Error = NotScalar;
    type SerializeSeq = Impossible<u8, NotScalar>;
    type SerializeTuple = Impossible<u8, NotScalar>;
    type SerializeTupleStruct = Impossible<u8, NotScalar>;
    type SerializeTupleVariant = Impossible<u8, NotScalar>;
    type SerializeMap = Impossible<u8, NotScalar>;
    type SerializeStruct = Impossible<u8, NotScalar>;
    type SerializeStructVariant = Impossible<u8, NotScalar>;

    fn serialize_u8(self, v: u8) -> Result<u8, NotScalar> {
        Ok(v)
    }

    fn serialize_bool(self, _v: bool) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_i8(self, _v: i8) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_i16(self, _v: i16) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_i32(self, _v: i32) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_i64(self, _v: i64) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_u16(self, _v: u16) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_u32(self, _v: u32) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_u64(self, _v: u64) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_f32(self, _v: f32) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_f64(self, _v: f64) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_char(self, _v: char) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_str(self, _v: &str) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_none(self) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_unit(self) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<u8, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, NotScalar> {
        Err(NotScalar)
    }
}
