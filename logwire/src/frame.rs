//! Scope-prefixed framing of encoded log records.
//!
//! A frame is `<scope name><SENTINEL><protobuf LogRecord>`. Consumers split on
//! the first sentinel to recover the scope without decoding the payload.
//! Scope names must not contain the sentinel, nor end in a way that makes
//! the first sentinel start inside the scope; [`frame`] rejects them.

use crate::field::Field;
use crate::record::{build_record, Entry};
use opentelemetry_proto::tonic::logs::v1::LogRecord;
use prost::Message;
use thiserror::Error;

/// Separator between the scope name and the record payload.
pub const SENTINEL: &[u8] = b"#LOGWIRE#";

/// Errors that can occur while framing or unframing a record.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The scope name contains the sentinel and could not be split back out.
    #[error("Scope name {0:?} contains the frame sentinel")]
    SentinelInScope(String),

    /// The frame has no sentinel.
    #[error("Frame sentinel not found")]
    MissingSentinel,

    /// The scope part of a frame is not valid UTF-8.
    #[error("Scope name is not valid UTF-8: {0}")]
    InvalidScope(#[from] std::str::Utf8Error),

    /// Protobuf encoding of the record failed.
    #[error("Failed to encode log record: {0}")]
    Encode(#[from] prost::EncodeError),

    /// The payload is not a valid protobuf log record.
    #[error("Failed to decode log record: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// Serializes a record and prefixes it with its scope name.
///
/// # Errors
///
/// Returns an error if:
/// - The scope name contains [`SENTINEL`], or overlaps it so that the first
///   sentinel in the frame would start inside the scope
/// - Protobuf encoding fails
pub fn frame(scope: &str, record: &LogRecord) -> Result<Vec<u8>, FrameError> {
    let mut buf = Vec::with_capacity(scope.len() + SENTINEL.len() + record.encoded_len());
    buf.extend_from_slice(scope.as_bytes());
    buf.extend_from_slice(SENTINEL);

    // The first sentinel must be the one just appended, otherwise a split
    // would cut the scope short (e.g. a scope ending in a sentinel prefix).
    if find_sentinel(&buf) != Some(scope.len()) {
        return Err(FrameError::SentinelInScope(scope.to_string()));
    }

    record.encode(&mut buf)?;
    Ok(buf)
}

/// Splits a frame on the first sentinel into `(scope, payload)`.
///
/// # Errors
///
/// Returns an error if the sentinel is missing or the scope is not UTF-8.
pub fn split_frame(bytes: &[u8]) -> Result<(&str, &[u8]), FrameError> {
    let pos = find_sentinel(bytes).ok_or(FrameError::MissingSentinel)?;
    let scope = std::str::from_utf8(&bytes[..pos])?;
    Ok((scope, &bytes[pos + SENTINEL.len()..]))
}

/// Splits a frame and decodes its payload.
///
/// # Errors
///
/// Returns an error if the frame cannot be split or the payload is not a
/// valid log record.
pub fn unframe(bytes: &[u8]) -> Result<(String, LogRecord), FrameError> {
    let (scope, payload) = split_frame(bytes)?;
    let record = LogRecord::decode(payload)?;
    Ok((scope.to_string(), record))
}

fn find_sentinel(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(SENTINEL.len())
        .position(|window| window == SENTINEL)
}

/// Turns log entries into frames ready for the exporter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordEncoder;

impl RecordEncoder {
    /// Creates a new encoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the record for `entry` and frames it under the logger name.
    ///
    /// # Errors
    ///
    /// Returns an error if the logger name contains [`SENTINEL`] or the
    /// record cannot be encoded.
    pub fn encode_entry(
        &self,
        entry: &Entry,
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<Vec<u8>, FrameError> {
        let record = build_record(entry, fields);
        frame(&entry.logger_name, &record)
    }
}
