//! Trace context carried alongside log records.
//!
//! Identifiers are copied verbatim from whatever tracing system is in use;
//! this module never generates them.

use std::fmt;

/// A 16-byte trace identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TraceId([u8; 16]);

impl TraceId {
    /// The all-zero, invalid trace ID.
    pub const INVALID: Self = Self([0; 16]);

    /// Creates a trace ID from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// An 8-byte span identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpanId([u8; 8]);

impl SpanId {
    /// The all-zero, invalid span ID.
    pub const INVALID: Self = Self([0; 8]);

    /// Creates a span ID from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Identifies the active span a log line was emitted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpanContext {
    trace_id: TraceId,
    span_id: SpanId,
}

impl SpanContext {
    /// Creates a span context from a trace ID and span ID.
    #[must_use]
    pub const fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self { trace_id, span_id }
    }

    /// The trace this span belongs to.
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// The span itself.
    #[must_use]
    pub const fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// A context is valid when both identifiers are non-zero.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.span_id != SpanId::INVALID
    }
}

/// Looks up the span that is active for the caller, if any.
///
/// Implemented by adapters over a tracing system. Callers resolve the
/// context themselves and pass it to [`Field::span_ctx`](crate::Field::span_ctx),
/// so nothing in this crate reads ambient state.
pub trait TraceContextProvider {
    /// Returns the active span context, or `None` when there is no active span.
    fn active_span(&self) -> Option<SpanContext>;
}

impl TraceContextProvider for Option<SpanContext> {
    fn active_span(&self) -> Option<SpanContext> {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_context_validity() {
        let ctx = SpanContext::new(TraceId::from_bytes([1; 16]), SpanId::from_bytes([2; 8]));
        assert!(ctx.is_valid());

        assert!(!SpanContext::default().is_valid());
        assert!(!SpanContext::new(TraceId::INVALID, SpanId::from_bytes([2; 8])).is_valid());
        assert!(!SpanContext::new(TraceId::from_bytes([1; 16]), SpanId::INVALID).is_valid());
    }

    #[test]
    fn test_ids_render_as_lowercase_hex() {
        let trace_id = TraceId::from_bytes([
            0x4b, 0xf9, 0x2f, 0x35, 0x77, 0xb3, 0x4d, 0xa6, 0xa3, 0xce, 0x92, 0x9d, 0x0e, 0x0e,
            0x47, 0x36,
        ]);
        let span_id = SpanId::from_bytes([0x00, 0xf0, 0x67, 0xaa, 0x0b, 0xa9, 0x02, 0xb7]);

        assert_eq!(trace_id.to_string(), "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(span_id.to_string(), "00f067aa0ba902b7");
    }

    #[test]
    fn test_option_provider() {
        let ctx = SpanContext::new(TraceId::from_bytes([7; 16]), SpanId::from_bytes([9; 8]));
        assert_eq!(Some(ctx).active_span(), Some(ctx));
        assert_eq!(None::<SpanContext>.active_span(), None);
    }
}
