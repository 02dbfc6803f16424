use crate::payload::{Payload, PayloadKind};
use arbitrary::{Arbitrary, Unstructured};
use std::fmt;

/// Upper bounds applied when decoding variable-length payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum number of input bytes turned into a text payload.
    pub max_text_len: usize,
    /// Maximum number of input bytes passed through as a byte payload.
    pub max_bytes_len: usize,
}

impl DecodeLimits {
    /// No bound besides the input itself: text and byte payloads take every
    /// remaining byte.
    pub const UNBOUNDED: DecodeLimits = DecodeLimits {
        max_text_len: usize::MAX,
        max_bytes_len: usize::MAX,
    };
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Carves typed values off the front of a fuzz input.
///
/// A thin layer over [`Unstructured`] that never reports an error: every
/// `consume_*` call is a destructive read, and when too few bytes remain for
/// a fixed-width value nothing is consumed and a default is returned.
///
/// The mapping is fully deterministic, so a saved input always replays to the
/// same payload.
pub struct ByteDecoder<'a> {
    data: Unstructured<'a>,
    original_len: usize,
}

impl fmt::Debug for ByteDecoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteDecoder")
            .field("consumed", &self.consumed())
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl<'a> ByteDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data: Unstructured::new(data),
            original_len: data.len(),
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Bytes consumed so far. Always `original length - remaining()`.
    pub fn consumed(&self) -> usize {
        self.original_len - self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Takes up to `max_len` bytes and decodes them as UTF-8.
    ///
    /// Malformed sequences are replaced with U+FFFD instead of being rejected,
    /// so this always yields a string (empty once the input is exhausted).
    /// The bound counts input bytes, not characters.
    pub fn consume_text(&mut self, max_len: usize) -> String {
        let raw = self.consume_bytes(max_len);
        String::from_utf8_lossy(raw).into_owned()
    }

    /// Returns a value in `[0, max]`.
    ///
    /// Uses the smallest number of bytes able to express `max`. Returns 0
    /// without consuming anything when fewer bytes remain than needed.
    pub fn consume_u64_in_range(&mut self, max: u64) -> u64 {
        if self.remaining() < byte_width(max) {
            return 0;
        }
        self.data.int_in_range(0..=max).unwrap_or(0)
    }

    /// Returns a value in the inclusive range between `a` and `b`, in either
    /// order. A short input yields `0` clamped into the range.
    pub fn consume_i64_in_range(&mut self, a: i64, b: i64) -> i64 {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let fallback = 0i64.clamp(min, max);
        if self.remaining() < byte_width(max.abs_diff(min)) {
            return fallback;
        }
        self.data.int_in_range(min..=max).unwrap_or(fallback)
    }

    /// Full-range `i64`, eight bytes.
    pub fn consume_i64(&mut self) -> i64 {
        self.consume_i64_in_range(i64::MIN, i64::MAX)
    }

    /// Reinterprets eight bytes as an IEEE-754 double, so NaN and the
    /// infinities are reachable. Returns 0.0 without consuming anything when
    /// fewer than eight bytes remain.
    pub fn consume_f64(&mut self) -> f64 {
        if self.remaining() < size_of::<f64>() {
            return 0.0;
        }
        f64::arbitrary(&mut self.data).unwrap_or(0.0)
    }

    /// Returns at most `max_len` bytes from the front, verbatim.
    pub fn consume_bytes(&mut self, max_len: usize) -> &'a [u8] {
        let take = max_len.min(self.data.len());
        self.data.bytes(take).unwrap_or_default()
    }

    pub fn consume_remaining_bytes(&mut self) -> &'a [u8] {
        std::mem::replace(&mut self.data, Unstructured::new(&[])).take_rest()
    }

    /// Decodes exactly one payload of the requested kind.
    pub fn consume_payload(&mut self, kind: PayloadKind, limits: &DecodeLimits) -> Payload {
        match kind {
            PayloadKind::Text => Payload::Text(self.consume_text(limits.max_text_len)),
            PayloadKind::Integer => Payload::Integer(self.consume_i64()),
            PayloadKind::Float => Payload::Float(self.consume_f64()),
            PayloadKind::Bytes => {
                Payload::Bytes(self.consume_bytes(limits.max_bytes_len).to_vec())
            }
        }
    }
}

/// Number of bytes an in-range read of `range` consumes. Zero for an empty
/// range, at most 8.
fn byte_width(range: u64) -> usize {
    (u64::BITS - range.leading_zeros()).div_ceil(8) as usize
}
