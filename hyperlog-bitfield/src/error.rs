use thiserror::Error;

/// Errors from decoding run-length encoded or raw bitfield bytes.
///
/// Pager and bitfield reads never fail: absent pages and untouched bytes
/// read as zero.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum BitfieldError {
    /// The input ended inside a run-length varint.
    #[error("truncated run length at byte {0}")]
    TruncatedRunLength(usize),
    /// A run length was read but its byte value is missing.
    #[error("missing run value at byte {0}")]
    TruncatedRunValue(usize),
    /// A run length decoded to a negative count.
    #[error("invalid run length {length} at byte {position}")]
    InvalidRunLength {
        /// The decoded count.
        length: i64,
        /// Offset of the varint in the input.
        position: usize,
    },
    /// Decoding would produce more bytes than the caller allows.
    #[error("decoded length exceeds limit of {limit} bytes")]
    DecodedLengthExceeded {
        /// The caller-supplied maximum.
        limit: u64,
    },
}
