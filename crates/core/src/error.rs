//! Error types for the bytecodec system.
//!
//! All operations return structured errors rather than panicking. Codec
//! failures are detected at the point of violation and surfaced immediately;
//! no partial output is ever reported as success.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Codec: one of the three engines rejected its input or ran out of room
/// - Bit I/O: reading/writing bits from/to byte buffers
/// - Framing: container frame serialization/parsing
/// - CRC: data corruption detected
/// - I/O: file system operations
#[derive(Debug, Error)]
pub enum Error {
    /// Codec engine failure (RLE, Huffman or LZ77)
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Container frame error (e.g., invalid header, length mismatch)
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// CRC validation failed, indicating data corruption
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map this error to the negative status code of the C-style calling
    /// convention (`compress(...) -> int`).
    ///
    /// Codec errors keep their own code; every other failure domain maps to
    /// [`STATUS_OTHER`].
    pub fn code(&self) -> i32 {
        match self {
            Error::Codec(err) => err.code(),
            _ => STATUS_OTHER,
        }
    }

    /// The codec error wrapped by this error, if any.
    pub fn as_codec(&self) -> Option<&CodecError> {
        match self {
            Error::Codec(err) => Some(err),
            _ => None,
        }
    }
}

/// Status code for failures outside the codec engines.
pub const STATUS_OTHER: i32 = -6;

/// Codec engine errors.
///
/// The first four kinds are shared by all engines. `Ambiguous` is only
/// produced by the LZ77 compressor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Absent or empty buffer, or an input the format cannot describe
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Output capacity exhausted
    #[error("output buffer overflow: need {required} bytes, capacity {capacity}")]
    BufferOverflow { required: usize, capacity: usize },

    /// Encoded input violates the wire format
    #[error("malformed input at offset {offset}: {reason}")]
    MalformedInput { offset: usize, reason: &'static str },

    /// Encoded form is not smaller than the input; store it raw instead
    #[error("compression ineffective: {encoded} encoded bytes for {input} input bytes")]
    Ineffective { encoded: usize, input: usize },

    /// A literal in the untagged LZ77 stream would be read back as a match
    #[error("ambiguous literal at output offset {offset}")]
    Ambiguous { offset: usize },
}

impl CodecError {
    /// Negative status code of the C-style calling convention.
    pub fn code(&self) -> i32 {
        match self {
            CodecError::InvalidArgument(_) => -1,
            CodecError::BufferOverflow { .. } => -2,
            CodecError::MalformedInput { .. } => -3,
            CodecError::Ineffective { .. } => -4,
            CodecError::Ambiguous { .. } => -5,
        }
    }

    /// Whether the caller should fall back to storing the input raw.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            CodecError::Ineffective { .. } | CodecError::Ambiguous { .. }
        )
    }
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Attempted to write past the end of the destination slice
    #[error("bit writer full: capacity {capacity} bytes")]
    BufferFull { capacity: usize },

    /// Invalid bit count (more than 64 bits at once)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Container frame errors.
#[derive(Debug, Error)]
pub enum FramingError {
    /// Invalid magic number in header
    #[error("invalid magic number: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Frame is too short to contain a valid header
    #[error("frame too short: need at least {required} bytes, got {actual}")]
    FrameTooShort { required: usize, actual: usize },

    /// Codec id in the header is not known
    #[error("unknown codec id {0}")]
    UnknownCodec(u8),

    /// Restored length doesn't match the header
    #[error("raw length mismatch: header says {expected}, got {actual}")]
    RawLengthMismatch { expected: usize, actual: usize },

    /// Data does not fit the 32-bit length fields
    #[error("input of {0} bytes is too large to frame")]
    TooLarge(usize),

    /// Raw length above the caller's limit; nothing was allocated
    #[error("raw length {raw_len} exceeds limit of {limit} bytes")]
    RawLengthOverLimit { raw_len: usize, limit: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
