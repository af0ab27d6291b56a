//! Container frame serialization and parsing.
//!
//! A frame packages one compressed payload with what is needed to restore it
//! without outside knowledge: the codec that produced it, the original
//! length, and a checksum.
//!
//! # Frame Format
//!
//! ```text
//! +------------------+
//! | Magic (4 bytes)  |  0x42 0x43 0x44 0x43 ("BCDC")
//! +------------------+
//! | codec_id (1)     |  u8, see CodecKind::id
//! +------------------+
//! | raw_len (4)      |  u32 original uncompressed size
//! +------------------+
//! | payload_len (4)  |  u32 encoded payload length
//! +------------------+
//! | crc32 (4)        |  u32 checksum
//! +------------------+
//! | payload          |  codec output (payload_len bytes)
//! | (variable)       |
//! +------------------+
//! ```
//!
//! # CRC Coverage
//!
//! The CRC32 covers codec_id, raw_len, payload_len and the payload.
//!
//! # Stored Fallback
//!
//! An untagged LZ77 stream that would read back wrongly (`Ambiguous`) is
//! retried with the flag-tagged variant. When the codec still cannot make
//! the data smaller (Huffman reports `Ineffective`, or the payload simply is
//! not shorter) the frame carries the raw bytes under `CodecKind::Stored`.

use tracing::debug;

use crate::codec::{Codec, CodecKind};
use crate::error::{CodecError, Error, FramingError, Result};

/// Magic number for frames: "BCDC"
const MAGIC: [u8; 4] = [0x42, 0x43, 0x44, 0x43];

/// Size of the frame header in bytes
pub const HEADER_SIZE: usize = 17;

/// Largest `raw_len` that [`decompress_frame`] will allocate for
pub const DEFAULT_MAX_RAW_LEN: usize = 64 << 20;

/// A parsed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Codec that produced the payload
    pub codec: CodecKind,

    /// Original uncompressed data length
    pub raw_len: u32,

    /// Encoded payload
    pub payload: Vec<u8>,

    /// CRC32 checksum (for validation)
    pub crc32: u32,
}

/// Serialize a frame around an already-encoded payload.
///
/// # Errors
/// Returns `FramingError::TooLarge` if either length exceeds `u32`.
pub fn serialize_frame(codec: CodecKind, raw_len: usize, payload: &[u8]) -> Result<Vec<u8>> {
    let raw_len = u32::try_from(raw_len).map_err(|_| FramingError::TooLarge(raw_len))?;
    let payload_len =
        u32::try_from(payload.len()).map_err(|_| FramingError::TooLarge(payload.len()))?;

    let crc32 = compute_crc(codec.id(), raw_len, payload_len, payload);

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&MAGIC);
    frame.push(codec.id());
    frame.extend_from_slice(&raw_len.to_le_bytes());
    frame.extend_from_slice(&payload_len.to_le_bytes());
    frame.extend_from_slice(&crc32.to_le_bytes());
    frame.extend_from_slice(payload);

    Ok(frame)
}

/// Parse a frame from bytes.
///
/// # Errors
/// - `FramingError::FrameTooShort` if the buffer is smaller than the header
///   or than the payload length it announces
/// - `FramingError::InvalidMagic` if the magic number doesn't match
/// - `Error::Crc` if CRC validation fails
/// - `FramingError::UnknownCodec` if the codec id is not recognized
pub fn parse_frame(bytes: &[u8]) -> Result<Frame> {
    if bytes.len() < HEADER_SIZE {
        return Err(FramingError::FrameTooShort {
            required: HEADER_SIZE,
            actual: bytes.len(),
        }
        .into());
    }

    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if magic != MAGIC {
        return Err(FramingError::InvalidMagic {
            expected: MAGIC,
            actual: magic,
        }
        .into());
    }

    let codec_id = bytes[4];
    let raw_len = read_u32(bytes, 5);
    let payload_len = read_u32(bytes, 9);
    let crc32 = read_u32(bytes, 13);

    let expected_size = HEADER_SIZE + payload_len as usize;
    if bytes.len() != expected_size {
        return Err(FramingError::FrameTooShort {
            required: expected_size,
            actual: bytes.len(),
        }
        .into());
    }

    let payload = &bytes[HEADER_SIZE..];
    let computed_crc = compute_crc(codec_id, raw_len, payload_len, payload);
    if computed_crc != crc32 {
        return Err(Error::Crc {
            expected: crc32,
            actual: computed_crc,
        });
    }

    let codec = CodecKind::from_id(codec_id).ok_or(FramingError::UnknownCodec(codec_id))?;

    Ok(Frame {
        codec,
        raw_len,
        payload: payload.to_vec(),
        crc32,
    })
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Compute CRC32 over the protected fields.
fn compute_crc(codec_id: u8, raw_len: u32, payload_len: u32, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&[codec_id]);
    hasher.update(&raw_len.to_le_bytes());
    hasher.update(&payload_len.to_le_bytes());
    hasher.update(payload);
    hasher.finalize()
}

/// Compress `raw_data` with `codec` and build a frame.
///
/// Untagged LZ77 retries as `CodecKind::Lz77Tagged` on `Ambiguous`. Falls
/// back to `CodecKind::Stored` when the codec asks for it or its output is
/// not smaller than the input. Empty data frames as an empty stored payload.
///
/// # Errors
/// Propagates codec errors other than the fallback kinds, and
/// `FramingError::TooLarge`.
pub fn compress_and_frame(codec: CodecKind, raw_data: &[u8]) -> Result<Vec<u8>> {
    if raw_data.is_empty() {
        return serialize_frame(CodecKind::Stored, 0, &[]);
    }

    let mut scratch = vec![0u8; codec.max_compressed_len(raw_data.len())];
    let mut attempt = codec.compress(raw_data, &mut scratch);
    let mut codec = codec;

    if codec == CodecKind::Lz77 {
        if let Err(Error::Codec(CodecError::Ambiguous { offset })) = attempt {
            debug!(offset, "untagged lz77 ambiguous, retrying tagged");
            codec = CodecKind::Lz77Tagged;
            scratch.resize(codec.max_compressed_len(raw_data.len()), 0);
            attempt = codec.compress(raw_data, &mut scratch);
        }
    }

    let (used, payload) = match attempt {
        Ok(n) if n < raw_data.len() => (codec, &scratch[..n]),
        Ok(n) => {
            debug!(%codec, encoded = n, raw = raw_data.len(), "no gain, storing raw");
            (CodecKind::Stored, raw_data)
        }
        Err(Error::Codec(err)) if err.is_fallback() => {
            debug!(%codec, %err, "storing raw");
            (CodecKind::Stored, raw_data)
        }
        Err(err) => return Err(err),
    };

    serialize_frame(used, raw_data.len(), payload)
}

/// Decompress a parsed frame, refusing raw lengths above
/// [`DEFAULT_MAX_RAW_LEN`].
///
/// # Errors
/// See [`decompress_frame_with_limit`].
pub fn decompress_frame(frame: &Frame) -> Result<Vec<u8>> {
    decompress_frame_with_limit(frame, DEFAULT_MAX_RAW_LEN)
}

/// Decompress a parsed frame whose header claims at most `max_raw_len` bytes.
///
/// The header is checked against the limit before the output is allocated.
///
/// # Errors
/// - `FramingError::RawLengthOverLimit` if `raw_len` exceeds `max_raw_len`
/// - Propagates codec errors
/// - `FramingError::RawLengthMismatch` if the codec restores a different
///   number of bytes than the header announces
pub fn decompress_frame_with_limit(frame: &Frame, max_raw_len: usize) -> Result<Vec<u8>> {
    let raw_len = frame.raw_len as usize;
    if raw_len > max_raw_len {
        return Err(FramingError::RawLengthOverLimit {
            raw_len,
            limit: max_raw_len,
        }
        .into());
    }
    if raw_len == 0 {
        if !frame.payload.is_empty() {
            return Err(FramingError::RawLengthMismatch {
                expected: 0,
                actual: frame.payload.len(),
            }
            .into());
        }
        return Ok(Vec::new());
    }

    let mut output = vec![0u8; raw_len];
    let restored = frame.codec.decompress(&frame.payload, &mut output)?;
    if restored != raw_len {
        return Err(FramingError::RawLengthMismatch {
            expected: raw_len,
            actual: restored,
        }
        .into());
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(codec: CodecKind, data: &[u8]) -> (CodecKind, Vec<u8>) {
        let bytes = compress_and_frame(codec, data).unwrap();
        let frame = parse_frame(&bytes).unwrap();
        assert_eq!(frame.raw_len as usize, data.len());
        (frame.codec, decompress_frame(&frame).unwrap())
    }

    #[test]
    fn test_round_trip_every_codec() {
        let data = b"hello world! hello world! hello world! aaaaaaaaaaaaaaaaaaaa".repeat(8);

        for codec in CodecKind::ALL {
            let (_, decoded) = round_trip(codec, &data);
            assert_eq!(decoded, data, "{codec}");
        }
    }

    #[test]
    fn test_rle_keeps_codec_when_it_helps() {
        let data = vec![b'X'; 1000];
        let (used, decoded) = round_trip(CodecKind::Rle, &data);
        assert_eq!(used, CodecKind::Rle);
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_ineffective_huffman_falls_back_to_stored() {
        let data = b"AAAAABBBBBCCCCCDDDDD";
        let (used, decoded) = round_trip(CodecKind::Huffman, data);
        assert_eq!(used, CodecKind::Stored);
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_ambiguous_lz77_retries_tagged() {
        // Literal 'a' followed by 1, 1 reads back as a match in the untagged form
        let mut data = vec![b'a', 1, 1, b'x', b'y'];
        data.extend(b"ring ring ring ring ring ring ring ring".iter());

        let (used, decoded) = round_trip(CodecKind::Lz77, &data);
        assert_eq!(used, CodecKind::Lz77Tagged);
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_rle_without_runs_falls_back_to_stored() {
        let data: Vec<u8> = (0..100).collect();
        let (used, _) = round_trip(CodecKind::Rle, &data);
        assert_eq!(used, CodecKind::Stored);
    }

    #[test]
    fn test_empty_data() {
        let (used, decoded) = round_trip(CodecKind::Lz77, b"");
        assert_eq!(used, CodecKind::Stored);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_invalid_magic() {
        let mut frame_bytes = vec![0xFF, 0xFF, 0xFF, 0xFF];
        frame_bytes.extend_from_slice(&[0u8; 13]);

        let result = parse_frame(&frame_bytes);
        assert!(matches!(
            result,
            Err(Error::Framing(FramingError::InvalidMagic { .. }))
        ));
    }

    #[test]
    fn test_frame_too_short() {
        let frame_bytes = vec![0u8; 10];
        let result = parse_frame(&frame_bytes);
        assert!(matches!(
            result,
            Err(Error::Framing(FramingError::FrameTooShort { .. }))
        ));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut frame_bytes = compress_and_frame(CodecKind::Rle, &[7u8; 64]).unwrap();

        // Corrupt a byte in the payload (near the end)
        let len = frame_bytes.len();
        frame_bytes[len - 1] ^= 0x01;

        let result = parse_frame(&frame_bytes);
        assert!(matches!(result, Err(Error::Crc { .. })));
    }

    #[test]
    fn test_unknown_codec() {
        let payload = b"abc";
        let crc = compute_crc(9, 3, 3, payload);

        let mut frame_bytes = MAGIC.to_vec();
        frame_bytes.push(9);
        frame_bytes.extend_from_slice(&3u32.to_le_bytes());
        frame_bytes.extend_from_slice(&3u32.to_le_bytes());
        frame_bytes.extend_from_slice(&crc.to_le_bytes());
        frame_bytes.extend_from_slice(payload);

        assert!(matches!(
            parse_frame(&frame_bytes),
            Err(Error::Framing(FramingError::UnknownCodec(9)))
        ));
    }

    #[test]
    fn test_raw_length_limit_checked_before_allocation() {
        // Single-leaf Huffman tree claiming a million bytes: 37-byte frame
        let mut payload = 1i32.to_le_bytes().to_vec();
        payload.extend_from_slice(&[b'z', 0, 0, 0]);
        payload.extend_from_slice(&1_000_000i32.to_le_bytes());
        payload.extend_from_slice(&(-1i32).to_le_bytes());
        payload.extend_from_slice(&(-1i32).to_le_bytes());

        let bytes = serialize_frame(CodecKind::Huffman, 1_000_000, &payload).unwrap();
        assert_eq!(bytes.len(), 37);
        let frame = parse_frame(&bytes).unwrap();

        assert!(matches!(
            decompress_frame_with_limit(&frame, 8192),
            Err(Error::Framing(FramingError::RawLengthOverLimit {
                raw_len: 1_000_000,
                limit: 8192
            }))
        ));
        assert_eq!(decompress_frame(&frame).unwrap().len(), 1_000_000);
    }

    #[test]
    fn test_raw_length_mismatch() {
        // RLE payload restores 5 bytes, header claims 6
        let bytes = serialize_frame(CodecKind::Rle, 6, &[5, b'A']).unwrap();
        let frame = parse_frame(&bytes).unwrap();
        assert!(matches!(
            decompress_frame(&frame),
            Err(Error::Framing(FramingError::RawLengthMismatch {
                expected: 6,
                actual: 5
            }))
        ));
    }
}
