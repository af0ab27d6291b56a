//! Windowed LZ77 with an untagged token stream.
//!
//! # Wire Format
//!
//! The stream interleaves two kinds of items with no tag between them:
//!
//! ```text
//! literal:  | byte (1) |
//! match:    | distance (1) | length (1) | next literal (1) |
//! ```
//!
//! A match copies `length` bytes starting `distance` bytes back in the output
//! produced so far (the ranges may overlap), then appends `next literal`.
//!
//! # Token Heuristic
//!
//! The decoder reads three bytes as a match whenever they are structurally
//! valid: `1 <= distance <= produced`, `1 <= length <= MAX_MATCH`, and the
//! whole copy plus the literal fits the output. Anything else is a literal.
//! Because a run of literals can happen to look like a match, the compressor
//! replays this exact rule over its own output and refuses (with
//! `CodecError::Ambiguous`) any stream that would not read back as written.
//! The [`tagged`] variant spends a flag bit per item instead and never needs
//! to refuse.

pub mod tagged;

pub use tagged::TaggedLz77Codec;

use tracing::debug;

use crate::codec::Codec;
use crate::error::{CodecError, Result};

/// Farthest back a match may reach (distance is one byte)
pub const WINDOW_SIZE: usize = u8::MAX as usize;

/// Longest match a token can carry
pub const MAX_MATCH: usize = 15;

/// Shortest match worth a 3-byte token
pub const MIN_MATCH: usize = 3;

/// Tail of the output kept free so final literals can always be flushed
const TAIL_RESERVE: usize = 4;

/// Bytes of a match token
const TOKEN_SIZE: usize = 3;

/// One item of the stream as the decoder sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { distance: usize, length: usize, next: u8 },
}

impl Token {
    /// Stream bytes this item occupies.
    pub fn encoded_len(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Match { .. } => TOKEN_SIZE,
        }
    }

    /// Output bytes this item produces.
    pub fn decoded_len(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => length + 1,
        }
    }
}

/// Classify the item at the front of `stream`.
///
/// `produced` is how many bytes the decoder has written so far and
/// `capacity` the size of its output. This is the single definition of the
/// token heuristic; both directions go through it.
pub fn classify(stream: &[u8], produced: usize, capacity: usize) -> Token {
    if let [distance, length, next, ..] = *stream {
        let distance = distance as usize;
        let length = length as usize;
        let is_match = distance > 0
            && distance <= produced
            && (1..=MAX_MATCH).contains(&length)
            && produced + length + 1 <= capacity;

        if is_match {
            return Token::Match {
                distance,
                length,
                next,
            };
        }
    }
    Token::Literal(stream[0])
}

/// LZ77 codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz77Codec;

impl Codec for Lz77Codec {
    fn compress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        compress(input, output)
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        decompress(input, output)
    }
}

/// Find the longest match for `input[pos..]` in the window behind it.
///
/// Candidates are tried nearest first and only a strictly longer run replaces
/// the best so far, so ties go to the smallest distance. The run is capped so
/// that a literal always follows it. Returns `(distance, length)`.
pub(crate) fn longest_match(input: &[u8], pos: usize) -> (usize, usize) {
    let max_len = MAX_MATCH.min(input.len() - pos - 1);
    let mut best = (0, 0);

    for distance in 1..=pos.min(WINDOW_SIZE) {
        let start = pos - distance;
        let len = (0..max_len)
            .take_while(|&k| input[start + k] == input[pos + k])
            .count();

        if len > best.1 {
            best = (distance, len);
            if len == max_len {
                break;
            }
        }
    }
    best
}

/// Compress `input` into `output`.
///
/// Returns the number of bytes written.
///
/// # Errors
/// - `CodecError::InvalidArgument` if either buffer is empty
/// - `CodecError::BufferOverflow` if the input cannot be fully consumed
/// - `CodecError::Ambiguous` if a literal in the result would be decoded as
///   a match; store the data raw instead
pub fn compress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    check_buffers(input, output)?;

    let cap = output.len();
    let limit = cap.saturating_sub(TAIL_RESERVE);
    let mut in_pos = 0;
    let mut out_pos = 0;

    while in_pos < input.len() && out_pos < limit {
        let (distance, length) = if input.len() - in_pos > TAIL_RESERVE {
            longest_match(input, in_pos)
        } else {
            (0, 0)
        };

        if length >= MIN_MATCH && out_pos + TOKEN_SIZE < limit {
            output[out_pos] = distance as u8;
            output[out_pos + 1] = length as u8;
            output[out_pos + 2] = input[in_pos + length];
            out_pos += TOKEN_SIZE;
            in_pos += length + 1;
        } else {
            output[out_pos] = input[in_pos];
            out_pos += 1;
            in_pos += 1;
        }
    }

    // Flush what the main loop left as literals
    let tail = (input.len() - in_pos).min(cap - out_pos);
    output[out_pos..out_pos + tail].copy_from_slice(&input[in_pos..in_pos + tail]);
    out_pos += tail;
    in_pos += tail;

    if in_pos < input.len() {
        return Err(CodecError::BufferOverflow {
            required: out_pos + (input.len() - in_pos),
            capacity: cap,
        }
        .into());
    }

    verify_lockstep(input, &output[..out_pos])?;

    debug!(input = input.len(), output = out_pos, "lz77 compress");
    Ok(out_pos)
}

/// Replay the decoder over `stream` and check it reproduces `original`.
///
/// The already-verified prefix of `original` stands in for the decoder's
/// output, so nothing is allocated. Capacity is treated as unbounded: a
/// stream that passes decodes identically into any buffer of at least
/// `original.len()` bytes.
fn verify_lockstep(original: &[u8], stream: &[u8]) -> Result<()> {
    let mut in_pos = 0;
    let mut produced = 0;

    while in_pos < stream.len() {
        let token = classify(&stream[in_pos..], produced, usize::MAX);

        let end = produced + token.decoded_len();
        let faithful = end <= original.len()
            && match token {
                Token::Literal(byte) => original[produced] == byte,
                Token::Match {
                    distance,
                    length,
                    next,
                } => {
                    let from = produced - distance;
                    (0..length).all(|k| original[from + k] == original[produced + k])
                        && original[produced + length] == next
                }
            };

        if !faithful {
            return Err(CodecError::Ambiguous { offset: in_pos }.into());
        }

        in_pos += token.encoded_len();
        produced = end;
    }

    if produced != original.len() {
        return Err(CodecError::Ambiguous { offset: stream.len() }.into());
    }
    Ok(())
}

/// Decompress an LZ77 stream from `input` into `output`.
///
/// Returns the number of bytes restored.
///
/// # Errors
/// - `CodecError::InvalidArgument` if either buffer is empty
/// - `CodecError::BufferOverflow` if input remains once `output` is full
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    check_buffers(input, output)?;

    let cap = output.len();
    let mut in_pos = 0;
    let mut out_pos = 0;

    while in_pos < input.len() && out_pos < cap {
        match classify(&input[in_pos..], out_pos, cap) {
            Token::Match {
                distance,
                length,
                next,
            } => {
                // Byte by byte: the source may run into the bytes being written
                let start = out_pos - distance;
                for k in 0..length {
                    output[out_pos + k] = output[start + k];
                }
                output[out_pos + length] = next;
                out_pos += length + 1;
                in_pos += TOKEN_SIZE;
            }
            Token::Literal(byte) => {
                output[out_pos] = byte;
                out_pos += 1;
                in_pos += 1;
            }
        }
    }

    if in_pos < input.len() {
        return Err(CodecError::BufferOverflow {
            required: out_pos + 1,
            capacity: cap,
        }
        .into());
    }

    debug!(input = input.len(), output = out_pos, "lz77 decompress");
    Ok(out_pos)
}

pub(crate) fn check_buffers(input: &[u8], output: &[u8]) -> Result<()> {
    if input.is_empty() {
        return Err(CodecError::InvalidArgument("input is empty").into());
    }
    if output.is_empty() {
        return Err(CodecError::InvalidArgument("output has no capacity").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn round_trip(data: &[u8]) -> Vec<u8> {
        let mut encoded = vec![0u8; data.len() + 8];
        let n = compress(data, &mut encoded).unwrap();

        let mut decoded = vec![0u8; data.len()];
        let m = decompress(&encoded[..n], &mut decoded).unwrap();
        decoded.truncate(m);
        decoded
    }

    #[test]
    fn test_repeated_triplet() {
        let input = b"ABCABCABC";
        let mut encoded = [0u8; 32];
        let n = compress(input, &mut encoded).unwrap();

        // Three literals, then one match reaching back 3 bytes
        assert_eq!(&encoded[..n], &[b'A', b'B', b'C', 3, 5, b'C']);

        let mut decoded = [0u8; 9];
        let m = decompress(&encoded[..n], &mut decoded).unwrap();
        assert_eq!(&decoded[..m], input);
    }

    #[test]
    fn test_overlapping_run() {
        let input = b"zaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let mut encoded = [0u8; 64];
        let n = compress(input, &mut encoded).unwrap();
        assert!(n < input.len());

        // "z", "a", then a distance-1 match copying its own output
        assert_eq!(&encoded[..5], &[b'z', b'a', 1, 15, b'a']);
        assert_eq!(round_trip(input), input);
    }

    #[test]
    fn test_ties_prefer_nearest() {
        // "abcd" occurs at distances 4 and 8; the nearer wins
        let input = b"abcdabcdabcdXYZ!";
        let (distance, length) = longest_match(input, 8);
        assert_eq!((distance, length), (4, 4));
    }

    #[test]
    fn test_short_input_is_literal() {
        let input = b"ab";
        let mut encoded = [0u8; 8];
        let n = compress(input, &mut encoded).unwrap();
        assert_eq!(&encoded[..n], input);
        assert_eq!(round_trip(input), input);
    }

    #[test]
    fn test_window_bound() {
        // The only earlier copy of the pattern sits 300 bytes back
        let pattern = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut input = pattern.to_vec();
        input.resize(300, 0);
        input.extend_from_slice(&pattern);
        input.extend_from_slice(b"tail");

        assert_eq!(longest_match(&input, 300), (0, 0));

        // At exactly the window size it is found
        let mut input = pattern.to_vec();
        input.resize(WINDOW_SIZE, 0);
        input.extend_from_slice(&pattern);
        input.extend_from_slice(b"tail");

        assert_eq!(longest_match(&input, WINDOW_SIZE), (WINDOW_SIZE, 8));
    }

    #[test]
    fn test_classify_rejects_bad_tokens() {
        // Distance zero
        assert_eq!(classify(&[0, 3, b'x'], 10, 100), Token::Literal(0));
        // Distance past produced output
        assert_eq!(classify(&[11, 3, b'x'], 10, 100), Token::Literal(11));
        // Length zero and too long
        assert_eq!(classify(&[2, 0, b'x'], 10, 100), Token::Literal(2));
        assert_eq!(classify(&[2, 16, b'x'], 10, 100), Token::Literal(2));
        // No room for the copy
        assert_eq!(classify(&[2, 3, b'x'], 10, 13), Token::Literal(2));
        // Fewer than three bytes left
        assert_eq!(classify(&[2, 3], 10, 100), Token::Literal(2));
        // Valid
        assert_eq!(
            classify(&[2, 3, b'x'], 10, 14),
            Token::Match {
                distance: 2,
                length: 3,
                next: b'x'
            }
        );
    }

    #[test]
    fn test_decompress_treats_invalid_distance_as_literal() {
        // First byte cannot reference anything yet
        let mut out = [0u8; 16];
        let n = decompress(&[1, 2, 3], &mut out).unwrap();
        assert_eq!(&out[..n], &[1, 2, 3]);
    }

    #[test]
    fn test_ambiguous_literals_rejected() {
        // After "a", the literals 1, 1, 'x' read back as a match
        let input = [b'a', 1, 1, b'x', b'y'];
        let mut encoded = [0u8; 16];
        assert!(matches!(
            compress(&input, &mut encoded),
            Err(Error::Codec(CodecError::Ambiguous { offset: 1 }))
        ));
    }

    #[test]
    fn test_compress_overflow() {
        let input: Vec<u8> = (100..140).collect();
        let mut encoded = [0u8; 10];
        assert!(matches!(
            compress(&input, &mut encoded),
            Err(Error::Codec(CodecError::BufferOverflow { capacity: 10, .. }))
        ));
    }

    #[test]
    fn test_decompress_overflow() {
        let mut out = [0u8; 2];
        assert!(matches!(
            decompress(b"xyz", &mut out),
            Err(Error::Codec(CodecError::BufferOverflow { .. }))
        ));
    }

    #[test]
    fn test_round_trip_text() {
        let input =
            b"It was the best of times, it was the worst of times, it was the age of wisdom";
        assert_eq!(round_trip(input), input);
    }

    #[test]
    fn test_empty_buffers_rejected() {
        let mut out = [0u8; 4];
        assert!(matches!(
            compress(b"", &mut out),
            Err(Error::Codec(CodecError::InvalidArgument(_)))
        ));
        assert!(matches!(
            decompress(b"a", &mut []),
            Err(Error::Codec(CodecError::InvalidArgument(_)))
        ));
    }
}
