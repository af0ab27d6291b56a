//! LZ77 with an explicit flag byte per group of items.
//!
//! Same window, match finder and token layout as the untagged stream, but
//! every run of up to eight items is preceded by a flag byte. Bit 7 describes
//! the first item of the group, bit 0 the eighth; a set bit means a 3-byte
//! match token, a clear bit a single literal.
//!
//! ```text
//! | flags (1) | item 0 | item 1 | ... | item 7 | flags (1) | item 0 | ...
//! ```
//!
//! The decoder never has to guess, so any input round-trips. The cost is one
//! byte per eight items, which bounds the output at `n + ceil(n / 8)`.

use tracing::debug;

use super::{check_buffers, longest_match, MAX_MATCH, MIN_MATCH, TOKEN_SIZE};
use crate::codec::Codec;
use crate::error::{CodecError, Result};

/// Items described by one flag byte
pub const GROUP_SIZE: usize = 8;

/// Flag-tagged LZ77 codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedLz77Codec;

impl Codec for TaggedLz77Codec {
    fn compress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        compress(input, output)
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        decompress(input, output)
    }
}

/// Largest stream `compress` can produce for `input_len` bytes.
pub fn max_compressed_len(input_len: usize) -> usize {
    input_len.saturating_add(input_len.div_ceil(GROUP_SIZE))
}

fn overflow(required: usize, capacity: usize) -> crate::error::Error {
    CodecError::BufferOverflow { required, capacity }.into()
}

/// Compress `input` into `output`.
///
/// # Errors
/// - `CodecError::InvalidArgument` if either buffer is empty
/// - `CodecError::BufferOverflow` if `output` fills before the input is
///   consumed
pub fn compress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    check_buffers(input, output)?;

    let cap = output.len();
    let mut in_pos = 0;
    let mut out_pos = 0;

    while in_pos < input.len() {
        if out_pos >= cap {
            return Err(overflow(out_pos + 1, cap));
        }
        let flag_pos = out_pos;
        let mut flags = 0u8;
        out_pos += 1;

        for slot in 0..GROUP_SIZE {
            if in_pos >= input.len() {
                break;
            }

            let (distance, length) = if input.len() - in_pos > MIN_MATCH {
                longest_match(input, in_pos)
            } else {
                (0, 0)
            };

            if length >= MIN_MATCH {
                if out_pos + TOKEN_SIZE > cap {
                    return Err(overflow(out_pos + TOKEN_SIZE, cap));
                }
                output[out_pos] = distance as u8;
                output[out_pos + 1] = length as u8;
                output[out_pos + 2] = input[in_pos + length];
                flags |= 0x80 >> slot;
                out_pos += TOKEN_SIZE;
                in_pos += length + 1;
            } else {
                if out_pos >= cap {
                    return Err(overflow(out_pos + 1, cap));
                }
                output[out_pos] = input[in_pos];
                out_pos += 1;
                in_pos += 1;
            }
        }

        output[flag_pos] = flags;
    }

    debug!(input = input.len(), output = out_pos, "tagged lz77 compress");
    Ok(out_pos)
}

/// Decompress a flag-tagged stream from `input` into `output`.
///
/// # Errors
/// - `CodecError::InvalidArgument` if either buffer is empty
/// - `CodecError::MalformedInput` for a truncated or missing token, a flag
///   byte with no items after it, a distance of zero or past the bytes
///   restored so far, or a length outside `1..=MAX_MATCH`
/// - `CodecError::BufferOverflow` if the restored data does not fit `output`
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    check_buffers(input, output)?;

    let cap = output.len();
    let mut in_pos = 0;
    let mut out_pos = 0;

    while in_pos < input.len() {
        let flags = input[in_pos];
        in_pos += 1;

        for slot in 0..GROUP_SIZE {
            if in_pos >= input.len() {
                // The compressor never opens an empty group or flags unused slots
                if slot == 0 {
                    return Err(CodecError::MalformedInput {
                        offset: in_pos - 1,
                        reason: "flag byte without items",
                    }
                    .into());
                }
                if flags & (0xFF >> slot) != 0 {
                    return Err(CodecError::MalformedInput {
                        offset: in_pos,
                        reason: "truncated match token",
                    }
                    .into());
                }
                break;
            }

            if flags & (0x80 >> slot) == 0 {
                if out_pos >= cap {
                    return Err(overflow(out_pos + 1, cap));
                }
                output[out_pos] = input[in_pos];
                out_pos += 1;
                in_pos += 1;
                continue;
            }

            let [distance, length, next] = match input.get(in_pos..in_pos + TOKEN_SIZE) {
                Some(&[d, l, n]) => [d as usize, l as usize, n as usize],
                _ => {
                    return Err(CodecError::MalformedInput {
                        offset: in_pos,
                        reason: "truncated match token",
                    }
                    .into())
                }
            };
            if distance == 0 || distance > out_pos {
                return Err(CodecError::MalformedInput {
                    offset: in_pos,
                    reason: "match distance outside restored data",
                }
                .into());
            }
            if !(1..=MAX_MATCH).contains(&length) {
                return Err(CodecError::MalformedInput {
                    offset: in_pos + 1,
                    reason: "match length out of range",
                }
                .into());
            }
            if out_pos + length + 1 > cap {
                return Err(overflow(out_pos + length + 1, cap));
            }

            let start = out_pos - distance;
            for k in 0..length {
                output[out_pos + k] = output[start + k];
            }
            output[out_pos + length] = next as u8;
            out_pos += length + 1;
            in_pos += TOKEN_SIZE;
        }
    }

    debug!(input = input.len(), output = out_pos, "tagged lz77 decompress");
    Ok(out_pos)
}
