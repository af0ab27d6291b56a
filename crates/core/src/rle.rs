//! Run-length encoding.
//!
//! # Wire Format
//!
//! ```text
//! +-----------+-----------+-----------+-----------+----
//! | count (1) | value (1) | count (1) | value (1) | ...
//! +-----------+-----------+-----------+-----------+----
//! ```
//!
//! Each record stands for `count` copies of `value`, with `count` in
//! `1..=255`. Longer runs are split into several records.

use tracing::debug;

use crate::codec::Codec;
use crate::error::{CodecError, Result};

/// Longest run a single record can describe
pub const MAX_RUN: usize = u8::MAX as usize;

/// Byte-level run-length codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct RleCodec;

impl Codec for RleCodec {
    fn compress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        compress(input, output)
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        decompress(input, output)
    }
}

/// Encode `input` as (count, value) records into `output`.
///
/// Returns the number of bytes written.
///
/// # Errors
/// - `CodecError::InvalidArgument` if either buffer is empty
/// - `CodecError::BufferOverflow` if `output` fills up before the scan ends
pub fn compress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    check_buffers(input, output)?;

    let mut out_pos = 0;
    let mut i = 0;

    while i < input.len() {
        let value = input[i];
        let count = input[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == value)
            .count();

        if out_pos + 2 > output.len() {
            return Err(CodecError::BufferOverflow {
                required: out_pos + 2,
                capacity: output.len(),
            }
            .into());
        }

        output[out_pos] = count as u8;
        output[out_pos + 1] = value;
        out_pos += 2;
        i += count;
    }

    debug!(input = input.len(), output = out_pos, "rle compress");
    Ok(out_pos)
}

/// Expand (count, value) records from `input` into `output`.
///
/// Returns the number of bytes restored.
///
/// # Errors
/// - `CodecError::InvalidArgument` if either buffer is empty
/// - `CodecError::MalformedInput` for an odd-length stream or a zero count
/// - `CodecError::BufferOverflow` if a run does not fit in `output`
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    check_buffers(input, output)?;

    if input.len() % 2 != 0 {
        return Err(CodecError::MalformedInput {
            offset: input.len() - 1,
            reason: "stream length is not a whole number of records",
        }
        .into());
    }

    let mut out_pos = 0;

    for (record, pair) in input.chunks_exact(2).enumerate() {
        let count = pair[0] as usize;
        let value = pair[1];

        if count == 0 {
            return Err(CodecError::MalformedInput {
                offset: record * 2,
                reason: "run count is zero",
            }
            .into());
        }

        let end = out_pos + count;
        if end > output.len() {
            return Err(CodecError::BufferOverflow {
                required: end,
                capacity: output.len(),
            }
            .into());
        }

        output[out_pos..end].fill(value);
        out_pos = end;
    }

    debug!(input = input.len(), output = out_pos, "rle decompress");
    Ok(out_pos)
}

fn check_buffers(input: &[u8], output: &[u8]) -> Result<()> {
    if input.is_empty() {
        return Err(CodecError::InvalidArgument("input is empty").into());
    }
    if output.is_empty() {
        return Err(CodecError::InvalidArgument("output has no capacity").into());
    }
    Ok(())
}
