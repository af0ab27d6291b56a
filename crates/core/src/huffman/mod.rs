//! Huffman codec with an explicit arena tree.
//!
//! # Wire Format
//!
//! ```text
//! +-----------------+--------------------------------+------------------------+
//! | node_count (4)  | node_count x NodeRecord (16)   | payload bits (MSB-first)|
//! +-----------------+--------------------------------+------------------------+
//! ```
//!
//! The header is the construction arena written out verbatim (see
//! [`tree`] for the record layout). The payload holds one root-to-leaf path
//! per input byte, zero-padded to a byte boundary. The root's frequency is
//! the number of encoded bytes, so the decoder knows where the padding starts.
//!
//! Each call builds its own tree: there is no state shared between calls.

pub mod heap;
pub mod tree;

use tracing::debug;

use crate::bitio::{BitReader, BitWriter};
use crate::codec::Codec;
use crate::error::{CodecError, Error, Result};

pub use tree::{frequency_table, Code, CodeTable, HuffmanTree, Node, TreeBuilder};

/// Huffman codec configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct HuffmanCodec {
    allow_expansion: bool,
}

impl HuffmanCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an encoding that is not smaller than its input.
    ///
    /// Off by default: `compress` then reports `CodecError::Ineffective` so
    /// the caller can store the data raw.
    pub fn allow_expansion(mut self, allow: bool) -> Self {
        self.allow_expansion = allow;
        self
    }
}

impl Codec for HuffmanCodec {
    fn compress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if input.is_empty() {
            return Err(CodecError::InvalidArgument("input is empty").into());
        }
        if output.is_empty() {
            return Err(CodecError::InvalidArgument("output has no capacity").into());
        }
        check_input_len(input.len())?;

        let freqs = frequency_table(input);
        let tree = TreeBuilder::new().build(&freqs)?;
        let codes = tree.code_table()?;

        let payload_bits: u64 = freqs
            .iter()
            .enumerate()
            .map(|(symbol, &freq)| u64::from(freq) * u64::from(codes.get(symbol as u8).len))
            .sum();
        let header_len = tree.header_len();
        let total = header_len + payload_bits.div_ceil(8) as usize;

        if !self.allow_expansion && total >= input.len() {
            return Err(CodecError::Ineffective {
                encoded: total,
                input: input.len(),
            }
            .into());
        }
        if total > output.len() {
            return Err(CodecError::BufferOverflow {
                required: total,
                capacity: output.len(),
            }
            .into());
        }

        tree.write_header(output)?;

        let mut writer = BitWriter::new(&mut output[header_len..total]);
        for &byte in input {
            let code = codes.get(byte);
            writer.write_bits(code.bits, code.len as usize)?;
        }
        let payload_len = writer.finish();

        debug!(
            input = input.len(),
            nodes = tree.len(),
            output = header_len + payload_len,
            "huffman compress"
        );
        Ok(header_len + payload_len)
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if input.is_empty() {
            return Err(CodecError::InvalidArgument("input is empty").into());
        }
        if output.is_empty() {
            return Err(CodecError::InvalidArgument("output has no capacity").into());
        }

        let (tree, header_len) = HuffmanTree::read_header(input)?;
        let count = tree.total_frequency();
        if count > output.len() {
            return Err(CodecError::BufferOverflow {
                required: count,
                capacity: output.len(),
            }
            .into());
        }

        let root = tree.len() as i32 - 1;
        let mut reader = BitReader::new(&input[header_len..]);

        for slot in output[..count].iter_mut() {
            let mut node = tree.node(root);
            while !node.is_leaf() {
                let bit = reader.read_bit().map_err(|_| truncated(header_len, &reader))?;
                node = tree.node(if bit { node.right } else { node.left });
            }
            *slot = node.symbol;
        }

        debug!(input = input.len(), output = count, "huffman decompress");
        Ok(count)
    }
}

/// Node frequencies are `i32` on the wire, so the input length must fit one.
fn check_input_len(len: usize) -> Result<()> {
    if len > i32::MAX as usize {
        return Err(CodecError::InvalidArgument("input longer than i32::MAX bytes").into());
    }
    Ok(())
}

fn truncated(header_len: usize, reader: &BitReader<'_>) -> Error {
    CodecError::MalformedInput {
        offset: header_len + reader.position() / 8,
        reason: "bitstream ends mid-symbol",
    }
    .into()
}

/// Compress with the default configuration.
pub fn compress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    HuffmanCodec::new().compress(input, output)
}

/// Decompress a Huffman stream.
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    HuffmanCodec::new().decompress(input, output)
}
