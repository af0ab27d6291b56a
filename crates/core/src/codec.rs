//! The shared codec contract and codec selection.

use crate::error::{CodecError, Result};
use crate::huffman::HuffmanCodec;
use crate::lz77::{self, Lz77Codec, TaggedLz77Codec};
use crate::rle::RleCodec;

/// Contract every codec engine follows.
///
/// Both directions read all of `input`, write into the caller's `output`
/// without growing it, and return the number of bytes written. On error
/// nothing in `output` is meaningful.
pub trait Codec {
    fn compress(&self, input: &[u8], output: &mut [u8]) -> Result<usize>;
    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize>;
}

/// Identity codec, used when compressing does not pay off.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredCodec;

impl StoredCodec {
    fn copy(input: &[u8], output: &mut [u8]) -> Result<usize> {
        if input.is_empty() {
            return Err(CodecError::InvalidArgument("input is empty").into());
        }
        if input.len() > output.len() {
            return Err(CodecError::BufferOverflow {
                required: input.len(),
                capacity: output.len(),
            }
            .into());
        }
        output[..input.len()].copy_from_slice(input);
        Ok(input.len())
    }
}

impl Codec for StoredCodec {
    fn compress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        Self::copy(input, output)
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        Self::copy(input, output)
    }
}

/// Codec choice, as named on the command line and stored in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CodecKind {
    /// Raw bytes
    Stored,
    /// Run-length (count, value) pairs
    Rle,
    /// Arena-tree Huffman
    #[default]
    Huffman,
    /// Windowed LZ77, untagged token stream
    Lz77,
    /// Windowed LZ77 with flag bytes
    Lz77Tagged,
}

impl CodecKind {
    /// Every codec, in id order.
    pub const ALL: [CodecKind; 5] = [
        CodecKind::Stored,
        CodecKind::Rle,
        CodecKind::Huffman,
        CodecKind::Lz77,
        CodecKind::Lz77Tagged,
    ];

    /// Stable id written into frame headers.
    pub fn id(self) -> u8 {
        match self {
            CodecKind::Stored => 0,
            CodecKind::Rle => 1,
            CodecKind::Huffman => 2,
            CodecKind::Lz77 => 3,
            CodecKind::Lz77Tagged => 4,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Output capacity that lets `compress` finish on `input_len` bytes
    /// without a spurious `BufferOverflow`.
    ///
    /// RLE can double its input. LZ77 gets room for its tail reserve so a
    /// match is never refused for space; the tagged variant adds its flag
    /// bytes. Huffman reports `Ineffective` before it could outgrow its input.
    pub fn max_compressed_len(self, input_len: usize) -> usize {
        match self {
            CodecKind::Stored | CodecKind::Huffman => input_len,
            CodecKind::Rle => input_len.saturating_mul(2),
            CodecKind::Lz77 => input_len.saturating_add(8),
            CodecKind::Lz77Tagged => lz77::tagged::max_compressed_len(input_len),
        }
    }
}

impl Codec for CodecKind {
    fn compress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        match self {
            CodecKind::Stored => StoredCodec.compress(input, output),
            CodecKind::Rle => RleCodec.compress(input, output),
            CodecKind::Huffman => HuffmanCodec::new().compress(input, output),
            CodecKind::Lz77 => Lz77Codec.compress(input, output),
            CodecKind::Lz77Tagged => TaggedLz77Codec.compress(input, output),
        }
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        match self {
            CodecKind::Stored => StoredCodec.decompress(input, output),
            CodecKind::Rle => RleCodec.decompress(input, output),
            CodecKind::Huffman => HuffmanCodec::new().decompress(input, output),
            CodecKind::Lz77 => Lz77Codec.decompress(input, output),
            CodecKind::Lz77Tagged => TaggedLz77Codec.decompress(input, output),
        }
    }
}

impl std::fmt::Display for CodecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored => write!(f, "stored"),
            Self::Rle => write!(f, "rle"),
            Self::Huffman => write!(f, "huffman"),
            Self::Lz77 => write!(f, "lz77"),
            Self::Lz77Tagged => write!(f, "lz77-tagged"),
        }
    }
}

impl std::str::FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stored" | "raw" => Ok(Self::Stored),
            "rle" => Ok(Self::Rle),
            "huffman" | "huff" => Ok(Self::Huffman),
            "lz77" | "lz" => Ok(Self::Lz77),
            "lz77-tagged" | "lzt" => Ok(Self::Lz77Tagged),
            _ => Err(format!(
                "unknown codec: {s}. Available: rle, huffman, lz77, lz77-tagged, stored"
            )),
        }
    }
}
