//! bytecodec-core: fixed-buffer byte-stream compression codecs
//!
//! This library provides three independent codec engines that share one
//! calling convention but no code:
//! - Run-length encoding of (count, value) pairs
//! - Huffman coding over an arena tree built with a bounded min-heap
//! - Windowed LZ77 with (distance, length, next literal) tokens, untagged
//!   or grouped under flag bytes
//!
//! Every engine implements [`Codec`]: it reads a whole input slice, writes
//! into a caller-owned output slice without ever growing it, and returns the
//! number of bytes written or a structured error.
//!
//! # Architecture
//!
//! - `bitio`: MSB-first bit reading/writing over fixed slices
//! - `rle`: run-length codec
//! - `huffman`: tree arena, heap, Huffman codec
//! - `lz77`: windowed LZ77 codec and its flag-tagged variant
//! - `codec`: the `Codec` trait and `CodecKind` selection
//! - `framing`: self-describing container with CRC32 and stored fallback
//! - `metrics`: observable run behavior
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Bounded memory**: Codecs never allocate output; trees and heaps have
//!   fixed capacities
//! - **No shared state**: Every call owns its own working structures

pub mod bitio;
pub mod codec;
pub mod error;
pub mod framing;
pub mod huffman;
pub mod lz77;
pub mod metrics;
pub mod rle;

// Re-export commonly used types
pub use codec::{Codec, CodecKind, StoredCodec};
pub use error::{CodecError, Error, Result};
pub use huffman::HuffmanCodec;
pub use lz77::{Lz77Codec, TaggedLz77Codec};
pub use rle::RleCodec;
