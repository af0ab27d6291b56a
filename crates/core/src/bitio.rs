//! Bit-level I/O over caller-owned byte slices.
//!
//! `BitWriter` and `BitReader` are small value types holding a byte offset and
//! a bit offset. Both operate MSB-first (most significant bit first), which is
//! the bit order of the Huffman payload.
//!
//! Neither type allocates: the writer fills a `&mut [u8]` it was handed and
//! fails once the slice is full; the reader walks a `&[u8]`.
//!
//! # Padding Rules
//! - BitWriter: pads the final partial byte with trailing zeros
//! - BitReader: cannot tell padding from data; the caller knows how many
//!   symbols to decode
//!
//! # Example
//! ```
//! use bytecodec_core::bitio::{BitReader, BitWriter};
//!
//! let mut buf = [0u8; 1];
//! let mut writer = BitWriter::new(&mut buf);
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//! assert_eq!(writer.finish(), 1);
//! assert_eq!(buf, [0b1011_1000]);
//!
//! let mut reader = BitReader::new(&buf);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b11);
//! ```

use crate::error::{BitIoError, Result};

/// Writes bits MSB-first into a fixed byte slice.
///
/// # Invariants
/// - `bit_offset` is always < 8
/// - bytes at or after `byte_pos` are only touched once a bit lands in them
#[derive(Debug)]
pub struct BitWriter<'a> {
    /// Destination slice
    buf: &'a mut [u8],
    /// Index of the byte currently being filled
    byte_pos: usize,
    /// Number of bits already written into `buf[byte_pos]` (0-7)
    bit_offset: u8,
}

impl<'a> BitWriter<'a> {
    /// Create a writer positioned at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            byte_pos: 0,
            bit_offset: 0,
        }
    }

    /// Write a single bit.
    ///
    /// # Errors
    /// Returns `BitIoError::BufferFull` if the slice has no room left.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        if self.byte_pos >= self.buf.len() {
            return Err(BitIoError::BufferFull {
                capacity: self.buf.len(),
            }
            .into());
        }

        // Clear a fresh byte so stale caller data never leaks into padding
        if self.bit_offset == 0 {
            self.buf[self.byte_pos] = 0;
        }
        if bit {
            self.buf[self.byte_pos] |= 1 << (7 - self.bit_offset);
        }

        self.bit_offset += 1;
        if self.bit_offset == 8 {
            self.byte_pos += 1;
            self.bit_offset = 0;
        }
        Ok(())
    }

    /// Write the lowest `count` bits of `value`, MSB-first.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `BitIoError::BufferFull` if the slice runs out mid-write
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Finish writing and return the number of bytes used.
    ///
    /// A partial final byte counts as used; its low bits are already zero.
    pub fn finish(self) -> usize {
        self.byte_len()
    }

    /// Bytes touched so far, including a partial byte.
    pub fn byte_len(&self) -> usize {
        self.byte_pos + usize::from(self.bit_offset > 0)
    }

    /// Total number of bits written.
    pub fn bit_len(&self) -> usize {
        self.byte_pos * 8 + self.bit_offset as usize
    }
}

/// Reads bits MSB-first from a byte slice.
///
/// # Invariants
/// - `bit_position` never exceeds `data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source data
    data: &'a [u8],
    /// Current bit position (0 = MSB of first byte)
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new BitReader for the given data.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// Returns `BitIoError::UnexpectedEof` once every bit has been consumed.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.is_empty() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        let byte = self.data[self.bit_position / 8];
        let bit = (byte >> (7 - self.bit_position % 8)) & 1;
        self.bit_position += 1;
        Ok(bit == 1)
    }

    /// Read up to 64 bits, MSB-first.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `BitIoError::UnexpectedEof` if not enough bits remain (nothing is
    ///   consumed in that case)
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        let mut result = 0u64;
        for _ in 0..count {
            result = (result << 1) | u64::from(self.read_bit()?);
        }
        Ok(result)
    }

    /// Return the number of bits remaining in the buffer.
    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.bit_position
    }

    /// Return the current bit position.
    pub fn position(&self) -> usize {
        self.bit_position
    }

    /// Check if we're at the end of the buffer.
    pub fn is_empty(&self) -> bool {
        self.bit_position >= self.data.len() * 8
    }
}
