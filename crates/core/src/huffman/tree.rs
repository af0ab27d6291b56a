//! Arena-backed Huffman tree and its builder.
//!
//! Nodes live in a fixed array and refer to each other by index. A merge node
//! is always pushed after both of its children, so every child index is
//! smaller than its parent's and the last node is the root. Decoded headers
//! are held to the same rule, which keeps every tree acyclic.
//!
//! # Node Record
//!
//! ```text
//! +------------+-------------+----------------+-----------+------------+
//! | symbol (1) | padding (3) | frequency (4)  | left (4)  | right (4)  |
//! +------------+-------------+----------------+-----------+------------+
//! ```
//!
//! Integers are little-endian `i32`; padding is written as zeros and ignored
//! on read; `-1` means "no child".

use tracing::trace;

use super::heap::{HeapEntry, MinHeap};
use crate::error::{CodecError, Result};

/// Arena capacity (a full 256-symbol tree needs 511 nodes)
pub const MAX_NODES: usize = 512;

/// Child index meaning "no child"
pub const NO_CHILD: i32 = -1;

/// Serialized size of one node
pub const NODE_RECORD_SIZE: usize = 16;

/// Serialized size of the node count
pub const COUNT_SIZE: usize = 4;

/// Longest code the code table can hold.
///
/// Frequencies are `i32`, which bounds tree depth well below this.
pub const MAX_CODE_LEN: u8 = 64;

/// One arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// Byte value (meaningful at leaves only)
    pub symbol: u8,
    /// Occurrences of the symbol, or of every symbol below this node
    pub frequency: i32,
    /// Arena index of the 0-branch, or `NO_CHILD`
    pub left: i32,
    /// Arena index of the 1-branch, or `NO_CHILD`
    pub right: i32,
}

impl Node {
    const EMPTY: Node = Node {
        symbol: 0,
        frequency: 0,
        left: NO_CHILD,
        right: NO_CHILD,
    };

    pub fn leaf(symbol: u8, frequency: i32) -> Self {
        Self {
            symbol,
            frequency,
            left: NO_CHILD,
            right: NO_CHILD,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left == NO_CHILD && self.right == NO_CHILD
    }

    fn write_record(&self, out: &mut [u8]) {
        out[0] = self.symbol;
        out[1..4].fill(0);
        out[4..8].copy_from_slice(&self.frequency.to_le_bytes());
        out[8..12].copy_from_slice(&self.left.to_le_bytes());
        out[12..16].copy_from_slice(&self.right.to_le_bytes());
    }

    fn read_record(bytes: &[u8]) -> Self {
        let word = |at: usize| {
            i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Self {
            symbol: bytes[0],
            frequency: word(4),
            left: word(8),
            right: word(12),
        }
    }
}

/// A root-to-leaf path: `len` bits, MSB-first in the low bits of `bits`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

/// Per-symbol codes derived from a built tree.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: [Code; 256],
}

impl CodeTable {
    pub fn get(&self, symbol: u8) -> Code {
        self.codes[symbol as usize]
    }
}

/// Fixed-capacity node arena. The last node is the root.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: [Node; MAX_NODES],
    len: usize,
}

impl HuffmanTree {
    fn new() -> Self {
        Self {
            nodes: [Node::EMPTY; MAX_NODES],
            len: 0,
        }
    }

    fn push(&mut self, node: Node) -> Result<u16> {
        if self.len == MAX_NODES {
            return Err(CodecError::BufferOverflow {
                required: self.len + 1,
                capacity: MAX_NODES,
            }
            .into());
        }
        self.nodes[self.len] = node;
        self.len += 1;
        Ok((self.len - 1) as u16)
    }

    /// Number of nodes in use.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The nodes in construction order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes[..self.len]
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes().last()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes().iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of input bytes the tree was built from.
    pub fn total_frequency(&self) -> usize {
        self.root().map_or(0, |r| r.frequency as usize)
    }

    /// Node at `index`, or `None` for `NO_CHILD` and anything outside the
    /// nodes in use.
    pub fn get(&self, index: i32) -> Option<&Node> {
        usize::try_from(index).ok().and_then(|i| self.nodes().get(i))
    }

    /// Node at an index already checked by construction or `read_header`.
    pub(crate) fn node(&self, index: i32) -> &Node {
        &self.nodes[index as usize]
    }

    /// Derive every leaf's root-to-leaf code (left = 0, right = 1).
    ///
    /// Walks the arena from the root down; children always sit at lower
    /// indices, so each parent's code is known before its children are
    /// visited. A single-leaf tree gives its symbol the empty code.
    ///
    /// # Errors
    /// Returns `CodecError::InvalidArgument` if a path exceeds
    /// `MAX_CODE_LEN` bits.
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut paths = [Code::default(); MAX_NODES];
        let mut table = CodeTable {
            codes: [Code::default(); 256],
        };

        for i in (0..self.len).rev() {
            let node = &self.nodes[i];
            let path = paths[i];

            if node.is_leaf() {
                table.codes[node.symbol as usize] = path;
                continue;
            }
            if path.len == MAX_CODE_LEN {
                return Err(CodecError::InvalidArgument("huffman code exceeds 64 bits").into());
            }

            paths[node.left as usize] = Code {
                bits: path.bits << 1,
                len: path.len + 1,
            };
            paths[node.right as usize] = Code {
                bits: (path.bits << 1) | 1,
                len: path.len + 1,
            };
        }

        Ok(table)
    }

    /// Size of the serialized header (count plus records).
    pub fn header_len(&self) -> usize {
        COUNT_SIZE + self.len * NODE_RECORD_SIZE
    }

    /// Write the node count and every record into `out`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    /// Returns `CodecError::BufferOverflow` if `out` is shorter than
    /// `header_len()`.
    pub fn write_header(&self, out: &mut [u8]) -> Result<usize> {
        let header_len = self.header_len();
        if out.len() < header_len {
            return Err(CodecError::BufferOverflow {
                required: header_len,
                capacity: out.len(),
            }
            .into());
        }

        out[..COUNT_SIZE].copy_from_slice(&(self.len as i32).to_le_bytes());
        for (node, record) in self
            .nodes()
            .iter()
            .zip(out[COUNT_SIZE..header_len].chunks_exact_mut(NODE_RECORD_SIZE))
        {
            node.write_record(record);
        }

        Ok(header_len)
    }

    /// Parse and validate a header from the front of `input`.
    ///
    /// Returns the tree and the number of header bytes consumed.
    ///
    /// # Errors
    /// `CodecError::MalformedInput` if the count is out of range, the header
    /// is truncated, or any record breaks the tree invariants (leaf links,
    /// child order, frequency sums).
    pub fn read_header(input: &[u8]) -> Result<(Self, usize)> {
        let malformed =
            |offset: usize, reason: &'static str| CodecError::MalformedInput { offset, reason };

        if input.len() < COUNT_SIZE {
            return Err(malformed(0, "truncated node count").into());
        }
        let count = i32::from_le_bytes([input[0], input[1], input[2], input[3]]);
        if count < 1 || count as usize > MAX_NODES {
            return Err(malformed(0, "node count out of range").into());
        }

        let count = count as usize;
        let header_len = COUNT_SIZE + count * NODE_RECORD_SIZE;
        if input.len() < header_len {
            return Err(malformed(input.len(), "truncated node records").into());
        }

        let mut tree = Self::new();
        for (i, record) in input[COUNT_SIZE..header_len]
            .chunks_exact(NODE_RECORD_SIZE)
            .enumerate()
        {
            let offset = COUNT_SIZE + i * NODE_RECORD_SIZE;
            let node = Node::read_record(record);

            if node.frequency <= 0 {
                return Err(malformed(offset, "non-positive node frequency").into());
            }

            if !node.is_leaf() {
                let in_range = |child: i32| child >= 0 && (child as usize) < i;
                if !in_range(node.left) || !in_range(node.right) {
                    return Err(malformed(offset, "child index out of range").into());
                }

                let sum = tree.nodes[node.left as usize]
                    .frequency
                    .checked_add(tree.nodes[node.right as usize].frequency);
                if sum != Some(node.frequency) {
                    let reason = "frequency is not the sum of its children";
                    return Err(malformed(offset, reason).into());
                }
            }

            tree.push(node)?;
        }

        Ok((tree, header_len))
    }
}

/// Count occurrences of every byte value.
///
/// Counts saturate at `u32::MAX`, which `TreeBuilder::build` then rejects
/// as too large instead of seeing a wrapped total.
pub fn frequency_table(data: &[u8]) -> [u32; 256] {
    let mut freqs = [0u32; 256];
    for &byte in data {
        let slot = &mut freqs[byte as usize];
        *slot = slot.saturating_add(1);
    }
    freqs
}

/// Per-call construction context: owns the arena and the heap.
///
/// Consumed by [`TreeBuilder::build`], which hands back the finished tree and
/// drops the heap.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    tree: HuffmanTree,
    heap: MinHeap,
}

impl Default for HuffmanTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a frequency table.
    ///
    /// Leaves are created in ascending symbol order. The two lightest nodes
    /// are merged (first extracted on the left) until one node remains.
    ///
    /// # Errors
    /// - `CodecError::InvalidArgument` if every frequency is zero, or the
    ///   total does not fit in an `i32`
    /// - `CodecError::BufferOverflow` if the arena or heap capacity is hit
    pub fn build(mut self, freqs: &[u32; 256]) -> Result<HuffmanTree> {
        let total: u64 = freqs.iter().map(|&f| u64::from(f)).sum();
        if total == 0 {
            return Err(CodecError::InvalidArgument("empty frequency table").into());
        }
        if total > i32::MAX as u64 {
            return Err(CodecError::InvalidArgument("input exceeds i32 frequency range").into());
        }

        for (symbol, &freq) in freqs.iter().enumerate() {
            if freq == 0 {
                continue;
            }
            let weight = freq as i32;
            let node = self.tree.push(Node::leaf(symbol as u8, weight))?;
            self.heap.insert(HeapEntry { weight, node })?;
        }

        loop {
            let Some(a) = self.heap.extract_min() else {
                break;
            };
            // A lone entry is the root, already last in the arena
            let Some(b) = self.heap.extract_min() else {
                break;
            };

            let weight = a.weight + b.weight;
            let node = self.tree.push(Node {
                symbol: 0,
                frequency: weight,
                left: i32::from(a.node),
                right: i32::from(b.node),
            })?;
            trace!(left = a.node, right = b.node, weight, node, "huffman merge");

            self.heap.insert(HeapEntry { weight, node })?;
        }

        Ok(self.tree)
    }
}
