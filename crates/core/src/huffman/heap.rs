//! Fixed-capacity binary min-heap over arena indices.
//!
//! Entries carry the node weight next to the arena index so comparisons never
//! reach back into the arena. Ordering uses a strict `<`, so equal weights
//! keep whatever order the heap discipline leaves them in; there is no
//! canonical tie-breaking.

use crate::error::{CodecError, Result};

/// Most entries the heap can hold (one per byte value)
pub const HEAP_CAPACITY: usize = 256;

/// A heap slot: the weight used for ordering and the arena index it names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapEntry {
    pub weight: i32,
    pub node: u16,
}

/// Array-backed min-heap, 0-based (children of `i` at `2i + 1`, `2i + 2`).
#[derive(Debug, Clone)]
pub struct MinHeap {
    entries: [HeapEntry; HEAP_CAPACITY],
    len: usize,
}

impl MinHeap {
    pub fn new() -> Self {
        Self {
            entries: [HeapEntry::default(); HEAP_CAPACITY],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert an entry and sift it up.
    ///
    /// # Errors
    /// Returns `CodecError::BufferOverflow` once the heap is full.
    pub fn insert(&mut self, entry: HeapEntry) -> Result<()> {
        if self.len == HEAP_CAPACITY {
            return Err(CodecError::BufferOverflow {
                required: self.len + 1,
                capacity: HEAP_CAPACITY,
            }
            .into());
        }

        let mut i = self.len;
        self.entries[i] = entry;
        self.len += 1;

        while i > 0 {
            let parent = (i - 1) / 2;
            if self.entries[i].weight < self.entries[parent].weight {
                self.entries.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Remove and return the minimum-weight entry.
    pub fn extract_min(&mut self) -> Option<HeapEntry> {
        if self.len == 0 {
            return None;
        }

        let min = self.entries[0];
        self.len -= 1;
        self.entries[0] = self.entries[self.len];
        self.min_heapify(0);
        Some(min)
    }

    pub fn peek(&self) -> Option<&HeapEntry> {
        self.entries[..self.len].first()
    }

    fn min_heapify(&mut self, mut i: usize) {
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut smallest = i;

            if l < self.len && self.entries[l].weight < self.entries[smallest].weight {
                smallest = l;
            }
            if r < self.len && self.entries[r].weight < self.entries[smallest].weight {
                smallest = r;
            }
            if smallest == i {
                return;
            }

            self.entries.swap(i, smallest);
            i = smallest;
        }
    }

    #[cfg(test)]
    fn is_valid(&self) -> bool {
        (1..self.len).all(|i| self.entries[(i - 1) / 2].weight <= self.entries[i].weight)
    }
}

impl Default for MinHeap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(weight: i32, node: u16) -> HeapEntry {
        HeapEntry { weight, node }
    }

    #[test]
    fn test_extracts_in_weight_order() {
        let mut heap = MinHeap::new();
        for (node, weight) in [9, 3, 7, 1, 8, 2].into_iter().enumerate() {
            heap.insert(entry(weight, node as u16)).unwrap();
            assert!(heap.is_valid());
        }

        let mut weights = Vec::new();
        while let Some(e) = heap.extract_min() {
            assert!(heap.is_valid());
            weights.push(e.weight);
        }
        assert_eq!(weights, vec![1, 2, 3, 7, 8, 9]);
    }

    #[test]
    fn test_equal_weights_first_inserted_on_top() {
        let mut heap = MinHeap::new();
        heap.insert(entry(5, 0)).unwrap();
        heap.insert(entry(5, 1)).unwrap();

        assert_eq!(heap.peek().map(|e| e.node), Some(0));
        assert_eq!(heap.extract_min().map(|e| e.node), Some(0));
        assert_eq!(heap.extract_min().map(|e| e.node), Some(1));
        assert!(heap.extract_min().is_none());
    }

    #[test]
    fn test_capacity_bound() {
        let mut heap = MinHeap::new();
        for i in 0..HEAP_CAPACITY {
            heap.insert(entry(i as i32, i as u16)).unwrap();
        }
        assert_eq!(heap.len(), HEAP_CAPACITY);
        assert!(heap.insert(entry(0, 0)).is_err());
    }
}
