//! This module contains utility functionality needed for this crate. Most
//! prominently, it contains the definition of the [PositionSet] used for
//! storing the current domains of variables.

use std::collections::HashSet;
use std::hash::Hash;
use std::slice::Iter;

const WORD_BITS: usize = 64;

/// A set of positions in the range `[0, capacity[` that is implemented as a
/// bit vector. Variables use it to mark which entries of their full domain
/// are still part of the current domain, so pruning and restoring a value is
/// a single bit operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionSet {
    capacity: usize,
    len: usize,
    words: Vec<u64>
}

struct BitIterator {
    bit_index: usize,
    value: u64
}

impl Iterator for BitIterator {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.value == 0 {
            return None;
        }

        let skipped = self.value.trailing_zeros() as usize;
        self.value >>= skipped;
        self.bit_index += skipped;
        let result = self.bit_index;

        // Consume the bit that was just reported.
        self.value >>= 1;
        self.bit_index += 1;
        Some(result)
    }
}

/// An iterator over the positions contained in a [PositionSet], in ascending
/// order.
pub struct PositionSetIter<'a> {
    offset: usize,
    current: BitIterator,
    words: Iter<'a, u64>
}

impl<'a> Iterator for PositionSetIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some(bit_index) = self.current.next() {
                return Some(self.offset + bit_index);
            }

            let &word = self.words.next()?;
            self.offset += WORD_BITS;
            self.current = BitIterator {
                bit_index: 0,
                value: word
            };
        }
    }
}

fn locate(position: usize) -> (usize, u64) {
    (position / WORD_BITS, 1u64 << (position % WORD_BITS))
}

impl PositionSet {

    /// Creates a new set that contains every position in `[0, capacity[`.
    pub fn full(capacity: usize) -> PositionSet {
        let word_count = (capacity + WORD_BITS - 1) / WORD_BITS;
        let mut words = vec![!0u64; word_count];
        let remainder = capacity % WORD_BITS;

        if remainder > 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << remainder) - 1;
            }
        }

        PositionSet {
            capacity,
            len: capacity,
            words
        }
    }

    /// Gets the number of positions this set can hold, which is the size of
    /// the full domain it represents.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Indicates whether the given position is contained in this set.
    /// Positions outside the capacity are never contained.
    pub fn contains(&self, position: usize) -> bool {
        if position >= self.capacity {
            return false;
        }

        let (word, mask) = locate(position);
        self.words[word] & mask != 0
    }

    /// Inserts the given position. Returns `true` if the set has changed,
    /// that is, the position was absent before and lies within the capacity.
    pub fn insert(&mut self, position: usize) -> bool {
        if position >= self.capacity || self.contains(position) {
            return false;
        }

        let (word, mask) = locate(position);
        self.words[word] |= mask;
        self.len += 1;
        true
    }

    /// Removes the given position. Returns `true` if the set has changed,
    /// that is, the position was present before.
    pub fn remove(&mut self, position: usize) -> bool {
        if !self.contains(position) {
            return false;
        }

        let (word, mask) = locate(position);
        self.words[word] &= !mask;
        self.len -= 1;
        true
    }

    /// Returns an iterator over the contained positions in ascending order.
    pub fn iter(&self) -> PositionSetIter<'_> {
        let mut words = self.words.iter();
        let first = words.next().cloned().unwrap_or(0);

        PositionSetIter {
            offset: 0,
            current: BitIterator {
                bit_index: 0,
                value: first
            },
            words
        }
    }

    /// Indicates whether this set contains no positions.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of contained positions.
    pub fn len(&self) -> usize {
        self.len
    }
}

/// Determines whether the given iterator contains at least two equal elements
/// as defined by the [Eq](std::cmp::Eq) trait. The duplication detection is
/// implemented with a [HashSet](std::collections::HashSet), so it is required
/// that the item type implements the [Hash](std::hash::Hash) trait in a
/// consistent way.
pub(crate) fn contains_duplicate<I>(mut iter: I) -> bool
where
    I: Iterator,
    I::Item: Hash + Eq
{
    let mut set = HashSet::new();
    iter.any(|e| !set.insert(e))
}
