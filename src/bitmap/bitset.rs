//! Bounded, densely allocated bitset.

use super::{
    bitwise_add, bitwise_add_with_overflow, bitwise_mult, bitwise_sub, BitMap, Ones,
};

/// Flat bitset over 32-bit indices.
///
/// Words are allocated densely up to the highest set bit, so this is the
/// right shape for small, well-populated index ranges and for
/// interoperability with code expecting a plain bounded bitset. For huge or
/// sparse populations use [`PagedBitMap`](super::PagedBitMap).
///
/// Implements [`BitMap`] without exposing a word store, so set algebra
/// against it always runs through the generic bit-by-bit paths. Indices
/// above `u32::MAX` are a range error.
#[derive(Default, Clone)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    /// Empty bitset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty bitset with room for `bits` bits preallocated.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(64)],
        }
    }

    /// Smallest clear bit index `>= start`. Always returns, since every
    /// bit past the allocated words is clear.
    pub fn next_clear(&self, start: u64) -> u64 {
        let mut w = (start / 64) as usize;
        if w >= self.words.len() {
            return start;
        }
        let mut inverted = !self.words[w] & (u64::MAX << (start % 64));
        loop {
            if inverted != 0 {
                return w as u64 * 64 + inverted.trailing_zeros() as u64;
            }
            w += 1;
            if w >= self.words.len() {
                return w as u64 * 64;
            }
            inverted = !self.words[w];
        }
    }

    fn check_index(index: u64) -> usize {
        assert!(
            index <= u32::MAX as u64,
            "bit index out of range for bounded bitset: {index}"
        );
        (index / 64) as usize
    }
}

impl BitMap for BitSet {
    fn get(&self, index: u64) -> bool {
        let w = Self::check_index(index);
        match self.words.get(w) {
            Some(word) => word & (1u64 << (index % 64)) != 0,
            None => false,
        }
    }

    fn set(&mut self, index: u64, value: bool) {
        let w = Self::check_index(index);
        if w >= self.words.len() {
            if !value {
                return;
            }
            self.words.resize(w + 1, 0);
        }
        let bit = 1u64 << (index % 64);
        if value {
            self.words[w] |= bit;
        } else {
            self.words[w] &= !bit;
        }
    }

    fn get_and_set(&mut self, index: u64, value: bool) -> bool {
        let old = self.get(index);
        self.set(index, value);
        old
    }

    fn seek_one(&self, start: u64) -> Option<u64> {
        let mut w = (start / 64) as usize;
        if w >= self.words.len() {
            return None;
        }
        let mut word = self.words[w] & (u64::MAX << (start % 64));
        loop {
            if word != 0 {
                return Some(w as u64 * 64 + word.trailing_zeros() as u64);
            }
            w += 1;
            if w >= self.words.len() {
                return None;
            }
            word = self.words[w];
        }
    }

    fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    fn add(&mut self, that: &dyn BitMap) {
        bitwise_add(self, that);
    }

    fn add_with_overflow(&mut self, that: &dyn BitMap, overflow: &mut dyn BitMap) {
        bitwise_add_with_overflow(self, that, overflow);
    }

    fn sub(&mut self, that: &dyn BitMap) {
        bitwise_sub(self, that);
    }

    fn mult(&mut self, that: &dyn BitMap) {
        bitwise_mult(self, that);
    }

    fn ones(&self) -> Ones<'_> {
        Ones::new(self)
    }
}
