//! Paged bitmap over a lazily allocated word store.

use super::store::{DensePagedStore, SparsePagedStore, WordStore};
use super::{
    bitwise_add, bitwise_add_with_overflow, bitwise_mult, bitwise_sub, BitMap, Ones,
};

/// Bitmap storing bits in pages of its [`WordStore`].
///
/// Untouched pages are never allocated, so the map stays reasonably
/// efficient for bit populations with large gaps. The store type selects
/// the density trade-off: [`DensePagedStore`] (default) for moderate,
/// well-populated index ranges, [`SparsePagedStore`] for populations
/// scattered across the whole 64-bit range.
///
/// # Example
///
/// ```rust
/// use unboxed::{BitMap, PagedBitMap};
///
/// let mut bits = PagedBitMap::new();
/// bits.set(3, true);
/// bits.set(1 << 40, true);
///
/// assert!(bits.get(3));
/// assert_eq!(bits.seek_one(4), Some(1 << 40));
/// assert_eq!(bits.count_ones(), 2);
/// ```
#[derive(Default, Clone)]
pub struct PagedBitMap<S: WordStore = DensePagedStore> {
    words: S,
}

impl PagedBitMap<DensePagedStore> {
    /// Bitmap over a dense page table.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PagedBitMap<SparsePagedStore> {
    /// Bitmap over an ordered page map, for populations spanning the full
    /// 64-bit index range.
    pub fn sparse() -> Self {
        Self {
            words: SparsePagedStore::new(),
        }
    }
}

impl<S: WordStore> PagedBitMap<S> {
    /// Bitmap over a caller-provided word store.
    pub fn with_store(words: S) -> Self {
        Self { words }
    }

    #[inline]
    fn split(index: u64) -> (u64, u64) {
        (index / 64, 1u64 << (index % 64))
    }
}

impl<S: WordStore> BitMap for PagedBitMap<S> {
    fn get(&self, index: u64) -> bool {
        let (word, bit) = Self::split(index);
        self.words.get(word) & bit != 0
    }

    fn set(&mut self, index: u64, value: bool) {
        let (word, bit) = Self::split(index);
        let old = self.words.get(word);
        let new = if value { old | bit } else { old & !bit };
        self.words.set(word, new);
    }

    fn get_and_set(&mut self, index: u64, value: bool) -> bool {
        let (word, bit) = Self::split(index);
        let old = self.words.get(word);
        let new = if value { old | bit } else { old & !bit };
        self.words.set(word, new);
        old & bit != 0
    }

    fn seek_one(&self, start: u64) -> Option<u64> {
        let mut word_idx = start / 64;
        let mut masked = self.words.get(word_idx) & (u64::MAX << (start % 64));
        loop {
            if masked != 0 {
                return Some(word_idx * 64 + masked.trailing_zeros() as u64);
            }
            word_idx = self.words.seek_next(word_idx + 1)?;
            masked = self.words.get(word_idx);
        }
    }

    fn count_ones(&self) -> u64 {
        self.ones().count() as u64
    }

    fn add(&mut self, that: &dyn BitMap) {
        match that.word_store() {
            Some(ta) => {
                let mut n = ta.seek_next(0);
                while let Some(i) = n {
                    let v = self.words.get(i) | ta.get(i);
                    self.words.set(i, v);
                    n = i.checked_add(1).and_then(|f| ta.seek_next(f));
                }
            }
            None => bitwise_add(self, that),
        }
    }

    fn add_with_overflow(&mut self, that: &dyn BitMap, overflow: &mut dyn BitMap) {
        match (that.word_store(), overflow.word_store_mut()) {
            (Some(ta), Some(of)) => {
                let mut n = ta.seek_next(0);
                while let Some(i) = n {
                    let old = self.words.get(i);
                    let tw = ta.get(i);
                    self.words.set(i, old | tw);
                    let o = old & tw;
                    if o != 0 {
                        of.set(i, o | of.get(i));
                    }
                    n = i.checked_add(1).and_then(|f| ta.seek_next(f));
                }
            }
            _ => bitwise_add_with_overflow(self, that, overflow),
        }
    }

    fn sub(&mut self, that: &dyn BitMap) {
        match that.word_store() {
            Some(ta) => {
                let mut n = ta.seek_next(0);
                while let Some(i) = n {
                    let v = self.words.get(i) & !ta.get(i);
                    self.words.set(i, v);
                    n = i.checked_add(1).and_then(|f| ta.seek_next(f));
                }
            }
            None => bitwise_sub(self, that),
        }
    }

    fn mult(&mut self, that: &dyn BitMap) {
        // Driven by this bitmap's populated words: every word of self not
        // matched by a set word in that must be cleared.
        match that.word_store() {
            Some(ta) => {
                let mut n = self.words.seek_next(0);
                while let Some(i) = n {
                    let v = self.words.get(i) & ta.get(i);
                    self.words.set(i, v);
                    n = i.checked_add(1).and_then(|f| self.words.seek_next(f));
                }
            }
            None => bitwise_mult(self, that),
        }
    }

    fn ones(&self) -> Ones<'_> {
        Ones::new(self)
    }

    fn word_store(&self) -> Option<&dyn WordStore> {
        Some(&self.words)
    }

    fn word_store_mut(&mut self) -> Option<&mut dyn WordStore> {
        Some(&mut self.words)
    }
}
