//! Bit-indexed sets over a 64-bit index space.
//!
//! [`PagedBitMap`] stores bits in lazily allocated pages and never touches
//! unpopulated ranges, so it stays cheap for bitmaps with large gaps.
//! [`BitSet`] is the bounded, densely allocated counterpart for small index
//! ranges. Both implement the [`BitMap`] contract, so they can be mixed in
//! the set-algebra operations; paged operands additionally expose their
//! [`WordStore`] so that algebra between them runs word-at-a-time.

mod bitset;
mod paged;
mod store;

pub use bitset::BitSet;
pub use paged::PagedBitMap;
pub use store::{DensePagedStore, SparsePagedStore, WordStore};

/// A mutable set of bits addressed by `u64` index.
///
/// All bits are zero initially. Implementations differ only in storage
/// layout and the index range they can afford to cover.
pub trait BitMap {
    /// Value of the bit at `index`.
    fn get(&self, index: u64) -> bool;

    /// Set the bit at `index` to `value`.
    fn set(&mut self, index: u64, value: bool);

    /// Set the bit at `index` to `value`, returning its previous value.
    fn get_and_set(&mut self, index: u64, value: bool) -> bool;

    /// Smallest set bit index `>= start`, or `None` if no bit is set at or
    /// above `start`. Skips unpopulated ranges at word and page
    /// granularity.
    fn seek_one(&self, start: u64) -> Option<u64>;

    /// Number of set bits, counted by seeking through the population (cost
    /// is proportional to the number of set bits, not the domain).
    fn count_ones(&self) -> u64;

    /// Union: `self |= that`.
    fn add(&mut self, that: &dyn BitMap);

    /// Union, additionally recording the pre-operation intersection:
    /// every bit of `that` that was already set in `self` is OR-ed into
    /// `overflow` before `self |= that` takes effect for it.
    fn add_with_overflow(&mut self, that: &dyn BitMap, overflow: &mut dyn BitMap);

    /// Difference: `self &= !that`.
    fn sub(&mut self, that: &dyn BitMap);

    /// Intersection: `self &= that`.
    fn mult(&mut self, that: &dyn BitMap);

    /// Lazy ascending iterator over set bit indices.
    fn ones(&self) -> Ones<'_>;

    /// Backing word store, if this bitmap has one. Set-algebra fast paths
    /// borrow the other operand's store through this; foreign bitmaps
    /// return `None` and take the bit-by-bit path.
    fn word_store(&self) -> Option<&dyn WordStore> {
        None
    }

    /// Mutable access to the backing word store, if any.
    fn word_store_mut(&mut self) -> Option<&mut dyn WordStore> {
        None
    }
}

/// Iterator over the set bits of a [`BitMap`], ascending.
///
/// Built on repeated [`BitMap::seek_one`] calls; forward-only and finite.
pub struct Ones<'a> {
    bitmap: &'a dyn BitMap,
    next: Option<u64>,
}

impl<'a> Ones<'a> {
    /// Start iterating from bit 0.
    pub fn new(bitmap: &'a dyn BitMap) -> Self {
        Self {
            next: bitmap.seek_one(0),
            bitmap,
        }
    }
}

impl Iterator for Ones<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let n = self.next?;
        self.next = match n.checked_add(1) {
            Some(from) => self.bitmap.seek_one(from),
            None => None,
        };
        Some(n)
    }
}

// Bit-by-bit set algebra, used whenever an operand has no word store.

pub(crate) fn bitwise_add(this: &mut dyn BitMap, that: &dyn BitMap) {
    let mut n = that.seek_one(0);
    while let Some(i) = n {
        this.set(i, true);
        n = i.checked_add(1).and_then(|f| that.seek_one(f));
    }
}

pub(crate) fn bitwise_add_with_overflow(
    this: &mut dyn BitMap,
    that: &dyn BitMap,
    overflow: &mut dyn BitMap,
) {
    let mut n = that.seek_one(0);
    while let Some(i) = n {
        if this.get(i) {
            overflow.set(i, true);
        }
        this.set(i, true);
        n = i.checked_add(1).and_then(|f| that.seek_one(f));
    }
}

pub(crate) fn bitwise_sub(this: &mut dyn BitMap, that: &dyn BitMap) {
    let mut n = that.seek_one(0);
    while let Some(i) = n {
        this.set(i, false);
        n = i.checked_add(1).and_then(|f| that.seek_one(f));
    }
}

pub(crate) fn bitwise_mult(this: &mut dyn BitMap, that: &dyn BitMap) {
    let mut n = this.seek_one(0);
    while let Some(i) = n {
        if !that.get(i) {
            this.set(i, false);
        }
        n = i.checked_add(1).and_then(|f| this.seek_one(f));
    }
}
