//! # unboxed
//!
//! Primitive, unboxed data structures for very large in-memory datasets.
//!
//! Everything here works directly over flat primitive arrays, with no
//! per-element boxing and no node allocations, trading API convenience for
//! memory density and cache locality:
//!
//! - [`PagedBitMap`]: a bit-indexed set over the 64-bit index space with
//!   lazily allocated pages, in a dense or sparse page layout.
//! - [`BitSet`]: its bounded, densely allocated counterpart.
//! - [`HashLookup`]: a hash table over integer entry ids with intrusive
//!   chains, for keys the caller keeps in parallel arrays.
//! - [`IndexSorter`] and [`reorder`]: sort positions instead of values,
//!   then apply the resulting permutation in place by cycle decomposition.
//!
//! ## Example
//!
//! ```rust
//! use unboxed::{reorder, IndexSorter};
//!
//! // Two parallel columns; sort both by the first.
//! let mut keys = [30i64, 10, 20];
//! let mut payload = [300u32, 100, 200];
//!
//! let order = {
//!     let sorter = IndexSorter::new(|a: usize, b: usize| keys[a].cmp(&keys[b]));
//!     sorter.order(0, keys.len())
//! };
//! reorder(&mut keys, &order).unwrap();
//! reorder(&mut payload, &order).unwrap();
//!
//! assert_eq!(keys, [10, 20, 30]);
//! assert_eq!(payload, [100, 200, 300]);
//! ```
//!
//! All structures are single-threaded and non-reentrant; callers needing
//! shared access must provide external synchronization.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitmap;
pub mod hash;
pub mod shuffle;
pub mod sort;

pub use bitmap::{
    BitMap, BitSet, DensePagedStore, Ones, PagedBitMap, SparsePagedStore, WordStore,
};
pub use hash::{EntryKeys, HashLookup};
pub use shuffle::{reorder, ReorderError};
pub use sort::{IndexSorter, SortKeys};

#[cfg(test)]
mod proptests;
