//! Paged backing stores for 64-bit words.
//!
//! A store behaves like an unbounded array of `u64` words indexed by `u64`:
//! every word reads as zero until written, and pages of words are allocated
//! lazily on the first non-zero write. Two layouts are provided:
//!
//! - [`DensePagedStore`]: a flat page table, cheap when populated pages are
//!   numerous or contiguous.
//! - [`SparsePagedStore`]: an ordered page map, usable across the whole
//!   64-bit index range with enormous unpopulated gaps (e.g. raw memory
//!   addresses), at the price of a tree lookup per access.

use std::collections::BTreeMap;

/// log2 of the page size in words.
pub(crate) const PAGE_BITS: u32 = 10;
/// Words per page (1024 words = 65536 bits).
pub(crate) const PAGE_SIZE: usize = 1 << PAGE_BITS;

const PAGE_MASK: u64 = (PAGE_SIZE as u64) - 1;

type Page = Box<[u64; PAGE_SIZE]>;

fn new_page() -> Page {
    Box::new([0u64; PAGE_SIZE])
}

/// Minimal contract for a growable array of 64-bit words.
///
/// Used as backing storage for [`PagedBitMap`](super::PagedBitMap). Words
/// that were never written read as zero, and writing zero to an unallocated
/// region must not allocate storage.
pub trait WordStore {
    /// Word at `index`, zero if never written.
    fn get(&self, index: u64) -> u64;

    /// Store `value` at `index`. Storing zero where no page exists is a
    /// no-op.
    fn set(&mut self, index: u64, value: u64);

    /// Smallest index `>= start` holding a non-zero word, scanning
    /// allocated pages in increasing index order.
    fn seek_next(&self, start: u64) -> Option<u64>;
}

/// Word store with a flat, growable page table.
///
/// Page slots are `None` until first written. The table grows to cover the
/// highest written page index, so this layout is only appropriate for
/// moderately sized, densely populated index ranges.
#[derive(Default, Clone)]
pub struct DensePagedStore {
    pages: Vec<Option<Page>>,
}

impl DensePagedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated pages.
    pub fn page_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_some()).count()
    }
}

impl WordStore for DensePagedStore {
    fn get(&self, index: u64) -> u64 {
        let pi = (index >> PAGE_BITS) as usize;
        match self.pages.get(pi) {
            Some(Some(page)) => page[(index & PAGE_MASK) as usize],
            _ => 0,
        }
    }

    fn set(&mut self, index: u64, value: u64) {
        let pi = (index >> PAGE_BITS) as usize;
        if pi >= self.pages.len() || self.pages[pi].is_none() {
            if value == 0 {
                return;
            }
            if pi >= self.pages.len() {
                self.pages.resize(pi + 1, None);
            }
            self.pages[pi] = Some(new_page());
        }
        let page = self.pages[pi].as_mut().unwrap();
        page[(index & PAGE_MASK) as usize] = value;
    }

    fn seek_next(&self, start: u64) -> Option<u64> {
        let mut pi = (start >> PAGE_BITS) as usize;
        while pi < self.pages.len() {
            if let Some(page) = &self.pages[pi] {
                let page_start = (pi as u64) << PAGE_BITS;
                let first = start.saturating_sub(page_start) as usize;
                for off in first..PAGE_SIZE {
                    if page[off] != 0 {
                        return Some(page_start + off as u64);
                    }
                }
            }
            pi += 1;
        }
        None
    }
}

/// Word store keeping allocated pages in an ordered map.
///
/// The map is keyed by page index so that [`WordStore::seek_next`] can walk
/// allocated pages in increasing address order without touching gaps. A
/// hash map would look up faster, but could not seek.
#[derive(Default, Clone)]
pub struct SparsePagedStore {
    pages: BTreeMap<u64, Page>,
}

impl SparsePagedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl WordStore for SparsePagedStore {
    fn get(&self, index: u64) -> u64 {
        match self.pages.get(&(index >> PAGE_BITS)) {
            Some(page) => page[(index & PAGE_MASK) as usize],
            None => 0,
        }
    }

    fn set(&mut self, index: u64, value: u64) {
        let pi = index >> PAGE_BITS;
        if value == 0 {
            if let Some(page) = self.pages.get_mut(&pi) {
                page[(index & PAGE_MASK) as usize] = 0;
            }
            return;
        }
        let page = self.pages.entry(pi).or_insert_with(new_page);
        page[(index & PAGE_MASK) as usize] = value;
    }

    fn seek_next(&self, start: u64) -> Option<u64> {
        let start_page = start >> PAGE_BITS;
        for (&pi, page) in self.pages.range(start_page..) {
            let page_start = pi << PAGE_BITS;
            let first = start.saturating_sub(page_start) as usize;
            for off in first..PAGE_SIZE {
                if page[off] != 0 {
                    return Some(page_start + off as u64);
                }
            }
        }
        None
    }
}
