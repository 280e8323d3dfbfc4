//! Index sorting: produce a permutation instead of moving data.
//!
//! [`IndexSorter`] sorts logical positions, not values. It emits an order
//! array that [`reorder`](crate::shuffle::reorder) can then apply in place
//! to one or more parallel primitive arrays, so wide rows are compared once
//! and moved once.

use std::cmp::Ordering;

/// Ranges shorter than this are insertion sorted.
const INSERTION_SORT_LIMIT: usize = 7;

/// Ranges longer than this sample each pivot candidate as a median of a
/// small neighborhood (9-point median-of-medians), which resists sorted and
/// adversarial partitions.
const NINTHER_LIMIT: usize = 40;

/// Comparator over logical positions.
///
/// `compare` must induce a total order. The sorter never materializes keys
/// itself; implementations that build keys lazily can keep separate
/// cursors for the two sides, since `a` and `b` are never aliases of a
/// retained key.
///
/// Implemented for closures, so ad-hoc sorters read naturally:
///
/// ```rust
/// use unboxed::IndexSorter;
///
/// let data = [30i64, 10, 20];
/// let sorter = IndexSorter::new(|a: usize, b: usize| data[a].cmp(&data[b]));
/// assert_eq!(sorter.order(0, 3), vec![1, 2, 0]);
/// ```
pub trait SortKeys {
    /// Order of the keys at positions `a` and `b`.
    fn compare(&self, a: usize, b: usize) -> Ordering;
}

impl<F: Fn(usize, usize) -> Ordering> SortKeys for F {
    fn compare(&self, a: usize, b: usize) -> Ordering {
        self(a, b)
    }
}

/// Sorter producing gather permutations over position ranges.
pub struct IndexSorter<S: SortKeys> {
    keys: S,
}

impl<S: SortKeys> IndexSorter<S> {
    /// Sorter over the given position comparator.
    pub fn new(keys: S) -> Self {
        Self { keys }
    }

    /// The comparator.
    pub fn keys(&self) -> &S {
        &self.keys
    }

    /// Permutation of positions `[from, to)` in ascending key order:
    /// `order[i]` is the position whose value belongs at rank `i`.
    ///
    /// # Panics
    ///
    /// If `from > to`, or `to` does not fit the `u32` position range.
    pub fn order(&self, from: usize, to: usize) -> Vec<u32> {
        assert!(from <= to, "negative sort range: {from}..{to}");
        assert!(
            to <= u32::MAX as usize,
            "sort range end out of position range: {to}"
        );
        let mut refs: Vec<u32> = (from as u32..to as u32).collect();
        let len = refs.len();
        self.sort_span(&mut refs, 0, len);
        refs
    }

    #[inline]
    fn cmp(&self, a: u32, b: u32) -> Ordering {
        self.keys.compare(a as usize, b as usize)
    }

    /// Median position of three sampled rows.
    fn med(&self, rows: &[u32], a: usize, b: usize, c: usize) -> usize {
        if self.cmp(rows[a], rows[b]) == Ordering::Less {
            if self.cmp(rows[b], rows[c]) == Ordering::Less {
                b
            } else if self.cmp(rows[a], rows[c]) == Ordering::Less {
                c
            } else {
                a
            }
        } else if self.cmp(rows[b], rows[c]) == Ordering::Greater {
            b
        } else if self.cmp(rows[a], rows[c]) == Ordering::Greater {
            c
        } else {
            a
        }
    }

    /// Three-way quicksort of `rows[start..end]`, after Apache Harmony's
    /// primitive sort: pivot-equal rows are swept to both ends during
    /// partitioning and swapped into the middle once the scans cross.
    fn sort_span(&self, rows: &mut [u32], start: usize, end: usize) {
        let mut length = end - start;
        if length < INSERTION_SORT_LIMIT {
            for i in start + 1..end {
                let mut j = i;
                while j > start && self.cmp(rows[j - 1], rows[j]) == Ordering::Greater {
                    rows.swap(j, j - 1);
                    j -= 1;
                }
            }
            return;
        }

        let mut middle = (start + end) / 2;
        if length > INSERTION_SORT_LIMIT {
            let mut bottom = start;
            let mut top = end - 1;
            if length > NINTHER_LIMIT {
                length /= 8;
                bottom = self.med(rows, bottom, bottom + length, bottom + 2 * length);
                middle = self.med(rows, middle - length, middle, middle + length);
                top = self.med(rows, top - 2 * length, top - length, top);
            }
            middle = self.med(rows, bottom, middle, top);
        }

        let pivot = rows[middle];
        // Scan indices may pass each other and run one below `start`, so
        // partitioning works in signed space.
        let start_i = start as isize;
        let end_i = end as isize;
        let mut a = start_i;
        let mut b = start_i;
        let mut c = end_i - 1;
        let mut d = c;
        loop {
            while b <= c {
                match self.cmp(rows[b as usize], pivot) {
                    Ordering::Greater => break,
                    Ordering::Equal => {
                        rows.swap(a as usize, b as usize);
                        a += 1;
                        b += 1;
                    }
                    Ordering::Less => b += 1,
                }
            }
            while c >= b {
                match self.cmp(rows[c as usize], pivot) {
                    Ordering::Less => break,
                    Ordering::Equal => {
                        rows.swap(c as usize, d as usize);
                        d -= 1;
                        c -= 1;
                    }
                    Ordering::Greater => c -= 1,
                }
            }
            if b > c {
                break;
            }
            rows.swap(c as usize, b as usize);
            c -= 1;
            b += 1;
        }

        // Move the pivot-equal runs from the ends into the middle.
        let mut run = (a - start_i).min(b - a);
        let mut l = start_i;
        let mut h = b - run;
        while run > 0 {
            rows.swap(l as usize, h as usize);
            l += 1;
            h += 1;
            run -= 1;
        }
        let mut run = (d - c).min(end_i - 1 - d);
        let mut l = b;
        let mut h = end_i - run;
        while run > 0 {
            rows.swap(l as usize, h as usize);
            l += 1;
            h += 1;
            run -= 1;
        }

        let less = (b - a) as usize;
        let greater = (d - c) as usize;
        // A comparator where the pivot does not compare equal to itself can
        // leave one partition covering the whole range. The resulting order
        // is unspecified either way; refuse to recurse without progress.
        if less == end - start || greater == end - start {
            return;
        }
        if less > 0 {
            self.sort_span(rows, start, start + less);
        }
        if greater > 0 {
            self.sort_span(rows, end - greater, end);
        }
    }
}
