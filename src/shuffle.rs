//! In-place permutation application.

use crate::bitmap::{BitMap, BitSet};
use thiserror::Error;

/// Malformed permutation detected while applying it.
///
/// On error the target array is left partially permuted; callers must not
/// reuse its contents without re-initializing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReorderError {
    /// The order array does not cover the target array.
    #[error("order length {order} does not match array length {array}")]
    LengthMismatch {
        /// Length of the array being permuted.
        array: usize,
        /// Length of the order array.
        order: usize,
    },
    /// An order entry points outside the array.
    #[error("order target {target} out of range for length {len}")]
    TargetOutOfRange {
        /// Offending order entry.
        target: usize,
        /// Array length.
        len: usize,
    },
    /// A cycle walk reached an already-visited position before closing,
    /// which only a non-bijective order can cause.
    #[error("order revisits position {position} before closing its cycle")]
    RevisitedPosition {
        /// Position visited twice.
        position: usize,
    },
}

/// Rewrite `array` in place so that `array[i]` ends up holding the value
/// that started at `array[order[i]]` (a gather, not a scatter).
///
/// Works by cycle decomposition: each unvisited position starts a cycle
/// that is walked with one swap per displaced element, with a visited
/// bitset as the only extra memory. Validity of `order` is checked lazily
/// during the walk, not up front.
///
/// The same order can be applied to any number of parallel arrays needing
/// one reordering.
///
/// # Example
///
/// ```rust
/// use unboxed::reorder;
///
/// let mut values = [30i64, 10, 20];
/// let mut labels = ["c", "a", "b"];
/// let order = [1u32, 2, 0];
/// reorder(&mut values, &order).unwrap();
/// reorder(&mut labels, &order).unwrap();
/// assert_eq!(values, [10, 20, 30]);
/// assert_eq!(labels, ["a", "b", "c"]);
/// ```
pub fn reorder<T>(array: &mut [T], order: &[u32]) -> Result<(), ReorderError> {
    let len = array.len();
    if order.len() != len {
        return Err(ReorderError::LengthMismatch {
            array: len,
            order: order.len(),
        });
    }

    let mut visited = BitSet::with_capacity(len);
    let mut n = 0u64;
    loop {
        n = visited.next_clear(n);
        let start = n as usize;
        if start >= len {
            break;
        }
        let mut mv = start;
        loop {
            let target = order[mv] as usize;
            if target >= len {
                return Err(ReorderError::TargetOutOfRange { target, len });
            }
            visited.set(mv as u64, true);
            if target == start {
                break;
            }
            array.swap(mv, target);
            mv = target;
            if visited.get(mv as u64) {
                return Err(ReorderError::RevisitedPosition { position: mv });
            }
        }
    }
    Ok(())
}
