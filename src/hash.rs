//! Entry-indexed hash lookup with intrusive chaining.
//!
//! [`HashLookup`] maps caller-defined keys to integer entry ids without
//! storing the keys themselves: the caller owns the value domain (typically
//! one or more parallel primitive arrays) and exposes it through
//! [`EntryKeys`]. Per entry the table keeps only a stored hash and an
//! intrusive chain pointer, both in flat `u32` arrays, so collisions cost
//! no per-entry allocation.

/// Sentinel for "no entry" in chain pointers, bucket heads and stored
/// hashes. Stored hashes are masked to 31 bits, so this value can never
/// collide with a real hash.
const NIL: u32 = u32::MAX;

/// Stored hashes keep only the low 31 bits, leaving the sentinel
/// distinguishable.
const HASH_MASK: u32 = 0x7FFF_FFFF;

/// Initial length of the entry and bucket arrays.
const DEFAULT_CAPACITY: usize = 1024;

/// Load factor as a fixed-point fraction scaled by 1024 (0.75).
const DEFAULT_LOAD_FACTOR: usize = 768;

/// Caller-side key access for [`HashLookup`].
///
/// `key_at` must be pure and stable for a given entry id between calls,
/// unless the mutation is followed by a `put` for that entry. Hash quality
/// is entirely the caller's concern; a degenerate hash degrades lookups to
/// a table scan but never breaks correctness.
pub trait EntryKeys {
    /// Key type produced by the projection.
    type Key;

    /// Materialize the key for `entry`. The returned value may be rebuilt
    /// on every call; the table never retains it.
    fn key_at(&self, entry: usize) -> Self::Key;

    /// Hash for a key. Only the low 31 bits are stored.
    fn hash(&self, key: &Self::Key) -> u32;

    /// Key equality. Must be consistent with `hash` (equal keys hash
    /// equal).
    fn equal(&self, a: &Self::Key, b: &Self::Key) -> bool;
}

/// Hash table over entry ids, tolerant of duplicate keys.
///
/// Entry arrays (`hashes`, `nexts`) are indexed directly by entry id and
/// grow by doubling to cover the ids used. Buckets are closed-addressed:
/// each bucket head points at an entry id, and further same-bucket entries
/// are linked through `nexts`. An entry id is in at most one chain at a
/// time; it is present iff its stored hash is not the sentinel.
///
/// # Example
///
/// ```rust
/// use unboxed::{EntryKeys, HashLookup};
///
/// struct Values(Vec<i64>);
///
/// impl EntryKeys for Values {
///     type Key = i64;
///     fn key_at(&self, entry: usize) -> i64 {
///         self.0[entry]
///     }
///     fn hash(&self, key: &i64) -> u32 {
///         *key as u32
///     }
///     fn equal(&self, a: &i64, b: &i64) -> bool {
///         a == b
///     }
/// }
///
/// let mut table = HashLookup::new(Values(vec![7, 42, 7]));
/// table.put(0);
/// table.put(1);
/// table.put(2);
///
/// let first = table.seek(&7).unwrap();
/// let second = table.seek_next_duplicate(&7, first).unwrap();
/// assert_eq!([first, second], [0, 2]);
/// assert_eq!(table.seek(&42), Some(1));
/// assert_eq!(table.seek(&13), None);
/// ```
pub struct HashLookup<S: EntryKeys> {
    keys: S,
    /// Stored 31-bit hash per entry id, `NIL` when absent.
    hashes: Vec<u32>,
    /// Intrusive chain pointer per entry id, `NIL` at chain end.
    nexts: Vec<u32>,
    /// Bucket heads; length is always a power of two.
    heads: Vec<u32>,
    /// Rehash threshold: `load_factor * heads.len() >> 10`.
    load: usize,
    load_factor: usize,
    size: usize,
}

impl<S: EntryKeys> HashLookup<S> {
    /// Empty table at default capacity over the given key projection.
    pub fn new(keys: S) -> Self {
        Self {
            keys,
            hashes: vec![NIL; DEFAULT_CAPACITY],
            nexts: vec![NIL; DEFAULT_CAPACITY],
            heads: vec![NIL; DEFAULT_CAPACITY],
            load: (DEFAULT_LOAD_FACTOR * DEFAULT_CAPACITY) >> 10,
            load_factor: DEFAULT_LOAD_FACTOR,
            size: 0,
        }
    }

    /// Number of entries present.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current bucket array length.
    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    /// The key projection.
    pub fn keys(&self) -> &S {
        &self.keys
    }

    /// Mutable access to the key projection. Any entry whose key changes
    /// must be re-`put` (or removed) before the next lookup.
    pub fn keys_mut(&mut self) -> &mut S {
        &mut self.keys
    }

    /// Insert or update `entry`.
    ///
    /// If the entry's key hash changed since the last insertion (or the
    /// entry was absent), the entry is unlinked from its old bucket and
    /// relinked at the tail of its new bucket's chain. Crossing the load
    /// threshold doubles the bucket array first.
    pub fn put(&mut self, entry: usize) {
        assert!(entry < NIL as usize, "entry id out of range: {entry}");
        self.grow(entry);

        let old_hash = self.hashes[entry];
        if old_hash == NIL {
            self.size += 1;
        }
        if self.size > self.load {
            self.rehash();
        }

        let key = self.keys.key_at(entry);
        let hash = self.keys.hash(&key) & HASH_MASK;
        if old_hash != hash {
            if old_hash != NIL {
                self.remove_entry(entry);
                self.size += 1;
            }
            let entry = entry as u32;
            let head = self.head_or_link(hash, entry);
            if head != entry {
                let mut h = head as usize;
                loop {
                    if self.nexts[h] == NIL {
                        self.nexts[h] = entry;
                        break;
                    }
                    h = self.nexts[h] as usize;
                }
            }
            self.hashes[entry as usize] = hash;
        }
    }

    /// Unlink `entry` from its bucket chain.
    ///
    /// Returns whether another entry with the same stored hash was observed
    /// during the unlink scan. This is a conservative signal: `true` means
    /// duplicate-hash entries may remain, `false` after a mid-chain unlink
    /// does not prove the chain holds none, since the scan stops at the
    /// removed entry. Absent entries are a no-op returning `false`.
    pub fn remove_entry(&mut self, entry: usize) -> bool {
        if entry >= self.hashes.len() {
            return false;
        }
        let old_hash = self.hashes[entry];
        if old_hash == NIL {
            return false;
        }
        self.size -= 1;

        let entry32 = entry as u32;
        let bucket = self.bucket_of(old_hash);
        let mut head = self.heads[bucket];
        let mut found = false;
        let mut more_same_hash = false;
        let mut prev = NIL;
        while head != NIL {
            if !found {
                if head == entry32 {
                    if prev != NIL {
                        self.nexts[prev as usize] = self.nexts[entry];
                        self.nexts[entry] = NIL;
                        found = true;
                        if more_same_hash {
                            break;
                        }
                    } else {
                        self.heads[bucket] = self.nexts[entry];
                        found = true;
                    }
                } else if self.hashes[head as usize] == old_hash {
                    more_same_hash = true;
                }
            } else if self.hashes[head as usize] == old_hash {
                more_same_hash = true;
                break;
            }
            prev = head;
            head = self.nexts[head as usize];
        }
        self.nexts[entry] = NIL;
        self.hashes[entry] = NIL;
        more_same_hash
    }

    /// First entry whose key equals `key`, in chain order.
    pub fn seek(&self, key: &S::Key) -> Option<usize> {
        let hash = self.keys.hash(key) & HASH_MASK;
        let mut head = self.heads[self.bucket_of(hash)];
        while head != NIL {
            if self.keys.equal(key, &self.keys.key_at(head as usize)) {
                return Some(head as usize);
            }
            head = self.nexts[head as usize];
        }
        None
    }

    /// Next entry after `prev` matching `prev`'s stored hash and `key`,
    /// continuing the chain walk started by [`seek`](Self::seek).
    pub fn seek_next_duplicate(&self, key: &S::Key, prev: usize) -> Option<usize> {
        if prev >= self.hashes.len() {
            return None;
        }
        let hash = self.hashes[prev];
        let mut r = self.nexts[prev];
        while r != NIL {
            let r_us = r as usize;
            if self.hashes[r_us] == hash && self.keys.equal(key, &self.keys.key_at(r_us)) {
                return Some(r_us);
            }
            r = self.nexts[r_us];
        }
        None
    }

    /// Reset all entries to absent, keeping the current capacity.
    pub fn clean(&mut self) {
        self.hashes.fill(NIL);
        self.nexts.fill(NIL);
        self.heads.fill(NIL);
        self.load = (self.load_factor * self.heads.len()) >> 10;
        self.size = 0;
    }

    /// Reset all entries and drop back to the default capacity.
    pub fn reset(&mut self) {
        self.hashes = vec![NIL; DEFAULT_CAPACITY];
        self.nexts = vec![NIL; DEFAULT_CAPACITY];
        self.heads = vec![NIL; DEFAULT_CAPACITY];
        self.load = (self.load_factor * self.heads.len()) >> 10;
        self.size = 0;
    }

    #[inline]
    fn bucket_of(&self, hash: u32) -> usize {
        hash as usize & (self.heads.len() - 1)
    }

    /// Bucket head for `hash`, installing `entry` as head when the bucket
    /// is empty.
    fn head_or_link(&mut self, hash: u32, entry: u32) -> u32 {
        let idx = self.bucket_of(hash);
        if self.heads[idx] == NIL {
            self.heads[idx] = entry;
            return entry;
        }
        self.heads[idx]
    }

    /// Double the bucket array and redistribute every chain. Entry arrays
    /// are untouched.
    fn rehash(&mut self) {
        let mut nheads = vec![NIL; self.heads.len() * 2];
        let mask = nheads.len() - 1;

        for b in 0..self.heads.len() {
            while self.heads[b] != NIL {
                let entry = self.heads[b] as usize;
                let i = self.hashes[entry] as usize & mask;
                if nheads[i] == NIL {
                    nheads[i] = entry as u32;
                } else {
                    let mut r = nheads[i] as usize;
                    loop {
                        if self.nexts[r] == NIL {
                            self.nexts[r] = entry as u32;
                            break;
                        }
                        r = self.nexts[r] as usize;
                    }
                }
                self.heads[b] = self.nexts[entry];
                self.nexts[entry] = NIL;
            }
        }
        self.heads = nheads;
        self.load = (self.load_factor * self.heads.len()) >> 10;
    }

    /// Double the entry arrays until they cover `entry`.
    fn grow(&mut self, entry: usize) {
        if entry < self.hashes.len() {
            return;
        }
        let mut length = self.hashes.len();
        while entry >= length {
            length *= 2;
        }
        self.hashes.resize(length, NIL);
        self.nexts.resize(length, NIL);
    }
}
