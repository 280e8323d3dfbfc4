use super::*;

use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

// Small index domain so that ops collide often enough to be interesting,
// plus a high offset to exercise gaps between allocated pages.
fn bit_index() -> impl Strategy<Value = u64> + Clone {
    prop_oneof![
        4 => 0u64..=2_000,
        1 => 1_000_000u64..=1_002_000,
    ]
}

fn sparse_bit_index() -> impl Strategy<Value = u64> + Clone {
    prop_oneof![
        3 => 0u64..=2_000,
        1 => (1u64 << 40)..=(1u64 << 40) + 2_000,
        1 => u64::MAX - 2_000..=u64::MAX,
    ]
}

#[derive(Clone, Debug)]
enum BitOp {
    Set(u64, bool),
    GetAndSet(u64, bool),
    Get(u64),
    SeekOne(u64),
}

fn bit_ops(index: impl Strategy<Value = u64> + Clone) -> impl Strategy<Value = Vec<BitOp>> {
    let op = prop_oneof![
        4 => (index.clone(), any::<bool>()).prop_map(|(i, v)| BitOp::Set(i, v)),
        2 => (index.clone(), any::<bool>()).prop_map(|(i, v)| BitOp::GetAndSet(i, v)),
        2 => index.clone().prop_map(BitOp::Get),
        1 => index.prop_map(BitOp::SeekOne),
    ];
    prop::collection::vec(op, 0..=500)
}

fn check_bitmap_ops(bits: &mut dyn BitMap, ops: Vec<BitOp>) -> Result<(), TestCaseError> {
    let mut reference: BTreeSet<u64> = BTreeSet::new();

    for op in ops {
        match op {
            BitOp::Set(i, v) => {
                bits.set(i, v);
                if v {
                    reference.insert(i);
                } else {
                    reference.remove(&i);
                }
            }
            BitOp::GetAndSet(i, v) => {
                let prev = bits.get_and_set(i, v);
                prop_assert_eq!(prev, reference.contains(&i));
                if v {
                    reference.insert(i);
                } else {
                    reference.remove(&i);
                }
            }
            BitOp::Get(i) => {
                prop_assert_eq!(bits.get(i), reference.contains(&i));
            }
            BitOp::SeekOne(start) => {
                let expected = reference.range(start..).next().copied();
                prop_assert_eq!(bits.seek_one(start), expected);
            }
        }
    }

    let got: Vec<u64> = bits.ones().collect();
    let expected: Vec<u64> = reference.iter().copied().collect();
    prop_assert_eq!(got, expected);
    prop_assert_eq!(bits.count_ones(), reference.len() as u64);
    Ok(())
}

fn build_paged(indices: &[u64]) -> PagedBitMap {
    let mut bits = PagedBitMap::new();
    for &i in indices {
        bits.set(i, true);
    }
    bits
}

fn ones_of(bits: &dyn BitMap) -> BTreeSet<u64> {
    bits.ones().collect()
}

fn permutation(len: impl Strategy<Value = usize>) -> impl Strategy<Value = Vec<u32>> {
    len.prop_flat_map(|n| Just((0..n as u32).collect::<Vec<u32>>()).prop_shuffle())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_dense_bitmap_equivalence(ops in bit_ops(bit_index())) {
        let mut bits = PagedBitMap::new();
        check_bitmap_ops(&mut bits, ops)?;
    }

    #[test]
    fn prop_sparse_bitmap_equivalence(ops in bit_ops(sparse_bit_index())) {
        let mut bits = PagedBitMap::sparse();
        check_bitmap_ops(&mut bits, ops)?;
    }

    #[test]
    fn prop_bounded_bitset_equivalence(ops in bit_ops(0u64..=5_000)) {
        let mut bits = BitSet::new();
        check_bitmap_ops(&mut bits, ops)?;
    }

    #[test]
    fn prop_set_algebra_laws(
        a in prop::collection::btree_set(bit_index(), 0..200),
        b in prop::collection::btree_set(bit_index(), 0..200),
    ) {
        let a: Vec<u64> = a.into_iter().collect();
        let b: Vec<u64> = b.into_iter().collect();
        let base = build_paged(&a);
        let that = build_paged(&b);
        let set_a: BTreeSet<u64> = a.iter().copied().collect();
        let set_b: BTreeSet<u64> = b.iter().copied().collect();

        let mut union = base.clone();
        union.add(&that);
        prop_assert_eq!(ones_of(&union), &set_a | &set_b);

        let mut diff = base.clone();
        diff.sub(&that);
        prop_assert_eq!(ones_of(&diff), &set_a - &set_b);

        let mut inter = base.clone();
        inter.mult(&that);
        prop_assert_eq!(ones_of(&inter), &set_a & &set_b);

        let mut acc = base.clone();
        let mut overflow = PagedBitMap::new();
        acc.add_with_overflow(&that, &mut overflow);
        prop_assert_eq!(ones_of(&acc), &set_a | &set_b);
        prop_assert_eq!(ones_of(&overflow), &set_a & &set_b);
    }

    // Same laws with a storeless right operand, forcing the bit-by-bit
    // paths; both routes must agree.
    #[test]
    fn prop_set_algebra_fallback_matches_fast_path(
        a in prop::collection::btree_set(0u64..=4_000, 0..150),
        b in prop::collection::btree_set(0u64..=4_000, 0..150),
    ) {
        let a: Vec<u64> = a.into_iter().collect();
        let b: Vec<u64> = b.into_iter().collect();
        let that_paged = build_paged(&b);
        let mut that_bounded = BitSet::new();
        for &i in &b {
            that_bounded.set(i, true);
        }

        for op in 0..4 {
            let mut fast = build_paged(&a);
            let mut slow = build_paged(&a);
            let mut fast_overflow = PagedBitMap::new();
            let mut slow_overflow = BitSet::new();
            match op {
                0 => {
                    fast.add(&that_paged);
                    slow.add(&that_bounded);
                }
                1 => {
                    fast.sub(&that_paged);
                    slow.sub(&that_bounded);
                }
                2 => {
                    fast.mult(&that_paged);
                    slow.mult(&that_bounded);
                }
                _ => {
                    fast.add_with_overflow(&that_paged, &mut fast_overflow);
                    slow.add_with_overflow(&that_bounded, &mut slow_overflow);
                }
            }
            prop_assert_eq!(ones_of(&fast), ones_of(&slow));
            prop_assert_eq!(ones_of(&fast_overflow), ones_of(&slow_overflow));
        }
    }

    #[test]
    fn prop_sort_matches_reference(data in prop::collection::vec(any::<i64>(), 0..400)) {
        let sorter = IndexSorter::new(|a: usize, b: usize| data[a].cmp(&data[b]));
        let order = sorter.order(0, data.len());

        let mut sorted = data.clone();
        reorder(&mut sorted, &order).unwrap();

        let mut expected = data.clone();
        expected.sort_unstable();
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn prop_sort_subrange(
        data in prop::collection::vec(any::<i32>(), 2..200),
        split in any::<prop::sample::Index>(),
    ) {
        let from = split.index(data.len());
        let sorter = IndexSorter::new(|a: usize, b: usize| data[a].cmp(&data[b]));
        let order = sorter.order(from, data.len());

        // The order must be a permutation of [from, len).
        prop_assert_eq!(order.len(), data.len() - from);
        let mut positions: Vec<u32> = order.clone();
        positions.sort_unstable();
        let expected_positions: Vec<u32> = (from as u32..data.len() as u32).collect();
        prop_assert_eq!(positions, expected_positions);

        let keys: Vec<i32> = order.iter().map(|&p| data[p as usize]).collect();
        let mut sorted = data[from..].to_vec();
        sorted.sort_unstable();
        prop_assert_eq!(keys, sorted);
    }

    #[test]
    fn prop_reorder_gather_and_inverse(order in permutation(0..300usize)) {
        let len = order.len();
        let original: Vec<u64> = (0..len as u64).map(|i| i.wrapping_mul(0x9E37_79B9)).collect();

        let expected: Vec<u64> = order.iter().map(|&p| original[p as usize]).collect();
        let mut data = original.clone();
        reorder(&mut data, &order).unwrap();
        prop_assert_eq!(&data, &expected);

        // Applying the inverse permutation undoes the reorder.
        let mut inv = vec![0u32; len];
        for (i, &p) in order.iter().enumerate() {
            inv[p as usize] = i as u32;
        }
        reorder(&mut data, &inv).unwrap();
        prop_assert_eq!(data, original);
    }

    #[test]
    fn prop_reorder_rejects_duplicate_targets(
        order in permutation(2..100usize),
        dup in any::<prop::sample::Index>(),
    ) {
        let mut order = order;
        let len = order.len();
        // Overwrite one slot with its neighbor's target, making the order
        // non-bijective.
        let at = dup.index(len);
        let neighbor = (at + 1) % len;
        order[at] = order[neighbor];

        let mut data: Vec<i64> = (0..len as i64).collect();
        prop_assert!(reorder(&mut data, &order).is_err());
    }

    #[test]
    fn prop_hash_lookup_equivalence(ops in hash_ops()) {
        run_hash_model(ops)?;
    }
}

#[derive(Clone, Debug)]
enum HashOp {
    Add(i64),
    Update(usize, i64),
    Erase(usize),
}

fn hash_ops() -> impl Strategy<Value = Vec<HashOp>> {
    let op = prop_oneof![
        5 => (0i64..20_000).prop_map(HashOp::Add),
        3 => (any::<prop::sample::Index>(), 0i64..20_000)
            .prop_map(|(n, v)| HashOp::Update(n.index(1 << 16), v)),
        2 => any::<prop::sample::Index>().prop_map(|n| HashOp::Erase(n.index(1 << 16))),
    ];
    prop::collection::vec(op, 0..=400)
}

const HOLE: i64 = i64::MIN;

// Collision-heavy on purpose: hash by `% 1000`, equality by `% 10000`, so
// chains regularly hold several distinct keys with the same hash.
struct ModularKeys {
    values: Vec<i64>,
}

impl EntryKeys for ModularKeys {
    type Key = i64;

    fn key_at(&self, entry: usize) -> i64 {
        self.values[entry]
    }

    fn hash(&self, key: &i64) -> u32 {
        key.rem_euclid(1000) as u32
    }

    fn equal(&self, a: &i64, b: &i64) -> bool {
        a.rem_euclid(10_000) == b.rem_euclid(10_000)
    }
}

fn run_hash_model(ops: Vec<HashOp>) -> Result<(), TestCaseError> {
    let mut table = HashLookup::new(ModularKeys { values: Vec::new() });
    let mut reference: HashSet<i64> = HashSet::new();

    for op in ops {
        match op {
            HashOp::Add(v) => {
                if reference.contains(&v) {
                    continue;
                }
                let entry = table.keys().values.len();
                table.keys_mut().values.push(v);
                table.put(entry);
                reference.insert(v);
            }
            HashOp::Update(n, v) => {
                let len = table.keys().values.len();
                if len == 0 || reference.contains(&v) {
                    continue;
                }
                let n = n % len;
                let old = table.keys().values[n];
                if old == HOLE {
                    continue;
                }
                reference.remove(&old);
                table.keys_mut().values[n] = v;
                table.put(n);
                reference.insert(v);
            }
            HashOp::Erase(n) => {
                let len = table.keys().values.len();
                if len == 0 {
                    continue;
                }
                let n = n % len;
                let old = table.keys().values[n];
                if old == HOLE {
                    continue;
                }
                table.remove_entry(n);
                table.keys_mut().values[n] = HOLE;
                reference.remove(&old);
            }
        }
    }

    prop_assert_eq!(table.len(), reference.len());
    for &v in &reference {
        prop_assert!(table.seek(&v).is_some(), "value {} should be found", v);
    }
    let mut live: Vec<i64> = table
        .keys()
        .values
        .iter()
        .copied()
        .filter(|&v| v != HOLE)
        .collect();
    let mut expected: Vec<i64> = reference.iter().copied().collect();
    live.sort_unstable();
    expected.sort_unstable();
    prop_assert_eq!(live, expected);
    Ok(())
}
