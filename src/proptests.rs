use super::*;

use crate::node::Node;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Walks the whole structure and checks every invariant the algorithms
/// promise to restore.
fn validate_tree<P: Ord + Debug, S: Ord + Debug, V>(t: &RankTree<P, S, V>) {
    let root = t.root();
    assert_eq!(t.parent(root), None, "root must have no parent");
    assert!(
        matches!(t.arena[root], Node::Branch(_)),
        "root must be a branch"
    );

    let mut leaves = Vec::new();
    let mut leaf_depth = None;
    let mut reachable = 0usize;
    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        reachable += 1;
        match &t.arena[id] {
            Node::Leaf(_) => {
                match leaf_depth {
                    None => leaf_depth = Some(depth),
                    Some(d) => assert_eq!(d, depth, "leaves must share one depth"),
                }
                leaves.push(id);
            }
            Node::Branch(branch) => {
                let children = branch.children();
                assert!(
                    (2..=3).contains(&children.len()),
                    "invalid child count: {}",
                    children.len()
                );
                for &child in children {
                    assert_eq!(t.parent(child), Some(id), "broken parent link");
                }

                let expected_max = match &t.arena[branch.last()] {
                    Node::Leaf(_) => branch.last(),
                    Node::Branch(last) => last.max,
                };
                assert_eq!(branch.max, expected_max, "stale representative key");

                let expected_size: usize = children.iter().map(|&c| t.arena[c].size()).sum();
                assert_eq!(branch.size, expected_size, "stale subtree size");

                for &child in children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
    }

    assert_eq!(leaves.first(), Some(&t.left_sentinel()));
    assert_eq!(leaves.last(), Some(&t.right_sentinel()));
    assert_eq!(leaves.len(), t.len() + 2, "len must count real leaves");
    assert_eq!(t.size(root), Some(t.len()));
    assert_eq!(t.arena.live(), reachable, "unreachable nodes left in arena");

    for pair in leaves.windows(2) {
        let (a, b) = (t.key_of(pair[0]), t.key_of(pair[1]));
        assert!(a.less_than(b), "keys out of order: {a:?} then {b:?}");
        assert_eq!(t.right_sibling(pair[0]), Some(pair[1]), "broken next link");
        assert_eq!(t.left_sibling(pair[1]), Some(pair[0]), "broken prev link");
    }
    assert_eq!(t.left_sibling(t.left_sentinel()), None);
    assert_eq!(t.right_sibling(t.right_sentinel()), None);

    for (i, &leaf) in leaves.iter().enumerate().skip(1).take(t.len()) {
        assert_eq!(t.rank(leaf), Ok(i), "rank mismatch at position {i}");
    }
}

type Model = BTreeMap<(u16, u8), u32>;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 4)]
    Insert {
        #[proptest(strategy = "0u16..200")]
        primary: u16,
        #[proptest(strategy = "0u8..4")]
        secondary: u8,
        value: u32,
    },
    #[proptest(weight = 2)]
    Remove {
        #[proptest(strategy = "0u16..200")]
        primary: u16,
        #[proptest(strategy = "0u8..4")]
        secondary: u8,
    },
    RemovePrimary {
        #[proptest(strategy = "0u16..200")]
        primary: u16,
    },
    Get {
        #[proptest(strategy = "0u16..200")]
        primary: u16,
        #[proptest(strategy = "0u8..4")]
        secondary: u8,
    },
    RangeCount {
        #[proptest(strategy = "0u16..220")]
        lo: u16,
        #[proptest(strategy = "0u16..220")]
        hi: u16,
    },
    Rank {
        #[proptest(strategy = "0u16..200")]
        primary: u16,
        #[proptest(strategy = "0u8..4")]
        secondary: u8,
    },
}

fn apply(t: &mut RankTree<u16, u8, u32>, m: &mut Model, op: Op) -> Result<(), TestCaseError> {
    match op {
        Op::Insert {
            primary,
            secondary,
            value,
        } => {
            let exists = t.exists(&Key::new(primary, secondary));
            prop_assert_eq!(exists, m.contains_key(&(primary, secondary)));
            if !exists {
                t.insert_entry(primary, secondary, value);
                m.insert((primary, secondary), value);
            }
        }
        Op::Remove { primary, secondary } => {
            let got = t.remove(&Key::new(primary, secondary)).map(|(_, v)| v);
            prop_assert_eq!(got, m.remove(&(primary, secondary)));
        }
        Op::RemovePrimary { primary } => {
            let first = m
                .range((primary, u8::MIN)..=(primary, u8::MAX))
                .next()
                .map(|(&k, _)| k);
            let got = t.remove(&Key::primary_only(primary));
            match first {
                Some(k) => {
                    let (key, value) = got.expect("tree lost an entry");
                    prop_assert_eq!(key, Key::new(k.0, k.1));
                    prop_assert_eq!(Some(value), m.remove(&k));
                }
                None => prop_assert!(got.is_none()),
            }
        }
        Op::Get { primary, secondary } => {
            let got = t.get(&Key::new(primary, secondary)).copied();
            prop_assert_eq!(got, m.get(&(primary, secondary)).copied());
        }
        Op::RangeCount { lo, hi } => {
            let got = t.range_count(&Key::primary_only(lo), &Key::primary_only(hi));
            let expected = if lo <= hi {
                m.range((lo, u8::MIN)..=(hi, u8::MAX)).count()
            } else {
                0
            };
            prop_assert_eq!(got, expected);
        }
        Op::Rank { primary, secondary } => {
            if let Some(leaf) = t.find(&Key::new(primary, secondary)) {
                let expected = m.range(..(primary, secondary)).count() + 1;
                prop_assert_eq!(t.rank(leaf), Ok(expected));
            }
        }
    }
    prop_assert_eq!(t.len(), m.len());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=1000)) {
        let mut t: RankTree<u16, u8, u32> = RankTree::new();
        let mut m = Model::new();

        for op in ops {
            apply(&mut t, &mut m, op)?;
        }

        validate_tree(&t);
        let got: Vec<((u16, u8), u32)> = t
            .iter()
            .filter_map(|(k, v)| Some(((*k.primary()?, *k.secondary()?), *v)))
            .collect();
        let expected: Vec<((u16, u8), u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_range_matches_scan(
        keys in prop::collection::btree_set(0u32..1000, 0..=300),
        lo in 0u32..1100,
        hi in 0u32..1100,
    ) {
        let mut t: RankTree<u32, u32, ()> = RankTree::new();
        for &k in &keys {
            t.insert_entry(k, 0, ());
        }
        validate_tree(&t);

        let (l, h) = (Key::primary_only(lo), Key::primary_only(hi));
        let expected: Vec<u32> = keys.iter().copied().filter(|k| lo <= *k && *k <= hi).collect();
        prop_assert_eq!(t.range_count(&l, &h), expected.len());
        let got: Vec<u32> = t.range(&l, &h).filter_map(|(k, _)| k.primary().copied()).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_search_is_idempotent(
        keys in prop::collection::btree_set(0u32..1000, 0..=200),
        target in 0u32..1100,
    ) {
        let mut t: RankTree<u32, u32, ()> = RankTree::new();
        for &k in &keys {
            t.insert_entry(k, k, ());
        }
        let key = Key::primary_only(target);
        let first = (t.search(&key), t.search_larger(&key), t.exists(&key));
        prop_assert_eq!((t.search(&key), t.search_larger(&key), t.exists(&key)), first);
        prop_assert_eq!(first.2, keys.contains(&target));
        validate_tree(&t);
    }

    #[test]
    fn prop_insert_delete_round_trip(keys in prop::collection::btree_set(0u32..10_000, 0..=400)) {
        let mut t: RankTree<u32, u32, u32> = RankTree::new();
        let leaves: Vec<NodeId> = keys.iter().map(|&k| t.insert_entry(k, 0, k)).collect();
        validate_tree(&t);

        for (leaf, &k) in leaves.into_iter().zip(&keys) {
            let (_, value) = t.delete(leaf).expect("inserted leaf must delete");
            prop_assert_eq!(value, k);
        }
        validate_tree(&t);
        prop_assert!(t.is_empty());
        prop_assert_eq!(t.height(), 2);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

const SMALL_SET: [(u8, char); 7] = [
    (1, 'a'),
    (1, 'b'),
    (2, 'a'),
    (3, 'a'),
    (3, 'c'),
    (4, 'z'),
    (5, 'a'),
];

#[test]
fn exhaustive_insert_order_small_set() {
    for_each_permutation(&SMALL_SET, |perm| {
        let mut t: RankTree<u8, char, usize> = RankTree::new();
        for (i, (p, s)) in perm.into_iter().enumerate() {
            t.insert_entry(p, s, i);
            validate_tree(&t);
        }

        let got: Vec<(u8, char)> = t
            .iter()
            .filter_map(|(k, _)| Some((*k.primary()?, *k.secondary()?)))
            .collect();
        assert_eq!(got, SMALL_SET);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let mut base: RankTree<u8, char, usize> = RankTree::new();
    for (i, &(p, s)) in SMALL_SET.iter().enumerate() {
        base.insert_entry(p, s, i);
    }

    for_each_permutation(&SMALL_SET, |perm| {
        let mut t = base.clone();
        let mut remaining = SMALL_SET.len();
        for (p, s) in perm {
            let leaf = t.find(&Key::new(p, s)).expect("entry must be present");
            t.delete(leaf).expect("linked leaf must delete");
            remaining -= 1;
            assert_eq!(t.len(), remaining);
            validate_tree(&t);
        }
        assert!(t.is_empty());
        assert_eq!(t.height(), 2);
    });
}

#[test]
fn exhaustive_range_windows_small_set() {
    let mut t: RankTree<u8, char, ()> = RankTree::new();
    for &(p, s) in &SMALL_SET {
        t.insert_entry(p, s, ());
    }

    for lo in 0..=6u8 {
        for hi in 0..=6u8 {
            let expected = SMALL_SET
                .iter()
                .filter(|(p, _)| lo <= *p && *p <= hi)
                .count();
            let (l, h) = (Key::primary_only(lo), Key::primary_only(hi));
            assert_eq!(t.range_count(&l, &h), expected, "[{lo}, {hi}]");
            assert_eq!(t.range(&l, &h).len(), expected, "[{lo}, {hi}]");
        }
    }
}
