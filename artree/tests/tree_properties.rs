//! Property tests checking the tree against `BTreeMap` as a model.

use std::collections::{BTreeMap, BTreeSet};

use artree::{AdaptiveRadixTree, Filter, IterError, Order, TreeStatsTrait};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u32),
    Remove(Vec<u8>),
}

/// Keys over a small alphabet, so they share prefixes and zero children often.
fn arb_key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![Just(0u8), Just(1u8), Just(b'a'), Just(255u8)], 0..8)
}

/// Keys with long shared runs, to push prefixes past what nodes store inline.
fn arb_long_key() -> impl Strategy<Value = Vec<u8>> {
    (0..3usize, "[ab]{0,4}", 0..30usize).prop_map(|(stem, tail, cut)| {
        let stems = [
            "shared/prefix/much/longer/than/ten/bytes/",
            "shared/prefix/much/longer/",
            "shared/",
        ];
        let mut key = stems[stem].as_bytes().to_vec();
        key.truncate(key.len().saturating_sub(cut % 8));
        key.extend_from_slice(tail.as_bytes());
        key
    })
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let key = prop_oneof![arb_key(), arb_long_key()].boxed();
    prop::collection::vec(
        prop_oneof![
            3 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
            1 => key.prop_map(Op::Remove),
        ],
        0..200,
    )
}

fn apply(ops: &[Op]) -> (AdaptiveRadixTree<u32>, BTreeMap<Vec<u8>, u32>) {
    let mut tree = AdaptiveRadixTree::new();
    let mut model = BTreeMap::new();
    for op in ops {
        match op {
            Op::Insert(k, v) => assert_eq!(tree.insert(k, *v), model.insert(k.clone(), *v)),
            Op::Remove(k) => assert_eq!(tree.remove(k), model.remove(k)),
        }
    }
    (tree, model)
}

proptest! {
    /// Property: every operation returns what the model returns, and the final contents agree
    #[test]
    fn prop_matches_btreemap(ops in arb_ops()) {
        let (tree, model) = apply(&ops);
        prop_assert_eq!(tree.len(), model.len());
        prop_assert_eq!(tree.is_empty(), model.is_empty());
        for (k, v) in &model {
            prop_assert_eq!(tree.get(k), Some(v));
        }
        for op in &ops {
            if let Op::Remove(k) = op {
                prop_assert_eq!(tree.get(k), model.get(k));
            }
        }
        prop_assert_eq!(tree.get_tree_stats().num_leaves, model.len());
    }

    /// Property: forward iteration is sorted key order and reverse is its mirror
    #[test]
    fn prop_iteration_is_ordered(ops in arb_ops()) {
        let (tree, model) = apply(&ops);
        let forward: Vec<(Vec<u8>, u32)> = tree.iter().map(|(k, v)| (k.to_vec(), *v)).collect();
        let expected: Vec<(Vec<u8>, u32)> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(&forward, &expected);

        let mut reverse: Vec<Vec<u8>> = tree
            .nodes(Filter::Leaves, Order::Reverse)
            .filter_map(|n| n.key().map(<[u8]>::to_vec))
            .collect();
        reverse.reverse();
        prop_assert_eq!(reverse, model.keys().cloned().collect::<Vec<_>>());

        prop_assert_eq!(
            tree.minimum().map(|(k, v)| (k.to_vec(), *v)),
            model.first_key_value().map(|(k, v)| (k.clone(), *v))
        );
        prop_assert_eq!(
            tree.maximum().map(|(k, v)| (k.to_vec(), *v)),
            model.last_key_value().map(|(k, v)| (k.clone(), *v))
        );
    }

    /// Property: a prefix query reports exactly the keys starting with the prefix, in order
    #[test]
    fn prop_prefix_query_matches_filter(
        ops in arb_ops(),
        prefix in prop_oneof![arb_key(), arb_long_key()],
    ) {
        let (tree, model) = apply(&ops);
        let mut found = vec![];
        tree.for_each_prefix(&prefix, |node| {
            found.push(node.key().map(<[u8]>::to_vec).unwrap_or_default());
            true
        });
        let expected: Vec<Vec<u8>> = model
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect();
        prop_assert_eq!(found, expected);
    }

    /// Property: every inner node is at least as full as its kind requires
    #[test]
    fn prop_inner_nodes_respect_floors(ops in arb_ops()) {
        let (tree, _) = apply(&ops);
        for node in tree.nodes(Filter::Nodes, Order::Forward) {
            let occupancy = node.num_children() + usize::from(node.has_zero_child());
            prop_assert!(occupancy >= node.kind().shrink_floor(), "{:?}", node);
            prop_assert!(node.num_children() <= node.kind().capacity());
        }
    }

    /// Property: the detached iterator visits what the borrowed one does, and asking whether
    /// there is more never moves it
    #[test]
    fn prop_detached_iterator_agrees(ops in arb_ops(), reverse in any::<bool>()) {
        let (tree, _) = apply(&ops);
        let order = if reverse { Order::Reverse } else { Order::Forward };
        let expected: Vec<_> = tree
            .nodes(Filter::All, order)
            .map(|n| (n.kind(), n.key()))
            .collect();

        let mut it = tree.iterator(Filter::All, order);
        let mut got = vec![];
        while it.has_next(&tree) && it.has_next(&tree) {
            let node = it.next(&tree);
            prop_assert!(node.is_ok());
            if let Ok(node) = node {
                got.push((node.kind(), node.key()));
            }
        }
        prop_assert_eq!(got, expected);
        prop_assert_eq!(it.next(&tree).err(), Some(IterError::Exhausted));
    }

    /// Property: any structural change after creation invalidates a detached iterator
    #[test]
    fn prop_structural_change_invalidates(ops in arb_ops(), key in arb_key(), steps in 0..5usize) {
        let (mut tree, _) = apply(&ops);
        let mut it = tree.iterator(Filter::Leaves, Order::Forward);
        for _ in 0..steps {
            let _ = it.next(&tree);
        }
        let version = tree.version();
        let changed = if tree.get(&key).is_some() {
            tree.remove(&key).is_some()
        } else {
            tree.insert(&key, 0).is_none()
        };
        prop_assert!(changed);
        prop_assert!(tree.version() != version);
        let err = it.next(&tree).err();
        let invalidated = matches!(err, Some(IterError::ConcurrentModification { .. }));
        // An iterator that already ran dry reports that instead.
        prop_assert!(invalidated || err == Some(IterError::Exhausted));
        prop_assert!(it.has_next(&tree) == invalidated);
    }
}

#[test]
fn keys_sharing_long_runs() {
    let keys: BTreeSet<String> = (0..200)
        .map(|i| format!("tenant/0000000042/objects/{:04}/{}", i % 17, i))
        .collect();
    let mut tree = AdaptiveRadixTree::new();
    for (i, k) in keys.iter().enumerate() {
        tree.insert(k, i);
    }
    let ordered: Vec<String> = tree
        .keys()
        .map(|k| String::from_utf8_lossy(k).into_owned())
        .collect();
    assert_eq!(ordered, keys.iter().cloned().collect::<Vec<_>>());

    let mut in_bucket = 0;
    tree.for_each_prefix("tenant/0000000042/objects/0003/", |_| {
        in_bucket += 1;
        true
    });
    assert_eq!(in_bucket, keys.iter().filter(|k| k.contains("/0003/")).count());

    for k in &keys {
        assert!(tree.remove(k).is_some());
    }
    assert!(tree.is_empty());
}
