#![no_main]

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use artree::{AdaptiveRadixTree, Filter, IterError, Order};

#[derive(Arbitrary, Debug)]
enum Step {
    Next,
    HasNext,
    Insert { key: Vec<u8> },
    Delete { key: Vec<u8> },
    Update { key: Vec<u8> },
}

#[derive(Arbitrary, Debug)]
struct Input {
    keys: Vec<Vec<u8>>,
    reverse: bool,
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    let mut tree = AdaptiveRadixTree::<u32>::new();
    let mut model = BTreeSet::new();
    for key in &input.keys {
        tree.insert(key, 0);
        model.insert(key.clone());
    }

    let order = if input.reverse { Order::Reverse } else { Order::Forward };
    let mut expected: Vec<Vec<u8>> = model.iter().cloned().collect();
    if input.reverse {
        expected.reverse();
    }
    let mut expected = expected.into_iter();

    let mut it = tree.iterator(Filter::Leaves, order);
    let mut modified = false;
    for step in &input.steps {
        match step {
            Step::Next => match it.next(&tree) {
                Ok(node) => {
                    assert!(!modified);
                    assert_eq!(node.key().map(<[u8]>::to_vec), expected.next());
                }
                Err(IterError::ConcurrentModification { .. }) => assert!(modified),
                Err(IterError::Exhausted) => {}
                Err(IterError::ForeignTree) => unreachable!(),
            },
            Step::HasNext => {
                let _ = it.has_next(&tree);
            }
            Step::Insert { key } => {
                if tree.insert(key, 1).is_none() {
                    modified = true;
                }
            }
            Step::Delete { key } => {
                if tree.remove(key).is_some() {
                    modified = true;
                }
            }
            Step::Update { key } => {
                if let Some(v) = tree.get_mut(key) {
                    *v += 1;
                }
            }
        }
    }
});
