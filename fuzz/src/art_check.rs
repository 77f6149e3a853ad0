#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use artree::AdaptiveRadixTree;

#[derive(Arbitrary, Debug)]
enum MapMethod {
    Get { key: Vec<u8> },
    Insert { key: Vec<u8>, val: usize },
    Update { key: Vec<u8>, val: usize },
    Delete { key: Vec<u8> },
    Prefix { prefix: Vec<u8> },
}

fuzz_target!(|methods: Vec<MapMethod>| {
    let mut art = AdaptiveRadixTree::<usize>::new();
    let mut bt_map = BTreeMap::<Vec<u8>, usize>::new();

    for m in &methods {
        match m {
            MapMethod::Get { key } => {
                assert_eq!(art.get(key), bt_map.get(key));
            }
            MapMethod::Insert { key, val } => {
                let btree_insert = bt_map.insert(key.clone(), *val);
                let a_insert = art.insert(key, *val);
                assert_eq!(a_insert, btree_insert, "insert {key:?}");
            }
            MapMethod::Update { key, val } => {
                let version = art.version();
                let old_bt = bt_map.get_mut(key);
                let old_art = art.get_mut(key);
                assert_eq!(old_art, old_bt);
                if let (Some(old_bt), Some(old_art)) = (old_bt, old_art) {
                    *old_bt = *val;
                    *old_art = *val;
                }
                assert_eq!(art.get(key), bt_map.get(key));
                assert_eq!(art.version(), version);
            }
            MapMethod::Delete { key } => {
                let btr = bt_map.remove(key);
                let artr = art.remove(key);
                assert_eq!(artr, btr, "delete {key:?}");
            }
            MapMethod::Prefix { prefix } => {
                let mut found = vec![];
                art.for_each_prefix(prefix, |node| {
                    found.extend(node.key().map(<[u8]>::to_vec));
                    true
                });
                let expected: Vec<Vec<u8>> = bt_map
                    .keys()
                    .filter(|k| k.starts_with(prefix))
                    .cloned()
                    .collect();
                assert_eq!(found, expected, "prefix {prefix:?}");
            }
        }
        assert_eq!(art.len(), bt_map.len());
    }

    for (k, expected_value) in bt_map.iter() {
        assert_eq!(art.get(k), Some(expected_value), "key {k:?}");
    }
    let keys: Vec<&[u8]> = art.keys().collect();
    assert!(keys.iter().copied().eq(bt_map.keys().map(Vec::as_slice)));
});
