// Public-surface property tests for Dict.

use proptest::prelude::*;
use std::collections::HashMap;
use typed_dict::Dict;

fn build(pairs: &[(u64, i64)]) -> Dict<u64, i64> {
    let d = Dict::new();
    for &(k, v) in pairs {
        d.insert(k, v).unwrap();
    }
    d
}

proptest! {
    // For any insertion sequence (duplicates included), get() agrees with
    // a HashMap model: last write per key wins, len counts distinct keys.
    #[test]
    fn prop_get_roundtrip(pairs in proptest::collection::vec((0u64..32, any::<i64>()), 0..100)) {
        let d = build(&pairs);
        let model: HashMap<u64, i64> = pairs.iter().copied().collect();
        prop_assert_eq!(d.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(d.get(*k), Some(*v));
        }
        prop_assert_eq!(d.get(1000u64), None);
    }

    // copy() is equal to the original and structurally independent.
    #[test]
    fn prop_copy_equal_and_independent(pairs in proptest::collection::vec((0u64..32, any::<i64>()), 0..60)) {
        let d = build(&pairs);
        let c = d.copy();
        prop_assert!(c == d);

        let before = d.len();
        c.insert(1000u64, 0i64).unwrap();
        c.clear();
        prop_assert_eq!(d.len(), before);
        prop_assert!(d.get(1000u64).is_none());
    }

    // Equality is insertion-order independent: the same final key set
    // built forwards and backwards compares equal, and as-pair-sets the
    // two dicts are identical.
    #[test]
    fn prop_equality_order_independent(pairs in proptest::collection::vec((0u64..32, any::<i64>()), 0..60)) {
        let model: HashMap<u64, i64> = pairs.iter().copied().collect();
        let forward = build(&pairs);
        let backward = {
            let d = Dict::new();
            for (k, v) in model.iter() {
                d.insert(*k, *v).unwrap();
            }
            d
        };
        prop_assert!(forward == backward);
        prop_assert!(backward == forward);

        let a: HashMap<u64, i64> = forward.items().into_iter().collect();
        let b: HashMap<u64, i64> = backward.items().into_iter().collect();
        prop_assert_eq!(a, b);
    }

    // Draining via popitem yields exactly the dict's contents, in
    // reverse insertion order of live entries.
    #[test]
    fn prop_popitem_drains_reverse_order(pairs in proptest::collection::vec((0u64..32, any::<i64>()), 0..60)) {
        let d = build(&pairs);
        let mut expected: Vec<(u64, i64)> = d.items().into_iter().collect();

        while let Ok(pair) = d.popitem() {
            prop_assert_eq!(Some(pair), expected.pop());
        }
        prop_assert!(expected.is_empty());
        prop_assert!(d.is_empty());
    }
}
