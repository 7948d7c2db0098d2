#![cfg(test)]

// Property tests for Dict kept inside the crate so they can assert
// against engine-level details (insertion order, popitem victim choice)
// without feature gates.

use crate::Dict;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i64),
    Get(usize),
    Pop(usize),
    PopOr(usize, i64),
    Popitem,
    SetDefault(usize, i64),
    Contains(usize),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = Vec<OpI>> {
    (1usize..=6).prop_flat_map(|pool| {
        let idx = 0..pool;
        let op = prop_oneof![
            4 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Pop),
            1 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::PopOr(i, v)),
            1 => Just(OpI::Popitem),
            1 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::SetDefault(i, v)),
            2 => idx.clone().prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80)
    })
}

// Property: state-machine equivalence against std::collections::HashMap
// plus an insertion-order list. Invariants exercised across random
// operation sequences:
// - get/contains/len parity with the model after every op.
// - Replacement keeps a key at its original position; a popped and
//   reinserted key moves to the back.
// - popitem removes exactly the most recently inserted live entry.
// - items() yields live entries in insertion order.
// - clear drives the dict to empty and popitem then reports KeyNotFound.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_scenario()) {
        let sut: Dict<u64, i64> = Dict::new();
        let mut model: HashMap<u64, i64> = HashMap::new();
        let mut order: Vec<u64> = Vec::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = i as u64;
                    sut.insert(k, v).unwrap();
                    if model.insert(k, v).is_none() {
                        order.push(k);
                    }
                }
                OpI::Get(i) => {
                    let k = i as u64;
                    prop_assert_eq!(sut.get(k), model.get(&k).copied());
                }
                OpI::Pop(i) => {
                    let k = i as u64;
                    match model.remove(&k) {
                        Some(v) => {
                            prop_assert_eq!(sut.pop(k), Ok(v));
                            order.retain(|&o| o != k);
                        }
                        None => {
                            prop_assert_eq!(sut.pop(k), Err(crate::DictError::KeyNotFound));
                        }
                    }
                }
                OpI::PopOr(i, d) => {
                    let k = i as u64;
                    match model.remove(&k) {
                        Some(v) => {
                            prop_assert_eq!(sut.pop_or(k, d), v);
                            order.retain(|&o| o != k);
                        }
                        None => {
                            prop_assert_eq!(sut.pop_or(k, d), d);
                        }
                    }
                }
                OpI::Popitem => match sut.popitem() {
                    Ok((k, v)) => {
                        // Victim is the live entry nearest the dense tail,
                        // i.e. the most recently inserted live key.
                        prop_assert_eq!(Some(&k), order.last());
                        prop_assert_eq!(model.remove(&k), Some(v));
                        order.pop();
                    }
                    Err(crate::DictError::KeyNotFound) => {
                        prop_assert!(model.is_empty());
                    }
                    Err(e) => prop_assert!(false, "unexpected popitem error {:?}", e),
                },
                OpI::SetDefault(i, d) => {
                    let k = i as u64;
                    sut.setdefault(k, d).unwrap();
                    if !model.contains_key(&k) {
                        model.insert(k, d);
                        order.push(k);
                    }
                }
                OpI::Contains(i) => {
                    let k = i as u64;
                    prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
                }
                OpI::Iterate => {
                    let got: Vec<(u64, i64)> = sut.items().into_iter().collect();
                    let want: Vec<(u64, i64)> = order.iter().map(|k| (*k, model[k])).collect();
                    prop_assert_eq!(got, want);
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                    order.clear();
                }
            }
            prop_assert_eq!(sut.len(), model.len());
        }

        // Drain and verify the remaining contents in one pass.
        while let Ok((k, v)) = sut.popitem() {
            prop_assert_eq!(Some(&k), order.last());
            prop_assert_eq!(model.remove(&k), Some(v));
            order.pop();
        }
        prop_assert!(model.is_empty());
        prop_assert!(sut.is_empty());
    }
}
