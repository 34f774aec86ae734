use proptest::prelude::*;
use splice_core::{SpliceError, Untrusted};
use splice_structs::{ByKey, ByValue, NodeId, SearchTree};
use splice_synth::{SynthConfig, UnboundedPolicy};

fn value_tree(values: &[i64]) -> SearchTree<ByValue<i64>> {
    let mut tree: SearchTree<ByValue<i64>> = SearchTree::new();
    for &value in values {
        tree.insert(Untrusted::new(value));
    }
    tree
}

fn keys(tree: &SearchTree<ByValue<i64>>) -> Vec<i64> {
    tree.in_order()
        .into_iter()
        .map(|id| *tree.key(id).unwrap().raw())
        .collect()
}

#[test]
fn duplicate_insert_is_rejected() {
    let mut tree = value_tree(&[50, 30, 70]);
    assert!(!tree.insert(Untrusted::new(30)));
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.render(), "30 50 70");
}

#[test]
fn delete_handles_every_shape() {
    let mut tree = value_tree(&[50, 30, 70, 20, 40, 60, 80, 65]);
    assert!(tree.delete(&20));
    assert!(tree.delete(&60));
    assert!(tree.delete(&50));
    assert!(!tree.delete(&50));
    assert_eq!(keys(&tree), vec![30, 40, 65, 70, 80]);
    assert_eq!(tree.len(), 5);
    assert!(tree.find(&65).is_some());
    assert!(tree.find(&50).is_none());
}

#[test]
fn freed_slots_are_reused() {
    let mut tree = value_tree(&[10, 5]);
    let old = tree.find(&5).unwrap();
    tree.delete(&5);
    tree.insert(Untrusted::new(7));
    assert_eq!(tree.find(&7), Some(old));
}

#[test]
fn leaf_without_left_subtree_uses_its_successor() {
    let mut tree = value_tree(&[50, 30, 70, 20, 40, 60, 80]);
    let leaf = tree.find(&20).unwrap();
    assert!(tree.synthesize(leaf).unwrap());
    let key = tree.key(leaf).unwrap();
    assert_eq!(*key.raw(), 29);
    assert!(key.is_synthesized());
    assert_eq!(keys(&tree), vec![29, 30, 40, 50, 60, 70, 80]);
}

#[test]
fn rightmost_node_moves_above_its_predecessor() {
    let mut tree = value_tree(&[50, 30, 70, 80]);
    let id = tree.find(&80).unwrap();
    assert!(tree.synthesize(id).unwrap());
    assert_eq!(*tree.key(id).unwrap().raw(), 71);
}

#[test]
fn inner_leaf_respects_ancestor_bounds() {
    let mut tree = value_tree(&[50, 30, 70, 40]);
    let id = tree.find(&40).unwrap();
    assert!(tree.synthesize(id).unwrap());
    let value = *tree.key(id).unwrap().raw();
    assert!(30 < value && value < 50, "got {value}");
}

#[test]
fn midpoint_key_is_replaced_by_a_different_one() {
    let mut tree = value_tree(&[5, 3, 7]);
    let id = tree.find(&5).unwrap();
    assert!(tree.synthesize(id).unwrap());
    let value = *tree.key(id).unwrap().raw();
    assert_ne!(value, 5);
    assert!(3 < value && value < 7, "got {value}");
    assert_eq!(keys(&tree), vec![3, value, 7]);
}

#[test]
fn tight_neighbours_leave_a_single_fit() {
    let mut tree = value_tree(&[5, 4, 6]);
    let id = tree.find(&5).unwrap();
    assert!(tree.synthesize(id).unwrap());
    let key = tree.key(id).unwrap();
    assert_eq!(*key.raw(), 5);
    assert!(key.is_synthesized());
    assert!(!tree.key(tree.find(&4).unwrap()).unwrap().is_synthesized());
}

#[test]
fn single_node_follows_the_unbounded_policy() {
    let mut tree = value_tree(&[42]);
    let root = tree.root().unwrap();
    assert!(tree.synthesize(root).unwrap());
    assert_eq!(*tree.key(root).unwrap().raw(), 42);
    assert!(tree.key(root).unwrap().is_synthesized());

    let mut strict = SearchTree::<ByValue<i64>>::with_synth(SynthConfig {
        unbounded: UnboundedPolicy::Reject,
        ..SynthConfig::default()
    });
    strict.insert(Untrusted::new(42));
    let root = strict.root().unwrap();
    assert!(!strict.synthesize(root).unwrap());
    assert!(!strict.key(root).unwrap().is_synthesized());
}

#[test]
fn keyed_tree_drops_the_payload_of_a_synthesized_key() {
    let mut tree = SearchTree::<ByKey<String, i64>>::new();
    tree.insert(Untrusted::new("Jack".to_string()), 20);
    tree.insert(Untrusted::new("Adam".to_string()), 30);
    tree.insert(Untrusted::new("Luke".to_string()), 40);
    assert!(!tree.insert(Untrusted::new("Adam".to_string()), 99));
    assert_eq!(tree.get(&"Adam".to_string()), Some(&30));

    let id = tree.find(&"Adam".to_string()).unwrap();
    assert!(tree.synthesize(id).unwrap());
    assert_eq!(tree.key(id).unwrap().raw(), "I");
    assert_eq!(tree.value(id).unwrap(), None);
    assert_eq!(tree.render(), "I(-) Jack(20) Luke(40)");
    assert_eq!(tree.get(&"Jack".to_string()), Some(&20));
}

#[test]
fn unknown_node_is_an_error() {
    let mut tree = value_tree(&[1]);
    let err = tree.synthesize(NodeId::from_raw(9)).unwrap_err();
    assert!(matches!(err, SpliceError::Container(info) if info.code == "index-out-of-range"));

    let id = tree.find(&1).unwrap();
    tree.delete(&1);
    assert!(tree.key(id).is_err());
}

proptest! {
    #[test]
    fn synthesis_keeps_in_order_strictly_sorted(
        values in proptest::collection::btree_set(-500i64..500, 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let values: Vec<i64> = values.into_iter().collect();
        // Scrambled insertion order so the shape is not a list.
        let mut order = values.clone();
        order.sort_by_key(|v| v.wrapping_mul(7919).rem_euclid(101));
        let mut tree = value_tree(&order);
        let target = values[pick.index(values.len())];
        let id = tree.find(&target).unwrap();
        let before = keys(&tree);
        let changed = tree.synthesize(id).unwrap();

        let after = keys(&tree);
        prop_assert!(after.windows(2).all(|w| w[0] < w[1]));
        let flagged: Vec<NodeId> = tree
            .in_order()
            .into_iter()
            .filter(|&n| tree.key(n).unwrap().is_synthesized())
            .collect();
        if changed {
            prop_assert_eq!(flagged, vec![id]);
        } else {
            prop_assert!(flagged.is_empty());
            prop_assert_eq!(after, before);
        }
    }
}
