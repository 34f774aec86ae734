use proptest::prelude::*;
use splice_core::{SpliceError, Untrusted};
use splice_structs::MinHeap;
use splice_synth::{SynthConfig, UnboundedPolicy};

fn heap(values: &[i64]) -> MinHeap<i64> {
    let mut heap = MinHeap::new();
    for &value in values {
        heap.push(Untrusted::new(value));
    }
    heap
}

fn raw(heap: &MinHeap<i64>) -> Vec<i64> {
    heap.iter().map(|item| *item.raw()).collect()
}

fn is_heap(items: &[i64]) -> bool {
    (1..items.len()).all(|i| items[(i - 1) / 2] <= items[i])
}

#[test]
fn pops_come_out_sorted() {
    let mut heap = heap(&[5, 3, 8, 1, 9, 2, 7]);
    assert_eq!(heap.peek().map(|top| *top.raw()), Some(1));
    let mut drained = Vec::new();
    while let Some(item) = heap.pop() {
        drained.push(item.into_raw());
    }
    assert_eq!(drained, vec![1, 2, 3, 5, 7, 8, 9]);
    assert!(heap.is_empty());
}

#[test]
fn root_drops_below_its_children() {
    let mut heap = heap(&[10, 20, 30]);
    assert!(heap.synthesize(0).unwrap());
    assert_eq!(raw(&heap), vec![19, 20, 30]);
    assert!(heap.get(0).unwrap().is_synthesized());
}

#[test]
fn leaf_rises_above_its_parent() {
    let mut heap = heap(&[10, 20, 30]);
    assert!(heap.synthesize(2).unwrap());
    assert_eq!(raw(&heap), vec![10, 20, 11]);
}

#[test]
fn inner_node_sits_between_parent_and_smaller_child() {
    let mut heap = heap(&[1, 50, 60, 90, 70]);
    assert_eq!(raw(&heap), vec![1, 50, 60, 90, 70]);
    assert!(heap.synthesize(1).unwrap());
    let value = *heap.get(1).unwrap().raw();
    assert!(1 < value && value < 70, "got {value}");
    assert!(is_heap(&raw(&heap)));
}

#[test]
fn midpoint_between_parent_and_child_is_avoided() {
    let mut heap = heap(&[3, 5, 9, 7]);
    assert_eq!(raw(&heap), vec![3, 5, 9, 7]);
    assert!(heap.synthesize(1).unwrap());
    assert_eq!(raw(&heap), vec![3, 6, 9, 7]);
}

#[test]
fn no_room_leaves_the_heap_untouched() {
    let mut heap = heap(&[1, 2, 3, 2]);
    assert!(!heap.synthesize(1).unwrap());
    assert_eq!(raw(&heap), vec![1, 2, 3, 2]);
    assert!(!heap.get(1).unwrap().is_synthesized());
}

#[test]
fn lone_element_follows_the_policy() {
    let mut heap = heap(&[4]);
    assert!(heap.synthesize(0).unwrap());
    assert!(heap.peek().unwrap().is_synthesized());

    let mut strict = MinHeap::with_synth(SynthConfig {
        unbounded: UnboundedPolicy::Reject,
        ..SynthConfig::default()
    });
    strict.push(Untrusted::new(4i64));
    assert!(!strict.synthesize(0).unwrap());
}

#[test]
fn out_of_range_index_is_an_error() {
    let mut heap = heap(&[1, 2]);
    let err = heap.synthesize(2).unwrap_err();
    assert!(matches!(err, SpliceError::Container(info) if info.code == "index-out-of-range"));
}

#[test]
fn string_heap_keeps_its_order() {
    let mut heap = MinHeap::<String>::new();
    for name in ["Jack", "Adam", "Luke", "Blair"] {
        heap.push(Untrusted::new(name.to_string()));
    }
    assert!(heap.synthesize(0).unwrap());
    let items: Vec<&String> = heap.iter().map(Untrusted::raw).collect();
    assert!((1..items.len()).all(|i| items[(i - 1) / 2] <= items[i]), "{items:?}");
}

proptest! {
    #[test]
    fn synthesis_preserves_the_heap_property(
        values in proptest::collection::vec(-10_000i64..10_000, 1..64),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut heap = heap(&values);
        prop_assert!(is_heap(&raw(&heap)));
        let index = pick.index(values.len());
        let before = raw(&heap);
        let changed = heap.synthesize(index).unwrap();
        let after = raw(&heap);
        prop_assert!(is_heap(&after));
        if !changed {
            prop_assert_eq!(after, before);
        }
    }
}
