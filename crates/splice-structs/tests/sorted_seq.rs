use proptest::prelude::*;
use splice_core::{SpliceError, Untrusted};
use splice_structs::{ContainerConfig, SortedSeq};
use splice_synth::SynthConfig;

fn seq(values: &[i64]) -> SortedSeq<i64> {
    let mut seq = SortedSeq::new();
    for &value in values {
        seq.insert(Untrusted::new(value));
    }
    seq
}

fn small_runs() -> SortedSeq<i64> {
    let config = ContainerConfig {
        segment_load: 2,
        ..ContainerConfig::default()
    };
    SortedSeq::with_config(&config, SynthConfig::default()).unwrap()
}

#[test]
fn first_element_drops_below_its_successor() {
    let mut seq = seq(&[14, 5, 9]);
    assert!(seq.synthesize(0).unwrap());
    let first = seq.get(0).unwrap();
    assert_eq!(*first.raw(), 8);
    assert!(first.is_synthesized());
    assert_eq!(seq.to_vec(), vec![8, 9, 14]);
}

#[test]
fn last_element_rises_above_its_predecessor() {
    let mut seq = seq(&[5, 9, 14]);
    assert!(seq.synthesize(2).unwrap());
    assert_eq!(seq.to_vec(), vec![5, 9, 10]);
}

#[test]
fn middle_element_stays_between_neighbours() {
    let mut seq = seq(&[5, 9, 14]);
    assert!(seq.synthesize(1).unwrap());
    let middle = *seq.get(1).unwrap().raw();
    assert!(5 < middle && middle < 14);
}

#[test]
fn evenly_spaced_element_changes_value() {
    let mut seq = seq(&[20, 30, 40]);
    assert!(seq.synthesize(1).unwrap());
    let middle = *seq.get(1).unwrap().raw();
    assert_ne!(middle, 30);
    assert!(20 < middle && middle < 40);
}

#[test]
fn equal_or_adjacent_neighbours_report_failure() {
    let mut dup = seq(&[3, 5, 5, 5]);
    assert!(!dup.synthesize(2).unwrap());
    assert!(!dup.get(2).unwrap().is_synthesized());

    let mut tight = seq(&[1, 2, 2, 3]);
    assert!(!tight.synthesize(1).unwrap());
    assert_eq!(tight.to_vec(), vec![1, 2, 2, 3]);
}

#[test]
fn out_of_range_index_is_an_error() {
    let mut seq = seq(&[5, 9, 14]);
    let err = seq.synthesize(3).unwrap_err();
    assert!(matches!(err, SpliceError::Container(info) if info.code == "index-out-of-range"));
    assert!(seq.replace_at(7, Untrusted::new(1)).is_err());
}

#[test]
fn single_element_is_reflagged() {
    let mut seq = seq(&[7]);
    assert!(seq.synthesize(0).unwrap());
    assert_eq!(seq.to_vec(), vec![7]);
    assert!(seq.get(0).unwrap().is_synthesized());
}

#[test]
fn string_elements_keep_their_order() {
    let mut seq = SortedSeq::<String>::new();
    for name in ["Luke", "Adam", "Jack"] {
        seq.insert(Untrusted::new(name.to_string()));
    }
    assert!(seq.synthesize(1).unwrap());
    let names = seq.to_vec();
    assert!(names[0] < names[1] && names[1] < names[2], "{names:?}");
    assert!(!seq.contains(&"Jack".to_string()));
}

#[test]
fn runs_split_and_lookups_cross_them() {
    let mut seq = small_runs();
    for value in [9, 3, 7, 1, 5, 3, 8, 2, 6, 4, 0] {
        seq.insert(Untrusted::new(value));
    }
    assert_eq!(seq.to_vec(), vec![0, 1, 2, 3, 3, 4, 5, 6, 7, 8, 9]);
    assert_eq!(seq.index_of(&3), Some(3));
    assert_eq!(seq.index_of(&8), Some(9));
    assert!(seq.remove(&3));
    assert!(seq.contains(&3));
    assert!(seq.remove(&3));
    assert!(!seq.contains(&3));
    assert!(!seq.remove(&42));
    assert_eq!(seq.len(), 9);
    for v in [0, 1, 2, 4, 5, 6, 7, 8, 9] {
        assert!(seq.remove(&v));
    }
    assert!(seq.is_empty());
}

#[test]
fn replacing_a_run_tail_refreshes_lookups() {
    let mut seq = small_runs();
    for value in 1..=10 {
        seq.insert(Untrusted::new(value));
    }
    seq.replace_at(9, Untrusted::new(100)).unwrap();
    assert!(seq.contains(&100));
    seq.insert(Untrusted::new(50));
    assert_eq!(seq.index_of(&50), Some(9));
    assert_eq!(seq.index_of(&100), Some(10));
}

#[test]
fn zero_segment_load_is_rejected() {
    let config = ContainerConfig {
        segment_load: 0,
        ..ContainerConfig::default()
    };
    let err = SortedSeq::<i64>::with_config(&config, SynthConfig::default()).unwrap_err();
    assert_eq!(err.info().code, "invalid-segment-load");
}

proptest! {
    #[test]
    fn synthesis_keeps_the_sequence_sorted(
        values in proptest::collection::vec(-1000i64..1000, 1..60),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut seq = small_runs();
        for &v in &values {
            seq.insert(Untrusted::new(v));
        }
        let index = pick.index(values.len());
        let before = seq.to_vec();
        let changed = seq.synthesize(index).unwrap();
        let after = seq.to_vec();
        prop_assert!(after.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(after.len(), before.len());
        let lower = index.checked_sub(1).map(|i| before[i]);
        let upper = before.get(index + 1).copied();
        let room = match (lower, upper) {
            (Some(lower), Some(upper)) => upper - lower > 2,
            (None, None) => false,
            _ => true,
        };
        if room {
            prop_assert_ne!(after[index], before[index]);
        }
        if changed {
            prop_assert!(seq.get(index).unwrap().is_synthesized());
        } else {
            prop_assert_eq!(after, before);
        }
    }
}
