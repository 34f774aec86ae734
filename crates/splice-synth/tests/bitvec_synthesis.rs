use splice_core::CustomHash;
use splice_synth::{Domain, SymbolicHash, Synthesizer, Value};

fn bits(v: u64) -> Value {
    Value::Bits(v)
}

fn bitvec(width: u32) -> Synthesizer {
    Synthesizer::new(Domain::bitvec(width).unwrap())
}

fn solved(synth: &Synthesizer) -> u64 {
    match synth.solve().unwrap() {
        Some(Value::Bits(v)) => v,
        other => panic!("expected a bit-vector, got {other:?}"),
    }
}

#[test]
fn relations_over_unsigned_words() {
    let mut synth = bitvec(32);
    synth.greater_than(&bits(43)).unwrap();
    assert_eq!(solved(&synth), 44);

    synth.reset();
    synth.less_than(&bits(25)).unwrap();
    assert_eq!(solved(&synth), 24);

    synth.reset();
    let value = synth
        .bounded_synthesis(Some(&bits(40)), Some(&bits(25)))
        .unwrap();
    assert_eq!(value, Some(bits(32)));
}

#[test]
fn width_limits_the_domain() {
    let mut synth = bitvec(8);
    synth.greater_than(&bits(255)).unwrap();
    assert_eq!(synth.solve().unwrap(), None);

    let err = synth.less_than(&bits(256)).unwrap_err();
    assert_eq!(err.info().code, "domain-mismatch");

    let err = Domain::bitvec(65).unwrap_err();
    assert_eq!(err.info().code, "invalid-bitvec-width");
}

#[test]
fn masked_shift_preimage() {
    let n = 2;
    let keep = (1u64 << (32 - n)) - 1;
    let target = 0x3E_345C;
    let mut synth = bitvec(32);
    synth
        .equals_under(|s| (s.scalar() >> n) & keep, i128::from(target))
        .unwrap();
    let v = solved(&synth);
    assert_eq!((v >> n) & keep, target);
}

#[test]
fn masked_shift_preimage_inside_bounds() {
    let target = 0x3E_345Cu64;
    let mut synth = bitvec(32);
    synth
        .equals_under(|s| (s.scalar() >> 2) & 0x3FFF_FFFF, i128::from(target))
        .unwrap()
        .greater_than(&bits(target << 2))
        .unwrap();
    let v = solved(&synth);
    assert!(v > target << 2);
    assert_eq!((v >> 2) & 0x3FFF_FFFF, target);
}

#[test]
fn salted_hash_preimage_is_a_distinct_key() {
    let original = 0xDEAD_BEEFu32;
    let mut synth = bitvec(32);
    synth
        .equals_under(u32::hash_term, i128::from(original.custom_hash()))
        .unwrap()
        .not_equal(&bits(u64::from(original)))
        .unwrap();
    let v = u32::try_from(solved(&synth)).unwrap();
    assert_ne!(v, original);
    assert_eq!(v.custom_hash(), original.custom_hash());
}

#[test]
fn modular_multiplication_is_inverted() {
    let mut synth = bitvec(8);
    synth.equals_under(|s| s.scalar() * 3, 9).unwrap();
    assert_eq!(solved(&synth), 3);

    synth.reset();
    synth.equals_under(|s| s.scalar() * 4, 12).unwrap();
    let v = solved(&synth);
    assert_eq!((v * 4) & 0xFF, 12);

    synth.reset();
    synth.equals_under(|s| s.scalar() * 4, 6).unwrap();
    assert_eq!(synth.solve().unwrap(), None);
}

#[test]
fn bitwise_terms_combine() {
    let mut synth = bitvec(16);
    synth
        .equals_under(|s| (!(s.scalar() ^ 0x00F0) | 0x000F) << 4, 0xA5F0)
        .unwrap();
    let v = solved(&synth);
    assert_eq!(((!(v ^ 0x00F0) | 0x000F) << 4) & 0xFFFF, 0xA5F0);
}

#[test]
fn squares_are_found_by_enumeration() {
    let mut synth = bitvec(8);
    synth.equals_under(|s| s.scalar() * s.scalar(), 49).unwrap();
    assert_eq!(solved(&synth), 7);
}
