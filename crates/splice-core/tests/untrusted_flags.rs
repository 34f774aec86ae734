use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use proptest::prelude::*;
use splice_core::{CustomHash, Untrusted, INT_HASH_MODULUS, U32_HASH_SALT};

fn std_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn constructors_set_flags() {
    let plain = Untrusted::new(5i64);
    assert!(plain.is_untrusted());
    assert!(!plain.is_synthesized());

    let safe = Untrusted::trusted(5i64);
    assert!(!safe.is_untrusted());

    let mut marked = Untrusted::trusted(5i64);
    marked.mark_synthesized();
    assert!(marked.is_untrusted());
    assert!(marked.is_synthesized());
}

#[test]
fn comparison_ignores_flags() {
    assert_eq!(Untrusted::new(3i64), Untrusted::synthesized(3i64));
    assert!(Untrusted::trusted(2i64) < Untrusted::new(3i64));
    assert_eq!(
        std_hash(&Untrusted::new("Jake".to_string())),
        std_hash(&Untrusted::synthesized("Jake".to_string()))
    );
}

#[test]
fn string_hash_is_position_weighted() {
    // L=76, u=117, k=107, e=101
    assert_eq!("Luke".custom_hash(), 76 + 2 * 117 + 3 * 107 + 4 * 101);
    assert_eq!(String::new().custom_hash(), 0);
    assert_ne!("ab".custom_hash(), "ba".custom_hash());
}

#[test]
fn integer_hashes_match_their_definitions() {
    assert_eq!(42i64.custom_hash(), 42);
    assert_eq!((-1i64).custom_hash(), (INT_HASH_MODULUS - 1) as u64);
    assert_eq!((INT_HASH_MODULUS + 5).custom_hash(), 5);
    assert_eq!(0u32.custom_hash(), u64::from(U32_HASH_SALT));
    assert_eq!(8u32.custom_hash(), 15u32.custom_hash());
}

proptest! {
    #[test]
    fn hash_depends_only_on_raw(raw in any::<i64>()) {
        let a = Untrusted::new(raw);
        let b = Untrusted::synthesized(raw);
        prop_assert_eq!(a.custom_hash(), b.custom_hash());
        prop_assert!(a.custom_hash() < INT_HASH_MODULUS as u64);
    }
}
