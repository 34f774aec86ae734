//! Minimal untrusted-value boundary consumed by the containers.
//!
//! Comparison and hashing look at the raw value only; the two flags are
//! bookkeeping for whoever decides what may be shown to whom.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Modulus of the integer custom hash (the Mersenne prime `2^31 - 1`).
pub const INT_HASH_MODULUS: i64 = 2_147_483_647;

/// Right shift applied by the `u32` custom hash.
pub const U32_HASH_SHIFT: u32 = 3;

/// Salt mixed into the `u32` custom hash.
pub const U32_HASH_SALT: u32 = 0x5bd1_e995;

/// Deterministic hash used for bucket selection.
///
/// The result must depend on the raw value and nothing else: hash-preserving
/// synthesis reproduces it from a symbolic description of the same function.
pub trait CustomHash {
    /// Returns the hash of the raw value.
    fn custom_hash(&self) -> u64;
}

impl CustomHash for i64 {
    fn custom_hash(&self) -> u64 {
        self.rem_euclid(INT_HASH_MODULUS) as u64
    }
}

impl CustomHash for u32 {
    fn custom_hash(&self) -> u64 {
        u64::from((self >> U32_HASH_SHIFT) ^ U32_HASH_SALT)
    }
}

impl CustomHash for str {
    /// Position-weighted sum of character codes: `sum((i + 1) * code(c_i))`.
    fn custom_hash(&self) -> u64 {
        self.chars().enumerate().fold(0u64, |acc, (idx, ch)| {
            acc.wrapping_add((idx as u64 + 1).wrapping_mul(u64::from(u32::from(ch))))
        })
    }
}

impl CustomHash for String {
    fn custom_hash(&self) -> u64 {
        self.as_str().custom_hash()
    }
}

/// A raw value tagged with its trust and synthesis status.
#[derive(Clone, Serialize, Deserialize)]
pub struct Untrusted<T> {
    raw: T,
    untrusted: bool,
    synthesized: bool,
}

impl<T> Untrusted<T> {
    /// Wraps a value that originates from an untrusted source.
    pub fn new(raw: T) -> Self {
        Self {
            raw,
            untrusted: true,
            synthesized: false,
        }
    }

    /// Wraps a value that is known to be safe to expose.
    pub fn trusted(raw: T) -> Self {
        Self {
            raw,
            untrusted: false,
            synthesized: false,
        }
    }

    /// Wraps a value produced by synthesis.
    pub fn synthesized(raw: T) -> Self {
        Self {
            raw,
            untrusted: true,
            synthesized: true,
        }
    }

    /// Returns the raw value.
    pub fn raw(&self) -> &T {
        &self.raw
    }

    /// Consumes the wrapper and returns the raw value.
    pub fn into_raw(self) -> T {
        self.raw
    }

    /// Whether the value came from an untrusted source.
    pub fn is_untrusted(&self) -> bool {
        self.untrusted
    }

    /// Whether the value was produced by synthesis.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    /// Flags the value as synthesized (and therefore untrusted).
    pub fn mark_synthesized(&mut self) {
        self.untrusted = true;
        self.synthesized = true;
    }
}

impl<T: CustomHash> Untrusted<T> {
    /// Custom hash of the raw value.
    pub fn custom_hash(&self) -> u64 {
        self.raw.custom_hash()
    }
}

impl<T: fmt::Debug> fmt::Debug for Untrusted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match (self.untrusted, self.synthesized) {
            (_, true) => "synthesized",
            (true, false) => "untrusted",
            (false, false) => "trusted",
        };
        write!(f, "{:?}<{marker}>", self.raw)
    }
}

impl<T: fmt::Display> fmt::Display for Untrusted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

impl<T: PartialEq> PartialEq for Untrusted<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: Eq> Eq for Untrusted<T> {}

impl<T: PartialOrd> PartialOrd for Untrusted<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.raw.partial_cmp(&other.raw)
    }
}

impl<T: Ord> Ord for Untrusted<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T: Hash> Hash for Untrusted<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state)
    }
}
