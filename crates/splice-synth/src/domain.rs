use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use splice_core::{ErrorInfo, SpliceError};

/// Ordered character set a string domain draws from.
///
/// Characters are kept sorted by code point without duplicates, so the
/// position order of the alphabet agrees with the ordering of `String`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Builds an alphabet from the characters of `chars`.
    pub fn new(chars: &str) -> Result<Self, SpliceError> {
        let mut sorted: Vec<char> = chars.chars().collect();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.is_empty() || sorted[0] == '\0' {
            return Err(SpliceError::Config(
                ErrorInfo::new("invalid-alphabet", "alphabet must contain non-NUL characters")
                    .with_context("alphabet", chars.escape_debug().to_string()),
            ));
        }
        Ok(Self { chars: sorted })
    }

    /// `A-Z` followed by `a-z`.
    pub fn letters() -> Self {
        Self {
            chars: ('A'..='Z').chain('a'..='z').collect(),
        }
    }

    /// Printable ASCII, from space (0x20) to tilde (0x7E).
    pub fn printable_ascii() -> Self {
        Self {
            chars: (' '..='~').collect(),
        }
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; construction rejects empty alphabets.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Position of `ch` in the alphabet order.
    pub fn position(&self, ch: char) -> Option<usize> {
        self.chars.binary_search(&ch).ok()
    }

    /// Character at alphabet position `idx`.
    pub fn char_at(&self, idx: usize) -> char {
        self.chars[idx]
    }

    /// Whether `ch` belongs to the alphabet.
    pub fn contains(&self, ch: char) -> bool {
        self.position(ch).is_some()
    }

    /// Smallest character.
    pub fn first(&self) -> char {
        self.chars[0]
    }

    /// Largest character.
    pub fn last(&self) -> char {
        self.chars[self.chars.len() - 1]
    }

    /// Iterates over the characters in order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    /// Character codes in order.
    pub fn codes(&self) -> impl Iterator<Item = i128> + '_ {
        self.chars.iter().map(|&ch| i128::from(u32::from(ch)))
    }

    /// Character set as a string.
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }

    /// Positions of every character of `bound`, or an `alphabet-violation` error.
    pub(crate) fn positions_of(&self, bound: &str) -> Result<Vec<usize>, SpliceError> {
        bound
            .chars()
            .map(|ch| {
                self.position(ch).ok_or_else(|| {
                    SpliceError::Synth(
                        ErrorInfo::new(
                            "alphabet-violation",
                            "bound contains a character that is not in the alphabet",
                        )
                        .with_context("bound", bound)
                        .with_context("character", ch.escape_debug().to_string())
                        .with_context("alphabet", self.as_string()),
                    )
                })
            })
            .collect()
    }
}

/// Closed set of value domains the synthesizer can solve over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// Signed 64-bit integers under ordinary arithmetic.
    Int,
    /// Unsigned bit-vectors of the given width, arithmetic modulo `2^width`.
    BitVec {
        /// Number of bits, `1..=64`.
        width: u32,
    },
    /// Strings over an alphabet, at most `max_len` characters long.
    Str {
        /// Characters a value may use.
        alphabet: Alphabet,
        /// Maximum number of characters.
        max_len: usize,
    },
}

impl Domain {
    /// Bit-vector domain, validating the width.
    pub fn bitvec(width: u32) -> Result<Self, SpliceError> {
        if !(1..=64).contains(&width) {
            return Err(SpliceError::Synth(
                ErrorInfo::new("invalid-bitvec-width", "bit-vector width must be in 1..=64")
                    .with_context("width", width.to_string()),
            ));
        }
        Ok(Domain::BitVec { width })
    }

    /// String domain over `alphabet`.
    pub fn string(alphabet: Alphabet, max_len: usize) -> Self {
        Domain::Str { alphabet, max_len }
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Domain::Int => "int",
            Domain::BitVec { .. } => "bitvec",
            Domain::Str { .. } => "str",
        }
    }

    /// Inclusive range of a scalar domain.
    pub(crate) fn scalar_range(&self) -> Option<(i128, i128)> {
        match self {
            Domain::Int => Some((i128::from(i64::MIN), i128::from(i64::MAX))),
            Domain::BitVec { width } => Some((0, bit_mask(*width) as i128)),
            Domain::Str { .. } => None,
        }
    }

    /// Rejects values of the wrong kind or outside a bit-vector's width.
    pub(crate) fn check(&self, value: &Value) -> Result<(), SpliceError> {
        let fits = match (self, value) {
            (Domain::Int, Value::Int(_)) | (Domain::Str { .. }, Value::Str(_)) => true,
            (Domain::BitVec { width }, Value::Bits(bits)) => *bits <= bit_mask(*width),
            _ => false,
        };
        if fits {
            Ok(())
        } else {
            Err(SpliceError::Synth(
                ErrorInfo::new("domain-mismatch", "value does not belong to the domain")
                    .with_context("domain", self.name())
                    .with_context("value", value.to_string()),
            ))
        }
    }
}

/// All-ones mask of `width` bits.
pub(crate) fn bit_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Concrete value of one of the domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer value.
    Int(i64),
    /// Bit-vector value.
    Bits(u64),
    /// String value.
    Str(String),
}

impl Value {
    /// Compares two values of the same kind.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Bits(a), Value::Bits(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Integer view of a scalar value.
    pub(crate) fn as_scalar(&self) -> Option<i128> {
        match self {
            Value::Int(v) => Some(i128::from(*v)),
            Value::Bits(v) => Some(i128::from(*v)),
            Value::Str(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Bits(v) => write!(f, "{v:#x}"),
            Value::Str(s) => write!(f, "{s:?}"),
        }
    }
}
