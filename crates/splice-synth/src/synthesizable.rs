//! Bridges container element types to synthesis domains.

use splice_core::{SpliceError, INT_HASH_MODULUS, U32_HASH_SALT, U32_HASH_SHIFT};

use crate::config::SynthConfig;
use crate::domain::{Domain, Value};
use crate::term::{Symbol, Term};

/// A type whose values can be produced by the synthesizer.
pub trait Synthesizable: Sized + Clone + Ord {
    /// Domain that holds every value of the type.
    fn domain(config: &SynthConfig) -> Result<Domain, SpliceError>;

    /// Converts into the solver's value representation.
    fn to_value(&self) -> Value;

    /// Converts back; `None` for a value of another domain.
    fn from_value(value: Value) -> Option<Self>;
}

/// Symbolic mirror of [`splice_core::CustomHash`].
///
/// Evaluating `hash_term` on a value's symbol must give the value's custom
/// hash, so that hash-preserving synthesis lands in the same bucket.
pub trait SymbolicHash {
    /// The custom hash as a term over `symbol`.
    fn hash_term(symbol: &Symbol) -> Term;
}

impl Synthesizable for i64 {
    fn domain(_config: &SynthConfig) -> Result<Domain, SpliceError> {
        Ok(Domain::Int)
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl Synthesizable for u32 {
    fn domain(_config: &SynthConfig) -> Result<Domain, SpliceError> {
        Domain::bitvec(32)
    }

    fn to_value(&self) -> Value {
        Value::Bits(u64::from(*self))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bits(v) => u32::try_from(v).ok(),
            _ => None,
        }
    }
}

impl Synthesizable for u64 {
    fn domain(_config: &SynthConfig) -> Result<Domain, SpliceError> {
        Domain::bitvec(64)
    }

    fn to_value(&self) -> Value {
        Value::Bits(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bits(v) => Some(v),
            _ => None,
        }
    }
}

impl Synthesizable for String {
    fn domain(config: &SynthConfig) -> Result<Domain, SpliceError> {
        Ok(Domain::string(config.alphabet()?, config.max_string_len))
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl SymbolicHash for i64 {
    fn hash_term(symbol: &Symbol) -> Term {
        symbol.scalar() % i128::from(INT_HASH_MODULUS)
    }
}

impl SymbolicHash for u32 {
    fn hash_term(symbol: &Symbol) -> Term {
        (symbol.scalar() >> U32_HASH_SHIFT) ^ u64::from(U32_HASH_SALT)
    }
}

impl SymbolicHash for String {
    fn hash_term(symbol: &Symbol) -> Term {
        symbol
            .chars()
            .into_iter()
            .enumerate()
            .map(|(idx, code)| code * (idx as i128 + 1))
            .reduce(|acc, term| acc + term)
            .unwrap_or(Term::Const(0))
    }
}
