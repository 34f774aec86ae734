//! Symbolic expressions for `equals_under` constraints.

use std::ops;

use splice_core::{ErrorInfo, SpliceError};

use crate::domain::{bit_mask, Domain};

/// Expression over the value being synthesized.
///
/// `Var` stands for a scalar (integer or bit-vector) value. `Char(i)` stands for
/// the code of the i-th character of a string value, `0` past its end. Bitwise
/// operators only exist in the bit-vector theory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// The scalar being synthesized.
    Var,
    /// Code of the character at the given position.
    Char(usize),
    /// Integer literal.
    Const(i128),
    /// Sum.
    Add(Box<Term>, Box<Term>),
    /// Difference.
    Sub(Box<Term>, Box<Term>),
    /// Product.
    Mul(Box<Term>, Box<Term>),
    /// Euclidean remainder by a positive constant.
    Rem(Box<Term>, i128),
    /// Bitwise and with a mask.
    And(Box<Term>, u64),
    /// Bitwise or with a mask.
    Or(Box<Term>, u64),
    /// Bitwise exclusive or with a mask.
    Xor(Box<Term>, u64),
    /// Bitwise complement.
    Not(Box<Term>),
    /// Left shift by a constant.
    Shl(Box<Term>, u32),
    /// Logical right shift by a constant.
    Shr(Box<Term>, u32),
}

/// Argument handed to an `equals_under` function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A single integer or bit-vector unknown.
    Scalar,
    /// A string, seen as a fixed-size array of character codes.
    Chars {
        /// Number of character positions.
        len: usize,
    },
}

impl Symbol {
    /// The scalar unknown.
    pub fn scalar(&self) -> Term {
        Term::Var
    }

    /// Code of the character at `idx`.
    pub fn char_at(&self, idx: usize) -> Term {
        Term::Char(idx)
    }

    /// Every character position, in order.
    pub fn chars(&self) -> Vec<Term> {
        match self {
            Symbol::Scalar => Vec::new(),
            Symbol::Chars { len } => (0..*len).map(Term::Char).collect(),
        }
    }
}

/// Arithmetic used when evaluating a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arith {
    /// Exact integers; overflow makes the term undefined.
    Integer,
    /// Arithmetic modulo `2^width`.
    Modular { width: u32 },
}

impl Arith {
    pub(crate) fn for_domain(domain: &Domain) -> Self {
        match domain {
            Domain::BitVec { width } => Arith::Modular { width: *width },
            Domain::Int | Domain::Str { .. } => Arith::Integer,
        }
    }
}

/// Assignment a term is evaluated under.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Env<'a> {
    Scalar(i128),
    Chars(&'a [i128]),
}

impl Term {
    /// The scalar unknown.
    pub fn var() -> Term {
        Term::Var
    }

    /// Code of the character at `idx`.
    pub fn char_at(idx: usize) -> Term {
        Term::Char(idx)
    }

    /// Integer literal.
    pub fn constant(value: impl Into<i128>) -> Term {
        Term::Const(value.into())
    }

    /// Whether the term mentions the unknown.
    pub fn has_unknown(&self) -> bool {
        self.unknown_count() > 0
    }

    pub(crate) fn unknown_count(&self) -> usize {
        match self {
            Term::Var | Term::Char(_) => 1,
            Term::Const(_) => 0,
            Term::Add(a, b) | Term::Sub(a, b) | Term::Mul(a, b) => {
                a.unknown_count() + b.unknown_count()
            }
            Term::Rem(a, _)
            | Term::And(a, _)
            | Term::Or(a, _)
            | Term::Xor(a, _)
            | Term::Not(a)
            | Term::Shl(a, _)
            | Term::Shr(a, _) => a.unknown_count(),
        }
    }

    /// Checks that the term only uses what `domain` provides.
    pub(crate) fn validate(&self, domain: &Domain) -> Result<(), SpliceError> {
        let unsupported = |what: &str| {
            SpliceError::Synth(
                ErrorInfo::new("unsupported-operator", "term is not expressible in the domain")
                    .with_context("domain", domain.name())
                    .with_context("operator", what),
            )
        };
        match self {
            Term::Var => match domain {
                Domain::Str { .. } => Err(unsupported("scalar variable")),
                _ => Ok(()),
            },
            Term::Char(idx) => match domain {
                Domain::Str { max_len, .. } if idx < max_len => Ok(()),
                Domain::Str { .. } => Err(unsupported("character index beyond max length")),
                _ => Err(unsupported("character code")),
            },
            Term::Const(_) => Ok(()),
            Term::Add(a, b) | Term::Sub(a, b) | Term::Mul(a, b) => {
                a.validate(domain)?;
                b.validate(domain)
            }
            Term::Rem(a, k) => {
                if *k <= 0 {
                    return Err(unsupported("remainder by a non-positive constant"));
                }
                a.validate(domain)
            }
            Term::And(a, _)
            | Term::Or(a, _)
            | Term::Xor(a, _)
            | Term::Not(a)
            | Term::Shl(a, _)
            | Term::Shr(a, _) => match domain {
                Domain::BitVec { .. } => a.validate(domain),
                _ => Err(unsupported("bitwise operator")),
            },
        }
    }

    /// Evaluates the term; `None` when it is undefined (overflow, wrong symbol).
    pub(crate) fn eval(&self, env: Env<'_>, arith: Arith) -> Option<i128> {
        match arith {
            Arith::Integer => self.eval_integer(env),
            Arith::Modular { width } => self.eval_modular(env, width).map(|v| v as i128),
        }
    }

    fn eval_integer(&self, env: Env<'_>) -> Option<i128> {
        match self {
            Term::Var => match env {
                Env::Scalar(x) => Some(x),
                Env::Chars(_) => None,
            },
            Term::Char(idx) => match env {
                Env::Chars(codes) => Some(codes.get(*idx).copied().unwrap_or(0)),
                Env::Scalar(_) => None,
            },
            Term::Const(c) => Some(*c),
            Term::Add(a, b) => a.eval_integer(env)?.checked_add(b.eval_integer(env)?),
            Term::Sub(a, b) => a.eval_integer(env)?.checked_sub(b.eval_integer(env)?),
            Term::Mul(a, b) => a.eval_integer(env)?.checked_mul(b.eval_integer(env)?),
            Term::Rem(a, k) => Some(a.eval_integer(env)?.rem_euclid(*k)),
            _ => None,
        }
    }

    fn eval_modular(&self, env: Env<'_>, width: u32) -> Option<u64> {
        let mask = bit_mask(width);
        let wrap = |v: i128| (v.rem_euclid(1i128 << width.min(64))) as u64 & mask;
        let value = match self {
            Term::Var => match env {
                Env::Scalar(x) => wrap(x),
                Env::Chars(_) => return None,
            },
            Term::Char(_) => return None,
            Term::Const(c) => wrap(*c),
            Term::Add(a, b) => a
                .eval_modular(env, width)?
                .wrapping_add(b.eval_modular(env, width)?),
            Term::Sub(a, b) => a
                .eval_modular(env, width)?
                .wrapping_sub(b.eval_modular(env, width)?),
            Term::Mul(a, b) => a
                .eval_modular(env, width)?
                .wrapping_mul(b.eval_modular(env, width)?),
            Term::Rem(a, k) => {
                let k = u64::try_from(*k).ok()?;
                a.eval_modular(env, width)? % k
            }
            Term::And(a, m) => a.eval_modular(env, width)? & m,
            Term::Or(a, m) => a.eval_modular(env, width)? | m,
            Term::Xor(a, m) => a.eval_modular(env, width)? ^ m,
            Term::Not(a) => !a.eval_modular(env, width)?,
            Term::Shl(a, n) => a.eval_modular(env, width)?.checked_shl(*n).unwrap_or(0),
            Term::Shr(a, n) => a.eval_modular(env, width)?.checked_shr(*n).unwrap_or(0),
        };
        Some(value & mask)
    }

    /// Interval enclosing every value of the term when each character code
    /// `i` ranges over `hull(i)`. `None` when no useful bound is known.
    pub(crate) fn bounds(&self, hull: &dyn Fn(usize) -> (i128, i128)) -> Option<(i128, i128)> {
        match self {
            Term::Var => None,
            Term::Char(idx) => Some(hull(*idx)),
            Term::Const(c) => Some((*c, *c)),
            Term::Add(a, b) => {
                let (alo, ahi) = a.bounds(hull)?;
                let (blo, bhi) = b.bounds(hull)?;
                Some((alo.checked_add(blo)?, ahi.checked_add(bhi)?))
            }
            Term::Sub(a, b) => {
                let (alo, ahi) = a.bounds(hull)?;
                let (blo, bhi) = b.bounds(hull)?;
                Some((alo.checked_sub(bhi)?, ahi.checked_sub(blo)?))
            }
            Term::Mul(a, b) => {
                let (alo, ahi) = a.bounds(hull)?;
                let (blo, bhi) = b.bounds(hull)?;
                let products = [
                    alo.checked_mul(blo)?,
                    alo.checked_mul(bhi)?,
                    ahi.checked_mul(blo)?,
                    ahi.checked_mul(bhi)?,
                ];
                let lo = products.iter().copied().min()?;
                let hi = products.iter().copied().max()?;
                Some((lo, hi))
            }
            Term::Rem(a, k) => match a.bounds(hull) {
                Some((lo, hi)) if lo >= 0 && hi < *k => Some((lo, hi)),
                _ => Some((0, k - 1)),
            },
            _ => None,
        }
    }
}

impl ops::Add for Term {
    type Output = Term;

    fn add(self, rhs: Term) -> Term {
        Term::Add(Box::new(self), Box::new(rhs))
    }
}

impl ops::Add<i128> for Term {
    type Output = Term;

    fn add(self, rhs: i128) -> Term {
        self + Term::Const(rhs)
    }
}

impl ops::Sub for Term {
    type Output = Term;

    fn sub(self, rhs: Term) -> Term {
        Term::Sub(Box::new(self), Box::new(rhs))
    }
}

impl ops::Sub<i128> for Term {
    type Output = Term;

    fn sub(self, rhs: i128) -> Term {
        self - Term::Const(rhs)
    }
}

impl ops::Mul for Term {
    type Output = Term;

    fn mul(self, rhs: Term) -> Term {
        Term::Mul(Box::new(self), Box::new(rhs))
    }
}

impl ops::Mul<i128> for Term {
    type Output = Term;

    fn mul(self, rhs: i128) -> Term {
        self * Term::Const(rhs)
    }
}

impl ops::Rem<i128> for Term {
    type Output = Term;

    fn rem(self, rhs: i128) -> Term {
        Term::Rem(Box::new(self), rhs)
    }
}

impl ops::BitAnd<u64> for Term {
    type Output = Term;

    fn bitand(self, rhs: u64) -> Term {
        Term::And(Box::new(self), rhs)
    }
}

impl ops::BitOr<u64> for Term {
    type Output = Term;

    fn bitor(self, rhs: u64) -> Term {
        Term::Or(Box::new(self), rhs)
    }
}

impl ops::BitXor<u64> for Term {
    type Output = Term;

    fn bitxor(self, rhs: u64) -> Term {
        Term::Xor(Box::new(self), rhs)
    }
}

impl ops::Not for Term {
    type Output = Term;

    fn not(self) -> Term {
        Term::Not(Box::new(self))
    }
}

impl ops::Shl<u32> for Term {
    type Output = Term;

    fn shl(self, rhs: u32) -> Term {
        Term::Shl(Box::new(self), rhs)
    }
}

impl ops::Shr<u32> for Term {
    type Output = Term;

    fn shr(self, rhs: u32) -> Term {
        Term::Shr(Box::new(self), rhs)
    }
}
