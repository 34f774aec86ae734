use std::cmp::Ordering;

use splice_core::{ErrorInfo, SpliceError};
use tracing::debug;

use crate::config::{SynthConfig, DEFAULT_SEARCH_BUDGET};
use crate::domain::{Domain, Value};
use crate::scalar::ScalarProblem;
use crate::string::StringProblem;
use crate::synthesizable::Synthesizable;
use crate::template::{Language, Matcher};
use crate::term::{Arith, Symbol, Term};

/// Compiled relational constraints, per domain family.
#[derive(Debug, Clone)]
enum Relations {
    Scalar {
        lo: i128,
        hi: i128,
        has_lower: bool,
        has_upper: bool,
        excluded: Vec<i128>,
    },
    Str {
        matchers: Vec<Matcher>,
    },
}

impl Relations {
    fn empty(domain: &Domain) -> Self {
        match domain.scalar_range() {
            Some((lo, hi)) => Relations::Scalar {
                lo,
                hi,
                has_lower: false,
                has_upper: false,
                excluded: Vec::new(),
            },
            None => Relations::Str {
                matchers: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Relation {
    Less,
    Greater,
    AtMost,
    AtLeast,
}

/// Accumulates constraints over one domain and finds a value satisfying all
/// of them.
///
/// "No solution" is `Ok(None)`; `Err` is reserved for malformed requests such
/// as a bound outside the domain or inverted bounds.
///
/// ```
/// use splice_synth::{Domain, Synthesizer, Value};
///
/// let mut synth = Synthesizer::new(Domain::Int);
/// let value = synth
///     .bounded_synthesis(Some(&Value::Int(92)), Some(&Value::Int(7)))
///     .unwrap()
///     .unwrap();
/// assert!(matches!(value, Value::Int(v) if 7 < v && v < 92));
/// ```
#[derive(Debug, Clone)]
pub struct Synthesizer {
    domain: Domain,
    budget: u64,
    allow_unbounded: bool,
    relations: Relations,
    equations: Vec<(Term, i128)>,
    count: usize,
}

impl Synthesizer {
    /// Creates a synthesizer with no constraints.
    pub fn new(domain: Domain) -> Self {
        let relations = Relations::empty(&domain);
        Self {
            domain,
            budget: DEFAULT_SEARCH_BUDGET,
            allow_unbounded: false,
            relations,
            equations: Vec::new(),
            count: 0,
        }
    }

    /// Creates a synthesizer for the domain of `T` under `config`.
    pub fn for_type<T: Synthesizable>(config: &SynthConfig) -> Result<Self, SpliceError> {
        Ok(Self::new(T::domain(config)?).with_budget(config.search_budget))
    }

    /// Caps the candidates or search nodes a single `solve` may explore.
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    /// Lets `bounded(None, None)` through as "no constraint".
    pub fn allow_unbounded(mut self) -> Self {
        self.allow_unbounded = true;
        self
    }

    /// Domain being solved over.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Number of constraints added since construction or the last reset.
    pub fn constraint_count(&self) -> usize {
        self.count
    }

    /// Drops every constraint.
    pub fn reset(&mut self) {
        self.relations = Relations::empty(&self.domain);
        self.equations.clear();
        self.count = 0;
    }

    /// Requires `x < bound`.
    pub fn less_than(&mut self, bound: &Value) -> Result<&mut Self, SpliceError> {
        self.relate(Relation::Less, bound)
    }

    /// Requires `x > bound`.
    pub fn greater_than(&mut self, bound: &Value) -> Result<&mut Self, SpliceError> {
        self.relate(Relation::Greater, bound)
    }

    /// Requires `x <= bound`.
    pub fn less_or_equal(&mut self, bound: &Value) -> Result<&mut Self, SpliceError> {
        self.relate(Relation::AtMost, bound)
    }

    /// Requires `x >= bound`.
    pub fn greater_or_equal(&mut self, bound: &Value) -> Result<&mut Self, SpliceError> {
        self.relate(Relation::AtLeast, bound)
    }

    /// Requires `x != value`.
    pub fn not_equal(&mut self, value: &Value) -> Result<&mut Self, SpliceError> {
        self.domain.check(value)?;
        match &mut self.relations {
            Relations::Scalar { excluded, .. } => {
                excluded.extend(value.as_scalar());
            }
            Relations::Str { matchers } => {
                if let Value::Str(word) = value {
                    matchers.push(Matcher::Exclude(word.chars().collect()));
                }
            }
        }
        self.count += 1;
        Ok(self)
    }

    /// Requires `f(x) == target`.
    ///
    /// `f` receives a [`Symbol`]: the scalar unknown for integers and
    /// bit-vectors, or the array of character codes for strings.
    pub fn equals_under<F>(&mut self, f: F, target: i128) -> Result<&mut Self, SpliceError>
    where
        F: FnOnce(&Symbol) -> Term,
    {
        let symbol = match &self.domain {
            Domain::Str { max_len, .. } => Symbol::Chars { len: *max_len },
            Domain::Int | Domain::BitVec { .. } => Symbol::Scalar,
        };
        let term = f(&symbol);
        term.validate(&self.domain)?;
        self.equations.push((term, target));
        self.count += 1;
        Ok(self)
    }

    /// Requires `lower < x < upper`.
    ///
    /// With one bound missing this is the matching one-sided constraint. With
    /// both missing it is an error unless [`Synthesizer::allow_unbounded`] was
    /// set.
    pub fn bounded(
        &mut self,
        upper: Option<&Value>,
        lower: Option<&Value>,
    ) -> Result<&mut Self, SpliceError> {
        match (upper, lower) {
            (Some(upper), Some(lower)) => {
                self.domain.check(upper)?;
                self.domain.check(lower)?;
                if upper.compare(lower) != Some(Ordering::Greater) {
                    return Err(SpliceError::Synth(
                        ErrorInfo::new("inverted-bounds", "upper bound must exceed lower bound")
                            .with_context("upper", upper.to_string())
                            .with_context("lower", lower.to_string()),
                    ));
                }
                if let (Domain::Str { alphabet, .. }, Value::Str(upper), Value::Str(lower)) =
                    (&self.domain, upper, lower)
                {
                    let language = Language::between(alphabet, upper, lower)?;
                    self.push_matcher(Matcher::Language(language));
                    self.count += 1;
                } else {
                    self.relate(Relation::Less, upper)?;
                    self.relate(Relation::Greater, lower)?;
                    self.count -= 1;
                }
                Ok(self)
            }
            (Some(upper), None) => self.less_than(upper),
            (None, Some(lower)) => self.greater_than(lower),
            (None, None) if self.allow_unbounded => Ok(self),
            (None, None) => Err(SpliceError::Synth(
                ErrorInfo::new("missing-bounds", "bounded synthesis needs at least one bound")
                    .with_context("domain", self.domain.name())
                    .with_hint("construct the synthesizer with allow_unbounded()"),
            )),
        }
    }

    /// `bounded` followed by `solve`.
    pub fn bounded_synthesis(
        &mut self,
        upper: Option<&Value>,
        lower: Option<&Value>,
    ) -> Result<Option<Value>, SpliceError> {
        self.bounded(upper, lower)?;
        self.solve()
    }

    /// Finds a value satisfying every constraint, or `None`.
    pub fn solve(&self) -> Result<Option<Value>, SpliceError> {
        let solved = match (&self.domain, &self.relations) {
            (
                Domain::Int | Domain::BitVec { .. },
                Relations::Scalar {
                    lo,
                    hi,
                    has_lower,
                    has_upper,
                    excluded,
                },
            ) => {
                let preferred = match (has_lower, has_upper) {
                    (true, true) => lo + (hi - lo) / 2,
                    (false, true) => *hi,
                    (true, false) => *lo,
                    (false, false) => 0,
                };
                let problem = ScalarProblem {
                    lo: *lo,
                    hi: *hi,
                    preferred,
                    excluded,
                    equations: &self.equations,
                    arith: Arith::for_domain(&self.domain),
                    budget: self.budget,
                };
                problem.solve().and_then(|x| match self.domain {
                    Domain::Int => i64::try_from(x).ok().map(Value::Int),
                    _ => u64::try_from(x).ok().map(Value::Bits),
                })
            }
            (Domain::Str { alphabet, max_len }, Relations::Str { matchers }) => StringProblem {
                alphabet,
                max_len: *max_len,
                matchers,
                equations: &self.equations,
                budget: self.budget,
            }
            .solve()
            .map(Value::Str),
            _ => None,
        };
        debug!(
            domain = self.domain.name(),
            constraints = self.count,
            solved = solved.as_ref().map(ToString::to_string),
            "synthesis finished"
        );
        Ok(solved)
    }

    fn push_matcher(&mut self, matcher: Matcher) {
        if let Relations::Str { matchers } = &mut self.relations {
            matchers.push(matcher);
        }
    }

    fn relate(&mut self, relation: Relation, bound: &Value) -> Result<&mut Self, SpliceError> {
        self.domain.check(bound)?;
        if let (Domain::Str { alphabet, .. }, Value::Str(word)) = (&self.domain, bound) {
            let language = match relation {
                Relation::Less => Language::less_than(alphabet, word)?,
                Relation::Greater => Language::greater_than(alphabet, word)?,
                Relation::AtMost => Language::at_most(alphabet, word)?,
                Relation::AtLeast => Language::at_least(alphabet, word)?,
            };
            self.push_matcher(Matcher::Language(language));
        } else if let Relations::Scalar {
            lo,
            hi,
            has_lower,
            has_upper,
            ..
        } = &mut self.relations
        {
            let b = bound.as_scalar().unwrap_or_default();
            match relation {
                Relation::Less => {
                    *hi = (*hi).min(b - 1);
                    *has_upper = true;
                }
                Relation::AtMost => {
                    *hi = (*hi).min(b);
                    *has_upper = true;
                }
                Relation::Greater => {
                    *lo = (*lo).max(b + 1);
                    *has_lower = true;
                }
                Relation::AtLeast => {
                    *lo = (*lo).max(b);
                    *has_lower = true;
                }
            }
        }
        self.count += 1;
        Ok(self)
    }
}
