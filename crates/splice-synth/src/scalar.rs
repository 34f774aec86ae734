//! Integer and bit-vector solving.
//!
//! Relations collapse into one interval. Equations are inverted along the
//! path to the unknown when the term allows it, which yields either a residue
//! class (integers) or a ternary bit pattern (bit-vectors); anything else is
//! enumerated. Every candidate is checked against every constraint.

use tracing::{trace, warn};

use crate::domain::bit_mask;
use crate::term::{Arith, Env, Term};

/// Accumulated scalar constraints, ready to solve.
pub(crate) struct ScalarProblem<'a> {
    pub(crate) lo: i128,
    pub(crate) hi: i128,
    pub(crate) preferred: i128,
    pub(crate) excluded: &'a [i128],
    pub(crate) equations: &'a [(Term, i128)],
    pub(crate) arith: Arith,
    pub(crate) budget: u64,
}

/// `x ≡ residue (mod modulus)`; a zero modulus pins `x` to `residue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Class {
    residue: i128,
    modulus: i128,
}

impl Class {
    const ALL: Class = Class {
        residue: 0,
        modulus: 1,
    };

    fn exact(value: i128) -> Self {
        Class {
            residue: value,
            modulus: 0,
        }
    }

    fn modulo(residue: i128, modulus: i128) -> Self {
        Class {
            residue: residue.rem_euclid(modulus),
            modulus,
        }
    }

    fn contains(&self, x: i128) -> bool {
        if self.modulus == 0 {
            x == self.residue
        } else {
            x.checked_sub(self.residue)
                .is_some_and(|d| d.rem_euclid(self.modulus) == 0)
        }
    }

    fn shift(&self, delta: i128) -> Option<Class> {
        let residue = self.residue.checked_add(delta)?;
        Some(if self.modulus == 0 {
            Class::exact(residue)
        } else {
            Class::modulo(residue, self.modulus)
        })
    }

    /// `{ c - t | t in self }`.
    fn reflect(&self, c: i128) -> Option<Class> {
        let residue = c.checked_sub(self.residue)?;
        Some(if self.modulus == 0 {
            Class::exact(residue)
        } else {
            Class::modulo(residue, self.modulus)
        })
    }

    /// `{ x | c * x in self }`.
    fn divide(&self, c: i128) -> Inversion<Class> {
        if c == 0 {
            return if self.contains(0) {
                Inversion::Solved(Class::ALL)
            } else {
                Inversion::Empty
            };
        }
        if self.modulus == 0 {
            return if self.residue % c == 0 {
                Inversion::Solved(Class::exact(self.residue / c))
            } else {
                Inversion::Empty
            };
        }
        let m = self.modulus;
        let c = c.rem_euclid(m);
        if c == 0 {
            return if self.residue == 0 {
                Inversion::Solved(Class::ALL)
            } else {
                Inversion::Empty
            };
        }
        let g = gcd(c, m);
        if self.residue % g != 0 {
            return Inversion::Empty;
        }
        let reduced = m / g;
        if reduced == 1 {
            return Inversion::Solved(Class::ALL);
        }
        let Some(inverse) = mod_inverse(c / g, reduced) else {
            return Inversion::Unsupported;
        };
        match (self.residue / g).checked_mul(inverse) {
            Some(r) => Inversion::Solved(Class::modulo(r, reduced)),
            None => Inversion::Unsupported,
        }
    }
}

/// Bit-vectors `v` with `v & care == value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pattern {
    value: u64,
    care: u64,
}

impl Pattern {
    const ANY: Pattern = Pattern { value: 0, care: 0 };

    fn new(value: u64, care: u64) -> Self {
        Pattern {
            value: value & care,
            care,
        }
    }

    fn matches(&self, v: u64) -> bool {
        v & self.care == self.value
    }

    /// Smallest member `>= x` that fits in `width` bits.
    pub(crate) fn next_geq(&self, x: u64, width: u32) -> Option<u64> {
        let mask = bit_mask(width);
        if x > mask {
            return None;
        }
        if self.matches(x) {
            return Some(x);
        }
        // Raise the lowest bit that can go from 0 to 1 while keeping every
        // cared bit above it; below it take the smallest allowed bits.
        for i in 0..width {
            let bit = 1u64 << i;
            if x & bit != 0 || (self.care & bit != 0 && self.value & bit == 0) {
                continue;
            }
            let above = mask & !(bit | (bit - 1));
            if x & above & self.care != self.value & above {
                continue;
            }
            return Some((x & above) | bit | (self.value & (bit - 1)));
        }
        None
    }

    /// Largest member `<= x`.
    pub(crate) fn prev_leq(&self, x: u64, width: u32) -> Option<u64> {
        let mask = bit_mask(width);
        let flipped = Pattern::new(!self.value, self.care);
        flipped
            .next_geq(mask ^ (x & mask), width)
            .map(|v| mask ^ v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inversion<T> {
    Solved(T),
    Empty,
    Unsupported,
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

/// Inverse of `a` modulo `m` for coprime positive arguments.
fn mod_inverse(a: i128, m: i128) -> Option<i128> {
    let (mut old_r, mut r) = (a, m);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s.checked_sub(q.checked_mul(s)?)?);
    }
    (old_r == 1).then(|| old_s.rem_euclid(m))
}

/// Inverse of an odd `a` modulo `2^64` (Newton iteration).
fn odd_inverse(a: u64) -> u64 {
    let mut inv = a;
    for _ in 0..6 {
        inv = inv.wrapping_mul(2u64.wrapping_sub(a.wrapping_mul(inv)));
    }
    inv
}

/// Splits a binary node into its unknown side and the constant value of the
/// other side. `None` when both or neither side mention the unknown.
fn split<'t>(a: &'t Term, b: &'t Term, arith: Arith) -> Option<(&'t Term, i128, bool)> {
    match (a.has_unknown(), b.has_unknown()) {
        (true, false) => Some((a, b.eval(Env::Scalar(0), arith)?, true)),
        (false, true) => Some((b, a.eval(Env::Scalar(0), arith)?, false)),
        _ => None,
    }
}

fn invert_int(term: &Term, target: Class) -> Inversion<Class> {
    use Inversion::*;
    if !term.has_unknown() {
        return match term.eval(Env::Scalar(0), Arith::Integer) {
            Some(c) if target.contains(c) => Solved(Class::ALL),
            Some(_) => Empty,
            None => Unsupported,
        };
    }
    match term {
        Term::Var => Solved(target),
        Term::Add(a, b) => match split(a, b, Arith::Integer) {
            Some((x, c, _)) => match target.shift(-c) {
                Some(t) => invert_int(x, t),
                None => Unsupported,
            },
            None => Unsupported,
        },
        Term::Sub(a, b) => match split(a, b, Arith::Integer) {
            Some((x, c, true)) => match target.shift(c) {
                Some(t) => invert_int(x, t),
                None => Unsupported,
            },
            Some((x, c, false)) => match target.reflect(c) {
                Some(t) => invert_int(x, t),
                None => Unsupported,
            },
            None => Unsupported,
        },
        Term::Mul(a, b) => match split(a, b, Arith::Integer) {
            Some((x, c, _)) => match target.divide(c) {
                Solved(t) => invert_int(x, t),
                other => other,
            },
            None => Unsupported,
        },
        Term::Rem(a, k) if target.modulus == 0 => {
            if (0..*k).contains(&target.residue) {
                invert_int(a, Class::modulo(target.residue, *k))
            } else {
                Empty
            }
        }
        _ => Unsupported,
    }
}

fn invert_bits(term: &Term, target: Pattern, width: u32) -> Inversion<Pattern> {
    use Inversion::*;
    let mask = bit_mask(width);
    let arith = Arith::Modular { width };
    let exact = target.care == mask;
    if !term.has_unknown() {
        return match term.eval(Env::Scalar(0), arith) {
            Some(c) if target.matches(c as u64) => Solved(Pattern::ANY),
            Some(_) => Empty,
            None => Unsupported,
        };
    }
    match term {
        Term::Var => Solved(target),
        Term::Add(a, b) if exact => match split(a, b, arith) {
            Some((x, c, _)) => {
                invert_bits(x, Pattern::new(target.value.wrapping_sub(c as u64), mask), width)
            }
            None => Unsupported,
        },
        Term::Sub(a, b) if exact => match split(a, b, arith) {
            Some((x, c, true)) => {
                invert_bits(x, Pattern::new(target.value.wrapping_add(c as u64), mask), width)
            }
            Some((x, c, false)) => {
                invert_bits(x, Pattern::new((c as u64).wrapping_sub(target.value), mask), width)
            }
            None => Unsupported,
        },
        Term::Mul(a, b) if exact => match split(a, b, arith) {
            Some((x, c, _)) => {
                let c = c as u64 & mask;
                if c == 0 {
                    return if target.value == 0 {
                        Solved(Pattern::ANY)
                    } else {
                        Empty
                    };
                }
                let shift = c.trailing_zeros();
                if target.value & bit_mask(shift) != 0 {
                    return Empty;
                }
                let odd = c >> shift;
                let care = bit_mask(width - shift);
                let value = (target.value >> shift).wrapping_mul(odd_inverse(odd));
                invert_bits(x, Pattern::new(value, care), width)
            }
            None => Unsupported,
        },
        Term::Rem(a, k) => {
            if *k > mask as i128 {
                return invert_bits(a, target, width);
            }
            let k = *k as u64;
            if !(exact && k.is_power_of_two()) {
                return Unsupported;
            }
            if target.value >= k {
                return Empty;
            }
            invert_bits(a, Pattern::new(target.value, k - 1), width)
        }
        Term::Xor(a, m) => invert_bits(a, Pattern::new(target.value ^ m, target.care), width),
        Term::Not(a) => invert_bits(a, Pattern::new(!target.value, target.care), width),
        Term::And(a, m) => {
            if target.value & !m != 0 {
                return Empty;
            }
            invert_bits(a, Pattern::new(target.value, target.care & m), width)
        }
        Term::Or(a, m) => {
            if target.care & m & !target.value != 0 {
                return Empty;
            }
            invert_bits(a, Pattern::new(target.value, target.care & !m), width)
        }
        Term::Shl(a, n) => {
            if *n >= width {
                return if target.value == 0 { Solved(Pattern::ANY) } else { Empty };
            }
            if target.value & bit_mask(*n) != 0 {
                return Empty;
            }
            invert_bits(a, Pattern::new(target.value >> n, target.care >> n), width)
        }
        Term::Shr(a, n) => {
            if *n >= width {
                return if target.value == 0 { Solved(Pattern::ANY) } else { Empty };
            }
            if target.value & !bit_mask(width - n) != 0 {
                return Empty;
            }
            invert_bits(
                a,
                Pattern::new((target.value << n) & mask, (target.care << n) & mask),
                width,
            )
        }
        _ => Unsupported,
    }
}

/// How candidates are generated once equations have been looked at.
enum Generator {
    Class(Class),
    Pattern(Pattern, u32),
    Interval,
}

impl Generator {
    fn from_equations(problem: &ScalarProblem<'_>) -> Option<Generator> {
        for (term, target) in problem.equations {
            let inverted = match problem.arith {
                Arith::Integer => match invert_int(term, Class::exact(*target)) {
                    Inversion::Solved(class) => Inversion::Solved(Generator::Class(class)),
                    Inversion::Empty => Inversion::Empty,
                    Inversion::Unsupported => Inversion::Unsupported,
                },
                Arith::Modular { width } => {
                    let mask = bit_mask(width);
                    if !(0..=mask as i128).contains(target) {
                        Inversion::Empty
                    } else {
                        match invert_bits(term, Pattern::new(*target as u64, mask), width) {
                            Inversion::Solved(pattern) => {
                                Inversion::Solved(Generator::Pattern(pattern, width))
                            }
                            Inversion::Empty => Inversion::Empty,
                            Inversion::Unsupported => Inversion::Unsupported,
                        }
                    }
                }
            };
            match inverted {
                Inversion::Solved(generator) => return Some(generator),
                Inversion::Empty => {
                    trace!(expected = *target, "equation has no preimage");
                    return None;
                }
                Inversion::Unsupported => continue,
            }
        }
        Some(Generator::Interval)
    }

    /// Members in `[lo, hi]`: ascending from `start`, then descending below it.
    fn candidates(&self, lo: i128, hi: i128, start: i128) -> Box<dyn Iterator<Item = i128> + '_> {
        match *self {
            Generator::Interval => Box::new((start..=hi).chain((lo..start).rev())),
            Generator::Class(class) if class.modulus == 0 => {
                Box::new(std::iter::once(class.residue).filter(move |r| (lo..=hi).contains(r)))
            }
            Generator::Class(Class { residue, modulus }) => {
                let first_up = start.checked_add((residue - start).rem_euclid(modulus));
                let first_down = (start - 1).checked_sub((start - 1 - residue).rem_euclid(modulus));
                let up = std::iter::successors(first_up, move |v| v.checked_add(modulus))
                    .take_while(move |v| *v <= hi);
                let down = std::iter::successors(first_down, move |v| v.checked_sub(modulus))
                    .take_while(move |v| *v >= lo);
                Box::new(up.chain(down))
            }
            Generator::Pattern(pattern, width) => {
                let up = std::iter::successors(pattern.next_geq(start as u64, width), move |v| {
                    v.checked_add(1).and_then(|n| pattern.next_geq(n, width))
                })
                .map(|v| v as i128)
                .take_while(move |v| *v <= hi);
                let down = (start > 0)
                    .then(|| pattern.prev_leq(start as u64 - 1, width))
                    .flatten();
                let down = std::iter::successors(down, move |v| {
                    v.checked_sub(1).and_then(|n| pattern.prev_leq(n, width))
                })
                .map(|v| v as i128)
                .take_while(move |v| *v >= lo);
                Box::new(up.chain(down))
            }
        }
    }
}

impl ScalarProblem<'_> {
    fn satisfied_by(&self, x: i128) -> bool {
        (self.lo..=self.hi).contains(&x)
            && !self.excluded.contains(&x)
            && self.equations.iter().all(|(term, target)| {
                term.eval(Env::Scalar(x), self.arith) == Some(*target)
            })
    }

    /// First candidate satisfying every constraint, or `None` when there is
    /// none or the budget ran out.
    pub(crate) fn solve(&self) -> Option<i128> {
        if self.lo > self.hi {
            return None;
        }
        let generator = Generator::from_equations(self)?;
        let start = self.preferred.clamp(self.lo, self.hi);
        let mut spent = 0u64;
        for candidate in generator.candidates(self.lo, self.hi, start) {
            if spent >= self.budget {
                warn!(budget = self.budget, "scalar search budget exhausted");
                return None;
            }
            spent += 1;
            if self.satisfied_by(candidate) {
                trace!(candidate, spent, "scalar candidate confirmed");
                return Some(candidate);
            }
        }
        None
    }
}
