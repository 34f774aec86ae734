//! String solving over template automata and character-code equations.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace, warn};

use crate::domain::Alphabet;
use crate::template::{MatchState, Matcher};
use crate::term::{Arith, Env, Term};

pub(crate) struct StringProblem<'a> {
    pub(crate) alphabet: &'a Alphabet,
    pub(crate) max_len: usize,
    pub(crate) matchers: &'a [Matcher],
    pub(crate) equations: &'a [(Term, i128)],
    pub(crate) budget: u64,
}

/// Outcome of a budgeted search.
enum Search<T> {
    Found(T),
    Exhausted,
    Unsat,
}

impl StringProblem<'_> {
    pub(crate) fn solve(&self) -> Option<String> {
        let start: Vec<MatchState> = self.matchers.iter().map(Matcher::start).collect();
        if self
            .matchers
            .iter()
            .zip(start.iter())
            .any(|(matcher, state)| matcher.is_dead(state))
        {
            return None;
        }
        let outcome = if self.equations.is_empty() {
            if let Some(found) = self.from_templates() {
                return Some(found);
            }
            self.breadth_first(start)
        } else {
            self.deepening(start)
        };
        match outcome {
            Search::Found(found) => Some(found),
            Search::Exhausted => {
                warn!(budget = self.budget, "string search budget exhausted");
                None
            }
            Search::Unsat => None,
        }
    }

    fn confirm(&self, candidate: &str) -> bool {
        candidate.chars().count() <= self.max_len
            && candidate.chars().all(|ch| self.alphabet.contains(ch))
            && self
                .matchers
                .iter()
                .all(|matcher| matcher.matches(candidate, self.alphabet))
            && self.equations_hold(&codes_of(candidate))
    }

    fn equations_hold(&self, codes: &[i128]) -> bool {
        self.equations
            .iter()
            .all(|(term, target)| term.eval(Env::Chars(codes), Arith::Integer) == Some(*target))
    }

    /// Concrete shapes of each language, in preference order.
    fn from_templates(&self) -> Option<String> {
        for matcher in self.matchers {
            let Matcher::Language(language) = matcher else {
                continue;
            };
            for template in language.templates() {
                if template.min_len() > self.max_len {
                    continue;
                }
                let candidate = template.concretize(self.alphabet);
                if self.confirm(&candidate) {
                    debug!(candidate = %candidate, "template candidate confirmed");
                    return Some(candidate);
                }
                trace!(candidate = %candidate, "template candidate rejected");
            }
        }
        None
    }

    fn step_all(&self, states: &[MatchState], ch: char) -> Option<Vec<MatchState>> {
        self.matchers
            .iter()
            .zip(states.iter())
            .map(|(matcher, state)| matcher.step(state, ch, self.alphabet))
            .collect()
    }

    fn accepts_all(&self, states: &[MatchState]) -> bool {
        self.matchers
            .iter()
            .zip(states.iter())
            .all(|(matcher, state)| matcher.accepts(state))
    }

    /// Shortest accepted string over the product of all matchers.
    fn breadth_first(&self, start: Vec<MatchState>) -> Search<String> {
        if self.accepts_all(&start) {
            return Search::Found(String::new());
        }
        // (parent node, character) per discovered node; node 0 is the start.
        let mut nodes: Vec<(usize, char)> = vec![(0, '\0')];
        let mut visited: HashSet<Vec<MatchState>> = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start.clone());
        queue.push_back((start, 0usize, 0usize));

        while let Some((states, depth, node)) = queue.pop_front() {
            if depth == self.max_len {
                continue;
            }
            for ch in self.alphabet.iter() {
                let Some(next) = self.step_all(&states, ch) else {
                    continue;
                };
                if visited.contains(&next) {
                    continue;
                }
                if nodes.len() as u64 >= self.budget {
                    return Search::Exhausted;
                }
                nodes.push((node, ch));
                let id = nodes.len() - 1;
                if self.accepts_all(&next) {
                    return Search::Found(rebuild(&nodes, id));
                }
                visited.insert(next.clone());
                queue.push_back((next, depth + 1, id));
            }
        }
        Search::Unsat
    }

    /// Iterative deepening over the length, depth-first over the positions.
    fn deepening(&self, start: Vec<MatchState>) -> Search<String> {
        let mut walk = Walk {
            problem: self,
            codes: vec![0; self.max_len],
            spent: 0,
            min_code: self.alphabet.codes().next().unwrap_or(0),
            max_code: self.alphabet.codes().last().unwrap_or(0),
        };
        for len in 0..=self.max_len {
            if !walk.feasible(0, len) {
                continue;
            }
            match walk.descend(0, len, &start) {
                Search::Found(()) => {
                    return Search::Found(
                        walk.codes[..len]
                            .iter()
                            .filter_map(|&code| u32::try_from(code).ok().and_then(char::from_u32))
                            .collect(),
                    )
                }
                Search::Exhausted => return Search::Exhausted,
                Search::Unsat => {}
            }
        }
        Search::Unsat
    }
}

struct Walk<'p, 'a> {
    problem: &'p StringProblem<'a>,
    codes: Vec<i128>,
    spent: u64,
    min_code: i128,
    max_code: i128,
}

impl Walk<'_, '_> {
    /// Whether every equation can still reach its target with positions
    /// `< fixed` assigned, `fixed..len` free, and the rest past the end.
    fn feasible(&self, fixed: usize, len: usize) -> bool {
        let hull = |idx: usize| {
            if idx < fixed {
                let code = self.codes.get(idx).copied().unwrap_or(0);
                (code, code)
            } else if idx < len {
                (self.min_code, self.max_code)
            } else {
                (0, 0)
            }
        };
        self.problem.equations.iter().all(|(term, target)| {
            term.bounds(&hull)
                .map_or(true, |(lo, hi)| (lo..=hi).contains(target))
        })
    }

    fn descend(&mut self, pos: usize, len: usize, states: &[MatchState]) -> Search<()> {
        self.spent += 1;
        if self.spent > self.problem.budget {
            return Search::Exhausted;
        }
        if pos == len {
            let codes = &self.codes[..];
            return if self.problem.accepts_all(states) && self.problem.equations_hold(codes) {
                Search::Found(())
            } else {
                Search::Unsat
            };
        }
        for ch in self.problem.alphabet.iter() {
            let Some(next) = self.problem.step_all(states, ch) else {
                continue;
            };
            self.codes[pos] = i128::from(u32::from(ch));
            if !self.feasible(pos + 1, len) {
                continue;
            }
            match self.descend(pos + 1, len, &next) {
                Search::Unsat => {}
                other => return other,
            }
        }
        self.codes[pos] = 0;
        Search::Unsat
    }
}

fn rebuild(nodes: &[(usize, char)], mut id: usize) -> String {
    let mut chars = Vec::new();
    while id != 0 {
        let (parent, ch) = nodes[id];
        chars.push(ch);
        id = parent;
    }
    chars.iter().rev().collect()
}

fn codes_of(value: &str) -> Vec<i128> {
    value.chars().map(|ch| i128::from(u32::from(ch))).collect()
}
