//! Regular-language templates compiled from string bounds.
//!
//! A template is `prefix · [class]? · tail` where the class is a contiguous run
//! of alphabet positions and the tail is empty, `Σ*`, or `Σ+`. A language is an
//! ordered union of templates; the first template is the preferred shape.

use splice_core::SpliceError;

use crate::domain::Alphabet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tail {
    Empty,
    Star,
    Plus,
}

/// Which member of the class a concrete value uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pick {
    Low,
    Mid,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Template {
    prefix: Vec<char>,
    /// Alphabet positions `[start, end)`, never empty.
    class: Option<(usize, usize)>,
    pick: Pick,
    tail: Tail,
}

impl Template {
    fn literal(prefix: Vec<char>) -> Self {
        Self {
            prefix,
            class: None,
            pick: Pick::Low,
            tail: Tail::Empty,
        }
    }

    fn class(prefix: Vec<char>, start: usize, end: usize, pick: Pick) -> Self {
        debug_assert!(start < end);
        Self {
            prefix,
            class: Some((start, end)),
            pick,
            tail: Tail::Star,
        }
    }

    fn extension(prefix: Vec<char>) -> Self {
        Self {
            prefix,
            class: None,
            pick: Pick::Low,
            tail: Tail::Plus,
        }
    }

    fn tail_start(&self) -> u32 {
        (self.prefix.len() + usize::from(self.class.is_some())) as u32
    }

    /// Length of the shortest member.
    pub(crate) fn min_len(&self) -> usize {
        self.tail_start() as usize + usize::from(self.tail == Tail::Plus)
    }

    /// The member this template stands for when nothing else constrains it.
    pub(crate) fn concretize(&self, alphabet: &Alphabet) -> String {
        let mut out: String = self.prefix.iter().collect();
        if let Some((start, end)) = self.class {
            let idx = match self.pick {
                Pick::Low => start,
                Pick::Mid => start + (end - start) / 2,
                Pick::High => end - 1,
            };
            out.push(alphabet.char_at(idx));
        }
        if self.tail == Tail::Plus {
            out.push(alphabet.first());
        }
        out
    }

    fn step(&self, state: u32, ch: char, alphabet: &Alphabet) -> Option<u32> {
        let prefix_len = self.prefix.len() as u32;
        if state < prefix_len {
            return (self.prefix[state as usize] == ch).then_some(state + 1);
        }
        if let Some((start, end)) = self.class {
            if state == prefix_len {
                let pos = alphabet.position(ch)?;
                return (start <= pos && pos < end).then_some(state + 1);
            }
        }
        let tail = self.tail_start();
        match self.tail {
            Tail::Empty => None,
            Tail::Star => Some(tail),
            Tail::Plus => Some(tail + 1),
        }
    }

    fn accepts(&self, state: u32) -> bool {
        let tail = self.tail_start();
        match self.tail {
            Tail::Empty | Tail::Star => state == tail,
            Tail::Plus => state == tail + 1,
        }
    }
}

/// Ordered union of templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Language {
    templates: Vec<Template>,
}

impl Language {
    pub(crate) fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Strings below `bound`. Unsatisfiable for the empty bound.
    pub(crate) fn less_than(alphabet: &Alphabet, bound: &str) -> Result<Self, SpliceError> {
        let positions = alphabet.positions_of(bound)?;
        let chars: Vec<char> = bound.chars().collect();
        Ok(Self {
            templates: less_suffix(&[], &chars, &positions, true),
        })
    }

    /// Strings above `bound`.
    pub(crate) fn greater_than(alphabet: &Alphabet, bound: &str) -> Result<Self, SpliceError> {
        let positions = alphabet.positions_of(bound)?;
        let chars: Vec<char> = bound.chars().collect();
        Ok(Self {
            templates: greater_suffix(&[], &chars, &positions, alphabet.len()),
        })
    }

    /// Strings below or equal to `bound`.
    pub(crate) fn at_most(alphabet: &Alphabet, bound: &str) -> Result<Self, SpliceError> {
        let mut language = Self::less_than(alphabet, bound)?;
        language.templates.push(Template::literal(bound.chars().collect()));
        Ok(language)
    }

    /// Strings above or equal to `bound`.
    pub(crate) fn at_least(alphabet: &Alphabet, bound: &str) -> Result<Self, SpliceError> {
        let mut language = Self::greater_than(alphabet, bound)?;
        language.templates.push(Template::literal(bound.chars().collect()));
        Ok(language)
    }

    /// Strings strictly between `lower` and `upper`, built from both bounds at
    /// once. Requires `lower < upper`.
    pub(crate) fn between(
        alphabet: &Alphabet,
        upper: &str,
        lower: &str,
    ) -> Result<Self, SpliceError> {
        let upper_pos = alphabet.positions_of(upper)?;
        let lower_pos = alphabet.positions_of(lower)?;
        let upper: Vec<char> = upper.chars().collect();
        let lower: Vec<char> = lower.chars().collect();
        let shared = upper
            .iter()
            .zip(lower.iter())
            .take_while(|(a, b)| a == b)
            .count();

        if shared == lower.len() {
            // lower is a proper prefix of upper: lower · w with "" < w < upper[shared..]
            let templates = less_suffix(&lower, &upper[shared..], &upper_pos[shared..], false);
            return Ok(Self { templates });
        }

        let (low, high) = (lower_pos[shared], upper_pos[shared]);
        debug_assert!(low < high, "bounds must be ordered");
        let mut templates = Vec::new();
        if high - low >= 2 {
            templates.push(Template::class(
                upper[..shared].to_vec(),
                low + 1,
                high,
                Pick::Mid,
            ));
        }
        templates.extend(greater_suffix(
            &lower[..=shared],
            &lower[shared + 1..],
            &lower_pos[shared + 1..],
            alphabet.len(),
        ));
        templates.extend(less_suffix(
            &upper[..=shared],
            &upper[shared + 1..],
            &upper_pos[shared + 1..],
            true,
        ));
        Ok(Self { templates })
    }
}

fn joined(prefix: &[char], rest: &[char]) -> Vec<char> {
    prefix.iter().chain(rest.iter()).copied().collect()
}

/// `prefix · r` for every `r < bound`: first the smaller-character shapes by
/// increasing offset, then the proper prefixes of `bound`, longest first.
fn less_suffix(
    prefix: &[char],
    bound: &[char],
    positions: &[usize],
    include_empty: bool,
) -> Vec<Template> {
    let mut templates: Vec<Template> = positions
        .iter()
        .enumerate()
        .filter(|(_, &pos)| pos > 0)
        .map(|(offset, &pos)| Template::class(joined(prefix, &bound[..offset]), 0, pos, Pick::High))
        .collect();
    let shortest = usize::from(!include_empty);
    for len in (shortest..bound.len()).rev() {
        templates.push(Template::literal(joined(prefix, &bound[..len])));
    }
    templates
}

/// `prefix · r` for every `r > bound`: the larger-character shapes by
/// increasing offset, then the one-character-or-more extensions of `bound`.
fn greater_suffix(
    prefix: &[char],
    bound: &[char],
    positions: &[usize],
    alphabet_len: usize,
) -> Vec<Template> {
    let mut templates: Vec<Template> = positions
        .iter()
        .enumerate()
        .filter(|(_, &pos)| pos + 1 < alphabet_len)
        .map(|(offset, &pos)| {
            Template::class(joined(prefix, &bound[..offset]), pos + 1, alphabet_len, Pick::Low)
        })
        .collect();
    templates.push(Template::extension(joined(prefix, bound)));
    templates
}

/// Matcher state: one slot per template (language) or the progress through an
/// excluded word (`None` once the input left the word).
pub(crate) type MatchState = Vec<Option<u32>>;

/// Automaton view of a string constraint.
#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    Language(Language),
    Exclude(Vec<char>),
}

impl Matcher {
    pub(crate) fn start(&self) -> MatchState {
        match self {
            Matcher::Language(language) => vec![Some(0); language.templates.len()],
            Matcher::Exclude(_) => vec![Some(0)],
        }
    }

    pub(crate) fn is_dead(&self, state: &MatchState) -> bool {
        match self {
            Matcher::Language(_) => state.iter().all(Option::is_none),
            Matcher::Exclude(_) => false,
        }
    }

    pub(crate) fn step(&self, state: &MatchState, ch: char, alphabet: &Alphabet) -> Option<MatchState> {
        match self {
            Matcher::Language(language) => {
                let next: MatchState = language
                    .templates
                    .iter()
                    .zip(state.iter())
                    .map(|(template, slot)| slot.and_then(|s| template.step(s, ch, alphabet)))
                    .collect();
                (!self.is_dead(&next)).then_some(next)
            }
            Matcher::Exclude(word) => {
                let next = state[0].and_then(|k| {
                    let k = k as usize;
                    (k < word.len() && word[k] == ch).then_some(k as u32 + 1)
                });
                Some(vec![next])
            }
        }
    }

    pub(crate) fn accepts(&self, state: &MatchState) -> bool {
        match self {
            Matcher::Language(language) => language
                .templates
                .iter()
                .zip(state.iter())
                .any(|(template, slot)| slot.is_some_and(|s| template.accepts(s))),
            Matcher::Exclude(word) => state[0] != Some(word.len() as u32),
        }
    }

    /// Runs the matcher over a whole string.
    pub(crate) fn matches(&self, value: &str, alphabet: &Alphabet) -> bool {
        let mut state = self.start();
        if self.is_dead(&state) {
            return false;
        }
        for ch in value.chars() {
            match self.step(&state, ch, alphabet) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.accepts(&state)
    }
}
