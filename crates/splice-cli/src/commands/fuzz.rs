use std::cmp::Ordering;
use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use rand::Rng;
use serde::Serialize;
use splice_core::{RngHandle, SpliceError};
use splice_synth::{Alphabet, Domain, Synthesizer, Value};
use tracing::warn;

use super::emit;
use crate::config::SpliceConfig;

#[derive(Args, Debug)]
pub struct FuzzArgs {
    /// Master seed; each domain draws from its own substream.
    #[arg(long, default_value_t = 2024)]
    pub seed: u64,
    /// Bound pairs checked per domain.
    #[arg(long, default_value_t = 1000)]
    pub rounds: usize,
    /// Optional YAML configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct DomainSummary {
    domain: &'static str,
    checked: usize,
    solved: usize,
    unsat: usize,
    violations: Vec<String>,
}

impl DomainSummary {
    fn new(domain: &'static str) -> Self {
        Self {
            domain,
            ..Self::default()
        }
    }

    fn record(
        &mut self,
        upper: &Value,
        lower: &Value,
        solved: Option<Value>,
        inside: impl Fn(&Value) -> bool,
        no_room: bool,
    ) {
        self.checked += 1;
        match solved {
            Some(value) => {
                self.solved += 1;
                if !inside(&value) {
                    warn!(
                        domain = self.domain,
                        %lower,
                        %value,
                        %upper,
                        "solution escaped its bounds"
                    );
                    self.violations.push(format!("{lower} < {value} < {upper} does not hold"));
                }
            }
            None => {
                self.unsat += 1;
                if !no_room {
                    warn!(domain = self.domain, %lower, %upper, "no solution despite room");
                    self.violations.push(format!("no value found between {lower} and {upper}"));
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct FuzzSummary {
    seed: u64,
    rounds: usize,
    domains: Vec<DomainSummary>,
    violations: usize,
}

fn ordered<T: Ord>(a: T, b: T) -> (T, T) {
    if a < b {
        (b, a)
    } else {
        (a, b)
    }
}

pub fn run(args: &FuzzArgs) -> Result<(), Box<dyn Error>> {
    let config = SpliceConfig::load(args.config.as_deref())?;
    let width = config.synth.bitvec_width;
    let alphabet = config.synth.alphabet()?;
    let budget = config.synth.search_budget;

    let domains = vec![
        fuzz_int(args, budget)?,
        fuzz_bits(args, width, budget)?,
        fuzz_str(args, &alphabet, config.synth.max_string_len, budget)?,
    ];
    let violations = domains.iter().map(|d| d.violations.len()).sum();
    emit(&FuzzSummary {
        seed: args.seed,
        rounds: args.rounds,
        domains,
        violations,
    })?;
    if violations > 0 {
        return Err(format!("{violations} bounded synthesis violations").into());
    }
    Ok(())
}

fn fuzz_int(args: &FuzzArgs, budget: u64) -> Result<DomainSummary, SpliceError> {
    let mut rng = RngHandle::substream(args.seed, 1);
    let mut synth = Synthesizer::new(Domain::Int).with_budget(budget);
    let mut summary = DomainSummary::new("int");
    while summary.checked < args.rounds {
        let a: i64 = rng.gen_range(-1_000_000..1_000_000);
        let b: i64 = if rng.gen_bool(0.1) { a + 1 } else { rng.gen() };
        if a == b {
            continue;
        }
        let (upper, lower) = ordered(a, b);
        let (upper, lower) = (Value::Int(upper), Value::Int(lower));
        synth.reset();
        let solved = synth.bounded_synthesis(Some(&upper), Some(&lower))?;
        let no_room = i128::from(a).abs_diff(i128::from(b)) == 1;
        summary.record(&upper, &lower, solved, |v| strictly_between(v, &upper, &lower), no_room);
    }
    Ok(summary)
}

fn fuzz_bits(args: &FuzzArgs, width: u32, budget: u64) -> Result<DomainSummary, SpliceError> {
    let mut rng = RngHandle::substream(args.seed, 2);
    let mut synth = Synthesizer::new(Domain::bitvec(width)?).with_budget(budget);
    let mask = u64::MAX >> (64 - width);
    let mut summary = DomainSummary::new("bitvec");
    while summary.checked < args.rounds {
        let a = rng.gen::<u64>() & mask;
        let b = if rng.gen_bool(0.1) {
            a.saturating_add(1).min(mask)
        } else {
            rng.gen::<u64>() & mask
        };
        if a == b {
            continue;
        }
        let (upper, lower) = ordered(a, b);
        let no_room = upper - lower == 1;
        let (upper, lower) = (Value::Bits(upper), Value::Bits(lower));
        synth.reset();
        let solved = synth.bounded_synthesis(Some(&upper), Some(&lower))?;
        summary.record(&upper, &lower, solved, |v| strictly_between(v, &upper, &lower), no_room);
    }
    Ok(summary)
}

fn random_word(rng: &mut RngHandle, alphabet: &Alphabet, max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len.min(8));
    (0..len)
        .map(|_| alphabet.char_at(rng.gen_range(0..alphabet.len())))
        .collect()
}

fn fuzz_str(
    args: &FuzzArgs,
    alphabet: &Alphabet,
    max_len: usize,
    budget: u64,
) -> Result<DomainSummary, SpliceError> {
    let mut rng = RngHandle::substream(args.seed, 3);
    let mut synth = Synthesizer::new(Domain::string(alphabet.clone(), max_len)).with_budget(budget);
    let mut summary = DomainSummary::new("str");
    while summary.checked < args.rounds {
        let a = random_word(&mut rng, alphabet, max_len);
        let b = if rng.gen_bool(0.2) && a.chars().count() < max_len {
            let mut b = a.clone();
            b.push(alphabet.char_at(rng.gen_range(0..alphabet.len())));
            b
        } else {
            random_word(&mut rng, alphabet, max_len)
        };
        if a == b {
            continue;
        }
        let (upper, lower) = ordered(a, b);
        let mut successor = lower.clone();
        successor.push(alphabet.first());
        // At the length cap no extension of `lower` fits.
        let no_room = upper == successor || lower.chars().count() >= max_len;
        let (upper, lower) = (Value::Str(upper), Value::Str(lower));
        synth.reset();
        let solved = synth.bounded_synthesis(Some(&upper), Some(&lower))?;
        let inside = |v: &Value| {
            strictly_between(v, &upper, &lower)
                && matches!(v, Value::Str(s) if s.chars().all(|ch| alphabet.contains(ch)))
        };
        summary.record(&upper, &lower, solved, inside, no_room);
    }
    Ok(summary)
}

fn strictly_between(value: &Value, upper: &Value, lower: &Value) -> bool {
    value.compare(lower) == Some(Ordering::Greater) && value.compare(upper) == Some(Ordering::Less)
}
