use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::Serialize;
use splice_core::{ErrorInfo, SpliceError};
use splice_synth::{Domain, Synthesizer, Value};
use tracing::debug;

use super::emit;
use crate::config::SpliceConfig;

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Domain to synthesize in.
    #[arg(value_enum)]
    pub domain: DomainArg,
    /// Exclusive lower bound.
    #[arg(long, allow_hyphen_values = true)]
    pub lower: Option<String>,
    /// Exclusive upper bound.
    #[arg(long, allow_hyphen_values = true)]
    pub upper: Option<String>,
    /// Optional YAML configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DomainArg {
    /// Signed 64-bit integers.
    Int,
    /// Unsigned bit-vectors of the configured width.
    Bits,
    /// Strings over the configured alphabet.
    Str,
}

#[derive(Debug, Serialize)]
struct SynthReport {
    domain: &'static str,
    lower: Option<Value>,
    upper: Option<Value>,
    value: Option<Value>,
    satisfiable: bool,
}

pub fn run(args: &SynthArgs) -> Result<(), Box<dyn Error>> {
    let config = SpliceConfig::load(args.config.as_deref())?;
    let domain = match args.domain {
        DomainArg::Int => Domain::Int,
        DomainArg::Bits => Domain::bitvec(config.synth.bitvec_width)?,
        DomainArg::Str => Domain::string(config.synth.alphabet()?, config.synth.max_string_len),
    };
    let lower = args
        .lower
        .as_deref()
        .map(|raw| parse_bound(args.domain, raw))
        .transpose()?;
    let upper = args
        .upper
        .as_deref()
        .map(|raw| parse_bound(args.domain, raw))
        .transpose()?;

    let mut synth = Synthesizer::new(domain)
        .with_budget(config.synth.search_budget)
        .allow_unbounded();
    let value = synth.bounded_synthesis(upper.as_ref(), lower.as_ref())?;
    debug!(constraints = synth.constraint_count(), solved = value.is_some(), "one-shot synthesis");
    emit(&SynthReport {
        domain: synth.domain().name(),
        satisfiable: value.is_some(),
        lower,
        upper,
        value,
    })?;
    Ok(())
}

fn parse_bound(domain: DomainArg, raw: &str) -> Result<Value, SpliceError> {
    let invalid = |expected: &str| {
        SpliceError::Config(
            ErrorInfo::new("invalid-bound", format!("expected {expected}"))
                .with_context("bound", raw),
        )
    };
    match domain {
        DomainArg::Int => raw.parse().map(Value::Int).map_err(|_| invalid("an integer")),
        DomainArg::Bits => raw
            .parse()
            .map(Value::Bits)
            .map_err(|_| invalid("an unsigned integer")),
        DomainArg::Str => Ok(Value::Str(raw.to_string())),
    }
}
