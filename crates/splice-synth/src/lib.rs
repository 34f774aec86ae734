#![deny(missing_docs)]
#![doc = include_str!("../docs/synthesis-api.md")]

/// YAML configuration schema and defaults.
pub mod config;
/// Domains, alphabets, and concrete values.
pub mod domain;
mod scalar;
mod string;
/// Constraint accumulation and solving entry points.
pub mod synthesizer;
/// Element types the containers can synthesize.
pub mod synthesizable;
mod template;
/// Symbolic terms for `equals_under`.
pub mod term;

pub use config::{SynthConfig, UnboundedPolicy, DEFAULT_SEARCH_BUDGET};
pub use domain::{Alphabet, Domain, Value};
pub use synthesizable::{SymbolicHash, Synthesizable};
pub use synthesizer::Synthesizer;
pub use term::{Symbol, Term};
