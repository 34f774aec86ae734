use serde::{Deserialize, Serialize};
use splice_core::{ErrorInfo, SpliceError};

use crate::domain::Alphabet;

/// YAML-configurable parameters governing synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Characters a synthesized string may contain, in any order.
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
    /// Maximum length of a synthesized string.
    #[serde(default = "default_max_string_len")]
    pub max_string_len: usize,
    /// Width of the bit-vector domain used when none is implied by a type.
    #[serde(default = "default_bitvec_width")]
    pub bitvec_width: u32,
    /// Upper limit on candidates or search nodes explored by a single solve.
    #[serde(default = "default_search_budget")]
    pub search_budget: u64,
    /// What containers do when a position has no neighbour to bound it.
    #[serde(default)]
    pub unbounded: UnboundedPolicy,
}

fn default_alphabet() -> String {
    Alphabet::letters().as_string()
}

fn default_max_string_len() -> usize {
    50
}

fn default_bitvec_width() -> u32 {
    32
}

/// Search budget used when none is configured.
pub const DEFAULT_SEARCH_BUDGET: u64 = 200_000;

fn default_search_budget() -> u64 {
    DEFAULT_SEARCH_BUDGET
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
            max_string_len: default_max_string_len(),
            bitvec_width: default_bitvec_width(),
            search_budget: default_search_budget(),
            unbounded: UnboundedPolicy::default(),
        }
    }
}

impl SynthConfig {
    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<(), SpliceError> {
        self.alphabet()?;
        if self.max_string_len == 0 {
            return Err(SpliceError::Config(ErrorInfo::new(
                "invalid-max-length",
                "max_string_len must be at least 1",
            )));
        }
        if !(1..=64).contains(&self.bitvec_width) {
            return Err(SpliceError::Config(
                ErrorInfo::new("invalid-bitvec-width", "bit-vector width must be in 1..=64")
                    .with_context("width", self.bitvec_width.to_string()),
            ));
        }
        if self.search_budget == 0 {
            return Err(SpliceError::Config(ErrorInfo::new(
                "invalid-search-budget",
                "search_budget must be positive",
            )));
        }
        Ok(())
    }

    /// Parses the configured alphabet.
    pub fn alphabet(&self) -> Result<Alphabet, SpliceError> {
        Alphabet::new(&self.alphabet)
    }
}

/// Behaviour when no structural bound constrains a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnboundedPolicy {
    /// Re-write the current value flagged as synthesized.
    #[default]
    Reflag,
    /// Report that no replacement is possible.
    Reject,
}
