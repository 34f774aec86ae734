//! Bound-to-solver glue shared by every container.

use splice_core::SpliceError;
use splice_synth::{SynthConfig, Synthesizable, Synthesizer, UnboundedPolicy};
use tracing::debug;

/// What a container should do with the slot it asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome<T> {
    /// Write this value, flagged synthesized.
    Replace(T),
    /// Keep the value, flag it synthesized.
    Reflag,
    /// Leave the slot untouched and report failure.
    Unchanged,
}

impl<T> Outcome<T> {
    pub(crate) fn is_success(&self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }
}

/// Outcome when nothing in the structure constrains the slot.
pub(crate) fn unbounded<T>(config: &SynthConfig, container: &'static str) -> Outcome<T> {
    debug!(container, policy = ?config.unbounded, "no structural bound");
    match config.unbounded {
        UnboundedPolicy::Reflag => Outcome::Reflag,
        UnboundedPolicy::Reject => Outcome::Unchanged,
    }
}

/// Solves for a value strictly between the neighbours that exist.
///
/// A value different from `original` is preferred; `original` itself comes
/// back only when it is the single value that fits.
pub(crate) fn between<T: Synthesizable>(
    config: &SynthConfig,
    container: &'static str,
    original: &T,
    upper: Option<&T>,
    lower: Option<&T>,
) -> Result<Outcome<T>, SpliceError> {
    if upper.is_none() && lower.is_none() {
        return Ok(unbounded(config, container));
    }
    if let (Some(upper), Some(lower)) = (upper, lower) {
        if upper <= lower {
            debug!(container, "neighbours leave no room");
            return Ok(Outcome::Unchanged);
        }
    }
    let upper = upper.map(Synthesizable::to_value);
    let lower = lower.map(Synthesizable::to_value);
    let mut synth = Synthesizer::for_type::<T>(config)?;
    synth.bounded(upper.as_ref(), lower.as_ref())?;
    let fallback = synth.clone();
    synth.not_equal(&original.to_value())?;
    let solved = match synth.solve()? {
        Some(value) => Some(value),
        None => fallback.solve()?,
    };
    debug!(
        container,
        upper = upper.as_ref().map(ToString::to_string),
        lower = lower.as_ref().map(ToString::to_string),
        solved = solved.as_ref().map(ToString::to_string),
        "bounded synthesis"
    );
    Ok(solved
        .and_then(T::from_value)
        .map_or(Outcome::Unchanged, Outcome::Replace))
}
