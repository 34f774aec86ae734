use splice_core::{SpliceError, Untrusted};
use splice_synth::{SynthConfig, Synthesizable};
use tracing::debug;

use crate::config::ContainerConfig;
use crate::synthesis::{self, Outcome};

/// Non-decreasing, index-addressable sequence kept as a list of sorted runs.
///
/// Each run caches its maximum so lookups bisect over the maxima first and
/// then inside one run.
#[derive(Debug, Clone)]
pub struct SortedSeq<T> {
    runs: Vec<Vec<Untrusted<T>>>,
    maxes: Vec<T>,
    len: usize,
    load: usize,
    synth: SynthConfig,
}

impl<T: Synthesizable> Default for SortedSeq<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Synthesizable> SortedSeq<T> {
    /// Creates an empty sequence with default sizing and synthesis settings.
    pub fn new() -> Self {
        Self {
            runs: Vec::new(),
            maxes: Vec::new(),
            len: 0,
            load: ContainerConfig::default().segment_load,
            synth: SynthConfig::default(),
        }
    }

    /// Creates an empty sequence from explicit configuration.
    pub fn with_config(config: &ContainerConfig, synth: SynthConfig) -> Result<Self, SpliceError> {
        config.validate()?;
        Ok(Self {
            runs: Vec::new(),
            maxes: Vec::new(),
            len: 0,
            load: config.segment_load,
            synth,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts after any equal elements.
    pub fn insert(&mut self, value: Untrusted<T>) {
        if self.runs.is_empty() {
            self.maxes.push(value.raw().clone());
            self.runs.push(vec![value]);
            self.len = 1;
            return;
        }
        let mut run = self.maxes.partition_point(|max| max <= value.raw());
        if run == self.runs.len() {
            run -= 1;
            self.runs[run].push(value);
        } else {
            let items = &mut self.runs[run];
            let at = items.partition_point(|item| item.raw() <= value.raw());
            items.insert(at, value);
        }
        self.len += 1;
        self.refresh_max(run);
        self.split_if_full(run);
    }

    fn refresh_max(&mut self, run: usize) {
        if let Some(last) = self.runs[run].last() {
            self.maxes[run] = last.raw().clone();
        }
    }

    fn split_if_full(&mut self, run: usize) {
        if self.runs[run].len() <= 2 * self.load {
            return;
        }
        let tail = self.runs[run].split_off(self.load);
        self.runs.insert(run + 1, tail);
        self.maxes.insert(run + 1, self.maxes[run].clone());
        self.refresh_max(run);
        self.refresh_max(run + 1);
    }

    /// Run and offset of the leftmost element equal to `raw`.
    fn seek(&self, raw: &T) -> Option<(usize, usize)> {
        let run = self.maxes.partition_point(|max| max < raw);
        let items = self.runs.get(run)?;
        let at = items.partition_point(|item| item.raw() < raw);
        (items.get(at)?.raw() == raw).then_some((run, at))
    }

    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        let mut rest = index;
        for (run, items) in self.runs.iter().enumerate() {
            if rest < items.len() {
                return Some((run, rest));
            }
            rest -= items.len();
        }
        None
    }

    fn locate_or_err(&self, index: usize) -> Result<(usize, usize), SpliceError> {
        self.locate(index)
            .ok_or_else(|| SpliceError::index_out_of_range("sorted-seq", index, self.len))
    }

    /// Removes one element equal to `raw`.
    pub fn remove(&mut self, raw: &T) -> bool {
        let Some((run, at)) = self.seek(raw) else {
            return false;
        };
        self.runs[run].remove(at);
        self.len -= 1;
        if self.runs[run].is_empty() {
            self.runs.remove(run);
            self.maxes.remove(run);
        } else {
            self.refresh_max(run);
        }
        true
    }

    /// Whether an element equal to `raw` is present.
    pub fn contains(&self, raw: &T) -> bool {
        self.seek(raw).is_some()
    }

    /// Index of the leftmost element equal to `raw`.
    pub fn index_of(&self, raw: &T) -> Option<usize> {
        let (run, at) = self.seek(raw)?;
        Some(self.runs[..run].iter().map(Vec::len).sum::<usize>() + at)
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<&Untrusted<T>> {
        let (run, at) = self.locate(index)?;
        Some(&self.runs[run][at])
    }

    /// Elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &Untrusted<T>> + '_ {
        self.runs.iter().flatten()
    }

    /// Raw values in order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().map(|item| item.raw().clone()).collect()
    }

    /// Overwrites the element at `index` without re-sorting.
    ///
    /// The caller is trusted to keep the sequence non-decreasing.
    pub fn replace_at(&mut self, index: usize, value: Untrusted<T>) -> Result<(), SpliceError> {
        let (run, at) = self.locate_or_err(index)?;
        let is_last = at + 1 == self.runs[run].len();
        self.runs[run][at] = value;
        if is_last {
            self.refresh_max(run);
        }
        Ok(())
    }

    /// Replaces the element at `index` with a synthesized value that keeps
    /// the order strict with respect to its neighbours.
    pub fn synthesize(&mut self, index: usize) -> Result<bool, SpliceError> {
        let (run, at) = self.locate_or_err(index)?;
        let lower = index.checked_sub(1).and_then(|i| self.get(i)).map(Untrusted::raw);
        let upper = self.get(index + 1).map(Untrusted::raw);
        let original = self.runs[run][at].raw();
        let outcome = synthesis::between(&self.synth, "sorted-seq", original, upper, lower)?;
        debug!(index, success = outcome.is_success(), "sorted sequence synthesis");
        match outcome {
            Outcome::Replace(value) => {
                self.replace_at(index, Untrusted::synthesized(value))?;
                Ok(true)
            }
            Outcome::Reflag => {
                self.runs[run][at].mark_synthesized();
                Ok(true)
            }
            Outcome::Unchanged => Ok(false),
        }
    }
}
