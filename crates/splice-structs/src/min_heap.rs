use splice_core::{SpliceError, Untrusted};
use splice_synth::{SynthConfig, Synthesizable};
use tracing::debug;

use crate::synthesis::{self, Outcome};

/// Array-backed binary min-heap.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    items: Vec<Untrusted<T>>,
    synth: SynthConfig,
}

impl<T: Synthesizable> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn parent(index: usize) -> Option<usize> {
    index.checked_sub(1).map(|i| i / 2)
}

impl<T: Synthesizable> MinHeap<T> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::with_synth(SynthConfig::default())
    }

    /// Creates an empty heap that synthesizes under `synth`.
    pub fn with_synth(synth: SynthConfig) -> Self {
        Self {
            items: Vec::new(),
            synth,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Smallest element.
    pub fn peek(&self) -> Option<&Untrusted<T>> {
        self.items.first()
    }

    /// Element at array position `index`.
    pub fn get(&self, index: usize) -> Option<&Untrusted<T>> {
        self.items.get(index)
    }

    /// Backing array in heap order.
    pub fn as_slice(&self) -> &[Untrusted<T>] {
        &self.items
    }

    /// Elements in array order.
    pub fn iter(&self) -> impl Iterator<Item = &Untrusted<T>> + '_ {
        self.items.iter()
    }

    /// Adds an element.
    pub fn push(&mut self, value: Untrusted<T>) {
        self.items.push(value);
        let mut idx = self.items.len() - 1;
        while let Some(up) = parent(idx) {
            if self.items[idx] >= self.items[up] {
                break;
            }
            self.items.swap(idx, up);
            idx = up;
        }
    }

    /// Removes and returns the smallest element.
    pub fn pop(&mut self) -> Option<Untrusted<T>> {
        if self.items.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        let len = self.items.len();
        let mut idx = 0;
        loop {
            let mut smallest = idx;
            for child in [2 * idx + 1, 2 * idx + 2] {
                if child < len && self.items[child] < self.items[smallest] {
                    smallest = child;
                }
            }
            if smallest == idx {
                break;
            }
            self.items.swap(idx, smallest);
            idx = smallest;
        }
        Some(top)
    }

    /// Replaces the element at `index` with a synthesized value strictly
    /// between its parent and its smaller child. The heap is not re-ordered.
    pub fn synthesize(&mut self, index: usize) -> Result<bool, SpliceError> {
        if index >= self.items.len() {
            return Err(SpliceError::index_out_of_range("min-heap", index, self.items.len()));
        }
        let lower = parent(index).map(|p| self.items[p].raw());
        let upper = [2 * index + 1, 2 * index + 2]
            .into_iter()
            .filter_map(|child| self.items.get(child))
            .map(Untrusted::raw)
            .min();
        let original = self.items[index].raw();
        let outcome = synthesis::between(&self.synth, "min-heap", original, upper, lower)?;
        debug!(index, success = outcome.is_success(), "heap synthesis");
        match outcome {
            Outcome::Replace(value) => {
                self.items[index] = Untrusted::synthesized(value);
                Ok(true)
            }
            Outcome::Reflag => {
                self.items[index].mark_synthesized();
                Ok(true)
            }
            Outcome::Unchanged => Ok(false),
        }
    }
}
