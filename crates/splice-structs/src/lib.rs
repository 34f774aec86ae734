#![deny(missing_docs)]
#![doc = include_str!("../docs/containers.md")]

/// Binary search tree in value or key/value mode.
pub mod bst;
/// Container sizing configuration.
pub mod config;
/// Fixed-bucket hash table with hash-preserving key synthesis.
pub mod hash_table;
/// Packed sorted integer set with width upgrades.
pub mod int_set;
/// Array-backed binary min-heap.
pub mod min_heap;
/// Segmented sorted sequence.
pub mod sorted_seq;
mod synthesis;

pub use bst::{ByKey, ByValue, NodeId, SearchTree, TreeMode};
pub use config::ContainerConfig;
pub use hash_table::HashTable;
pub use int_set::{Encoding, IntSet};
pub use min_heap::MinHeap;
pub use sorted_seq::SortedSeq;
