use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use splice_core::{SpliceError, Untrusted};
use splice_synth::{SynthConfig, Synthesizable};
use tracing::debug;

use crate::synthesis::{self, Outcome};

/// Identifier of a node inside a [`SearchTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates an identifier from its raw representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw representation.
    pub fn as_raw(&self) -> u64 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ordering discipline of a tree, fixed by its type.
pub trait TreeMode {
    /// Type the tree is ordered by.
    type Key: Synthesizable;
    /// Payload carried next to each key.
    type Value;
    /// Whether a synthesized key drops its payload.
    const CLEARS_VALUE: bool;
}

/// Tree ordered by the stored values themselves.
#[derive(Debug)]
pub struct ByValue<T>(PhantomData<T>);

/// Tree ordered by explicit keys carrying separate values.
#[derive(Debug)]
pub struct ByKey<K, V>(PhantomData<(K, V)>);

impl<T: Synthesizable> TreeMode for ByValue<T> {
    type Key = T;
    type Value = ();
    const CLEARS_VALUE: bool = false;
}

impl<K: Synthesizable, V> TreeMode for ByKey<K, V> {
    type Key = K;
    type Value = V;
    const CLEARS_VALUE: bool = true;
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: Untrusted<K>,
    value: Option<V>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Unbalanced binary search tree stored in an arena.
///
/// Keys are unique. Deleting a node with two children moves its in-order
/// successor into its slot, so node identifiers of other entries may start
/// referring to different keys after a delete.
pub struct SearchTree<M: TreeMode> {
    nodes: Vec<Option<Node<M::Key, M::Value>>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
    synth: SynthConfig,
}

impl<M: TreeMode> fmt::Debug for SearchTree<M>
where
    M::Key: fmt::Debug,
    M::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchTree")
            .field("root", &self.root)
            .field("len", &self.len)
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<M: TreeMode> Default for SearchTree<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TreeMode> SearchTree<M> {
    /// Creates an empty tree with the default synthesis configuration.
    pub fn new() -> Self {
        Self::with_synth(SynthConfig::default())
    }

    /// Creates an empty tree that synthesizes under `synth`.
    pub fn with_synth(synth: SynthConfig) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            synth,
        }
    }

    /// Root node, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, id: NodeId) -> Result<&Node<M::Key, M::Value>, SpliceError> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| SpliceError::index_out_of_range("search-tree", id.index(), self.nodes.len()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<M::Key, M::Value>, SpliceError> {
        let slots = self.nodes.len();
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| SpliceError::index_out_of_range("search-tree", id.index(), slots))
    }

    // Internal links always point at live nodes.
    fn at(&self, id: NodeId) -> &Node<M::Key, M::Value> {
        match &self.nodes[id.index()] {
            Some(node) => node,
            None => unreachable!("dangling link to {id:?}"),
        }
    }

    fn at_mut(&mut self, id: NodeId) -> &mut Node<M::Key, M::Value> {
        match &mut self.nodes[id.index()] {
            Some(node) => node,
            None => unreachable!("dangling link to {id:?}"),
        }
    }

    /// Key of a node.
    pub fn key(&self, id: NodeId) -> Result<&Untrusted<M::Key>, SpliceError> {
        Ok(&self.node(id)?.key)
    }

    /// Payload of a node; `None` once a keyed node was synthesized.
    pub fn value(&self, id: NodeId) -> Result<Option<&M::Value>, SpliceError> {
        Ok(self.node(id)?.value.as_ref())
    }

    /// Node holding `raw`.
    pub fn find(&self, raw: &M::Key) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = self.at(id);
            cursor = match raw.cmp(node.key.raw()) {
                Ordering::Equal => return Some(id),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Payload stored under `raw`.
    pub fn get(&self, raw: &M::Key) -> Option<&M::Value> {
        self.find(raw).and_then(|id| self.at(id).value.as_ref())
    }

    fn allocate(&mut self, node: Node<M::Key, M::Value>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                NodeId::from_raw((self.nodes.len() - 1) as u64)
            }
        }
    }

    fn insert_entry(&mut self, key: Untrusted<M::Key>, value: M::Value) -> bool {
        let mut parent: Option<(NodeId, Ordering)> = None;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = self.at(id);
            let order = key.raw().cmp(node.key.raw());
            cursor = match order {
                Ordering::Equal => return false,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
            parent = Some((id, order));
        }
        let id = self.allocate(Node {
            key,
            value: Some(value),
            left: None,
            right: None,
        });
        match parent {
            None => self.root = Some(id),
            Some((parent, Ordering::Less)) => self.at_mut(parent).left = Some(id),
            Some((parent, _)) => self.at_mut(parent).right = Some(id),
        }
        self.len += 1;
        true
    }

    fn set_link(&mut self, parent: Option<(NodeId, bool)>, child: Option<NodeId>) {
        match parent {
            None => self.root = child,
            Some((parent, true)) => self.at_mut(parent).left = child,
            Some((parent, false)) => self.at_mut(parent).right = child,
        }
    }

    fn release(&mut self, id: NodeId) -> Node<M::Key, M::Value> {
        self.free.push(id);
        match self.nodes[id.index()].take() {
            Some(node) => node,
            None => unreachable!("double release of {id:?}"),
        }
    }

    /// Removes the entry stored under `raw`.
    pub fn delete(&mut self, raw: &M::Key) -> bool {
        // (parent, is_left_child)
        let mut parent: Option<(NodeId, bool)> = None;
        let mut cursor = self.root;
        let target = loop {
            let Some(id) = cursor else {
                return false;
            };
            let node = self.at(id);
            match raw.cmp(node.key.raw()) {
                Ordering::Equal => break id,
                Ordering::Less => {
                    parent = Some((id, true));
                    cursor = node.left;
                }
                Ordering::Greater => {
                    parent = Some((id, false));
                    cursor = node.right;
                }
            }
        };

        let (left, right) = {
            let node = self.at(target);
            (node.left, node.right)
        };
        match (left, right) {
            (None, child) | (child, None) => {
                self.set_link(parent, child);
                self.release(target);
            }
            (Some(_), Some(right)) => {
                let mut succ_parent = (target, false);
                let mut succ = right;
                while let Some(next) = self.at(succ).left {
                    succ_parent = (succ, true);
                    succ = next;
                }
                let succ_right = self.at(succ).right;
                self.set_link(Some(succ_parent), succ_right);
                let moved = self.release(succ);
                let node = self.at_mut(target);
                node.key = moved.key;
                node.value = moved.value;
            }
        }
        self.len -= 1;
        true
    }

    /// Node identifiers in ascending key order.
    pub fn in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut cursor = self.root;
        while cursor.is_some() || !stack.is_empty() {
            while let Some(id) = cursor {
                stack.push(id);
                cursor = self.at(id).left;
            }
            if let Some(id) = stack.pop() {
                out.push(id);
                cursor = self.at(id).right;
            }
        }
        out
    }

    fn extreme(&self, mut id: NodeId, leftmost: bool) -> NodeId {
        loop {
            let node = self.at(id);
            let next = if leftmost { node.left } else { node.right };
            match next {
                Some(next) => id = next,
                None => return id,
            }
        }
    }

    /// In-order predecessor and successor keys of a node.
    fn neighbours(&self, id: NodeId) -> (Option<&M::Key>, Option<&M::Key>) {
        let node = self.at(id);
        let mut lower = node.left.map(|left| self.extreme(left, false));
        let mut upper = node.right.map(|right| self.extreme(right, true));
        if lower.is_none() || upper.is_none() {
            let raw = node.key.raw();
            let mut from_above = (None, None);
            let mut cursor = self.root;
            while let Some(current) = cursor {
                if current == id {
                    break;
                }
                let here = self.at(current);
                if raw < here.key.raw() {
                    from_above.1 = Some(current);
                    cursor = here.left;
                } else {
                    from_above.0 = Some(current);
                    cursor = here.right;
                }
            }
            lower = lower.or(from_above.0);
            upper = upper.or(from_above.1);
        }
        (
            lower.map(|id| self.at(id).key.raw()),
            upper.map(|id| self.at(id).key.raw()),
        )
    }

    /// Replaces the key of `id` with a synthesized one that keeps the whole
    /// tree ordered.
    ///
    /// `Ok(false)` means no such key exists and the tree is unchanged.
    pub fn synthesize(&mut self, id: NodeId) -> Result<bool, SpliceError> {
        self.node(id)?;
        let (lower, upper) = self.neighbours(id);
        let original = self.at(id).key.raw();
        let outcome = synthesis::between(&self.synth, "search-tree", original, upper, lower)?;
        debug!(node = id.as_raw(), success = outcome.is_success(), "tree synthesis");
        let node = self.node_mut(id)?;
        match outcome {
            Outcome::Replace(key) => {
                node.key = Untrusted::synthesized(key);
                if M::CLEARS_VALUE {
                    node.value = None;
                }
                Ok(true)
            }
            Outcome::Reflag => {
                node.key.mark_synthesized();
                Ok(true)
            }
            Outcome::Unchanged => Ok(false),
        }
    }
}

impl<T: Synthesizable> SearchTree<ByValue<T>> {
    /// Inserts a value; `false` when it is already present.
    pub fn insert(&mut self, value: Untrusted<T>) -> bool {
        self.insert_entry(value, ())
    }
}

impl<T: Synthesizable + fmt::Display> SearchTree<ByValue<T>> {
    /// Space-separated values in order.
    pub fn render(&self) -> String {
        self.in_order()
            .into_iter()
            .map(|id| self.at(id).key.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K: Synthesizable, V> SearchTree<ByKey<K, V>> {
    /// Inserts `key -> value`; `false` when the key is already present.
    pub fn insert(&mut self, key: Untrusted<K>, value: V) -> bool {
        self.insert_entry(key, value)
    }
}

impl<K: Synthesizable + fmt::Display, V: fmt::Display> SearchTree<ByKey<K, V>> {
    /// Space-separated `key(value)` pairs in key order.
    pub fn render(&self) -> String {
        self.in_order()
            .into_iter()
            .map(|id| {
                let node = self.at(id);
                match &node.value {
                    Some(value) => format!("{}({value})", node.key),
                    None => format!("{}(-)", node.key),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
