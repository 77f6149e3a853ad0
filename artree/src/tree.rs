//! Adaptive Radix Tree implementation.
//!
//! This module contains the main [`AdaptiveRadixTree`] engine: search, insert and delete over
//! the four inner node kinds, plus the entry points into traversal.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use tracing::{debug, trace};

use crate::alloc::NodePool;
use crate::config::TreeConfig;
use crate::cursor::TreeIterator;
use crate::iter::{Filter, Iter, Keys, NodeIter, NodeRef, Order, Values};
use crate::node::{Leaf, Node};
use crate::prefix::Prefix;
use crate::stats::{update_tree_stats, TreeStats, TreeStatsTrait};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// An Adaptive Radix Tree (ART) - an ordered map from byte-string keys to values.
///
/// Inner nodes adapt their layout to how many children they have (4, 16, 48 or 256 slots) and
/// skip over runs of bytes shared by every key beneath them. Keys may be empty, may contain
/// zero bytes, and may be prefixes of one another.
///
/// ```rust
/// use artree::{AdaptiveRadixTree, Filter, Order};
///
/// let mut tree = AdaptiveRadixTree::new();
/// tree.insert("apple", 1);
/// tree.insert("application", 2);
/// tree.insert("banana", 3);
///
/// assert_eq!(tree.get("apple"), Some(&1));
/// assert_eq!(tree.insert("apple", 10), Some(1));
///
/// let mut apps = vec![];
/// tree.for_each_prefix("app", |node| {
///     apps.push(node.key().unwrap_or_default().to_vec());
///     true
/// });
/// assert_eq!(apps, vec![b"apple".to_vec(), b"application".to_vec()]);
///
/// let keys: Vec<&[u8]> = tree.keys().collect();
/// assert_eq!(keys, vec![&b"apple"[..], b"application", b"banana"]);
///
/// let leaves = tree.nodes(Filter::Leaves, Order::Reverse).count();
/// assert_eq!(leaves, 3);
/// ```
pub struct AdaptiveRadixTree<V> {
    root: Option<Node<V>>,
    size: usize,
    version: u64,
    id: u64,
    config: TreeConfig,
    pool: NodePool<V>,
}

impl<V> Default for AdaptiveRadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> AdaptiveRadixTree<V> {
    /// Create a new, empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        let id = NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed);
        debug!(id, node_pool_capacity = config.node_pool_capacity, "created tree");
        Self {
            root: None,
            size: 0,
            version: 0,
            id,
            config,
            pool: NodePool::new(config.node_pool_capacity),
        }
    }

    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The structural version. It moves on every insert of a new key and every delete, and is
    /// left alone by value updates.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Retired inner nodes currently held for reuse.
    pub fn pooled_nodes(&self) -> usize {
        self.pool.len()
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn root_node(&self) -> Option<&Node<V>> {
        self.root.as_ref()
    }

    /// Get a reference to the value associated with a key.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&V> {
        let key = key.as_ref();
        let mut node = self.root.as_ref()?;
        let mut depth = 0;
        loop {
            if let Node::Leaf(leaf) = node {
                return (*leaf.key == *key).then_some(&leaf.value);
            }
            let prefix = node.prefix()?;
            if !prefix.matches_stored(key, depth) {
                return None;
            }
            depth += prefix.len();
            let edge = key.get(depth).copied();
            node = node.find_child(edge)?;
            depth += usize::from(edge.is_some());
        }
    }

    /// Get a mutable reference to the value associated with a key. Changing the value does not
    /// count as a structural modification.
    pub fn get_mut<K: AsRef<[u8]>>(&mut self, key: K) -> Option<&mut V> {
        let key = key.as_ref();
        let mut node = self.root.as_mut()?;
        let mut depth = 0;
        loop {
            if let Node::Leaf(leaf) = node {
                return if *leaf.key == *key {
                    Some(&mut leaf.value)
                } else {
                    None
                };
            }
            let prefix = node.prefix()?;
            if !prefix.matches_stored(key, depth) {
                return None;
            }
            depth += prefix.len();
            let edge = key.get(depth).copied();
            node = node.find_child_mut(edge)?;
            depth += usize::from(edge.is_some());
        }
    }

    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Insert a key-value pair, returning the previous value if the key was already present.
    pub fn insert<K: AsRef<[u8]>>(&mut self, key: K, value: V) -> Option<V> {
        let key = key.as_ref();
        let old = match self.root.as_mut() {
            None => {
                self.root = Some(Node::new_leaf(key, value));
                None
            }
            Some(root) => Self::insert_recurse(root, key, value, 0, &mut self.pool),
        };
        if old.is_none() {
            self.size += 1;
            self.version += 1;
        }
        old
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Option<V> {
        let key = key.as_ref();
        let root = self.root.as_mut()?;
        let removed = if root.is_leaf() {
            if root.as_leaf().is_some_and(|leaf| *leaf.key != *key) {
                return None;
            }
            match self.root.take() {
                Some(Node::Leaf(leaf)) => {
                    let Leaf { value, .. } = *leaf;
                    Some(value)
                }
                _ => None,
            }
        } else {
            Self::remove_recurse(root, key, 0, &mut self.pool)
        };
        if removed.is_some() {
            self.size -= 1;
            self.version += 1;
        }
        removed
    }

    /// The smallest key and its value.
    pub fn minimum(&self) -> Option<(&[u8], &V)> {
        let leaf = self.root.as_ref()?.minimum_leaf()?;
        Some((&leaf.key, &leaf.value))
    }

    /// The largest key and its value.
    pub fn maximum(&self) -> Option<(&[u8], &V)> {
        let leaf = self.root.as_ref()?.maximum_leaf()?;
        Some((&leaf.key, &leaf.value))
    }

    /// Drops every key. Counts as a structural modification when the tree was not empty.
    pub fn clear(&mut self) {
        if self.root.take().is_some() {
            self.version += 1;
        }
        self.size = 0;
    }

    /// Visits nodes in pre-order until `f` returns `false`.
    pub fn for_each<F>(&self, filter: Filter, order: Order, mut f: F)
    where
        F: FnMut(NodeRef<'_, V>) -> bool,
    {
        for node in self.nodes(filter, order) {
            if !f(node) {
                break;
            }
        }
    }

    /// Visits, in key order, every leaf whose key starts with `prefix`, until `f` returns
    /// `false`.
    pub fn for_each_prefix<K, F>(&self, prefix: K, mut f: F)
    where
        K: AsRef<[u8]>,
        F: FnMut(NodeRef<'_, V>) -> bool,
    {
        for node in self.prefix_iter(prefix) {
            if !f(node) {
                break;
            }
        }
    }

    /// The leaves whose keys start with `prefix`, in key order.
    pub fn prefix_iter<K: AsRef<[u8]>>(&self, prefix: K) -> NodeIter<'_, V> {
        NodeIter::new(
            self.prefix_root(prefix.as_ref()),
            Filter::Leaves,
            Order::Forward,
        )
    }

    /// A borrowing, pre-order node iterator.
    pub fn nodes(&self, filter: Filter, order: Order) -> NodeIter<'_, V> {
        NodeIter::new(self.root.as_ref(), filter, order)
    }

    /// A detached iterator that can outlive borrows of the tree and reports any structural
    /// modification made after it was created.
    pub fn iterator(&self, filter: Filter, order: Order) -> TreeIterator<V> {
        TreeIterator::new(self, filter, order)
    }

    /// Key/value pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self.root.as_ref(), Order::Forward)
    }

    /// Key/value pairs in descending key order.
    pub fn iter_rev(&self) -> Iter<'_, V> {
        Iter::new(self.root.as_ref(), Order::Reverse)
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, V> {
        Values::new(self.iter())
    }

    /// The highest node whose leaves all start with `prefix`, if there is one.
    fn prefix_root(&self, prefix: &[u8]) -> Option<&Node<V>> {
        let mut node = self.root.as_ref()?;
        let mut depth = 0;
        loop {
            if let Node::Leaf(leaf) = node {
                return leaf.key.starts_with(prefix).then_some(node);
            }
            if depth >= prefix.len() {
                return Some(node);
            }
            let node_prefix_len = node.prefix_len();
            let matched = node.prefix_mismatch(prefix, depth);
            if matched < node_prefix_len {
                // Either a real mismatch, or the query ends inside this node's prefix.
                return (depth + matched == prefix.len()).then_some(node);
            }
            depth += node_prefix_len;
            if depth >= prefix.len() {
                return Some(node);
            }
            node = node.find_child(Some(prefix[depth]))?;
            depth += 1;
        }
    }

    fn insert_recurse(
        node: &mut Node<V>,
        key: &[u8],
        value: V,
        depth: usize,
        pool: &mut NodePool<V>,
    ) -> Option<V> {
        if let Node::Leaf(leaf) = node {
            if *leaf.key == *key {
                return Some(mem::replace(&mut leaf.value, value));
            }

            // Two distinct keys now share this slot: branch at the first byte where they differ.
            let existing = leaf.key.get(depth..).unwrap_or_default();
            let incoming = key.get(depth..).unwrap_or_default();
            let lcp = existing
                .iter()
                .zip(incoming)
                .take_while(|(a, b)| a == b)
                .count();
            let split_depth = depth + lcp;
            let existing_edge = leaf.key.get(split_depth).copied();
            let incoming_edge = key.get(split_depth).copied();
            trace!(depth, prefix_len = lcp, "split leaf");

            let branch = Node::new_inner(Prefix::new(incoming, lcp), pool);
            let existing = mem::replace(node, branch);
            node.add_child(existing_edge, existing, pool);
            node.add_child(incoming_edge, Node::new_leaf(key, value), pool);
            return None;
        }

        let prefix_len = node.prefix_len();
        if prefix_len > 0 {
            let matched = node.prefix_mismatch(key, depth);
            if matched < prefix_len {
                Self::split_prefix(node, key, value, depth, matched, pool);
                return None;
            }
        }

        let depth = depth + prefix_len;
        let edge = key.get(depth).copied();
        let next_depth = depth + usize::from(edge.is_some());
        if let Some(child) = node.find_child_mut(edge) {
            return Self::insert_recurse(child, key, value, next_depth, pool);
        }
        node.add_child(edge, Node::new_leaf(key, value), pool);
        None
    }

    /// Puts a new Node4 above `node` holding the first `matched` bytes of its prefix, with the
    /// old node and a leaf for `key` below it.
    fn split_prefix(
        node: &mut Node<V>,
        key: &[u8],
        value: V,
        depth: usize,
        matched: usize,
        pool: &mut NodePool<V>,
    ) {
        let Some(old) = node.prefix().copied() else {
            unreachable!("split_prefix on a leaf");
        };
        let remaining = old.len() - matched - 1;

        // Past the stored bytes, the old node's prefix can only be read back from a leaf.
        let (edge, rest) = if old.is_truncated() {
            let Some(leaf) = node.minimum_leaf() else {
                unreachable!("inner node without leaves");
            };
            let at = depth + matched;
            (leaf.key[at], Prefix::new(&leaf.key[at + 1..], remaining))
        } else {
            (
                old.stored()[matched],
                Prefix::new(&old.stored()[matched + 1..], remaining),
            )
        };
        trace!(
            depth,
            split_at = matched,
            old_prefix_len = old.len(),
            "split prefix"
        );

        if let Some(prefix) = node.prefix_mut() {
            *prefix = rest;
        }
        let branch = Node::new_inner(Prefix::new(old.stored(), matched), pool);
        let existing = mem::replace(node, branch);
        node.add_child(Some(edge), existing, pool);
        node.add_child(
            key.get(depth + matched).copied(),
            Node::new_leaf(key, value),
            pool,
        );
    }

    fn remove_recurse(
        node: &mut Node<V>,
        key: &[u8],
        depth: usize,
        pool: &mut NodePool<V>,
    ) -> Option<V> {
        let prefix = node.prefix()?;
        if !prefix.matches_stored(key, depth) {
            return None;
        }
        let depth = depth + prefix.len();
        let edge = key.get(depth).copied();

        let leaf_matches = match node.find_child(edge)? {
            Node::Leaf(leaf) => Some(*leaf.key == *key),
            _ => None,
        };
        match leaf_matches {
            Some(false) => None,
            Some(true) => match node.delete_child(edge, pool)? {
                Node::Leaf(leaf) => {
                    let Leaf { value, .. } = *leaf;
                    Some(value)
                }
                _ => None,
            },
            None => {
                let child = node.find_child_mut(edge)?;
                Self::remove_recurse(child, key, depth + 1, pool)
            }
        }
    }

    fn get_tree_stats_recurse(node: &Node<V>, tree_stats: &mut TreeStats, height: usize) {
        if height > tree_stats.max_height {
            tree_stats.max_height = height;
        }
        update_tree_stats(tree_stats, node);
        let mut after = None;
        while let Some((edge, child)) = node.next_child(after, Order::Forward) {
            Self::get_tree_stats_recurse(child, tree_stats, height + 1);
            after = Some(edge);
        }
    }
}

impl<V> TreeStatsTrait for AdaptiveRadixTree<V> {
    fn get_tree_stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        if let Some(root) = &self.root {
            Self::get_tree_stats_recurse(root, &mut stats, 1);
        }
        stats.finish();
        stats
    }
}

impl<K: AsRef<[u8]>, V> Extend<(K, V)> for AdaptiveRadixTree<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: AsRef<[u8]>, V> FromIterator<(K, V)> for AdaptiveRadixTree<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, V> IntoIterator for &'a AdaptiveRadixTree<V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
