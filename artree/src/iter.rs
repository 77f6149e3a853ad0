//! Tree traversal.
//!
//! Everything here is driven by [`Traversal`], a pre-order walk that keeps one frame per inner
//! node on an explicit stack. A frame records the edge that led to its node and the last child
//! edge it handed out, which is all that is needed to carry on from the same place later; the
//! detached [`TreeIterator`](crate::cursor::TreeIterator) stores exactly that.

use std::fmt;
use std::iter::FusedIterator;

use crate::node::{Node, NodeKind};

/// Child visiting order. Forward is ascending byte order with a key's zero child before its
/// extensions; reverse is the exact mirror.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Order {
    #[default]
    Forward,
    Reverse,
}

/// Which nodes a traversal reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Inner nodes and leaves.
    #[default]
    All,
    /// Leaves only.
    Leaves,
    /// Inner nodes only.
    Nodes,
}

impl Filter {
    pub fn accepts(self, kind: NodeKind) -> bool {
        match self {
            Filter::All => true,
            Filter::Leaves => kind == NodeKind::Leaf,
            Filter::Nodes => kind != NodeKind::Leaf,
        }
    }
}

/// A read-only handle on one node of a tree.
pub struct NodeRef<'a, V> {
    node: &'a Node<V>,
}

impl<V> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NodeRef<'_, V> {}

impl<'a, V> NodeRef<'a, V> {
    pub(crate) fn new(node: &'a Node<V>) -> Self {
        Self { node }
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    /// The full key, for leaves.
    pub fn key(&self) -> Option<&'a [u8]> {
        self.node.as_leaf().map(|leaf| &*leaf.key)
    }

    /// The stored value, for leaves.
    pub fn value(&self) -> Option<&'a V> {
        self.node.as_leaf().map(|leaf| &leaf.value)
    }

    /// Byte-keyed children; the zero child is reported by [`has_zero_child`](Self::has_zero_child).
    pub fn num_children(&self) -> usize {
        self.node.num_children()
    }

    pub fn has_zero_child(&self) -> bool {
        self.node.has_zero_child()
    }

    /// Logical length of the compressed prefix; zero for leaves.
    pub fn prefix_len(&self) -> usize {
        self.node.prefix_len()
    }

    /// The inline part of the compressed prefix.
    pub fn prefix(&self) -> &'a [u8] {
        self.node.prefix().map_or(&[][..], |p| p.stored())
    }
}

impl<V> fmt::Debug for NodeRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("NodeRef");
        s.field("kind", &self.kind());
        match self.key() {
            Some(key) => s.field("key", &key),
            None => s
                .field("prefix_len", &self.prefix_len())
                .field("children", &self.num_children()),
        };
        s.finish()
    }
}

struct Frame<'a, V> {
    node: &'a Node<V>,
    edge: Option<u8>,
    cursor: Option<Option<u8>>,
}

/// Where a traversal stands, without borrowing the tree: whether the root has been reported,
/// then for each inner node on the current path the edge leading into it and the last child
/// edge handed out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Position {
    started: bool,
    frames: Vec<(Option<u8>, Option<Option<u8>>)>,
}

pub(crate) struct Traversal<'a, V> {
    root: Option<&'a Node<V>>,
    started: bool,
    stack: Vec<Frame<'a, V>>,
    order: Order,
}

impl<'a, V> Traversal<'a, V> {
    pub(crate) fn new(root: Option<&'a Node<V>>, order: Order) -> Self {
        Self {
            root,
            started: false,
            stack: Vec::new(),
            order,
        }
    }

    /// Rebuilds the stack described by `position` against `root`. The path is followed edge by
    /// edge; it stops early if the tree no longer has it.
    pub(crate) fn resume(root: Option<&'a Node<V>>, order: Order, position: &Position) -> Self {
        let mut traversal = Self::new(root, order);
        if !position.started {
            return traversal;
        }
        traversal.started = true;
        let mut node = root;
        for (i, &(edge, cursor)) in position.frames.iter().enumerate() {
            let next = match (i, node) {
                (0, Some(n)) => Some(n),
                (_, Some(n)) => n.find_child(edge),
                (_, None) => None,
            };
            let Some(n) = next.filter(|n| !n.is_leaf()) else {
                break;
            };
            traversal.stack.push(Frame {
                node: n,
                edge,
                cursor,
            });
            node = Some(n);
        }
        traversal
    }

    pub(crate) fn position(&self) -> Position {
        Position {
            started: self.started,
            frames: self.stack.iter().map(|f| (f.edge, f.cursor)).collect(),
        }
    }

    /// The node handed out by the last call to `next`, provided that call returned one.
    pub(crate) fn current(&self) -> Option<&'a Node<V>> {
        if !self.started {
            return None;
        }
        let Some(top) = self.stack.last() else {
            return self.root;
        };
        match top.cursor {
            None => Some(top.node),
            Some(edge) => top.node.find_child(edge),
        }
    }
}

impl<'a, V> Iterator for Traversal<'a, V> {
    type Item = &'a Node<V>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            let root = self.root?;
            if !root.is_leaf() {
                self.stack.push(Frame {
                    node: root,
                    edge: None,
                    cursor: None,
                });
            }
            return Some(root);
        }

        let order = self.order;
        while let Some(frame) = self.stack.last_mut() {
            let node = frame.node;
            match node.next_child(frame.cursor, order) {
                Some((edge, child)) => {
                    frame.cursor = Some(edge);
                    if !child.is_leaf() {
                        self.stack.push(Frame {
                            node: child,
                            edge,
                            cursor: None,
                        });
                    }
                    return Some(child);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

impl<V> FusedIterator for Traversal<'_, V> {}

/// A filtered pre-order iterator over the nodes of a borrowed tree.
///
/// [`has_next`](Self::has_next) looks ahead for the next node passing the filter and buffers it,
/// so asking repeatedly never changes what [`next`](Iterator::next) returns.
pub struct NodeIter<'a, V> {
    traversal: Traversal<'a, V>,
    filter: Filter,
    peeked: Option<NodeRef<'a, V>>,
}

impl<'a, V> NodeIter<'a, V> {
    pub(crate) fn new(root: Option<&'a Node<V>>, filter: Filter, order: Order) -> Self {
        Self {
            traversal: Traversal::new(root, order),
            filter,
            peeked: None,
        }
    }

    pub fn has_next(&mut self) -> bool {
        self.peek().is_some()
    }

    pub fn peek(&mut self) -> Option<NodeRef<'a, V>> {
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked
    }

    fn advance(&mut self) -> Option<NodeRef<'a, V>> {
        let filter = self.filter;
        self.traversal
            .find(|node| filter.accepts(node.kind()))
            .map(NodeRef::new)
    }
}

impl<'a, V> Iterator for NodeIter<'a, V> {
    type Item = NodeRef<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.peeked.take() {
            Some(node) => Some(node),
            None => self.advance(),
        }
    }
}

impl<V> FusedIterator for NodeIter<'_, V> {}

/// Key/value pairs in key order (or reverse key order).
pub struct Iter<'a, V> {
    nodes: NodeIter<'a, V>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(root: Option<&'a Node<V>>, order: Order) -> Self {
        Self {
            nodes: NodeIter::new(root, Filter::Leaves, order),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes
            .by_ref()
            .find_map(|node| Some((node.key()?, node.value()?)))
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Keys<'a, V> {
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Values<'a, V> {
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use crate::iter::{Filter, Order};
    use crate::node::NodeKind;
    use crate::tree::AdaptiveRadixTree;

    fn sample() -> AdaptiveRadixTree<u32> {
        let mut tree = AdaptiveRadixTree::new();
        for (i, k) in ["b", "a", "ab", "abc", "abd", "c", ""].iter().enumerate() {
            tree.insert(k, i as u32);
        }
        tree
    }

    #[test]
    fn pre_order_visits_parents_first() {
        let tree = sample();
        let kinds: Vec<NodeKind> = tree
            .nodes(Filter::All, Order::Forward)
            .map(|n| n.kind())
            .collect();
        assert_ne!(kinds[0], NodeKind::Leaf);
        assert_eq!(kinds.iter().filter(|k| **k == NodeKind::Leaf).count(), 7);

        let inner = tree.nodes(Filter::Nodes, Order::Forward).count();
        assert_eq!(inner + 7, kinds.len());
    }

    #[test]
    fn leaves_in_both_orders() {
        let tree = sample();
        let forward: Vec<&[u8]> = tree
            .nodes(Filter::Leaves, Order::Forward)
            .filter_map(|n| n.key())
            .collect();
        let expected: Vec<&[u8]> = ["", "a", "ab", "abc", "abd", "b", "c"]
            .iter()
            .map(|k| k.as_bytes())
            .collect();
        assert_eq!(forward, expected);

        let mut reverse: Vec<&[u8]> = tree
            .nodes(Filter::Leaves, Order::Reverse)
            .filter_map(|n| n.key())
            .collect();
        reverse.reverse();
        assert_eq!(reverse, expected);
    }

    #[test]
    fn peeking_is_idempotent() {
        let tree = sample();
        let mut nodes = tree.nodes(Filter::Leaves, Order::Forward);
        assert!(nodes.has_next());
        assert!(nodes.has_next());
        let peeked = nodes.peek().and_then(|n| n.key());
        assert_eq!(peeked, Some(&b""[..]));
        assert_eq!(nodes.next().and_then(|n| n.key()), Some(&b""[..]));
        assert_eq!(nodes.next().and_then(|n| n.key()), Some(&b"a"[..]));

        let rest = nodes.by_ref().count();
        assert_eq!(rest, 5);
        assert!(!nodes.has_next());
        assert!(nodes.next().is_none());
    }

    #[test]
    fn empty_tree_has_nothing() {
        let tree: AdaptiveRadixTree<u32> = AdaptiveRadixTree::new();
        let mut nodes = tree.nodes(Filter::All, Order::Reverse);
        assert!(!nodes.has_next());
        assert_eq!(tree.iter().count(), 0);
    }

    #[test]
    fn single_leaf_root() {
        let mut tree = AdaptiveRadixTree::new();
        tree.insert("only", 1);
        let all: Vec<_> = tree.nodes(Filter::All, Order::Forward).collect();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_leaf());
        assert_eq!(all[0].prefix_len(), 0);
        assert_eq!(tree.nodes(Filter::Nodes, Order::Forward).count(), 0);
    }
}
