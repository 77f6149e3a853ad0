use std::fmt;
use std::mem;

use tracing::trace;

use crate::alloc::NodePool;
use crate::iter::Order;
use crate::mapping::direct_mapping::DirectMapping;
use crate::mapping::indexed_mapping::IndexedMapping;
use crate::mapping::sorted_keyed_mapping::SortedKeyedMapping;
use crate::mapping::NodeMapping;
use crate::prefix::Prefix;

pub(crate) type Mapping4<V> = SortedKeyedMapping<Node<V>, 4>;
pub(crate) type Mapping16<V> = SortedKeyedMapping<Node<V>, 16>;
pub(crate) type Mapping48<V> = IndexedMapping<Node<V>, 48, 1>;
pub(crate) type Mapping256<V> = DirectMapping<Node<V>>;

/// The shape of a node, as reported through [`NodeRef`](crate::iter::NodeRef) and the stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Leaf,
    Node4,
    Node16,
    Node48,
    Node256,
}

impl NodeKind {
    /// Maximum number of byte-keyed children; the zero child is not counted.
    pub fn capacity(self) -> usize {
        match self {
            NodeKind::Leaf => 0,
            NodeKind::Node4 => 4,
            NodeKind::Node16 => 16,
            NodeKind::Node48 => 48,
            NodeKind::Node256 => 256,
        }
    }

    /// Occupancy, zero child included, below which a node is replaced by a smaller one.
    pub fn shrink_floor(self) -> usize {
        match self {
            NodeKind::Leaf => 0,
            NodeKind::Node4 => 2,
            NodeKind::Node16 => 5,
            NodeKind::Node48 => 17,
            NodeKind::Node256 => 49,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Leaf => "Leaf",
            NodeKind::Node4 => "Node4",
            NodeKind::Node16 => "Node16",
            NodeKind::Node48 => "Node48",
            NodeKind::Node256 => "Node256",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) struct Leaf<V> {
    pub(crate) key: Box<[u8]>,
    pub(crate) value: V,
}

pub(crate) struct Inner<V, M> {
    pub(crate) prefix: Prefix,
    /// The leaf for the key that ends exactly where this node's prefix ends.
    pub(crate) zero_child: Option<Node<V>>,
    pub(crate) children: M,
}

impl<V, M: Default> Inner<V, M> {
    pub(crate) fn new(prefix: Prefix) -> Self {
        Self {
            prefix,
            zero_child: None,
            children: M::default(),
        }
    }
}

pub(crate) enum Node<V> {
    Leaf(Box<Leaf<V>>),
    Node4(Box<Inner<V, Mapping4<V>>>),
    Node16(Box<Inner<V, Mapping16<V>>>),
    Node48(Box<Inner<V, Mapping48<V>>>),
    Node256(Box<Inner<V, Mapping256<V>>>),
}

/// Runs `$body` against whichever inner layout `$node` holds, or `$leaf` for a leaf.
macro_rules! with_inner {
    ($node:expr, $n:ident => $body:expr, leaf => $leaf:expr) => {
        match $node {
            Node::Node4($n) => $body,
            Node::Node16($n) => $body,
            Node::Node48($n) => $body,
            Node::Node256($n) => $body,
            Node::Leaf(_) => $leaf,
        }
    };
}

/// Moves the zero child and every byte child of `from` into `to`.
fn transfer<V, const FROM: usize, const TO: usize, M1, M2>(
    from: &mut Inner<V, M1>,
    to: &mut Inner<V, M2>,
) where
    M1: NodeMapping<Node<V>, FROM>,
    M2: NodeMapping<Node<V>, TO>,
{
    to.zero_child = from.zero_child.take();
    from.children.move_into(&mut to.children);
}

/// One step of an ordered walk over a node's children. `after` is the edge visited last, or
/// `None` before the first step. The zero child sorts before every byte.
fn step<'a, V, const WIDTH: usize, M>(
    zero_child: Option<&'a Node<V>>,
    children: &'a M,
    after: Option<Option<u8>>,
    order: Order,
) -> Option<(Option<u8>, &'a Node<V>)>
where
    M: NodeMapping<Node<V>, WIDTH>,
{
    let zero = || zero_child.map(|z| (None, z));
    let byte = |(b, child): (u8, &'a Node<V>)| (Some(b), child);
    match (order, after) {
        (Order::Forward, None) => zero().or_else(|| children.first_child().map(byte)),
        (Order::Forward, Some(None)) => children.first_child().map(byte),
        (Order::Forward, Some(Some(b))) => children.next_child(Some(b)).map(byte),
        (Order::Reverse, None) => children.last_child().map(byte).or_else(zero),
        (Order::Reverse, Some(Some(b))) => children.prev_child(Some(b)).map(byte).or_else(zero),
        (Order::Reverse, Some(None)) => None,
    }
}

impl<V> Inner<V, Mapping4<V>> {
    /// Removes the only remaining child, carrying this node's prefix and the edge byte down into
    /// it when it is an inner node.
    fn take_sole_child(&mut self) -> Option<Node<V>> {
        if let Some(zero) = self.zero_child.take() {
            debug_assert_eq!(self.children.num_children(), 0);
            return Some(zero);
        }
        let (edge, _) = self.children.first_child()?;
        let mut child = self.children.delete_child(edge)?;
        if let Some(prefix) = child.prefix_mut() {
            *prefix = self.prefix.join(edge, prefix);
        }
        Some(child)
    }
}

impl<V> Node<V> {
    pub(crate) fn new_leaf(key: &[u8], value: V) -> Self {
        Node::Leaf(Box::new(Leaf {
            key: key.into(),
            value,
        }))
    }

    pub(crate) fn new_inner(prefix: Prefix, pool: &mut NodePool<V>) -> Self {
        Node::Node4(pool.node4(prefix))
    }

    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Node4(_) => NodeKind::Node4,
            Node::Node16(_) => NodeKind::Node16,
            Node::Node48(_) => NodeKind::Node48,
            Node::Node256(_) => NodeKind::Node256,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    #[inline]
    pub(crate) fn as_leaf(&self) -> Option<&Leaf<V>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub(crate) fn prefix(&self) -> Option<&Prefix> {
        with_inner!(self, n => Some(&n.prefix), leaf => None)
    }

    pub(crate) fn prefix_mut(&mut self) -> Option<&mut Prefix> {
        with_inner!(self, n => Some(&mut n.prefix), leaf => None)
    }

    #[inline]
    pub(crate) fn prefix_len(&self) -> usize {
        self.prefix().map_or(0, Prefix::len)
    }

    /// Byte-keyed children only.
    pub(crate) fn num_children(&self) -> usize {
        with_inner!(self, n => n.children.num_children(), leaf => 0)
    }

    pub(crate) fn has_zero_child(&self) -> bool {
        with_inner!(self, n => n.zero_child.is_some(), leaf => false)
    }

    /// Byte-keyed children plus the zero child.
    pub(crate) fn occupancy(&self) -> usize {
        self.num_children() + usize::from(self.has_zero_child())
    }

    fn is_full(&self) -> bool {
        with_inner!(self, n => n.children.is_full(), leaf => true)
    }

    /// The child under `edge`, where `None` addresses the zero child.
    pub(crate) fn find_child(&self, edge: Option<u8>) -> Option<&Node<V>> {
        match edge {
            None => with_inner!(self, n => n.zero_child.as_ref(), leaf => None),
            Some(b) => with_inner!(self, n => n.children.seek_child(b), leaf => None),
        }
    }

    pub(crate) fn find_child_mut(&mut self, edge: Option<u8>) -> Option<&mut Node<V>> {
        match edge {
            None => with_inner!(self, n => n.zero_child.as_mut(), leaf => None),
            Some(b) => with_inner!(self, n => n.children.seek_child_mut(b), leaf => None),
        }
    }

    /// Adds a child under an edge that is not yet occupied, growing first when every byte slot
    /// is taken.
    pub(crate) fn add_child(&mut self, edge: Option<u8>, child: Node<V>, pool: &mut NodePool<V>) {
        let Some(byte) = edge else {
            with_inner!(self, n => {
                debug_assert!(n.zero_child.is_none(), "zero child already present");
                n.zero_child = Some(child);
            }, leaf => unreachable!("add_child on a leaf"));
            return;
        };
        if self.is_full() {
            self.grow(pool);
        }
        with_inner!(
            self,
            n => n.children.add_child(byte, child),
            leaf => unreachable!("add_child on a leaf")
        )
    }

    /// Removes the child under `edge`, then shrinks this node if it fell below its floor.
    pub(crate) fn delete_child(
        &mut self,
        edge: Option<u8>,
        pool: &mut NodePool<V>,
    ) -> Option<Node<V>> {
        let removed = match edge {
            None => with_inner!(self, n => n.zero_child.take(), leaf => None),
            Some(b) => with_inner!(self, n => n.children.delete_child(b), leaf => None),
        }?;
        if self.occupancy() < self.kind().shrink_floor() {
            self.shrink(pool);
        }
        Some(removed)
    }

    /// Replaces this node with the next larger kind. A Node256 is already maximal.
    pub(crate) fn grow(&mut self, pool: &mut NodePool<V>) {
        let grown = match self {
            Node::Node4(n) => {
                let mut g = pool.node16(n.prefix);
                transfer(&mut **n, &mut *g);
                Node::Node16(g)
            }
            Node::Node16(n) => {
                let mut g = pool.node48(n.prefix);
                transfer(&mut **n, &mut *g);
                Node::Node48(g)
            }
            Node::Node48(n) => {
                let mut g = pool.node256(n.prefix);
                transfer(&mut **n, &mut *g);
                Node::Node256(g)
            }
            Node::Node256(_) | Node::Leaf(_) => return,
        };
        trace!(from = %self.kind(), to = %grown.kind(), children = grown.occupancy(), "grow");
        pool.release(mem::replace(self, grown));
    }

    /// Replaces this node with the next smaller kind. A Node4 left with a single child collapses
    /// into that child.
    pub(crate) fn shrink(&mut self, pool: &mut NodePool<V>) {
        let shrunk = match self {
            Node::Node256(n) => {
                let mut s = pool.node48(n.prefix);
                transfer(&mut **n, &mut *s);
                Node::Node48(s)
            }
            Node::Node48(n) => {
                let mut s = pool.node16(n.prefix);
                transfer(&mut **n, &mut *s);
                Node::Node16(s)
            }
            Node::Node16(n) => {
                let mut s = pool.node4(n.prefix);
                transfer(&mut **n, &mut *s);
                Node::Node4(s)
            }
            Node::Node4(n) => {
                if n.children.num_children() + usize::from(n.zero_child.is_some()) != 1 {
                    return;
                }
                match n.take_sole_child() {
                    Some(child) => child,
                    None => return,
                }
            }
            Node::Leaf(_) => return,
        };
        trace!(
            from = %self.kind(),
            to = %shrunk.kind(),
            prefix_len = shrunk.prefix_len(),
            "shrink"
        );
        pool.release(mem::replace(self, shrunk));
    }

    /// The child following `after` in `order`, with the edge leading to it. `after` is `None`
    /// before the first child has been visited.
    pub(crate) fn next_child(
        &self,
        after: Option<Option<u8>>,
        order: Order,
    ) -> Option<(Option<u8>, &Node<V>)> {
        with_inner!(
            self,
            n => step(n.zero_child.as_ref(), &n.children, after, order),
            leaf => None
        )
    }

    pub(crate) fn minimum_leaf(&self) -> Option<&Leaf<V>> {
        self.edge_leaf(Order::Forward)
    }

    pub(crate) fn maximum_leaf(&self) -> Option<&Leaf<V>> {
        self.edge_leaf(Order::Reverse)
    }

    fn edge_leaf(&self, order: Order) -> Option<&Leaf<V>> {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(leaf) => return Some(leaf),
                _ => node = node.next_child(None, order)?.1,
            }
        }
    }

    /// Length of the run of this node's logical prefix that matches `key` at `depth`.
    ///
    /// When every stored byte matches but the prefix is longer than what is stored, the
    /// comparison continues against the minimum leaf's key, which shares the whole prefix.
    pub(crate) fn prefix_mismatch(&self, key: &[u8], depth: usize) -> usize {
        let Some(prefix) = self.prefix() else {
            return 0;
        };
        let mut idx = prefix.matched_stored(key, depth);
        if idx < prefix.stored().len() || !prefix.is_truncated() {
            return idx;
        }
        let Some(leaf) = self.minimum_leaf() else {
            return idx;
        };
        let limit = prefix.len().min(key.len().saturating_sub(depth));
        while idx < limit && leaf.key.get(depth + idx) == key.get(depth + idx) {
            idx += 1;
        }
        idx
    }
}
