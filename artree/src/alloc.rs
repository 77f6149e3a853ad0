//! Inner node allocation.
//!
//! Every tree owns a [`NodePool`]. With a capacity of zero it is a plain allocator; otherwise
//! it keeps the boxes of nodes retired by grow, shrink and collapse on per-kind free lists and
//! hands them back out before allocating.

use crate::mapping::NodeMapping;
use crate::node::{Inner, Mapping16, Mapping256, Mapping4, Mapping48, Node};
use crate::prefix::Prefix;

pub(crate) struct NodePool<V> {
    capacity: usize,
    free4: Vec<Box<Inner<V, Mapping4<V>>>>,
    free16: Vec<Box<Inner<V, Mapping16<V>>>>,
    free48: Vec<Box<Inner<V, Mapping48<V>>>>,
    free256: Vec<Box<Inner<V, Mapping256<V>>>>,
}

fn take<V, M: Default>(free: &mut Vec<Box<Inner<V, M>>>, prefix: Prefix) -> Box<Inner<V, M>> {
    match free.pop() {
        Some(mut node) => {
            node.prefix = prefix;
            node
        }
        None => Box::new(Inner::new(prefix)),
    }
}

fn recycle<V, const WIDTH: usize, M>(
    free: &mut Vec<Box<Inner<V, M>>>,
    capacity: usize,
    node: Box<Inner<V, M>>,
) where
    M: NodeMapping<Node<V>, WIDTH>,
{
    // Only empty boxes are kept; anything still holding children is dropped with them.
    if free.len() < capacity && node.zero_child.is_none() && node.children.num_children() == 0 {
        free.push(node);
    }
}

impl<V> NodePool<V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free4: Vec::new(),
            free16: Vec::new(),
            free48: Vec::new(),
            free256: Vec::new(),
        }
    }

    pub(crate) fn node4(&mut self, prefix: Prefix) -> Box<Inner<V, Mapping4<V>>> {
        take(&mut self.free4, prefix)
    }

    pub(crate) fn node16(&mut self, prefix: Prefix) -> Box<Inner<V, Mapping16<V>>> {
        take(&mut self.free16, prefix)
    }

    pub(crate) fn node48(&mut self, prefix: Prefix) -> Box<Inner<V, Mapping48<V>>> {
        take(&mut self.free48, prefix)
    }

    pub(crate) fn node256(&mut self, prefix: Prefix) -> Box<Inner<V, Mapping256<V>>> {
        take(&mut self.free256, prefix)
    }

    /// Takes back a node that is no longer linked into the tree.
    pub(crate) fn release(&mut self, node: Node<V>) {
        let capacity = self.capacity;
        match node {
            Node::Leaf(_) => {}
            Node::Node4(n) => recycle(&mut self.free4, capacity, n),
            Node::Node16(n) => recycle(&mut self.free16, capacity, n),
            Node::Node48(n) => recycle(&mut self.free48, capacity, n),
            Node::Node256(n) => recycle(&mut self.free256, capacity, n),
        }
    }

    /// Number of node boxes currently held for reuse.
    pub(crate) fn len(&self) -> usize {
        self.free4.len() + self.free16.len() + self.free48.len() + self.free256.len()
    }
}
