//! Detached, version-checked iteration.
//!
//! A [`TreeIterator`] holds no borrow of the tree it walks. It is handed the tree on every call,
//! which lets the tree be mutated between steps; the iterator notices because the tree's
//! structural version no longer matches the one it was created against, and from then on it only
//! reports the modification.

use std::marker::PhantomData;

use tracing::debug;

use crate::error::{IterError, Result};
use crate::iter::{Filter, NodeRef, Order, Position, Traversal};
use crate::tree::AdaptiveRadixTree;

pub struct TreeIterator<V> {
    tree_id: u64,
    version: u64,
    filter: Filter,
    order: Order,
    position: Position,
    // Where the next match ends, or `None` when there is none. Only set while the tree is still
    // at `version`.
    peeked: Option<Option<Position>>,
    error: Option<IterError>,
    _values: PhantomData<fn() -> V>,
}

impl<V> TreeIterator<V> {
    pub(crate) fn new(tree: &AdaptiveRadixTree<V>, filter: Filter, order: Order) -> Self {
        Self {
            tree_id: tree.id(),
            version: tree.version(),
            filter,
            order,
            position: Position::default(),
            peeked: None,
            error: None,
            _values: PhantomData,
        }
    }

    /// The tree version this iterator was created against.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn order(&self) -> Order {
        self.order
    }

    fn check(&self, tree: &AdaptiveRadixTree<V>) -> Result<()> {
        if tree.id() != self.tree_id {
            return Err(IterError::ForeignTree);
        }
        if tree.version() != self.version {
            return Err(IterError::ConcurrentModification {
                expected: self.version,
                found: tree.version(),
            });
        }
        Ok(())
    }

    /// Whether a call to [`next`](Self::next) would produce something. An invalidated iterator
    /// answers `true` so that `next` gets the chance to report why; an exhausted one answers
    /// `false`.
    ///
    /// The lookahead is kept until `next` consumes it, so asking again is cheap and never
    /// changes what `next` returns.
    pub fn has_next(&mut self, tree: &AdaptiveRadixTree<V>) -> bool {
        match self.error {
            Some(err) => return err.is_invalidated(),
            None if self.check(tree).is_err() => return true,
            None => {}
        }
        if let Some(peeked) = &self.peeked {
            return peeked.is_some();
        }
        let filter = self.filter;
        let mut traversal = Traversal::resume(tree.root_node(), self.order, &self.position);
        let found = traversal.any(|node| filter.accepts(node.kind()));
        self.peeked = Some(found.then(|| traversal.position()));
        found
    }

    /// Steps to the next node passing the filter.
    pub fn next<'t>(&mut self, tree: &'t AdaptiveRadixTree<V>) -> Result<NodeRef<'t, V>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Err(err) = self.check(tree) {
            debug!(
                tree_id = self.tree_id,
                snapshot_version = self.version,
                error = %err,
                "tree iterator invalidated"
            );
            self.error = Some(err);
            return Err(err);
        }

        let found = match self.peeked.take() {
            Some(Some(position)) => {
                self.position = position;
                Traversal::resume(tree.root_node(), self.order, &self.position).current()
            }
            Some(None) => None,
            None => {
                let filter = self.filter;
                let mut traversal =
                    Traversal::resume(tree.root_node(), self.order, &self.position);
                let found = traversal.find(|node| filter.accepts(node.kind()));
                self.position = traversal.position();
                found
            }
        };
        match found {
            Some(node) => Ok(NodeRef::new(node)),
            None => {
                self.error = Some(IterError::Exhausted);
                Err(IterError::Exhausted)
            }
        }
    }
}
