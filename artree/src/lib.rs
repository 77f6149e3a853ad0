//! An Adaptive Radix Tree: an ordered index over byte-string keys.
//!
//! Inner nodes come in four sizes and are swapped for a larger or smaller one as children come
//! and go. Shared key runs are compressed into node prefixes, and a key that is a strict prefix
//! of another lives in its node's zero child, so arbitrary byte strings can be stored.
//!
//! Traversal is pre-order over nodes, filtered to leaves, inner nodes or both, in forward or
//! reverse key order. [`AdaptiveRadixTree::nodes`] borrows the tree;
//! [`AdaptiveRadixTree::iterator`] returns a [`TreeIterator`] that does not, and which fails with
//! [`IterError::ConcurrentModification`] once the tree's structure changes under it.

mod alloc;
pub mod config;
pub mod cursor;
pub mod error;
pub mod iter;
pub mod mapping;
mod node;
pub mod prefix;
pub mod stats;
pub mod tree;
pub mod utils;

pub use config::TreeConfig;
pub use cursor::TreeIterator;
pub use error::IterError;
pub use iter::{Filter, Iter, Keys, NodeIter, NodeRef, Order, Values};
pub use node::NodeKind;
pub use prefix::MAX_PREFIX_LEN;
pub use stats::{TreeStats, TreeStatsTrait};
pub use tree::AdaptiveRadixTree;
