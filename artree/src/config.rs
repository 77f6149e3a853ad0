//! Per-tree configuration.

/// Construction options for an [`AdaptiveRadixTree`](crate::tree::AdaptiveRadixTree).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeConfig {
    /// How many emptied inner nodes of each kind the tree keeps for reuse. Zero disables
    /// pooling; every node is then freshly allocated and freed as soon as it is retired.
    pub node_pool_capacity: usize,
}

impl TreeConfig {
    /// Fresh allocation for every node.
    pub fn unpooled() -> Self {
        Self::default()
    }

    /// Keep up to `capacity` retired nodes per kind for reuse.
    pub fn pooled(capacity: usize) -> Self {
        Self {
            node_pool_capacity: capacity,
        }
    }

    pub fn is_pooled(&self) -> bool {
        self.node_pool_capacity > 0
    }
}
