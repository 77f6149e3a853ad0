//! Statistics and introspection for artree.
//!
//! This module gathers statistics about the internal shape of an Adaptive Radix Tree: how many
//! nodes of each kind it holds, how full they are, and how deep it goes.
//!
//! Statistics can be useful for:
//! - Performance analysis and optimization
//! - Understanding memory usage patterns
//! - Debugging tree structure issues

use std::collections::HashMap;

use crate::node::Node;

pub trait TreeStatsTrait {
    fn get_tree_stats(&self) -> TreeStats;
}

#[derive(Debug, Default)]
pub struct NodeStats {
    pub width: usize,
    pub node_type: String,
    pub total_nodes: usize,
    pub total_children: usize,
    /// Nodes of this kind carrying a zero child.
    pub zero_children: usize,
    pub density: f64,
}

#[derive(Debug, Default)]
pub struct TreeStats {
    pub node_stats: HashMap<String, NodeStats>,
    pub num_leaves: usize,
    pub num_inner_nodes: usize,
    pub total_density: f64,
    pub max_height: usize,
}

impl TreeStats {
    /// Number of inner nodes of the kind named `node_type` (`"Node4"`, `"Node16"`, ...).
    pub fn nodes_of(&self, node_type: &str) -> usize {
        self.node_stats.get(node_type).map_or(0, |ns| ns.total_nodes)
    }

    /// Fills in the per-kind and overall densities once every node has been counted.
    pub(crate) fn finish(&mut self) {
        let mut total_children = 0;
        let mut total_width = 0;
        for ns in self.node_stats.values_mut() {
            total_children += ns.total_children;
            total_width += ns.width * ns.total_nodes;
            ns.density = ns.total_children as f64 / (ns.width * ns.total_nodes) as f64;
        }
        self.num_inner_nodes = self.node_stats.values().map(|ns| ns.total_nodes).sum();
        if total_width > 0 {
            self.total_density = total_children as f64 / total_width as f64;
        }
    }
}

pub(crate) fn update_tree_stats<V>(tree_stats: &mut TreeStats, node: &Node<V>) {
    let kind = node.kind();
    if node.is_leaf() {
        tree_stats.num_leaves += 1;
        return;
    }

    let num_children = node.num_children();
    let zero_child = usize::from(node.has_zero_child());

    tree_stats
        .node_stats
        .entry(kind.name().to_string())
        .and_modify(|e| {
            e.total_nodes += 1;
            e.total_children += num_children;
            e.zero_children += zero_child;
        })
        .or_insert(NodeStats {
            width: kind.capacity(),
            node_type: kind.name().to_string(),
            total_nodes: 1,
            total_children: num_children,
            zero_children: zero_child,
            density: 0.0,
        });
}
