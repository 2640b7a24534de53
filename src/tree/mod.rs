//! Arena-backed rooted phylogeny.
//!
//! Nodes live in a flat vector and refer to each other by index, with a
//! precomputed name→id map for O(1) leaf lookup. The structure is built
//! once by the newick parser and is read-only afterwards, so it can be
//! shared by reference across resolver workers.

use crate::error::{PriorkinError, Result};
use rustc_hash::FxHashMap;

mod newick;

pub use newick::parse_newick;

/// Stable index of a node within its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    /// Length of the edge to the parent; 0.0 at the root.
    pub(crate) branch_length: f64,
    pub(crate) children: Vec<NodeId>,
}

/// A rooted tree with branch lengths and named nodes.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    by_name: FxHashMap<String, NodeId>,
    root: NodeId,
}

impl Tree {
    pub(crate) fn from_nodes(nodes: Vec<Node>, root: NodeId) -> Self {
        let mut by_name = FxHashMap::default();
        for (i, node) in nodes.iter().enumerate() {
            if !node.name.is_empty() {
                let prev = by_name.insert(node.name.clone(), NodeId(i as u32));
                if prev.is_some() {
                    log::warn!("duplicate node name '{}' in tree, keeping the last", node.name);
                }
            }
        }
        Self { nodes, by_name, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn branch_length(&self, id: NodeId) -> f64 {
        self.nodes[id.index()].branch_length
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.index()].children.is_empty()
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Look up a node by name or fail with the name.
    pub fn require_node(&self, name: &str) -> Result<NodeId> {
        self.node(name)
            .ok_or_else(|| PriorkinError::UnknownTreeNode(name.to_string()))
    }

    /// All node ids, root first, in construction order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Names of every node (leaf and internal) that carries a name.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|n| !n.name.is_empty())
            .map(|n| n.name.as_str())
    }

    /// Ids of all leaves.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_ids().filter(|id| self.is_leaf(*id))
    }

    /// Names of all leaves.
    pub fn leaf_names(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|n| n.children.is_empty())
            .map(|n| n.name.as_str())
    }

    /// Additive path distance between two nodes, summing branch lengths
    /// through their lowest common ancestor.
    pub fn path_distance(&self, a: NodeId, b: NodeId) -> f64 {
        if a == b {
            return 0.0;
        }

        // Cumulative distance from `a` to each of its ancestors.
        let mut to_ancestor: FxHashMap<NodeId, f64> = FxHashMap::default();
        let mut dist = 0.0;
        let mut cur = a;
        to_ancestor.insert(cur, 0.0);
        while let Some(parent) = self.parent(cur) {
            dist += self.branch_length(cur);
            to_ancestor.insert(parent, dist);
            cur = parent;
        }

        // Climb from `b` until we meet that ancestor chain.
        let mut dist_b = 0.0;
        let mut cur = b;
        loop {
            if let Some(dist_a) = to_ancestor.get(&cur) {
                return dist_a + dist_b;
            }
            match self.parent(cur) {
                Some(parent) => {
                    dist_b += self.branch_length(cur);
                    cur = parent;
                }
                // Disjoint only if the ids come from different trees;
                // ids are never exchanged across trees in this crate.
                None => return f64::INFINITY,
            }
        }
    }
}
