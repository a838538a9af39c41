//! Dependency-graph storage: a petgraph store plus the identifier memo
//! table that enforces one-node-per-identifier.

use crate::node::Node;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Vertex handle, stable across the life of a build.
pub type NodeIndex = petgraph::stable_graph::NodeIndex;

/// Edge payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// An observed dependency.
    Direct,
    /// A dependency forced by configuration (alias targets, implied deps).
    Implied,
}

/// Node/edge storage with identifier memoization.
///
/// Invariants:
/// - at most one node per identifier (`intern` returns the existing node);
/// - at most one edge per `(source, target, kind)` triple;
/// - nodes are never removed while a build is running.
#[derive(Default)]
pub struct DependencyGraph {
    store: StableDiGraph<Node, EdgeKind>,
    by_name: FxHashMap<Arc<str>, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by identifier.
    #[inline]
    pub fn find(&self, identifier: &str) -> Option<NodeIndex> {
        self.by_name.get(identifier).copied()
    }

    /// Insert a node, or return the already-materialized node for the same
    /// identifier. This is the only way nodes enter the graph.
    pub fn intern(&mut self, node: Node) -> NodeIndex {
        if let Some(&existing) = self.by_name.get(&node.identifier) {
            return existing;
        }
        let key = Arc::clone(&node.identifier);
        let index = self.store.add_node(node);
        self.by_name.insert(key, index);
        index
    }

    /// Add an edge unless an identical `(source, target, kind)` edge exists.
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, kind: EdgeKind) {
        let duplicate = self
            .store
            .edges_connecting(source, target)
            .any(|e| *e.weight() == kind);
        if !duplicate {
            self.store.add_edge(source, target, kind);
        }
    }

    #[inline]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.store[index]
    }

    #[inline]
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.store[index]
    }

    /// Number of materialized nodes.
    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    /// All nodes, in materialization order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.store.node_indices().map(move |i| (i, &self.store[i]))
    }

    /// All edges as `(source, target, kind)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, EdgeKind)> + '_ {
        self.store
            .edge_references()
            .map(|e| (e.source(), e.target(), *e.weight()))
    }

    /// Outgoing or incoming neighbor set of a node.
    pub fn neighbors(&self, index: NodeIndex, dir: Direction) -> Vec<NodeIndex> {
        self.store.neighbors_directed(index, dir).collect()
    }

    /// Whether an edge of the given kind exists.
    pub fn has_edge(&self, source: NodeIndex, target: NodeIndex, kind: EdgeKind) -> bool {
        self.store
            .edges_connecting(source, target)
            .any(|e| *e.weight() == kind)
    }

    /// Count the parallel edges between two nodes (any kind).
    pub fn edge_count_between(&self, source: NodeIndex, target: NodeIndex) -> usize {
        self.store.edges_connecting(source, target).count()
    }

    /// Depth-first preorder over the dependency closure of `roots`.
    pub fn dfs_from(&self, roots: &[NodeIndex]) -> Vec<NodeIndex> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::new();
        let mut stack: Vec<NodeIndex> = roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            if !seen.insert(index) {
                continue;
            }
            order.push(index);
            let mut next: Vec<NodeIndex> = self
                .store
                .neighbors_directed(index, Direction::Outgoing)
                .collect();
            next.reverse();
            stack.extend(next);
        }
        order
    }
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("nodes", &self.store.node_count())
            .field("edges", &self.store.edge_count())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
