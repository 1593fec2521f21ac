//! Dependency graph construction and analysis
//!
//! This module builds an adjacency view over a batch and exposes the two
//! analyses the engine needs: structural validation (dangling references,
//! cycles) and topological level computation.

pub mod levels;
pub mod validate;

pub use levels::{compute_levels, LevelPlan};
pub use validate::{validate, ValidationError};

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::batch::Batch;

/// Adjacency view of a batch: one node per command, one edge from each
/// command to each of its resolvable dependencies. References to undefined
/// commands produce no edge; the validator reports them separately.
pub(crate) struct Adjacency {
    pub graph: DiGraph<String, ()>,
}

impl Adjacency {
    /// Dependency lists indexed by node, collected once so traversals can
    /// hold a cursor into them instead of re-walking petgraph iterators.
    pub fn neighbor_lists(&self) -> Vec<Vec<NodeIndex>> {
        self.graph
            .node_indices()
            .map(|node| self.graph.neighbors(node).collect())
            .collect()
    }
}

pub(crate) fn build_adjacency(batch: &Batch) -> Adjacency {
    let mut graph = DiGraph::new();
    let mut indices = HashMap::new();

    for name in batch.names() {
        let node = graph.add_node(name.to_string());
        indices.insert(name.to_string(), node);
    }

    for (name, spec) in batch.iter() {
        let from = indices[name];
        for dep in &spec.depends_on {
            if let Some(&to) = indices.get(dep) {
                // Edge direction: command -> dependency
                graph.add_edge(from, to, ());
            }
        }
    }

    Adjacency { graph }
}
