//! Batch structure validation
//!
//! Checks a batch for dangling dependency references and dependency cycles,
//! reporting every violation found rather than stopping at the first.

use thiserror::Error;

use crate::batch::Batch;
use crate::graph::build_adjacency;

/// A structural problem in a batch definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate command name '{0}'")]
    DuplicateName(String),

    #[error("command '{command}' depends on '{dependency}', which is not defined")]
    MissingDependency { command: String, dependency: String },

    /// The stored path is closed: it ends with a repeat of its first node.
    #[error("circular dependency detected: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// Check a batch for dangling references and cycles.
///
/// Returns one entry per violation; an empty list means the batch is valid.
/// A batch with zero commands is trivially valid. The batch is not mutated,
/// so repeated calls yield identical results.
///
/// Cycle detection is an iterative depth-first traversal with an explicit
/// stack and a per-node color array, so arbitrarily deep dependency chains
/// cannot exhaust the call stack. Each back edge is reported once; traversal
/// continues through the remaining components.
pub fn validate(batch: &Batch) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (name, spec) in batch.iter() {
        for dep in &spec.depends_on {
            if batch.get(dep).is_none() {
                errors.push(ValidationError::MissingDependency {
                    command: name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    let adjacency = build_adjacency(batch);
    let graph = &adjacency.graph;
    let neighbors = adjacency.neighbor_lists();

    let mut colors = vec![Color::Unvisited; graph.node_count()];
    // Each frame holds a node and a cursor into its neighbor list; `path`
    // mirrors the in-progress chain so cycle paths can be extracted.
    let mut stack = Vec::new();
    let mut path = Vec::new();

    for start in graph.node_indices() {
        if colors[start.index()] != Color::Unvisited {
            continue;
        }
        colors[start.index()] = Color::InProgress;
        stack.push((start, 0usize));
        path.push(start);

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            if cursor < neighbors[node.index()].len() {
                frame.1 += 1;
                let next = neighbors[node.index()][cursor];
                match colors[next.index()] {
                    Color::Unvisited => {
                        colors[next.index()] = Color::InProgress;
                        stack.push((next, 0));
                        path.push(next);
                    }
                    Color::InProgress => {
                        // Back edge: the cycle runs from `next` along the
                        // current path down to `node`, then back to `next`.
                        let from = path.iter().position(|&n| n == next).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[from..].iter().map(|&n| graph[n].clone()).collect();
                        if let Some(first) = cycle.first().cloned() {
                            cycle.push(first);
                        }
                        errors.push(ValidationError::Cycle(cycle));
                    }
                    Color::Done => {}
                }
            } else {
                colors[node.index()] = Color::Done;
                stack.pop();
                path.pop();
            }
        }
    }

    errors
}
