//! Topological level computation
//!
//! Converts a validated batch into ordered execution groups: a command's
//! level is zero when it has no dependencies, otherwise one plus the
//! maximum level of its dependencies. Commands sharing a level may run
//! concurrently; levels run strictly in order.

use std::collections::BTreeMap;

use crate::batch::Batch;
use crate::graph::build_adjacency;
use crate::types::{ConvoyError, ConvoyResult};

/// Ordered execution groups. Every command in group N has all of its
/// dependencies in groups 0..N; each name appears in exactly one group.
pub type LevelPlan = Vec<Vec<String>>;

/// Compute the level plan for a batch.
///
/// Precondition: the batch has passed [`validate`](crate::graph::validate).
/// An undetected cycle is caught defensively and returns a `Graph` error
/// instead of looping. References to undefined commands contribute no edge
/// and therefore no level constraint.
///
/// Levels are assigned by an iterative, memoized post-order traversal with
/// an explicit stack, so chain depth is bounded by memory rather than the
/// call stack. Returns an empty plan for an empty batch.
pub fn compute_levels(batch: &Batch) -> ConvoyResult<LevelPlan> {
    let adjacency = build_adjacency(batch);
    let graph = &adjacency.graph;
    let neighbors = adjacency.neighbor_lists();

    let mut levels: Vec<Option<usize>> = vec![None; graph.node_count()];
    let mut in_progress = vec![false; graph.node_count()];

    for start in graph.node_indices() {
        if levels[start.index()].is_some() {
            continue;
        }
        in_progress[start.index()] = true;
        let mut stack = vec![(start, 0usize)];

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            if cursor < neighbors[node.index()].len() {
                frame.1 += 1;
                let dep = neighbors[node.index()][cursor];
                if levels[dep.index()].is_some() {
                    continue;
                }
                if in_progress[dep.index()] {
                    return Err(ConvoyError::Graph(format!(
                        "dependency cycle through '{}' reached level computation; \
                         validate the batch first",
                        graph[dep]
                    )));
                }
                in_progress[dep.index()] = true;
                stack.push((dep, 0));
            } else {
                let level = neighbors[node.index()]
                    .iter()
                    .filter_map(|dep| levels[dep.index()])
                    .max()
                    .map_or(0, |deepest| deepest + 1);
                levels[node.index()] = Some(level);
                in_progress[node.index()] = false;
                stack.pop();
            }
        }
    }

    let mut grouped: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for node in graph.node_indices() {
        if let Some(level) = levels[node.index()] {
            grouped.entry(level).or_default().push(graph[node].clone());
        }
    }

    Ok(grouped.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::CommandSpec;

    fn spec(name: &str, deps: &[&str]) -> CommandSpec {
        let mut spec = CommandSpec::new(name, "true");
        spec.depends_on = deps.iter().map(|d| d.to_string()).collect();
        spec
    }

    fn batch(specs: Vec<CommandSpec>) -> Batch {
        specs
            .into_iter()
            .fold(Batch::builder(), |builder, spec| builder.command(spec))
            .build()
            .unwrap()
    }

    fn level_of(plan: &LevelPlan, name: &str) -> usize {
        plan.iter()
            .position(|group| group.iter().any(|n| n == name))
            .unwrap()
    }

    #[test]
    fn empty_batch_yields_empty_plan() {
        assert!(compute_levels(&Batch::default()).unwrap().is_empty());
    }

    #[test]
    fn independent_commands_share_one_level() {
        let batch = batch(vec![spec("a", &[]), spec("b", &[]), spec("c", &[])]);
        let plan = compute_levels(&batch).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].len(), 3);
    }

    #[test]
    fn linear_chain_yields_singleton_levels() {
        let batch = batch(vec![spec("a", &[]), spec("b", &["a"]), spec("c", &["b"])]);
        let plan = compute_levels(&batch).unwrap();
        assert_eq!(
            plan,
            vec![
                vec!["a".to_string()],
                vec!["b".to_string()],
                vec!["c".to_string()],
            ]
        );
    }

    #[test]
    fn diamond_yields_two_levels() {
        let batch = batch(vec![
            spec("a", &[]),
            spec("b", &[]),
            spec("c", &["a", "b"]),
            spec("d", &["a", "b"]),
        ]);
        let plan = compute_levels(&batch).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], vec!["a".to_string(), "b".to_string()]);
        assert_eq!(plan[1], vec!["c".to_string(), "d".to_string()]);
    }

    #[test]
    fn every_dependency_sits_strictly_below_its_dependent() {
        let batch = batch(vec![
            spec("fetch", &[]),
            spec("compile", &["fetch"]),
            spec("lint", &["fetch"]),
            spec("test", &["compile", "lint"]),
            spec("package", &["compile"]),
            spec("publish", &["test", "package"]),
        ]);
        let plan = compute_levels(&batch).unwrap();

        let total: usize = plan.iter().map(Vec::len).sum();
        assert_eq!(total, batch.len());

        for (name, spec) in batch.iter() {
            for dep in &spec.depends_on {
                assert!(
                    level_of(&plan, dep) < level_of(&plan, name),
                    "'{dep}' must be leveled before '{name}'"
                );
            }
        }
    }

    #[test]
    fn undetected_cycle_fails_fast() {
        let batch = batch(vec![spec("a", &["b"]), spec("b", &["a"])]);
        assert!(matches!(
            compute_levels(&batch),
            Err(ConvoyError::Graph(_))
        ));
    }

    #[test]
    fn scheduling_is_idempotent() {
        let batch = batch(vec![spec("a", &[]), spec("b", &["a"]), spec("c", &["a"])]);
        assert_eq!(
            compute_levels(&batch).unwrap(),
            compute_levels(&batch).unwrap()
        );
    }
}
