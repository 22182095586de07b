//! Deterministic topological ordering via Kahn's algorithm.
//!
//! The orchestrator relies on the validator having already rejected cycles;
//! nodes left with nonzero in-degree (a residual cycle) are silently absent
//! from the returned order.

use std::collections::{HashMap, VecDeque};

use nodeflow_types::workflow::WorkflowDefinition;

/// Compute a node execution order consistent with all edge directions.
///
/// Tie-break among independent nodes is implementation-defined but
/// deterministic: the initial queue is seeded in node declaration order, and
/// successors are released in edge declaration order.
pub fn topological_order(definition: &WorkflowDefinition) -> Vec<String> {
    let mut adj: HashMap<&str, Vec<&str>> = definition
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), Vec::new()))
        .collect();
    let mut in_degree: HashMap<&str, usize> = definition
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), 0))
        .collect();

    for edge in &definition.edges {
        if !adj.contains_key(edge.source.as_str()) {
            continue;
        }
        let Some(degree) = in_degree.get_mut(edge.target.as_str()) else {
            continue;
        };
        *degree += 1;
        if let Some(successors) = adj.get_mut(edge.source.as_str()) {
            successors.push(edge.target.as_str());
        }
    }

    let mut queue: VecDeque<&str> = definition
        .nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| in_degree.get(id).copied() == Some(0))
        .collect();
    let mut order = Vec::with_capacity(definition.nodes.len());

    while let Some(current) = queue.pop_front() {
        order.push(current.to_string());
        for &neighbor in adj.get(current).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(degree) = in_degree.get_mut(neighbor) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    order
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
