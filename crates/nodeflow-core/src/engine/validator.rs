//! Structural and semantic validation of workflow definitions.
//!
//! Validation is a pure function of the definition: no I/O, no side effects.
//! All checks run (after the emptiness gate) so the caller sees every
//! problem at once; warnings never affect validity.

use std::collections::{HashMap, HashSet, VecDeque};

use nodeflow_types::workflow::{NodeType, WorkflowDefinition};

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

/// Outcome of validating a workflow definition.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Structural problems that block execution.
    pub errors: Vec<String>,
    /// Advisory findings that do not block execution.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// A definition is valid iff no errors were recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a workflow definition.
///
/// Checks, in order:
/// 1. At least one node (failure here stops further checks).
/// 2. Exactly one start node.
/// 3. At least one end node (warning only).
/// 4. Unique node ids.
/// 5. Every edge endpoint references a known node id.
/// 6. The edge-induced graph is acyclic.
/// 7. Every node is reachable from the start node (aggregate warning).
pub fn validate(definition: &WorkflowDefinition) -> ValidationReport {
    let mut report = ValidationReport::default();

    if definition.nodes.is_empty() {
        report
            .errors
            .push("workflow must contain at least one node".to_string());
        return report;
    }

    let nodes = &definition.nodes;
    let edges = &definition.edges;

    let start_ids: Vec<&str> = nodes
        .iter()
        .filter(|n| n.node_type == NodeType::Start)
        .map(|n| n.id.as_str())
        .collect();
    match start_ids.len() {
        0 => report
            .errors
            .push("workflow must have a start node".to_string()),
        1 => {}
        _ => report
            .errors
            .push("workflow can only have one start node".to_string()),
    }

    if !nodes.iter().any(|n| n.node_type == NodeType::End) {
        report
            .warnings
            .push("consider adding an end node".to_string());
    }

    let node_ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let node_id_set: HashSet<&str> = node_ids.iter().copied().collect();
    if node_id_set.len() != node_ids.len() {
        report.errors.push("node ids must be unique".to_string());
    }

    for edge in edges {
        if !node_id_set.contains(edge.source.as_str()) {
            report
                .errors
                .push(format!("edge source node '{}' does not exist", edge.source));
        }
        if !node_id_set.contains(edge.target.as_str()) {
            report
                .errors
                .push(format!("edge target node '{}' does not exist", edge.target));
        }
    }

    if !is_acyclic(definition) {
        report.errors.push(
            "workflow must not contain circular dependencies (graph must be acyclic)".to_string(),
        );
    }

    // Reachability only makes sense once a start node exists; when more than
    // one is declared (already an error), check from the first.
    if let Some(start_id) = start_ids.first() {
        if !all_reachable(definition, start_id) {
            report
                .warnings
                .push("some nodes are not reachable from the start node".to_string());
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Graph checks
// ---------------------------------------------------------------------------

/// Adjacency over known node ids. Edges with unknown endpoints are excluded;
/// they are already reported by the edge-endpoint check.
fn adjacency<'a>(definition: &'a WorkflowDefinition) -> HashMap<&'a str, Vec<&'a str>> {
    let mut adj: HashMap<&str, Vec<&str>> = definition
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), Vec::new()))
        .collect();
    for edge in &definition.edges {
        if adj.contains_key(edge.target.as_str()) {
            if let Some(successors) = adj.get_mut(edge.source.as_str()) {
                successors.push(edge.target.as_str());
            }
        }
    }
    adj
}

/// Cycle detection: depth-first search tracking a recursion stack. A
/// back-edge to a node currently on the stack signals a cycle.
fn is_acyclic(definition: &WorkflowDefinition) -> bool {
    let adj = adjacency(definition);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut rec_stack: HashSet<&str> = HashSet::new();

    fn has_cycle<'a>(
        node_id: &'a str,
        adj: &HashMap<&'a str, Vec<&'a str>>,
        visited: &mut HashSet<&'a str>,
        rec_stack: &mut HashSet<&'a str>,
    ) -> bool {
        visited.insert(node_id);
        rec_stack.insert(node_id);

        for &neighbor in adj.get(node_id).map(Vec::as_slice).unwrap_or(&[]) {
            if !visited.contains(neighbor) {
                if has_cycle(neighbor, adj, visited, rec_stack) {
                    return true;
                }
            } else if rec_stack.contains(neighbor) {
                return true;
            }
        }

        rec_stack.remove(node_id);
        false
    }

    for node in &definition.nodes {
        if !visited.contains(node.id.as_str())
            && has_cycle(node.id.as_str(), &adj, &mut visited, &mut rec_stack)
        {
            return false;
        }
    }
    true
}

/// Breadth-first reachability from the start node, following edges in their
/// declared direction.
fn all_reachable(definition: &WorkflowDefinition, start_id: &str) -> bool {
    let adj = adjacency(definition);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    visited.insert(start_id);
    queue.push_back(start_id);

    while let Some(current) = queue.pop_front() {
        for &neighbor in adj.get(current).map(Vec::as_slice).unwrap_or(&[]) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    visited.len() == definition.nodes.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
