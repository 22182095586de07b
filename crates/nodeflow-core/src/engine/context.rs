//! Per-run execution context.
//!
//! Built fresh for every execution; mutated only by the orchestrator, in
//! node-execution order; never shared across concurrent executions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The accumulating state threaded between node handlers.
///
/// Serializes to the exact `{"input": …, "nodes": {…}}` mapping used for
/// both template lookup and the persisted context snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Caller-supplied input mapping.
    pub input: Value,
    /// Outputs of already-executed nodes, keyed by node id.
    pub nodes: Map<String, Value>,
}

impl ExecutionContext {
    /// Create a fresh context for one execution.
    pub fn new(input: Value) -> Self {
        Self {
            input,
            nodes: Map::new(),
        }
    }

    /// Store a node's output. Later nodes see it under `nodes.<id>`.
    pub fn set_node_output(&mut self, node_id: &str, output: Value) {
        self.nodes.insert(node_id.to_string(), output);
    }

    /// The context as a JSON value, for templating and persistence.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("input".to_string(), self.input.clone());
        map.insert("nodes".to_string(), Value::Object(self.nodes.clone()));
        Value::Object(map)
    }
}
