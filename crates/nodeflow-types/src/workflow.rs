//! Workflow domain types for Nodeflow.
//!
//! Defines the wire-format workflow definition (nodes, edges, canvas
//! positions) consumed by the validator and orchestrator, plus the persisted
//! records tracking executions (`WorkflowExecution`) and their append-only
//! audit trail (`ExecutionLog`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Node and edge definitions (wire format)
// ---------------------------------------------------------------------------

/// The kind of a workflow node. Closed set: adding a kind is a
/// compile-time-checked exhaustiveness requirement on every dispatch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Start,
    End,
    Llm,
    Http,
    Knowledge,
    Intent,
    String,
}

/// Canvas position of a node in the visual builder.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

/// Display label and kind-specific configuration attached to a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeData {
    /// Optional display name for logs and the builder UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Open mapping of kind-specific parameters (prompt, url, operation, ...).
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// A typed unit of work in a workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique within a definition.
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub position: NodePosition,
    #[serde(default)]
    pub data: NodeData,
}

/// A directed dependency between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    /// Source node id. Must reference an existing node.
    pub source: String,
    /// Target node id. Must reference an existing node.
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Immutable snapshot of a workflow graph, consumed by the engine.
///
/// Owned by the workflow store; the engine receives a copy per execution, so
/// later edits never retroactively change a past execution's semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

// ---------------------------------------------------------------------------
// Persisted workflow record
// ---------------------------------------------------------------------------

/// Lifecycle status of a stored workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Draft,
    Published,
    Archived,
}

/// A stored workflow: the definition plus versioning and run statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub definition: WorkflowDefinition,
    pub status: WorkflowStatus,
    /// Incremented on every definition update.
    pub version: i32,
    /// Total runs (any terminal state).
    pub execution_count: u64,
    /// Runs that reached COMPLETED.
    pub success_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create a new draft workflow wrapping a definition.
    pub fn new(name: impl Into<String>, definition: WorkflowDefinition) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            definition,
            status: WorkflowStatus::Draft,
            version: 1,
            execution_count: 0,
            success_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Execution record
// ---------------------------------------------------------------------------

/// Lifecycle state of a workflow execution.
///
/// `PENDING -> RUNNING -> {COMPLETED | FAILED | CANCELLED}`. Terminal states
/// are final; the engine never drives the CANCELLED transition itself (it is
/// reserved for external cancellation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    /// Whether this state is terminal (no transition may leave it).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

/// Persisted outcome and audit anchor of one workflow run.
///
/// Created by the orchestrator's caller before execution begins; mutated
/// exclusively by the orchestrator during the run; never deleted by the
/// engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: Uuid,
    pub workflow_id: Uuid,
    /// Workflow version at execution time (immutable snapshot).
    pub workflow_version: i32,
    pub status: ExecutionStatus,
    /// Caller-supplied input mapping.
    pub input_data: Value,
    /// Populated only on COMPLETED: the mapping of node ids to outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Value>,
    /// Snapshot of the execution context (`{"input":…,"nodes":…}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// Populated only on FAILED.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Id of the node whose handler failed, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Derived from the start/completion stamps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl WorkflowExecution {
    /// Create a PENDING execution record for a workflow at its current version.
    pub fn new(workflow: &Workflow, input_data: Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            workflow_id: workflow.id,
            workflow_version: workflow.version,
            status: ExecutionStatus::Pending,
            input_data,
            output_data: None,
            context: None,
            error_message: None,
            error_node_id: None,
            started_at: None,
            completed_at: None,
            duration_seconds: None,
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution log (append-only audit trail)
// ---------------------------------------------------------------------------

/// Severity of an execution log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// One entry per node-execution attempt, ordered by timestamp.
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
