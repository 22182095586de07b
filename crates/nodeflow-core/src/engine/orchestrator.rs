//! Execution orchestrator: the per-run state machine.
//!
//! Drives one execution record through
//! `PENDING -> RUNNING -> {COMPLETED | FAILED}`, running node handlers
//! strictly in topological order and appending one audit log entry per
//! node-execution attempt. The orchestrator is the sole writer of its
//! execution record for the duration of the run.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use nodeflow_types::error::StoreError;
use nodeflow_types::workflow::{
    ExecutionLog, ExecutionStatus, LogLevel, Node, Workflow, WorkflowDefinition, WorkflowExecution,
};

use super::context::ExecutionContext;
use super::runner::NodeRunner;
use super::topo::topological_order;
use super::validator::{ValidationReport, validate};
use crate::provider::{EmbeddingProvider, HttpCapability, LanguageModelProvider};
use crate::repository::WorkflowStore;

/// Engine-level failure of a run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The definition failed validation; no state transition occurred.
    #[error("workflow validation failed: {0}")]
    Validation(String),

    /// A node handler failed; the execution record is FAILED.
    #[error("node '{node_id}' failed: {cause}")]
    NodeFailed { node_id: String, cause: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sequential workflow executor over a store and capability providers.
pub struct WorkflowEngine<S, L, E, H> {
    store: Arc<S>,
    runner: NodeRunner<S, L, E, H>,
}

impl<S, L, E, H> WorkflowEngine<S, L, E, H>
where
    S: WorkflowStore,
    L: LanguageModelProvider,
    E: EmbeddingProvider,
    H: HttpCapability,
{
    pub fn new(store: Arc<S>, llm: Arc<L>, embedder: Arc<E>, http: Arc<H>) -> Self {
        let runner = NodeRunner::new(store.clone(), llm, embedder, http);
        Self { store, runner }
    }

    /// Validate a definition without executing it.
    pub fn validate(&self, definition: &WorkflowDefinition) -> ValidationReport {
        validate(definition)
    }

    /// Run one execution to a terminal state.
    ///
    /// `execution` must be a PENDING record created for `workflow`; both are
    /// updated in place and persisted through the store. Returns the final
    /// `output_data` mapping (node id to output) on success.
    pub async fn execute(
        &self,
        workflow: &mut Workflow,
        execution: &mut WorkflowExecution,
    ) -> Result<Value, EngineError> {
        // Validation gate: abort before any state transition.
        let report = validate(&workflow.definition);
        if !report.is_valid() {
            return Err(EngineError::Validation(report.errors.join(", ")));
        }

        tracing::info!(
            workflow_id = %workflow.id,
            execution_id = %execution.id,
            "workflow execution started"
        );

        execution.status = ExecutionStatus::Running;
        execution.started_at = Some(Utc::now());
        let mut context = ExecutionContext::new(execution.input_data.clone());
        execution.context = Some(context.to_value());
        self.store.update_execution(execution).await?;

        for node_id in topological_order(&workflow.definition) {
            // Absence is defensive only; a validated definition cannot hit it.
            // Cloned so the failure path can update the workflow record.
            let Some(node) = workflow
                .definition
                .nodes
                .iter()
                .find(|n| n.id == node_id)
                .cloned()
            else {
                continue;
            };

            self.append_node_log(
                execution.id,
                &node,
                LogLevel::Info,
                "starting node execution".to_string(),
                None,
                None,
            )
            .await?;

            let started = Instant::now();
            match self.runner.run(&node, &context).await {
                Ok(output) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    context.set_node_output(&node.id, output.clone());
                    tracing::info!(node_id = %node.id, duration_ms, "node executed successfully");
                    self.append_node_log(
                        execution.id,
                        &node,
                        LogLevel::Info,
                        "node executed successfully".to_string(),
                        Some(output),
                        Some(duration_ms),
                    )
                    .await?;
                }
                Err(err) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    let cause = err.to_string();
                    tracing::error!(node_id = %node.id, error = %cause, "node execution failed");
                    self.append_node_log(
                        execution.id,
                        &node,
                        LogLevel::Error,
                        format!("node execution failed: {cause}"),
                        None,
                        Some(duration_ms),
                    )
                    .await?;
                    self.finish_failed(workflow, execution, &context, &node.id, &cause)
                        .await?;
                    return Err(EngineError::NodeFailed {
                        node_id: node.id.clone(),
                        cause,
                    });
                }
            }
        }

        let completed_at = Utc::now();
        execution.status = ExecutionStatus::Completed;
        execution.completed_at = Some(completed_at);
        execution.duration_seconds = execution
            .started_at
            .map(|s| (completed_at - s).num_seconds());
        execution.context = Some(context.to_value());
        execution.output_data = Some(Value::Object(context.nodes.clone()));
        self.store.update_execution(execution).await?;

        workflow.execution_count += 1;
        workflow.success_count += 1;
        workflow.updated_at = completed_at;
        self.store.save_workflow(workflow).await?;

        tracing::info!(
            execution_id = %execution.id,
            duration_seconds = ?execution.duration_seconds,
            "workflow execution completed"
        );
        Ok(Value::Object(context.nodes))
    }

    /// Transition to FAILED, preserving the partial context.
    async fn finish_failed(
        &self,
        workflow: &mut Workflow,
        execution: &mut WorkflowExecution,
        context: &ExecutionContext,
        node_id: &str,
        cause: &str,
    ) -> Result<(), StoreError> {
        let completed_at = Utc::now();
        execution.status = ExecutionStatus::Failed;
        execution.completed_at = Some(completed_at);
        execution.duration_seconds = execution
            .started_at
            .map(|s| (completed_at - s).num_seconds());
        execution.error_message = Some(format!("node '{node_id}' failed: {cause}"));
        execution.error_node_id = Some(node_id.to_string());
        execution.context = Some(context.to_value());
        self.store.update_execution(execution).await?;

        workflow.execution_count += 1;
        workflow.updated_at = completed_at;
        self.store.save_workflow(workflow).await
    }

    async fn append_node_log(
        &self,
        execution_id: Uuid,
        node: &Node,
        level: LogLevel,
        message: String,
        output_data: Option<Value>,
        duration_ms: Option<u64>,
    ) -> Result<(), StoreError> {
        let log = ExecutionLog {
            id: Uuid::now_v7(),
            execution_id,
            node_id: node.id.clone(),
            node_name: node.data.label.clone(),
            node_type: Some(node.node_type),
            level,
            message,
            input_data: None,
            output_data,
            timestamp: Utc::now(),
            duration_ms,
        };
        self.store.append_log(&log).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
