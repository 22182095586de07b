//! Workflow store trait definition.
//!
//! Defines the storage interface the engine depends on: workflow and
//! execution records, append-only execution logs, and the lookup surface
//! used by node handlers (models, knowledge bases, chunks, document titles).
//! The infrastructure layer (nodeflow-infra) implements this trait.

use nodeflow_types::error::StoreError;
use nodeflow_types::knowledge::{DocumentChunk, KnowledgeBase};
use nodeflow_types::llm::LlmModel;
use nodeflow_types::workflow::{ExecutionLog, Workflow, WorkflowExecution};
use uuid::Uuid;

/// Storage interface consumed by the engine.
///
/// Covers three entity families:
/// - **Workflows:** CRUD for workflow records (definition + statistics).
/// - **Executions:** create/update/query execution records and their logs.
/// - **Lookups:** model and knowledge-base resolution for node handlers.
///   Absence of a referenced id is reported as `Ok(None)`, not as a store
///   error -- handlers turn it into a node-level failure.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait WorkflowStore: Send + Sync {
    // -----------------------------------------------------------------------
    // Workflows
    // -----------------------------------------------------------------------

    /// Upsert a workflow record (insert or replace by id).
    fn save_workflow(
        &self,
        workflow: &Workflow,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Get a workflow by its UUID.
    fn get_workflow(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Workflow>, StoreError>> + Send;

    /// Delete a workflow by id. Returns `true` if it existed.
    fn delete_workflow(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    // -----------------------------------------------------------------------
    // Executions
    // -----------------------------------------------------------------------

    /// Create a new execution record.
    fn create_execution(
        &self,
        execution: &WorkflowExecution,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Persist the current state of an execution record (replace by id).
    fn update_execution(
        &self,
        execution: &WorkflowExecution,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Get an execution record by id.
    fn get_execution(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<WorkflowExecution>, StoreError>> + Send;

    /// Append one entry to an execution's audit log. Entries are never
    /// mutated after creation.
    fn append_log(
        &self,
        log: &ExecutionLog,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// List all log entries for an execution, in append order.
    fn list_logs(
        &self,
        execution_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ExecutionLog>, StoreError>> + Send;

    // -----------------------------------------------------------------------
    // Handler lookups
    // -----------------------------------------------------------------------

    /// Resolve a registered language model by its string id.
    fn get_model(
        &self,
        model_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<LlmModel>, StoreError>> + Send;

    /// Resolve a knowledge base by its string id.
    fn get_knowledge_base(
        &self,
        kb_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<KnowledgeBase>, StoreError>> + Send;

    /// List all chunks belonging to a knowledge base, in storage order.
    fn list_chunks(
        &self,
        kb_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<DocumentChunk>, StoreError>> + Send;

    /// Resolve a document's display title for retrieval citations.
    fn get_document_title(
        &self,
        document_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;
}
