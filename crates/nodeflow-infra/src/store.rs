//! DashMap-backed in-memory workflow store.

use dashmap::DashMap;
use uuid::Uuid;

use nodeflow_core::repository::WorkflowStore;
use nodeflow_types::error::StoreError;
use nodeflow_types::knowledge::{DocumentChunk, KnowledgeBase};
use nodeflow_types::llm::LlmModel;
use nodeflow_types::workflow::{ExecutionLog, Workflow, WorkflowExecution};

/// Concurrent in-memory store.
///
/// Cheap to share behind an `Arc`; every map is independently locked per
/// shard, so unrelated executions never contend. Contents do not survive
/// process restart.
#[derive(Default)]
pub struct InMemoryStore {
    workflows: DashMap<Uuid, Workflow>,
    executions: DashMap<Uuid, WorkflowExecution>,
    /// Append-only log entries, keyed by execution id.
    logs: DashMap<Uuid, Vec<ExecutionLog>>,
    models: DashMap<String, LlmModel>,
    knowledge_bases: DashMap<String, KnowledgeBase>,
    /// Chunks keyed by knowledge base id, in insertion order.
    chunks: DashMap<String, Vec<DocumentChunk>>,
    document_titles: DashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Registration (lookups resolved by node handlers at execution time)
    // -----------------------------------------------------------------------

    /// Register a language model under its string id.
    pub fn register_model(&self, model: LlmModel) {
        self.models.insert(model.id.clone(), model);
    }

    /// Register a knowledge base under its string id.
    pub fn register_knowledge_base(&self, kb: KnowledgeBase) {
        self.knowledge_bases.insert(kb.id.clone(), kb);
    }

    /// Append a chunk to its knowledge base.
    pub fn add_chunk(&self, chunk: DocumentChunk) {
        self.chunks
            .entry(chunk.knowledge_base_id.clone())
            .or_default()
            .push(chunk);
    }

    /// Register a document's display title for retrieval citations.
    pub fn set_document_title(&self, document_id: impl Into<String>, title: impl Into<String>) {
        self.document_titles.insert(document_id.into(), title.into());
    }
}

impl WorkflowStore for InMemoryStore {
    async fn save_workflow(&self, workflow: &Workflow) -> Result<(), StoreError> {
        self.workflows.insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn get_workflow(&self, id: &Uuid) -> Result<Option<Workflow>, StoreError> {
        Ok(self.workflows.get(id).map(|w| w.clone()))
    }

    async fn delete_workflow(&self, id: &Uuid) -> Result<bool, StoreError> {
        Ok(self.workflows.remove(id).is_some())
    }

    async fn create_execution(&self, execution: &WorkflowExecution) -> Result<(), StoreError> {
        if self.executions.contains_key(&execution.id) {
            return Err(StoreError::Conflict(format!(
                "execution {} already exists",
                execution.id
            )));
        }
        self.executions.insert(execution.id, execution.clone());
        Ok(())
    }

    async fn update_execution(&self, execution: &WorkflowExecution) -> Result<(), StoreError> {
        self.executions.insert(execution.id, execution.clone());
        Ok(())
    }

    async fn get_execution(&self, id: &Uuid) -> Result<Option<WorkflowExecution>, StoreError> {
        Ok(self.executions.get(id).map(|e| e.clone()))
    }

    async fn append_log(&self, log: &ExecutionLog) -> Result<(), StoreError> {
        self.logs
            .entry(log.execution_id)
            .or_default()
            .push(log.clone());
        Ok(())
    }

    async fn list_logs(&self, execution_id: &Uuid) -> Result<Vec<ExecutionLog>, StoreError> {
        Ok(self
            .logs
            .get(execution_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn get_model(&self, model_id: &str) -> Result<Option<LlmModel>, StoreError> {
        Ok(self.models.get(model_id).map(|m| m.clone()))
    }

    async fn get_knowledge_base(&self, kb_id: &str) -> Result<Option<KnowledgeBase>, StoreError> {
        Ok(self.knowledge_bases.get(kb_id).map(|kb| kb.clone()))
    }

    async fn list_chunks(&self, kb_id: &str) -> Result<Vec<DocumentChunk>, StoreError> {
        Ok(self
            .chunks
            .get(kb_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn get_document_title(&self, document_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.document_titles.get(document_id).map(|t| t.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
