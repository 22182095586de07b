//! In-memory store and scripted providers shared by engine tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Value, json};
use uuid::Uuid;

use nodeflow_types::error::{ProviderError, StoreError};
use nodeflow_types::http::{HttpRequest, HttpResponse};
use nodeflow_types::knowledge::{DocumentChunk, KnowledgeBase};
use nodeflow_types::llm::{ChatMessage, ChatResponse, LlmModel};
use nodeflow_types::workflow::{ExecutionLog, Workflow, WorkflowExecution};

use crate::provider::{EmbeddingProvider, HttpCapability, LanguageModelProvider};
use crate::repository::WorkflowStore;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Hash-map backed store for tests. Interior mutability keeps the trait's
/// `&self` signatures.
#[derive(Default)]
pub struct TestStore {
    pub workflows: Mutex<HashMap<Uuid, Workflow>>,
    pub executions: Mutex<HashMap<Uuid, WorkflowExecution>>,
    pub logs: Mutex<Vec<ExecutionLog>>,
    pub models: Mutex<HashMap<String, LlmModel>>,
    pub knowledge_bases: Mutex<HashMap<String, KnowledgeBase>>,
    pub chunks: Mutex<Vec<DocumentChunk>>,
    pub document_titles: Mutex<HashMap<String, String>>,
}

impl TestStore {
    pub fn with_model(self, id: &str, upstream: &str) -> Self {
        self.models.lock().unwrap().insert(
            id.to_string(),
            LlmModel {
                id: id.to_string(),
                name: format!("{id} (test)"),
                model: upstream.to_string(),
            },
        );
        self
    }

    pub fn with_knowledge_base(self, id: &str, name: &str) -> Self {
        self.knowledge_bases.lock().unwrap().insert(
            id.to_string(),
            KnowledgeBase {
                id: id.to_string(),
                name: name.to_string(),
                description: None,
            },
        );
        self
    }

    pub fn with_chunk(self, kb_id: &str, document_id: &str, content: &str, embedding: Option<Vec<f32>>) -> Self {
        let index = self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.knowledge_base_id == kb_id)
            .count() as u32;
        self.chunks.lock().unwrap().push(DocumentChunk {
            id: Uuid::now_v7(),
            knowledge_base_id: kb_id.to_string(),
            document_id: document_id.to_string(),
            chunk_index: index,
            content: content.to_string(),
            embedding,
        });
        self
    }

    pub fn with_document_title(self, document_id: &str, title: &str) -> Self {
        self.document_titles
            .lock()
            .unwrap()
            .insert(document_id.to_string(), title.to_string());
        self
    }

    pub fn log_messages(&self) -> Vec<String> {
        self.logs.lock().unwrap().iter().map(|l| l.message.clone()).collect()
    }
}

impl WorkflowStore for TestStore {
    async fn save_workflow(&self, workflow: &Workflow) -> Result<(), StoreError> {
        self.workflows.lock().unwrap().insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn get_workflow(&self, id: &Uuid) -> Result<Option<Workflow>, StoreError> {
        Ok(self.workflows.lock().unwrap().get(id).cloned())
    }

    async fn delete_workflow(&self, id: &Uuid) -> Result<bool, StoreError> {
        Ok(self.workflows.lock().unwrap().remove(id).is_some())
    }

    async fn create_execution(&self, execution: &WorkflowExecution) -> Result<(), StoreError> {
        self.executions.lock().unwrap().insert(execution.id, execution.clone());
        Ok(())
    }

    async fn update_execution(&self, execution: &WorkflowExecution) -> Result<(), StoreError> {
        self.executions.lock().unwrap().insert(execution.id, execution.clone());
        Ok(())
    }

    async fn get_execution(&self, id: &Uuid) -> Result<Option<WorkflowExecution>, StoreError> {
        Ok(self.executions.lock().unwrap().get(id).cloned())
    }

    async fn append_log(&self, log: &ExecutionLog) -> Result<(), StoreError> {
        self.logs.lock().unwrap().push(log.clone());
        Ok(())
    }

    async fn list_logs(&self, execution_id: &Uuid) -> Result<Vec<ExecutionLog>, StoreError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.execution_id == *execution_id)
            .cloned()
            .collect())
    }

    async fn get_model(&self, model_id: &str) -> Result<Option<LlmModel>, StoreError> {
        Ok(self.models.lock().unwrap().get(model_id).cloned())
    }

    async fn get_knowledge_base(&self, kb_id: &str) -> Result<Option<KnowledgeBase>, StoreError> {
        Ok(self.knowledge_bases.lock().unwrap().get(kb_id).cloned())
    }

    async fn list_chunks(&self, kb_id: &str) -> Result<Vec<DocumentChunk>, StoreError> {
        Ok(self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.knowledge_base_id == kb_id)
            .cloned()
            .collect())
    }

    async fn get_document_title(&self, document_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.document_titles.lock().unwrap().get(document_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Language model returning a fixed reply, or a scripted transport failure.
pub struct ScriptedLlm {
    pub reply: String,
    pub fail: bool,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl LanguageModelProvider for ScriptedLlm {
    async fn chat(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _temperature: f64,
        _max_tokens: u32,
    ) -> Result<ChatResponse, ProviderError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if self.fail {
            return Err(ProviderError::Request("connection refused".to_string()));
        }
        Ok(ChatResponse {
            content: self.reply.clone(),
            raw: json!({"choices": [{"message": {"content": self.reply}}]}),
        })
    }
}

/// Embedder mapping known texts to fixed vectors; unknown texts get a unit
/// vector along the first axis.
#[derive(Default)]
pub struct FixedEmbedder {
    pub vectors: HashMap<String, Vec<f32>>,
}

impl FixedEmbedder {
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

impl EmbeddingProvider for FixedEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![1.0, 0.0]))
    }
}

/// HTTP capability returning a canned response, or a scripted transport
/// failure. Records the last request it received.
pub struct StaticHttp {
    pub status: u16,
    pub body: Value,
    pub failure: Option<String>,
    pub last_request: Mutex<Option<HttpRequest>>,
}

impl StaticHttp {
    pub fn responding(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            failure: None,
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            status: 0,
            body: Value::Null,
            failure: Some(message.to_string()),
            last_request: Mutex::new(None),
        }
    }
}

impl HttpCapability for StaticHttp {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        if let Some(message) = &self.failure {
            return Err(ProviderError::Request(message.clone()));
        }
        Ok(HttpResponse {
            status_code: self.status,
            headers: HashMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: self.body.clone(),
        })
    }
}
