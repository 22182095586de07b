//! Node handlers.
//!
//! One handler per node kind, dispatched over the closed `NodeType` enum so
//! a new kind is a compile-time exhaustiveness obligation. Handlers read
//! only `node.data.config` plus the execution context; they never see other
//! nodes' outputs except through `context.nodes`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use thiserror::Error;

use nodeflow_types::error::{ProviderError, StoreError};
use nodeflow_types::http::{DEFAULT_HTTP_TIMEOUT_SECS, HttpRequest};
use nodeflow_types::knowledge::RetrievedChunk;
use nodeflow_types::llm::ChatMessage;
use nodeflow_types::workflow::{Node, NodeType};

use super::context::ExecutionContext;
use super::{string_ops, template};
use crate::provider::{EmbeddingProvider, HttpCapability, LanguageModelProvider};
use crate::repository::WorkflowStore;

const DEFAULT_LLM_TEMPERATURE: f64 = 0.7;
const DEFAULT_LLM_MAX_TOKENS: u32 = 2000;
const DEFAULT_TOP_K: usize = 5;
const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;
const INTENT_TEMPERATURE: f64 = 0.1;
const INTENT_MAX_TOKENS: u32 = 500;

/// Failure of a single node handler.
///
/// Hard failures only; soft degradations (a malformed intent verdict) are
/// absorbed into the handler's output instead.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("missing required config: {0}")]
    MissingConfig(&'static str),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("knowledge base not found: {0}")]
    KnowledgeBaseNotFound(String),

    #[error("unknown string operation: {0}")]
    UnknownOperation(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Executes single nodes against the store and capability providers.
pub struct NodeRunner<S, L, E, H> {
    store: Arc<S>,
    llm: Arc<L>,
    embedder: Arc<E>,
    http: Arc<H>,
}

impl<S, L, E, H> NodeRunner<S, L, E, H>
where
    S: WorkflowStore,
    L: LanguageModelProvider,
    E: EmbeddingProvider,
    H: HttpCapability,
{
    pub fn new(store: Arc<S>, llm: Arc<L>, embedder: Arc<E>, http: Arc<H>) -> Self {
        Self {
            store,
            llm,
            embedder,
            http,
        }
    }

    /// Execute one node and return its output mapping.
    pub async fn run(&self, node: &Node, context: &ExecutionContext) -> Result<Value, NodeError> {
        let ctx = context.to_value();
        let config = &node.data.config;
        match node.node_type {
            NodeType::Start => Ok(context.input.clone()),
            NodeType::End => Ok(ctx),
            NodeType::Llm => self.run_llm(config, &ctx).await,
            NodeType::Http => self.run_http(config, &ctx).await,
            NodeType::Knowledge => self.run_knowledge(config, &ctx).await,
            NodeType::Intent => self.run_intent(config, &ctx).await,
            NodeType::String => run_string(config, &ctx),
        }
    }

    // -----------------------------------------------------------------------
    // llm
    // -----------------------------------------------------------------------

    async fn run_llm(&self, config: &Map<String, Value>, ctx: &Value) -> Result<Value, NodeError> {
        let model_id = raw_str(config, "model_id").ok_or(NodeError::MissingConfig("model_id"))?;
        let model = self
            .store
            .get_model(&model_id)
            .await?
            .ok_or_else(|| NodeError::ModelNotFound(model_id.clone()))?;

        let prompt = rendered_str(config, "prompt", ctx).unwrap_or_default();
        let system_prompt = rendered_str(config, "system_prompt", ctx).unwrap_or_default();
        let temperature = config
            .get("temperature")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_LLM_TEMPERATURE);
        let max_tokens = config
            .get("max_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(u64::from(DEFAULT_LLM_MAX_TOKENS)) as u32;

        let mut messages = Vec::with_capacity(2);
        if !system_prompt.is_empty() {
            messages.push(ChatMessage::system(system_prompt));
        }
        messages.push(ChatMessage::user(prompt));

        let response = self
            .llm
            .chat(&model.model, &messages, temperature, max_tokens)
            .await?;

        Ok(json!({
            "content": response.content,
            "raw_response": response.raw,
        }))
    }

    // -----------------------------------------------------------------------
    // http
    // -----------------------------------------------------------------------

    async fn run_http(&self, config: &Map<String, Value>, ctx: &Value) -> Result<Value, NodeError> {
        let method = raw_str(config, "method")
            .unwrap_or_else(|| "GET".to_string())
            .to_uppercase();
        let url = rendered_str(config, "url", ctx).unwrap_or_default();
        if url.is_empty() {
            return Err(NodeError::MissingConfig("url"));
        }

        let headers: HashMap<String, String> = match config.get("headers") {
            Some(value) => match template::substitute(value, ctx) {
                Value::Object(map) => map
                    .into_iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => (k, s),
                        other => (k, template::value_to_string(&other)),
                    })
                    .collect(),
                _ => HashMap::new(),
            },
            None => HashMap::new(),
        };
        let body = config.get("body").map(|value| template::substitute(value, ctx));
        let timeout_secs = config
            .get("timeout")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout_secs,
        };
        let response = self.http.execute(&request).await?;
        let success = response.status_code < 400;

        Ok(json!({
            "status_code": response.status_code,
            "headers": response.headers,
            "body": response.body,
            "success": success,
        }))
    }

    // -----------------------------------------------------------------------
    // knowledge
    // -----------------------------------------------------------------------

    async fn run_knowledge(
        &self,
        config: &Map<String, Value>,
        ctx: &Value,
    ) -> Result<Value, NodeError> {
        let kb_id = raw_str(config, "knowledge_base_id")
            .ok_or(NodeError::MissingConfig("knowledge_base_id"))?;
        let query = rendered_str(config, "query", ctx).unwrap_or_default();
        if query.is_empty() {
            return Err(NodeError::MissingConfig("query"));
        }
        let top_k = config
            .get("top_k")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TOP_K as u64) as usize;
        let threshold = config
            .get("similarity_threshold")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);

        let kb = self
            .store
            .get_knowledge_base(&kb_id)
            .await?
            .ok_or_else(|| NodeError::KnowledgeBaseNotFound(kb_id.clone()))?;

        let query_vector = self.embedder.embed_text(&query).await?;

        // Brute-force scan over every embedded chunk in the base.
        let mut results = Vec::new();
        for chunk in self.store.list_chunks(&kb.id).await? {
            let Some(embedding) = &chunk.embedding else {
                continue;
            };
            // Threshold applies to the raw score; rounding is presentation only.
            let raw = self.embedder.similarity(&query_vector, embedding);
            if raw < threshold {
                continue;
            }
            let similarity = round4(raw);
            let title = self
                .store
                .get_document_title(&chunk.document_id)
                .await?
                .unwrap_or_else(|| "unknown document".to_string());
            results.push(RetrievedChunk {
                chunk_id: chunk.id,
                document_id: chunk.document_id,
                document_title: title,
                content: chunk.content,
                similarity,
                chunk_index: chunk.chunk_index,
            });
        }

        // Stable descending sort keeps chunk order among equal scores.
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(top_k);

        let context_text = results
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                format!(
                    "[{}] from \"{}\" (similarity: {:.0}%):\n{}",
                    idx + 1,
                    r.document_title,
                    r.similarity * 100.0,
                    r.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let count = results.len();
        Ok(json!({
            "results": results,
            "count": count,
            "context_text": context_text,
            "query": query,
        }))
    }

    // -----------------------------------------------------------------------
    // intent
    // -----------------------------------------------------------------------

    async fn run_intent(
        &self,
        config: &Map<String, Value>,
        ctx: &Value,
    ) -> Result<Value, NodeError> {
        let model_id = raw_str(config, "model_id").ok_or(NodeError::MissingConfig("model_id"))?;
        let input_text = rendered_str(config, "input_text", ctx).unwrap_or_default();
        if input_text.is_empty() {
            return Err(NodeError::MissingConfig("input_text"));
        }
        let intents = config
            .get("intents")
            .and_then(Value::as_array)
            .filter(|list| !list.is_empty())
            .ok_or(NodeError::MissingConfig("intents"))?;

        let model = self
            .store
            .get_model(&model_id)
            .await?
            .ok_or_else(|| NodeError::ModelNotFound(model_id.clone()))?;

        let candidates = intents
            .iter()
            .map(|intent| {
                let name = intent.get("name").and_then(Value::as_str).unwrap_or("");
                let description = intent
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                let keywords = intent
                    .get("keywords")
                    .and_then(Value::as_array)
                    .map(|kws| {
                        kws.iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();
                format!("- {name}: {description} (keywords: {keywords})")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let system_prompt = "You are an intent classifier. Match the user input against the \
                             given list of intents.\nReply with a JSON object containing:\n\
                             - intent: the matched intent name\n\
                             - confidence: a number between 0 and 1\n\
                             - reason: a short justification";
        let user_prompt = format!(
            "Candidate intents:\n{candidates}\n\nUser input:\n{input_text}\n\n\
             Identify the intent and reply with JSON:"
        );
        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ];

        // Model failure and unparseable replies both degrade to the unknown
        // verdict; only missing config fails this handler.
        let (verdict, raw_response) = match self
            .llm
            .chat(&model.model, &messages, INTENT_TEMPERATURE, INTENT_MAX_TOKENS)
            .await
        {
            Ok(response) => {
                let verdict = first_json_object(&response.content);
                (verdict, Value::String(response.content))
            }
            Err(err) => {
                tracing::warn!(error = %err, "intent model call failed, degrading to unknown");
                (None, Value::Null)
            }
        };

        let verdict = verdict.unwrap_or_else(|| json!({}));
        let intent = verdict
            .get("intent")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let confidence = verdict
            .get("confidence")
            .and_then(Value::as_f64)
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let reason = verdict
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        Ok(json!({
            "intent": intent,
            "confidence": confidence,
            "reason": reason,
            "input_text": input_text,
            "raw_response": raw_response,
        }))
    }
}

// ---------------------------------------------------------------------------
// string (no store or provider involved)
// ---------------------------------------------------------------------------

fn run_string(config: &Map<String, Value>, ctx: &Value) -> Result<Value, NodeError> {
    let operation = raw_str(config, "operation").unwrap_or_else(|| "concat".to_string());
    let input_text = rendered_str(config, "input_text", ctx).unwrap_or_default();
    let result = string_ops::apply(&operation, &input_text, config, ctx)?;
    Ok(json!({
        "result": result,
        "operation": operation,
        "input_text": input_text,
    }))
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

/// A string config field, untouched. Empty counts as absent.
fn raw_str(config: &Map<String, Value>, key: &str) -> Option<String> {
    config
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A string config field, template-rendered against the context.
fn rendered_str(config: &Map<String, Value>, key: &str, ctx: &Value) -> Option<String> {
    config
        .get(key)
        .and_then(Value::as_str)
        .map(|s| template::render(s, ctx))
}

/// Round a similarity score to 4 decimal places.
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Extract the first balanced-brace JSON object from free-form model text.
fn first_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &text[start..start + offset + ch.len_utf8()];
                    return serde_json::from_str(candidate).ok();
                }
            }
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
