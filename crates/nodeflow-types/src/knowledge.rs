//! Knowledge-base retrieval types.
//!
//! The knowledge node scores a query embedding against every embedded chunk
//! of a knowledge base; these types model the base, its chunks, and a scored
//! retrieval result.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A knowledge base, resolved by id from node `config.knowledge_base_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// String id as referenced from node config.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An embedded text chunk belonging to a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub knowledge_base_id: String,
    /// Source document id, used to resolve the citation title.
    pub document_id: String,
    /// Position of this chunk within its document.
    pub chunk_index: u32,
    pub content: String,
    /// Absent until the chunk has been embedded; unembedded chunks are
    /// skipped during retrieval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// One scored retrieval result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: Uuid,
    pub document_id: String,
    pub document_title: String,
    pub content: String,
    /// Cosine similarity, rounded to 4 decimal places.
    pub similarity: f64,
    pub chunk_index: u32,
}
