//! Capability provider trait definitions.
//!
//! The engine calls three external capabilities during node execution: a
//! language model, an embedding/similarity service, and a generic HTTP
//! client. All three are defined here as traits using native async fn in
//! traits (RPITIT, Rust 2024 edition); implementations live in
//! nodeflow-infra or in the embedding application.

use nodeflow_types::error::ProviderError;
use nodeflow_types::http::{HttpRequest, HttpResponse};
use nodeflow_types::llm::{ChatMessage, ChatResponse};

/// Trait for language-model backends.
///
/// The engine only needs non-streaming chat: an ordered message list in, a
/// first-choice content string (plus the raw response) out.
pub trait LanguageModelProvider: Send + Sync {
    /// Send a chat completion request for the given upstream model identifier.
    fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f64,
        max_tokens: u32,
    ) -> impl std::future::Future<Output = Result<ChatResponse, ProviderError>> + Send;
}

/// Trait for embedding backends.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a text into a vector. Fails if no embedding can be produced.
    fn embed_text(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, ProviderError>> + Send;

    /// Similarity between two vectors, in `[0, 1]`.
    ///
    /// Default implementation is cosine similarity; backends with a native
    /// scoring function may override it.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f64 {
        cosine_similarity(a, b)
    }
}

/// Trait for the generic HTTP request capability used by the http node.
pub trait HttpCapability: Send + Sync {
    /// Issue the request and return the decoded response.
    ///
    /// Transport failures (DNS, connect, timeout) surface as
    /// `ProviderError::Request`; non-2xx statuses are NOT errors -- they are
    /// reported through `HttpResponse::status_code`.
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, ProviderError>> + Send;
}

/// Cosine similarity between two vectors, clamped to `[0, 1]`.
///
/// Returns 0 for mismatched lengths or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = [0.5f32, 0.25, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let a = [1.0f32, 0.0];
        let b = [0.0f32, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_opposite_vectors_clamped() {
        // Raw cosine would be -1; the capability contract is [0, 1].
        let a = [1.0f32, 0.0];
        let b = [-1.0f32, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
