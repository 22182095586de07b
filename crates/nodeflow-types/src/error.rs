use thiserror::Error;

/// Errors from store operations (used by trait definitions in nodeflow-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from capability providers (language model, embedding, HTTP).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or completed (transport-level failure).
    #[error("request failed: {0}")]
    Request(String),

    /// The provider replied with something the caller cannot interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// An embedding could not be produced for the given text.
    #[error("embedding failed: {0}")]
    Embedding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Request("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
        let err = ProviderError::Embedding("empty text".to_string());
        assert_eq!(err.to_string(), "embedding failed: empty text");
    }
}
