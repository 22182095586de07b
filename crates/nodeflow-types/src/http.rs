//! Request/response shapes for the generic HTTP capability.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default request timeout for the http node, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// A fully-resolved HTTP request produced by the http node handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRequest {
    /// Upper-cased HTTP method (GET, POST, ...).
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// JSON body; sent only for methods other than GET/DELETE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    pub timeout_secs: u64,
}

impl HttpRequest {
    /// Whether this method carries a request body.
    pub fn has_body(&self) -> bool {
        !matches!(self.method.as_str(), "GET" | "DELETE")
    }
}

/// Response returned by the HTTP capability.
///
/// `body` is the JSON-decoded payload when the response parses as JSON,
/// otherwise the raw text as a JSON string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub body: Value,
}
