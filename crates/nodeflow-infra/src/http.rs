//! Reqwest-backed HTTP capability for the http node.

use std::time::Duration;

use serde_json::Value;

use nodeflow_core::provider::HttpCapability;
use nodeflow_types::error::ProviderError;
use nodeflow_types::http::{HttpRequest, HttpResponse};

/// The http node's transport.
///
/// One shared connection pool; per-request timeout taken from the request
/// itself. Non-2xx statuses are returned as responses, not errors.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpCapability for ReqwestHttpClient {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ProviderError::Request(format!("invalid http method: {}", request.method)))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(Duration::from_secs(request.timeout_secs));
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if request.has_body() {
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        }

        tracing::debug!(method = %request.method, url = %request.url, "issuing http request");
        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status_code = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        // JSON when it parses, raw text otherwise.
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(HttpResponse {
            status_code,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_invalid_method_is_a_request_error() {
        let client = ReqwestHttpClient::new();
        let request = HttpRequest {
            method: "NOT A METHOD".to_string(),
            url: "http://localhost/".to_string(),
            headers: HashMap::new(),
            body: None,
            timeout_secs: 1,
        };
        let err = client.execute(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
        assert!(err.to_string().contains("invalid http method"));
    }
}
