//! Engine traits and types

use crate::error::{Result, ScoutError};
use crate::results::{OrderedKeySet, RawSearchResponse, ScoutKey};
use crate::search::SearchRequest;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// HTTP request to be made on behalf of an engine
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: HashMap<String, String>,
    /// Request body
    pub data: Option<RequestBody>,
}

impl EngineRequest {
    fn with_method(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            params: HashMap::new(),
            data: None,
        }
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(HttpMethod::Post, url)
    }

    /// Create a DELETE request
    pub fn delete(url: impl Into<String>) -> Self {
        Self::with_method(HttpMethod::Delete, url)
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add JSON body
    pub fn json(mut self, data: Value) -> Self {
        self.data = Some(RequestBody::Json(data));
        self
    }

    /// JSON body, if one was set
    pub fn json_body(&self) -> Option<&Value> {
        match &self.data {
            Some(RequestBody::Json(json)) => Some(json),
            None => None,
        }
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
    Delete,
}

/// Request body types
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
}

/// HTTP response from engine request
#[derive(Debug)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl EngineResponse {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx answer into a backend error carrying the service's message
    pub fn error_for_status(self, engine: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let message = serde_json::from_str::<Value>(&self.text)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| self.text.trim().to_string());

        Err(ScoutError::Backend {
            engine: engine.to_string(),
            status: self.status,
            message,
        })
    }
}

/// A record as written to an index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    pub key: ScoutKey,
    pub body: Map<String, Value>,
}

/// Capability shared by every search backend.
///
/// Engines only translate: they build HTTP requests and decode responses,
/// while `SearchEngine` owns the client and runs them.
pub trait Engine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Engines that never leave the process answer every search with no hits
    fn is_offline(&self) -> bool {
        false
    }

    /// Build the HTTP request for a search
    fn search_request(&self, request: &SearchRequest) -> Result<EngineRequest>;

    /// Decode a search answer, keeping the payload untouched
    fn parse_search(&self, response: EngineResponse) -> Result<RawSearchResponse> {
        let response = response.error_for_status(self.name())?;
        RawSearchResponse::from_text(self.name(), &response.text)
    }

    /// Keys of the hits, in relevance order
    fn map_ids(&self, raw: &RawSearchResponse, key_name: &str) -> Result<OrderedKeySet>;

    /// Number of matches the backend reports for the whole query
    fn total_count(&self, raw: &RawSearchResponse) -> u64;

    /// Build the request that upserts documents into an index
    fn update_request(
        &self,
        index: &str,
        key_name: &str,
        documents: Vec<IndexDocument>,
    ) -> Result<EngineRequest>;

    /// Build the request that removes documents by key
    fn delete_request(&self, index: &str, keys: &[ScoutKey]) -> Result<EngineRequest>;

    /// Build the request that removes every document from an index
    fn flush_request(&self, index: &str) -> Result<EngineRequest>;

    fn create_index_request(&self, _index: &str, _key_name: &str) -> Result<EngineRequest> {
        Err(ScoutError::unsupported(self.name(), "creating indexes"))
    }

    fn delete_index_request(&self, _index: &str) -> Result<EngineRequest> {
        Err(ScoutError::unsupported(self.name(), "deleting indexes"))
    }
}

/// Pluck a key field out of every hit, failing on hits that lack it
pub(crate) fn pluck_keys(
    engine: &str,
    raw: &RawSearchResponse,
    key_name: &str,
) -> Result<OrderedKeySet> {
    raw.hits()
        .iter()
        .enumerate()
        .map(|(position, hit)| {
            hit.get(key_name)
                .and_then(ScoutKey::from_value)
                .ok_or_else(|| {
                    ScoutError::parse(
                        engine,
                        format!("hit {} has no usable `{}` field", position, key_name),
                    )
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, text: &str) -> EngineResponse {
        EngineResponse {
            status,
            headers: HashMap::new(),
            text: text.to_string(),
            url: "http://localhost".to_string(),
        }
    }

    #[test]
    fn test_request_builder() {
        let request = EngineRequest::post("http://localhost/search")
            .header("Authorization", "Bearer key")
            .param("primaryKey", "id")
            .json(json!({"q": "lar"}));

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers["Authorization"], "Bearer key");
        assert_eq!(request.params["primaryKey"], "id");
        assert_eq!(request.json_body(), Some(&json!({"q": "lar"})));
    }

    #[test]
    fn test_error_for_status_uses_backend_message() {
        let err = response(404, r#"{"message":"Index `users` not found.","code":"index_not_found"}"#)
            .error_for_status("meilisearch")
            .unwrap_err();

        match err {
            ScoutError::Backend { status, message, .. } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Index `users` not found.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_for_status_falls_back_to_body() {
        let err = response(502, "Bad Gateway\n").error_for_status("algolia").unwrap_err();
        assert!(err.to_string().ends_with("Bad Gateway"));
        assert!(response(200, "{}").error_for_status("algolia").is_ok());
    }

    #[test]
    fn test_pluck_keys() {
        let raw = RawSearchResponse::from_value(
            "meilisearch",
            json!({"hits": [{"id": 3}, {"id": "x"}]}),
        )
        .unwrap();
        assert_eq!(
            pluck_keys("meilisearch", &raw, "id").unwrap(),
            vec![ScoutKey::Int(3), ScoutKey::from("x")]
        );
        assert!(pluck_keys("meilisearch", &raw, "uuid").is_err());
    }
}
