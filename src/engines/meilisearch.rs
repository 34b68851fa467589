//! Meilisearch engine implementation
//!
//! Talks to the Meilisearch REST API. Searches use `hitsPerPage`/`page` so the
//! answer carries an exact `totalHits`; offset windows fall back to
//! `offset`/`limit` and the estimated total.

use super::traits::*;
use crate::config::MeilisearchSettings;
use crate::error::{Result, ScoutError};
use crate::results::{OrderedKeySet, RawSearchResponse, ScoutKey};
use crate::search::{SearchRequest, Window};
use serde_json::{json, Map, Value};
use url::Url;

/// Meilisearch search engine
pub struct Meilisearch {
    host: String,
    key: Option<String>,
}

impl Meilisearch {
    pub fn new(host: &str, key: Option<String>) -> Result<Self> {
        let parsed = Url::parse(host)?;
        if parsed.cannot_be_a_base() {
            return Err(ScoutError::Config(format!(
                "meilisearch host `{}` is not a base URL",
                host
            )));
        }

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            key,
        })
    }

    pub fn from_settings(settings: &MeilisearchSettings) -> Result<Self> {
        Self::new(&settings.host, settings.key.clone())
    }

    fn index_url(&self, index: &str, path: &str) -> String {
        format!(
            "{}/indexes/{}{}",
            self.host,
            urlencoding::encode(index),
            path
        )
    }

    fn authorize(&self, request: EngineRequest) -> EngineRequest {
        match &self.key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    /// Filter expression for the request's constraints, if any
    pub fn filters(request: &SearchRequest) -> Option<String> {
        let mut clauses: Vec<String> = request
            .wheres
            .iter()
            .map(|(field, value)| format!("{}={}", field, filter_value(value)))
            .collect();

        for (field, values) in &request.where_ins {
            clauses.push(format!("{} IN [{}]", field, filter_list(values)));
        }

        for (field, values) in &request.where_not_ins {
            clauses.push(format!("{} NOT IN [{}]", field, filter_list(values)));
        }

        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" AND "))
        }
    }
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => other.to_string(),
    }
}

fn filter_list(values: &[Value]) -> String {
    values
        .iter()
        .map(filter_value)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Engine for Meilisearch {
    fn name(&self) -> &str {
        "meilisearch"
    }

    fn search_request(&self, request: &SearchRequest) -> Result<EngineRequest> {
        let mut body = Map::new();
        body.insert("q".to_string(), json!(request.query));

        if let Some(filter) = Self::filters(request) {
            body.insert("filter".to_string(), json!(filter));
        }

        if !request.orders.is_empty() {
            let sort: Vec<String> = request
                .orders
                .iter()
                .map(|o| format!("{}:{}", o.field, o.direction.as_str()))
                .collect();
            body.insert("sort".to_string(), json!(sort));
        }

        match request.window {
            Some(Window::Limit(n)) => {
                body.insert("hitsPerPage".to_string(), json!(n));
                body.insert("page".to_string(), json!(1));
            }
            Some(Window::Page { page, per_page }) => {
                body.insert("hitsPerPage".to_string(), json!(per_page));
                body.insert("page".to_string(), json!(page.max(1)));
            }
            Some(Window::Offset { offset, length }) => {
                body.insert("offset".to_string(), json!(offset));
                body.insert("limit".to_string(), json!(length));
            }
            None => {}
        }

        for (key, value) in &request.options {
            body.insert(key.clone(), value.clone());
        }

        Ok(self.authorize(
            EngineRequest::post(self.index_url(&request.index, "/search")).json(Value::Object(body)),
        ))
    }

    fn map_ids(&self, raw: &RawSearchResponse, key_name: &str) -> Result<OrderedKeySet> {
        pluck_keys(self.name(), raw, key_name)
    }

    fn total_count(&self, raw: &RawSearchResponse) -> u64 {
        raw.get("totalHits")
            .or_else(|| raw.get("estimatedTotalHits"))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    fn update_request(
        &self,
        index: &str,
        key_name: &str,
        documents: Vec<IndexDocument>,
    ) -> Result<EngineRequest> {
        let documents: Vec<Value> = documents
            .into_iter()
            .map(|doc| {
                let mut body = doc.body;
                body.insert(key_name.to_string(), doc.key.to_value());
                Value::Object(body)
            })
            .collect();

        Ok(self.authorize(
            EngineRequest::post(self.index_url(index, "/documents"))
                .param("primaryKey", key_name)
                .json(Value::Array(documents)),
        ))
    }

    fn delete_request(&self, index: &str, keys: &[ScoutKey]) -> Result<EngineRequest> {
        let keys: Vec<Value> = keys.iter().map(ScoutKey::to_value).collect();
        Ok(self.authorize(
            EngineRequest::post(self.index_url(index, "/documents/delete-batch"))
                .json(Value::Array(keys)),
        ))
    }

    fn flush_request(&self, index: &str) -> Result<EngineRequest> {
        Ok(self.authorize(EngineRequest::delete(self.index_url(index, "/documents"))))
    }

    fn create_index_request(&self, index: &str, key_name: &str) -> Result<EngineRequest> {
        Ok(self.authorize(
            EngineRequest::post(format!("{}/indexes", self.host))
                .json(json!({"uid": index, "primaryKey": key_name})),
        ))
    }

    fn delete_index_request(&self, index: &str) -> Result<EngineRequest> {
        Ok(self.authorize(EngineRequest::delete(self.index_url(index, ""))))
    }
}
