//! Algolia search engine implementation
//!
//! Uses the Algolia REST API. Reads go to the DSN host, writes to the primary
//! application host.

use super::traits::*;
use crate::config::AlgoliaSettings;
use crate::error::{Result, ScoutError};
use crate::results::{OrderedKeySet, RawSearchResponse, ScoutKey};
use crate::search::{SearchRequest, Window};
use serde_json::{json, Map, Value};
use tracing::warn;
use url::Url;

/// Algolia search engine
pub struct Algolia {
    app_id: String,
    secret: String,
    read_host: String,
    write_host: String,
}

impl Algolia {
    pub fn new(
        app_id: impl Into<String>,
        secret: impl Into<String>,
        read_host: &str,
        write_host: &str,
    ) -> Result<Self> {
        let app_id = app_id.into();
        if app_id.is_empty() {
            return Err(ScoutError::Config("algolia app_id is empty".to_string()));
        }
        Url::parse(read_host)?;
        Url::parse(write_host)?;

        Ok(Self {
            app_id,
            secret: secret.into(),
            read_host: read_host.trim_end_matches('/').to_string(),
            write_host: write_host.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &AlgoliaSettings) -> Result<Self> {
        Self::new(
            settings.app_id.clone(),
            settings.secret.clone(),
            &settings.read_host(),
            &settings.write_host(),
        )
    }

    fn index_url(host: &str, index: &str, path: &str) -> String {
        format!("{}/1/indexes/{}{}", host, urlencoding::encode(index), path)
    }

    fn authorize(&self, request: EngineRequest) -> EngineRequest {
        request
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.secret)
    }

    fn batch(&self, index: &str, requests: Vec<Value>) -> EngineRequest {
        self.authorize(
            EngineRequest::post(Self::index_url(&self.write_host, index, "/batch"))
                .json(json!({ "requests": requests })),
        )
    }

    /// Numeric and facet filters for the request's constraints.
    ///
    /// Numbers go through `numericFilters`; strings and booleans are facets.
    /// Inner arrays are OR groups.
    pub fn filters(request: &SearchRequest) -> (Vec<Value>, Vec<Value>) {
        let mut numeric = Vec::new();
        let mut facets = Vec::new();

        for (field, value) in &request.wheres {
            match value {
                Value::Number(n) => numeric.push(json!(format!("{}={}", field, n))),
                other => facets.push(json!(format!("{}:{}", field, facet_value(other)))),
            }
        }

        for (field, values) in &request.where_ins {
            if values.is_empty() {
                numeric.push(json!("0=1"));
            } else if values.iter().all(Value::is_number) {
                let group: Vec<String> = values.iter().map(|v| format!("{}={}", field, v)).collect();
                numeric.push(json!(group));
            } else {
                let group: Vec<String> = values
                    .iter()
                    .map(|v| format!("{}:{}", field, facet_value(v)))
                    .collect();
                facets.push(json!(group));
            }
        }

        for (field, values) in &request.where_not_ins {
            for value in values {
                match value {
                    Value::Number(n) => numeric.push(json!(format!("{}!={}", field, n))),
                    other => facets.push(json!(format!("{}:-{}", field, facet_value(other)))),
                }
            }
        }

        (numeric, facets)
    }
}

fn facet_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Engine for Algolia {
    fn name(&self) -> &str {
        "algolia"
    }

    fn search_request(&self, request: &SearchRequest) -> Result<EngineRequest> {
        let mut body = Map::new();
        body.insert("query".to_string(), json!(request.query));

        let (numeric, facets) = Self::filters(request);
        if !numeric.is_empty() {
            body.insert("numericFilters".to_string(), Value::Array(numeric));
        }
        if !facets.is_empty() {
            body.insert("facetFilters".to_string(), Value::Array(facets));
        }

        if !request.orders.is_empty() {
            warn!("algolia sorts through index replicas, ignoring order_by clauses");
        }

        match request.window {
            Some(Window::Limit(n)) => {
                body.insert("hitsPerPage".to_string(), json!(n));
            }
            Some(Window::Page { page, per_page }) => {
                body.insert("hitsPerPage".to_string(), json!(per_page));
                body.insert("page".to_string(), json!(page.saturating_sub(1)));
            }
            Some(Window::Offset { offset, length }) => {
                body.insert("offset".to_string(), json!(offset));
                body.insert("length".to_string(), json!(length));
            }
            None => {}
        }

        for (key, value) in &request.options {
            body.insert(key.clone(), value.clone());
        }

        Ok(self.authorize(
            EngineRequest::post(Self::index_url(&self.read_host, &request.index, "/query"))
                .json(Value::Object(body)),
        ))
    }

    fn map_ids(&self, raw: &RawSearchResponse, _key_name: &str) -> Result<OrderedKeySet> {
        raw.hits()
            .iter()
            .enumerate()
            .map(|(position, hit)| match hit.get("objectID") {
                Some(Value::String(id)) => Ok(ScoutKey::Str(id.clone())),
                Some(Value::Number(n)) => Ok(ScoutKey::Str(n.to_string())),
                _ => Err(ScoutError::parse(
                    self.name(),
                    format!("hit {} has no `objectID`", position),
                )),
            })
            .collect()
    }

    fn total_count(&self, raw: &RawSearchResponse) -> u64 {
        raw.get("nbHits").and_then(Value::as_u64).unwrap_or(0)
    }

    fn update_request(
        &self,
        index: &str,
        _key_name: &str,
        documents: Vec<IndexDocument>,
    ) -> Result<EngineRequest> {
        let requests = documents
            .into_iter()
            .map(|doc| {
                let mut body = doc.body;
                body.insert("objectID".to_string(), json!(doc.key.to_string()));
                json!({"action": "updateObject", "body": body})
            })
            .collect();

        Ok(self.batch(index, requests))
    }

    fn delete_request(&self, index: &str, keys: &[ScoutKey]) -> Result<EngineRequest> {
        let requests = keys
            .iter()
            .map(|key| json!({"action": "deleteObject", "body": {"objectID": key.to_string()}}))
            .collect();

        Ok(self.batch(index, requests))
    }

    fn flush_request(&self, index: &str) -> Result<EngineRequest> {
        Ok(self.authorize(EngineRequest::post(Self::index_url(
            &self.write_host,
            index,
            "/clear",
        ))))
    }

    fn delete_index_request(&self, index: &str) -> Result<EngineRequest> {
        Ok(self.authorize(EngineRequest::delete(Self::index_url(
            &self.write_host,
            index,
            "",
        ))))
    }
}
