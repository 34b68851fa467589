#![allow(dead_code)]

use scout_rs::engines::algolia::Algolia;
use scout_rs::engines::meilisearch::Meilisearch;
use scout_rs::network::HttpClient;
use scout_rs::{Builder, InMemoryStore, ScoutKey, SearchEngine, Searchable};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email_verified_at: Option<String>,
}

impl Searchable for User {
    fn searchable_as() -> String {
        "users".to_string()
    }

    fn scout_key(&self) -> ScoutKey {
        ScoutKey::Int(self.id)
    }

    fn to_searchable_array(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("id".to_string(), json!(self.id));
        body.insert("name".to_string(), json!(self.name));
        body
    }
}

/// Searches `table`, writes `table_v2`
#[derive(Debug, Clone)]
pub struct VersionedRecord {
    pub id: i64,
}

impl Searchable for VersionedRecord {
    fn searchable_as() -> String {
        "table".to_string()
    }

    fn indexable_as() -> String {
        "table_v2".to_string()
    }

    fn scout_key(&self) -> ScoutKey {
        ScoutKey::Int(self.id)
    }

    fn to_searchable_array(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("id".to_string(), json!(self.id));
        body
    }
}

fn user_name(id: i64) -> String {
    match id {
        1 => "Laravel Framework".to_string(),
        11 => "Larry Casper".to_string(),
        12 => "Reta Larkin".to_string(),
        20 => "Prof. Larry Prosacco DVM".to_string(),
        39 => "Linkwood Larkin".to_string(),
        40 => "Otis Larson MD".to_string(),
        41 => "Gudrun Larkin".to_string(),
        42 => "Dax Larkin".to_string(),
        43 => "Dana Larson Sr.".to_string(),
        44 => "Amos Larson Sr.".to_string(),
        n => format!("Example {}", n),
    }
}

/// Forty-four users; 11, 20 and 21 through 39 never verified their email
pub fn users() -> Vec<User> {
    (1..=44)
        .map(|id| User {
            id,
            name: user_name(id),
            email_verified_at: match id {
                11 | 20 | 21..=39 => None,
                _ => Some("2024-01-01 00:00:00".to_string()),
            },
        })
        .collect()
}

pub fn store() -> Arc<InMemoryStore<User>> {
    Arc::new(InMemoryStore::new(users()))
}

/// Relevance order Meilisearch gives the ten users matching "lar"
pub const MEILI_LAR: [i64; 10] = [1, 11, 12, 39, 40, 41, 42, 43, 44, 20];

/// Relevance order Algolia gives the ten users matching "lar"
pub const ALGOLIA_LAR: [i64; 10] = [11, 1, 44, 43, 42, 41, 40, 39, 20, 12];

pub fn meili_hits(query: &str, ids: &[i64], total: u64) -> Value {
    let hits: Vec<Value> = ids
        .iter()
        .map(|&id| json!({"id": id, "name": user_name(id)}))
        .collect();
    json!({
        "hits": hits,
        "query": query,
        "processingTimeMs": 1,
        "totalHits": total,
    })
}

pub fn algolia_hits(query: &str, ids: &[i64], total: u64) -> Value {
    let hits: Vec<Value> = ids
        .iter()
        .map(|&id| json!({"objectID": id.to_string(), "name": user_name(id)}))
        .collect();
    json!({
        "hits": hits,
        "query": query,
        "processingTimeMS": 1,
        "nbHits": total,
    })
}

pub fn meili_engine(server: &MockServer) -> Arc<SearchEngine> {
    let engine = Meilisearch::new(&server.uri(), Some("masterKey".to_string())).unwrap();
    Arc::new(SearchEngine::new(HttpClient::new().unwrap(), Arc::new(engine)))
}

pub fn algolia_engine(server: &MockServer) -> Arc<SearchEngine> {
    let engine = Algolia::new("app-id", "secret", &server.uri(), &server.uri()).unwrap();
    Arc::new(SearchEngine::new(HttpClient::new().unwrap(), Arc::new(engine)))
}

pub fn search(engine: &Arc<SearchEngine>, query: &str) -> Builder<User> {
    Builder::new(Arc::clone(engine), store(), query)
}

/// Keeps the last raw response a builder hook saw
#[derive(Clone, Default)]
pub struct RawCapture(Arc<Mutex<Vec<Value>>>);

impl RawCapture {
    pub fn attach(&self, builder: Builder<User>) -> Builder<User> {
        let seen = Arc::clone(&self.0);
        builder.after_raw_search(move |raw| {
            seen.lock().unwrap().push(raw.clone().into_value());
        })
    }

    pub fn calls(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Value> {
        self.0.lock().unwrap().last().cloned()
    }
}

pub fn ids(users: &[User]) -> Vec<i64> {
    users.iter().map(|u| u.id).collect()
}

pub fn names(users: &[User]) -> Vec<(i64, String)> {
    users.iter().map(|u| (u.id, u.name.clone())).collect()
}

pub fn verified(query: scout_rs::RecordQuery<User>) -> scout_rs::RecordQuery<User> {
    query.filter(|u: &User| u.email_verified_at.is_some())
}
