//! Search request and related data models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sort direction for `order_by` clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Which slice of the ranked matches a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Window {
    /// The first `n` matches
    Limit(u32),
    /// One page of a page-numbered listing (1-indexed)
    Page { page: u32, per_page: u32 },
    /// `length` matches starting at rank `offset` (0-indexed)
    Offset { offset: u64, length: u32 },
}

impl Window {
    /// Zero-based rank of the first match in this window
    pub fn start(&self) -> u64 {
        match *self {
            Window::Limit(_) => 0,
            Window::Page { page, per_page } => {
                u64::from(page.saturating_sub(1)) * u64::from(per_page)
            }
            Window::Offset { offset, .. } => offset,
        }
    }

    /// Maximum number of matches the window holds
    pub fn size(&self) -> u32 {
        match *self {
            Window::Limit(n) => n,
            Window::Page { per_page, .. } => per_page,
            Window::Offset { length, .. } => length,
        }
    }
}

/// Everything an engine needs to run one search.
///
/// Built from a query builder for a single backend call and never mutated
/// after dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,
    /// Resolved index name
    pub index: String,
    /// Primary-key field inside index documents
    pub key_name: String,
    /// Equality constraints
    pub wheres: Vec<(String, Value)>,
    /// Membership constraints
    pub where_ins: Vec<(String, Vec<Value>)>,
    /// Exclusion constraints
    pub where_not_ins: Vec<(String, Vec<Value>)>,
    pub orders: Vec<OrderBy>,
    /// Slice of matches requested; `None` leaves it to the backend default
    pub window: Option<Window>,
    /// Engine-native parameters merged into the request body last
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl SearchRequest {
    pub fn new(index: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            index: index.into(),
            key_name: "id".to_string(),
            wheres: Vec::new(),
            where_ins: Vec::new(),
            where_not_ins: Vec::new(),
            orders: Vec::new(),
            window: None,
            options: Map::new(),
        }
    }

    pub fn with_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = key_name.into();
        self
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }

    pub fn has_filters(&self) -> bool {
        !(self.wheres.is_empty() && self.where_ins.is_empty() && self.where_not_ins.is_empty())
    }
}
