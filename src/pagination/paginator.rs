//! Page descriptors for full and simple pagination

use serde::Serialize;

/// One page of results together with the total match count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthAwarePaginator<T> {
    pub items: T,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub page_name: String,
    pub path: String,
    /// Extra query-string parameters carried into page URLs
    pub query: Vec<(String, String)>,
}

impl<T> LengthAwarePaginator<T> {
    pub fn new(items: T, total: u64, per_page: u32, current_page: u32) -> Self {
        Self {
            items,
            total,
            per_page: per_page.max(1),
            current_page: current_page.max(1),
            page_name: "page".to_string(),
            path: "/".to_string(),
            query: Vec::new(),
        }
    }

    pub fn with_page_name(mut self, page_name: impl Into<String>) -> Self {
        self.page_name = page_name.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Carry a query-string parameter into every page URL
    pub fn appends(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn last_page(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.per_page)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page()
    }

    pub fn on_first_page(&self) -> bool {
        self.current_page <= 1
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_more_pages().then(|| self.current_page + 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        (!self.on_first_page()).then(|| self.current_page - 1)
    }

    pub fn url(&self, page: u32) -> String {
        page_url(&self.path, &self.query, &self.page_name, page)
    }

    pub fn next_page_url(&self) -> Option<String> {
        self.next_page().map(|page| self.url(page))
    }

    pub fn previous_page_url(&self) -> Option<String> {
        self.previous_page().map(|page| self.url(page))
    }

    /// Replace the items, keeping the page bookkeeping
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> LengthAwarePaginator<U> {
        LengthAwarePaginator {
            items: f(self.items),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            page_name: self.page_name,
            path: self.path,
            query: self.query,
        }
    }
}

impl<T> LengthAwarePaginator<Vec<T>> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// 1-based position of the first item on this page
    pub fn from(&self) -> Option<u64> {
        item_range(self.current_page, self.per_page, self.items.len()).map(|(from, _)| from)
    }

    /// 1-based position of the last item on this page
    pub fn to(&self) -> Option<u64> {
        item_range(self.current_page, self.per_page, self.items.len()).map(|(_, to)| to)
    }
}

/// One page of results that only knows whether another page follows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplePaginator<T> {
    pub items: T,
    pub per_page: u32,
    pub current_page: u32,
    pub has_more_pages: bool,
    pub page_name: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl<T> SimplePaginator<T> {
    pub fn new(items: T, per_page: u32, current_page: u32, has_more_pages: bool) -> Self {
        Self {
            items,
            per_page: per_page.max(1),
            current_page: current_page.max(1),
            has_more_pages,
            page_name: "page".to_string(),
            path: "/".to_string(),
            query: Vec::new(),
        }
    }

    pub fn with_page_name(mut self, page_name: impl Into<String>) -> Self {
        self.page_name = page_name.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn appends(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn has_more_pages(&self) -> bool {
        self.has_more_pages
    }

    pub fn on_first_page(&self) -> bool {
        self.current_page <= 1
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_more_pages.then(|| self.current_page + 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        (!self.on_first_page()).then(|| self.current_page - 1)
    }

    pub fn url(&self, page: u32) -> String {
        page_url(&self.path, &self.query, &self.page_name, page)
    }

    pub fn next_page_url(&self) -> Option<String> {
        self.next_page().map(|page| self.url(page))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> SimplePaginator<U> {
        SimplePaginator {
            items: f(self.items),
            per_page: self.per_page,
            current_page: self.current_page,
            has_more_pages: self.has_more_pages,
            page_name: self.page_name,
            path: self.path,
            query: self.query,
        }
    }
}

impl<T> SimplePaginator<Vec<T>> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

/// How many keys of a window starting at rank `start` fall inside the first
/// `limit` matches
pub fn keys_within_limit(start: u64, wanted: u32, limit: Option<u32>) -> usize {
    let wanted = u64::from(wanted);
    let kept = match limit {
        Some(limit) => u64::from(limit).saturating_sub(start).min(wanted),
        None => wanted,
    };
    usize::try_from(kept).unwrap_or(usize::MAX)
}

/// Backend total, never more than the builder's limit
pub fn capped_total(total: u64, limit: Option<u32>) -> u64 {
    match limit {
        Some(limit) => total.min(u64::from(limit)),
        None => total,
    }
}

fn item_range(page: u32, per_page: u32, len: usize) -> Option<(u64, u64)> {
    if len == 0 {
        return None;
    }
    let from = u64::from(page.saturating_sub(1)) * u64::from(per_page) + 1;
    Some((from, from + len as u64 - 1))
}

fn page_url(path: &str, query: &[(String, String)], page_name: &str, page: u32) -> String {
    let page = page.to_string();
    let params: Vec<String> = query
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .chain(std::iter::once((page_name, page.as_str())))
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();

    format!("{}?{}", path, params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_aware_bookkeeping() {
        let page = LengthAwarePaginator::new(vec![6, 7, 8, 9, 10], 10, 5, 2);
        assert_eq!(page.last_page(), 2);
        assert!(!page.has_more_pages());
        assert_eq!(page.previous_page(), Some(1));
        assert_eq!(page.next_page(), None);
        assert_eq!(page.from(), Some(6));
        assert_eq!(page.to(), Some(10));
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let page = LengthAwarePaginator::new(Vec::<u8>::new(), 0, 15, 1);
        assert_eq!(page.last_page(), 1);
        assert!(page.on_first_page());
        assert_eq!(page.from(), None);
    }

    #[test]
    fn test_urls_carry_query() {
        let page = LengthAwarePaginator::new(vec![1], 30, 10, 1)
            .with_page_name("p")
            .with_path("/users")
            .appends("query", "larry casper");
        assert_eq!(page.next_page_url().unwrap(), "/users?query=larry%20casper&p=2");
        assert_eq!(page.previous_page_url(), None);
    }

    #[test]
    fn test_simple_paginator() {
        let page = SimplePaginator::new(vec!["a", "b"], 2, 1, true).appends("query", "lar");
        assert_eq!(page.next_page(), Some(2));
        assert_eq!(page.next_page_url().unwrap(), "/?query=lar&page=2");
        assert_eq!(page.map(|items| items.len()).items, 2);
    }

    #[test]
    fn test_limit_helpers() {
        assert_eq!(keys_within_limit(0, 5, Some(10)), 5);
        assert_eq!(keys_within_limit(5, 5, Some(7)), 2);
        assert_eq!(keys_within_limit(10, 5, Some(10)), 0);
        assert_eq!(keys_within_limit(40, 5, None), 5);
        assert_eq!(capped_total(44, Some(10)), 10);
        assert_eq!(capped_total(4, Some(10)), 4);
    }
}
