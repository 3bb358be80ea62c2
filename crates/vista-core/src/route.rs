//! Route-change keys supplied by the routing subsystem

use std::fmt;

use serde::Serialize;
use url::form_urlencoded;

/// A navigated location: path plus query parameters.
///
/// Values are only compared, never validated. Parameters are kept sorted by
/// name; repeated names keep their relative order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self.sort_query();
        self
    }

    /// First value of a query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse `"/listings?beds=3&city=Austin"` style input. Any `#fragment`
    /// is dropped; it never changes the page.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let input = input.split_once('#').map_or(input, |(before, _)| before);
        let (path, query) = input.split_once('?').unwrap_or((input, ""));

        let path = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };
        let mut route = Self {
            path,
            query: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        };
        route.sort_query();
        route
    }

    /// Canonical change-detection key. Query keys are sorted.
    pub fn change_key(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }

    // Stable, so repeated keys keep their order
    fn sort_query(&mut self) {
        self.query.sort_by(|a, b| a.0.cmp(&b.0));
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.change_key())
    }
}
