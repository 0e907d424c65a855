use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Immutable snapshot of request data handed to every hook.
///
/// Built once per inbound request by the host; hooks only ever borrow it
/// and return new values, never rewrite it. The identifier is opaque — it
/// may embed backend-specific hints, but this layer never parses it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub identifier: String,
    pub client_ip: String,
    /// Ordered header multimap, preserved exactly as received.
    #[serde(default)]
    request_headers: Vec<(String, String)>,
    #[serde(default)]
    cookies: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = ip.into();
        self
    }

    /// Appends a header; repeated names are kept, in arrival order.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// First value for a header name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.request_headers
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}
