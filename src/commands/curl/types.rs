/// Types for curl command

use std::collections::HashMap;

/// A fully parsed curl invocation, ready to hand to a fetch function.
#[derive(Debug, Clone, PartialEq)]
pub struct CurlRequest {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    /// Sent only for `POST`.
    pub body: Option<String>,
    /// `-i`: prefix the body with the status line.
    pub include_headers: bool,
}

impl Default for CurlRequest {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            body: None,
            include_headers: false,
        }
    }
}
