use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

/// HTTP response handed back by a fetch function
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub url: String,
}

impl FetchResponse {
    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The server answered with a non-2xx status
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// The request never produced a response
    #[error("{message}")]
    Transport { message: String },
}

pub type FetchFuture = Pin<Box<dyn Future<Output = Result<FetchResponse, NetworkError>> + Send>>;

/// Callback for HTTP requests (used by curl)
/// Parameters: url, method, headers, body
pub type FetchFn = Arc<dyn Fn(String, String, HashMap<String, String>, Option<String>) -> FetchFuture + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> FetchResponse {
        FetchResponse {
            status,
            status_text: String::new(),
            headers: HashMap::new(),
            body: String::new(),
            url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_is_success() {
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(301).is_success());
        assert!(!response(404).is_success());
    }

    #[test]
    fn test_network_error_display() {
        assert_eq!(NetworkError::Http { status: 404 }.to_string(), "HTTP error! status: 404");
        let err = NetworkError::Transport { message: "Failed to fetch".to_string() };
        assert_eq!(err.to_string(), "Failed to fetch");
    }
}
