// src/network/fetch.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, Method};

use super::types::{FetchFn, FetchFuture, FetchResponse, NetworkError};

fn transport(err: impl std::fmt::Display) -> NetworkError {
    NetworkError::Transport { message: err.to_string() }
}

/// Create a FetchFn backed by a real HTTP client.
pub fn http_fetch_fn(timeout: Duration) -> FetchFn {
    let client = Client::builder().timeout(timeout).build().unwrap_or_else(|err| {
        warn!("http client with timeout unavailable ({}), using defaults", err);
        Client::new()
    });

    Arc::new(move |url: String, method: String, headers: HashMap<String, String>, body: Option<String>| {
        let client = client.clone();
        Box::pin(async move {
            let method = Method::from_bytes(method.to_uppercase().as_bytes()).map_err(transport)?;
            debug!("fetch {} {}", method, url);

            let mut request = client.request(method, url.as_str());
            for (name, value) in &headers {
                request = request.header(name.as_str(), value.as_str());
            }
            if let Some(body) = body {
                request = request.body(body);
            }

            let response = request.send().await.map_err(transport)?;
            let status = response.status();
            let final_url = response.url().to_string();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
                .collect();
            let body = response.text().await.map_err(transport)?;

            Ok(FetchResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body,
                url: final_url,
            })
        }) as FetchFuture
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_method_is_transport_error() {
        let fetch = http_fetch_fn(Duration::from_secs(1));
        let result = fetch("https://example.com".to_string(), "BAD METHOD".to_string(), HashMap::new(), None).await;
        assert!(matches!(result, Err(NetworkError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url_is_transport_error() {
        let fetch = http_fetch_fn(Duration::from_secs(1));
        let result = fetch("not a url".to_string(), "GET".to_string(), HashMap::new(), None).await;
        assert!(matches!(result, Err(NetworkError::Transport { .. })));
    }
}
