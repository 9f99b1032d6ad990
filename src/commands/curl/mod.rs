/// curl - Transfer data from a URL
///
/// Parsing happens synchronously; the request itself is handed back to the
/// session as a `SessionAction::Fetch` and completed by `perform`.

pub mod parse;
pub mod types;

use log::warn;

use crate::commands::{CommandContext, CommandResult, SessionAction};
use crate::network::{FetchFn, NetworkError};

pub use self::parse::parse_request;
pub use self::types::CurlRequest;

/// Output when no fetch function is configured.
pub const NETWORK_UNAVAILABLE: &str = "curl: (6) Could not resolve host (network not available)";

pub fn execute(ctx: &mut CommandContext<'_>) -> CommandResult {
    match parse_request(&ctx.args) {
        Ok(request) => CommandResult::with_action(SessionAction::Fetch(request)),
        Err(message) => CommandResult::error(message),
    }
}

/// Run the request and render the single output line.
pub async fn perform(request: CurlRequest, fetch_fn: Option<FetchFn>) -> String {
    let Some(fetch_fn) = fetch_fn else {
        return NETWORK_UNAVAILABLE.to_string();
    };

    let result = fetch_fn(request.url.clone(), request.method.clone(), request.headers.clone(), request.body.clone()).await;
    let response = match result {
        Ok(response) if response.is_success() => response,
        Ok(response) => return format!("curl: {}", NetworkError::Http { status: response.status }),
        Err(err) => {
            warn!("curl {} failed: {}", request.url, err);
            return format!("curl: {}", err);
        }
    };

    if request.include_headers {
        format!("HTTP {} {}\n{}", response.status, response.status_text, response.body)
    } else {
        response.body
    }
}
