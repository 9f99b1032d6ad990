pub mod fetch;
pub mod types;

pub use fetch::http_fetch_fn;
pub use types::{FetchFn, FetchFuture, FetchResponse, NetworkError};
