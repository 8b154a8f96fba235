//! HTTP implementation of [`lgrep_search::SearchTransport`].
//!
//! Talks to the `_search`, `_search/scroll` and `_validate/query` endpoints of
//! an Elasticsearch-compatible REST API.

mod transport;
mod wire;

pub use transport::{DEFAULT_ENDPOINT, ElasticTransport, REQUEST_TIMEOUT};
