//! Streaming search execution for Elasticsearch-style REST indices.
//!
//! * [`Client`]: validates a query and picks single-request or scrolled execution
//! * [`SearchStream`]: the cancellable result stream a search returns
//! * [`SearchTransport`]: the seam to the remote server
//! * [`Document`]: a uniform view over the hit shapes a server returns

pub mod client;
pub mod document;
pub mod error;
pub mod execute;
pub mod query;
pub mod spec;
pub mod stream;
pub mod transport;
pub mod validate;

pub use client::Client;
pub use document::Document;
pub use error::{Error, Result};
pub use execute::{SCROLL_CHUNK, SCROLL_KEEP_ALIVE};
pub use query::Query;
pub use spec::{DEFAULT_SIZE, MAX_SEARCH_SIZE, SearchSpec, SortOrder};
pub use stream::{QUIT_TIMEOUT, SearchStream, StreamState};
pub use transport::{Hit, Page, QueryParams, ScrollRequest, SearchRequest, SearchTransport};
pub use validate::{ValidationExplanation, ValidationResponse};
