//! Error types for search execution.

use thiserror::Error;

use crate::spec::MAX_SEARCH_SIZE;

/// Errors produced while configuring, validating or streaming a search.
#[derive(Debug, Error)]
pub enum Error {
	/// The query was empty; nothing is sent to the server.
	#[error("empty search query, not submitting")]
	EmptySearch,

	/// A scrolled request was made without an index to bound it.
	#[error("an index pattern must be given for requests larger than {}", MAX_SEARCH_SIZE)]
	IndexRequired,

	/// Other invalid client-side configuration.
	#[error("invalid configuration: {0}")]
	Config(String),

	/// A raw JSON query did not decode to an object.
	#[error("query body must be a JSON object")]
	QueryNotObject,

	/// The targeted index does not exist on the server.
	#[error("specified index does not exist")]
	InvalidIndex,

	/// The server rejected the query for more than one reason.
	#[error("query is invalid")]
	InvalidQuery,

	/// The lucene query string could not be parsed.
	#[error("lucene query syntax is invalid")]
	InvalidLuceneSyntax,

	/// A single validation failure reported by the server.
	#[error("{0}")]
	Validation(String),

	/// The scroll cursor has no more results. Not a failure.
	#[error("end of stream")]
	EndOfStream,

	/// The request never produced a response.
	#[error("transport error: {0}")]
	Transport(String),

	/// The server answered with a non-success status.
	#[error("server responded with status {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, as text.
		body: String,
	},

	/// A scroll page failed after the stream started.
	#[error("server responded with error while scrolling: {0}")]
	Scroll(#[source] Box<Error>),

	/// A hit came back with neither a source document nor fields.
	#[error("hit {id} carried neither source nor fields")]
	EmptyHit {
		/// Document id, or `?` when the server omitted it.
		id: String,
	},

	/// A hit's source document could not be decoded.
	#[error("hit {id} has an undecodable source: {source}")]
	Document {
		/// Document id, or `?` when the server omitted it.
		id: String,
		/// Decoder failure.
		#[source]
		source: serde_json::Error,
	},

	/// JSON encoding or decoding failed.
	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),

	/// A stream callback asked to stop.
	#[error("{0}")]
	Handler(String),
}

impl Error {
	/// Builds a [`Error::Handler`] from any displayable message.
	pub fn handler(message: impl std::fmt::Display) -> Self {
		Self::Handler(message.to_string())
	}

	/// Returns true for errors raised before any request is sent.
	pub fn is_config(&self) -> bool {
		matches!(self, Self::EmptySearch | Self::IndexRequired | Self::Config(_) | Self::QueryNotObject)
	}
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, Error>;
