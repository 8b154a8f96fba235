//! Query bodies sent to the server.

use serde_json::{Map, Value, json};

use crate::{Error, Result};

/// A user query, either lucene syntax or a raw JSON request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
	/// Lucene query string, expanded with wildcard analysis.
	Lucene(String),
	/// Complete JSON request body.
	Json(Map<String, Value>),
}

impl Query {
	pub fn lucene(query: impl Into<String>) -> Self {
		Self::Lucene(query.into())
	}

	/// Parses a raw JSON request body. Anything other than an object is rejected.
	pub fn from_json(bytes: &[u8]) -> Result<Self> {
		match serde_json::from_slice(bytes)? {
			Value::Object(body) => Ok(Self::Json(body)),
			_ => Err(Error::QueryNotObject),
		}
	}

	/// Returns true for a blank lucene query.
	///
	/// JSON bodies are never empty here; an empty object is left for the
	/// server to reject.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Lucene(query) => query.trim().is_empty(),
			Self::Json(_) => false,
		}
	}

	/// Full request body for this query.
	pub fn body(&self) -> Map<String, Value> {
		match self {
			Self::Lucene(query) => {
				let mut body = Map::new();
				body.insert(
					"query".into(),
					json!({ "query_string": { "analyze_wildcard": true, "query": query } }),
				);
				body
			}
			Self::Json(body) => body.clone(),
		}
	}

	/// Body accepted by the validation endpoint, which only takes `query`.
	pub fn validation_body(&self) -> Map<String, Value> {
		let body = self.body();
		match body.get("query") {
			Some(query) => {
				let mut only_query = Map::new();
				only_query.insert("query".into(), query.clone());
				only_query
			}
			None => body,
		}
	}
}
