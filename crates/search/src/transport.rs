//! Transport seam between the stream engine and a search server.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::Result;
use crate::spec::{SortOrder, index_path};

/// Query parameters attached to a request path.
pub type QueryParams = Vec<(String, String)>;

/// One matched document as returned by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hit {
	/// Index the document lives in.
	pub index: Option<String>,
	/// Mapping type of the document.
	pub doc_type: Option<String>,
	/// Document id.
	pub id: Option<String>,
	/// Relevance score, absent when sorting by field.
	pub score: Option<f64>,
	/// Serialized source document, untouched.
	pub source: Option<Vec<u8>>,
	/// Selected stored fields.
	pub fields: Option<Map<String, Value>>,
	/// Sort values the server ordered this hit by.
	pub sort: Option<Vec<Value>>,
}

impl Hit {
	/// Id used in logs and error messages.
	pub fn display_id(&self) -> &str {
		self.id.as_deref().unwrap_or("?")
	}

	/// Rebuilds the server envelope for this hit.
	///
	/// Fails when the source bytes are not valid JSON.
	pub fn to_envelope(&self) -> Result<Map<String, Value>> {
		let mut envelope = Map::new();
		if let Some(index) = &self.index {
			envelope.insert("_index".into(), Value::String(index.clone()));
		}
		if let Some(doc_type) = &self.doc_type {
			envelope.insert("_type".into(), Value::String(doc_type.clone()));
		}
		if let Some(id) = &self.id {
			envelope.insert("_id".into(), Value::String(id.clone()));
		}
		envelope.insert("_score".into(), self.score.map_or(Value::Null, |s| json!(s)));
		if let Some(source) = &self.source {
			envelope.insert("_source".into(), serde_json::from_slice(source)?);
		}
		if let Some(fields) = &self.fields {
			envelope.insert("fields".into(), Value::Object(fields.clone()));
		}
		if let Some(sort) = &self.sort {
			envelope.insert("sort".into(), Value::Array(sort.clone()));
		}
		Ok(envelope)
	}
}

/// One page of results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
	/// Cursor token to continue from, when the request opened or advanced a scroll.
	pub scroll_id: Option<String>,
	/// Hits in server order.
	pub hits: Vec<Hit>,
	/// Total matching documents, when reported.
	pub total: Option<u64>,
}

/// A single-page search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
	/// Indices (or patterns) to search, empty for all.
	pub indices: Vec<String>,
	/// Mapping types to search, empty for all.
	pub types: Vec<String>,
	/// Request body.
	pub body: Map<String, Value>,
}

impl SearchRequest {
	/// Creates a request with the given body and no index restriction.
	pub fn new(body: Map<String, Value>) -> Self {
		Self {
			body,
			..Self::default()
		}
	}

	/// Path of the `_search` endpoint for this request.
	pub fn path(&self) -> String {
		index_path(&self.indices, &self.types, "_search")
	}

	/// Sets the number of hits to return.
	pub fn size(&mut self, size: usize) -> &mut Self {
		self.body.insert("size".into(), json!(size));
		self
	}

	/// Appends a sort clause that tolerates the field being unmapped.
	pub fn sort(&mut self, field: &str, order: SortOrder) -> &mut Self {
		let clause = json!({ field: { "unmapped_type": "boolean", "order": order.as_str() } });
		match self.body.get_mut("sort") {
			Some(Value::Array(clauses)) => clauses.push(clause),
			_ => {
				self.body.insert("sort".into(), Value::Array(vec![clause]));
			}
		}
		self
	}

	/// Restricts returned source documents to the named fields.
	pub fn source_includes(&mut self, fields: &[String]) -> &mut Self {
		source_includes(&mut self.body, fields);
		self
	}
}

/// A scroll-initialization request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRequest {
	/// Indices (or patterns) to scroll over.
	pub indices: Vec<String>,
	/// Mapping types to scroll over.
	pub types: Vec<String>,
	/// How long the server keeps the cursor alive between pages.
	pub keep_alive: Duration,
	/// Request body for the first page.
	pub body: Map<String, Value>,
}

impl ScrollRequest {
	/// Creates a scroll request with the given body and keep-alive.
	pub fn new(body: Map<String, Value>, keep_alive: Duration) -> Self {
		Self {
			indices: Vec::new(),
			types: Vec::new(),
			keep_alive,
			body,
		}
	}

	/// Path of the `_search` endpoint that opens the scroll.
	pub fn path(&self) -> String {
		index_path(&self.indices, &self.types, "_search")
	}

	/// Keep-alive rendered as a server time value, e.g. `30s`.
	pub fn keep_alive_param(&self) -> String {
		format!("{}s", self.keep_alive.as_secs().max(1))
	}

	/// Sets the page size.
	pub fn size(&mut self, size: usize) -> &mut Self {
		self.body.insert("size".into(), json!(size));
		self
	}

	/// Restricts returned source documents to the named fields.
	pub fn source_includes(&mut self, fields: &[String]) -> &mut Self {
		source_includes(&mut self.body, fields);
		self
	}
}

fn source_includes(body: &mut Map<String, Value>, fields: &[String]) {
	if fields.is_empty() {
		return;
	}
	body.insert("_source".into(), json!({ "includes": fields }));
}

/// Remote operations the stream engine needs from a search server.
#[async_trait]
pub trait SearchTransport: Send + Sync + 'static {
	/// Executes one search request.
	async fn search(&self, request: &SearchRequest) -> Result<Page>;

	/// Opens a scroll (`scroll_id` is `None`) or advances it.
	///
	/// An exhausted cursor is signalled either by a page without hits, which
	/// still carries its scroll id so the cursor can be cleared, or by
	/// [`crate::Error::EndOfStream`] when no cursor is left to clear.
	async fn scroll(&self, request: &ScrollRequest, scroll_id: Option<&str>) -> Result<Page>;

	/// Releases server-side cursor state for the given tokens.
	async fn clear_scroll(&self, scroll_ids: &[String]) -> Result<()>;

	/// Sends a validation request and returns the raw response body.
	async fn validate(&self, path: &str, params: &[(String, String)], body: &Value) -> Result<Vec<u8>>;
}
