//! [`SearchSpec`]: what to fetch and how to shape requests for it.

use crate::transport::{QueryParams, ScrollRequest, SearchRequest};
use crate::{Error, Result};

/// Largest result count served by a single request; anything above is scrolled.
pub const MAX_SEARCH_SIZE: usize = 10_000;

/// Result count used when `size` is unset.
pub const DEFAULT_SIZE: usize = 100;

/// Timestamp fields used for time ordering, in preference order.
pub const TIMESTAMP_FIELDS: [&str; 2] = ["@timestamp", "date"];

/// Sort direction for time ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
	Asc,
	Desc,
}

impl SortOrder {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}
}

/// Immutable description of one search.
///
/// `size: None` means [`DEFAULT_SIZE`]; `Some(0)` means "do not execute".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSpec {
	/// Requested number of results.
	pub size: Option<usize>,
	/// Indices or index patterns to search.
	pub indices: Vec<String>,
	/// Mapping types to search.
	pub types: Vec<String>,
	/// Time ordering, if any.
	pub sort_time: Option<SortOrder>,
	/// Restrict returned documents to these fields.
	pub fields: Vec<String>,
	/// Yield whole hit envelopes instead of documents.
	pub raw: bool,
	/// Log request bodies as they are sent.
	pub debug: bool,
	/// Skip the validation round-trip before executing.
	pub skip_validation: bool,
}

impl SearchSpec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_size(mut self, size: usize) -> Self {
		self.size = Some(size);
		self
	}

	/// Adds an index or pattern. Blank names are ignored.
	pub fn with_index(mut self, index: impl Into<String>) -> Self {
		push_name(&mut self.indices, index.into());
		self
	}

	/// Adds a mapping type. Blank names are ignored.
	pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
		push_name(&mut self.types, doc_type.into());
		self
	}

	pub fn with_sort(mut self, order: SortOrder) -> Self {
		self.sort_time = Some(order);
		self
	}

	pub fn with_fields<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for field in fields {
			push_name(&mut self.fields, field.into());
		}
		self
	}

	pub fn with_raw(mut self, raw: bool) -> Self {
		self.raw = raw;
		self
	}

	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}

	pub fn with_skip_validation(mut self, skip: bool) -> Self {
		self.skip_validation = skip;
		self
	}

	/// Effective result count.
	pub fn size(&self) -> usize {
		self.size.unwrap_or(DEFAULT_SIZE)
	}

	/// Returns true when the request must be served by a scroll.
	pub fn needs_scroll(&self) -> bool {
		self.size() > MAX_SEARCH_SIZE
	}

	/// Returns true when at least one index or pattern bounds the search.
	pub fn has_index(&self) -> bool {
		!self.indices.is_empty()
	}

	/// Builds the path and parameters for an index-scoped endpoint.
	///
	/// The path is `/{index}/{type}/{endpoint}`, with `_all` standing in for
	/// the index when only types are set, and both segments dropped when
	/// neither is.
	pub fn build_url(&self, endpoint: &str) -> Result<(String, QueryParams)> {
		let endpoint = endpoint.trim_matches('/');
		if endpoint.is_empty() {
			return Err(Error::Config("endpoint path must not be empty".into()));
		}
		Ok((index_path(&self.indices, &self.types, endpoint), QueryParams::new()))
	}

	/// Applies size, indices, time sort and field selection to a single-page request.
	pub fn configure_search(&self, request: &mut SearchRequest) {
		request.size(self.size());
		request.indices.clone_from(&self.indices);
		request.types.clone_from(&self.types);
		if let Some(order) = self.sort_time {
			for field in TIMESTAMP_FIELDS {
				request.sort(field, order);
			}
		}
		request.source_includes(&self.fields);
	}

	/// Applies size, indices and field selection to a scroll request.
	///
	/// Sorting is left untouched: a scroll keeps the order it was opened with.
	pub fn configure_scroll(&self, request: &mut ScrollRequest) {
		request.size(self.size());
		request.indices.clone_from(&self.indices);
		request.types.clone_from(&self.types);
		request.source_includes(&self.fields);
	}
}

fn push_name(names: &mut Vec<String>, name: String) {
	let name = name.trim();
	if !name.is_empty() {
		names.push(name.to_owned());
	}
}

/// Joins indices and types into a request path ending in `endpoint`.
pub fn index_path(indices: &[String], types: &[String], endpoint: &str) -> String {
	match (indices.is_empty(), types.is_empty()) {
		(false, false) => format!("/{}/{}/{endpoint}", indices.join(","), types.join(",")),
		(false, true) => format!("/{}/{endpoint}", indices.join(",")),
		(true, false) => format!("/_all/{}/{endpoint}", types.join(",")),
		(true, true) => format!("/{endpoint}"),
	}
}
