//! Top-level search orchestration.

use std::sync::Arc;

use tracing::debug;

use crate::document::Document;
use crate::execute::{scroll, single};
use crate::query::Query;
use crate::spec::SearchSpec;
use crate::stream::SearchStream;
use crate::transport::SearchTransport;
use crate::validate::{self, ValidationResponse};
use crate::{Error, Result};

/// Search client bound to one transport.
///
/// Drives at most one stream at a time in normal use, though nothing stops a
/// caller from holding several.
#[derive(Clone)]
pub struct Client {
	transport: Arc<dyn SearchTransport>,
}

impl std::fmt::Debug for Client {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Client").finish_non_exhaustive()
	}
}

impl Client {
	pub fn new(transport: impl SearchTransport) -> Self {
		Self {
			transport: Arc::new(transport),
		}
	}

	pub fn from_shared(transport: Arc<dyn SearchTransport>) -> Self {
		Self { transport }
	}

	/// Validates `query` without executing it.
	pub async fn validate(&self, query: &Query, spec: &SearchSpec) -> Result<ValidationResponse> {
		validate::validate(self.transport.as_ref(), query, spec).await
	}

	/// Starts a search and returns its result stream.
	///
	/// Configuration problems and validation failures are returned here,
	/// before any background work starts. A size of zero yields an already
	/// finished, empty stream.
	pub async fn search(&self, query: &Query, spec: &SearchSpec) -> Result<SearchStream> {
		if query.is_empty() {
			return Err(Error::EmptySearch);
		}
		if spec.size() == 0 {
			debug!("size is zero, not executing");
			return Ok(SearchStream::empty());
		}
		if spec.needs_scroll() && !spec.has_index() {
			return Err(Error::IndexRequired);
		}
		if !spec.skip_validation {
			self.validate(query, spec).await?;
		}

		let transport = Arc::clone(&self.transport);
		if spec.needs_scroll() {
			scroll::start(transport, query, spec)
		} else {
			Ok(single::start(transport, query, spec))
		}
	}

	/// Runs a search and collects every result, failing on the first error.
	pub async fn search_all(&self, query: &Query, spec: &SearchSpec) -> Result<Vec<Document>> {
		self.search(query, spec).await?.collect_all().await
	}
}
