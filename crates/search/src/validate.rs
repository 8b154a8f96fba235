//! Query validation against the server's `_validate/query` endpoint.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::query::Query;
use crate::spec::SearchSpec;
use crate::transport::SearchTransport;
use crate::{Error, Result};

const INDEX_NOT_FOUND: &str = "index_not_found_exception";
const LUCENE_PARSE_FAILURE: &str = "Cannot parse";

/// Validation result payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ValidationResponse {
	#[serde(default)]
	pub valid: bool,
	#[serde(rename = "_shards", default)]
	pub shards: ShardSummary,
	#[serde(default)]
	pub explanations: Vec<ValidationExplanation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShardSummary {
	#[serde(default)]
	pub total: u64,
	#[serde(default)]
	pub successful: u64,
	#[serde(default)]
	pub failed: u64,
}

/// Per-index explanation of an invalid query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ValidationExplanation {
	#[serde(default)]
	pub index: String,
	#[serde(default)]
	pub valid: bool,
	#[serde(rename = "error", default)]
	pub message: String,
}

impl ValidationExplanation {
	/// Error described by this explanation, if any.
	pub fn error(&self) -> Option<Error> {
		if self.message.is_empty() {
			return None;
		}
		if self.message.contains(LUCENE_PARSE_FAILURE) {
			return Some(Error::InvalidLuceneSyntax);
		}
		if self.index.is_empty() {
			return Some(Error::Validation(self.message.clone()));
		}
		let tag = format!("[{}]", self.index);
		Some(Error::Validation(self.message.replacen(&tag, "", 1).trim().to_owned()))
	}
}

impl ValidationResponse {
	/// Turns an invalid response into the most specific error available.
	///
	/// One distinct failure across all indices is returned as-is; anything
	/// else collapses to [`Error::InvalidQuery`].
	pub fn into_result(self) -> Result<Self> {
		if self.valid {
			return Ok(self);
		}
		let mut distinct: BTreeMap<String, Error> = BTreeMap::new();
		for explanation in &self.explanations {
			if let Some(err) = explanation.error() {
				distinct.entry(err.to_string()).or_insert(err);
			}
		}
		if distinct.len() == 1
			&& let Some((_, err)) = distinct.pop_first()
		{
			return Err(err);
		}
		Err(Error::InvalidQuery)
	}
}

/// Asks the server whether `query` is valid for the indices in `spec`.
pub async fn validate(transport: &dyn SearchTransport, query: &Query, spec: &SearchSpec) -> Result<ValidationResponse> {
	let (path, mut params) = spec.build_url("_validate/query")?;
	params.push(("explain".into(), "true".into()));
	debug!(path, "validating query");

	let body = Value::Object(query.validation_body());
	let raw = match transport.validate(&path, &params, &body).await {
		Ok(raw) => raw,
		Err(err) if err.to_string().contains(INDEX_NOT_FOUND) => return Err(Error::InvalidIndex),
		Err(err) => return Err(err),
	};
	let response: ValidationResponse = serde_json::from_slice(&raw)?;
	response.into_result()
}
