//! Uniform representation of retrieved documents.

use std::borrow::Cow;
use std::fmt;

use serde::de::IgnoredAny;
use serde_json::{Map, Value};

use crate::spec::SearchSpec;
use crate::transport::Hit;
use crate::{Error, Result};

/// One retrieved result.
///
/// Created once per hit by the producing task and handed to the consumer
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
	/// Selected fields, as returned when the server honored a field restriction.
	Fields(Map<String, Value>),
	/// Serialized source document, decoded only on demand.
	Source(Vec<u8>),
	/// The full hit envelope including server metadata.
	Hit(Box<Hit>),
}

impl Document {
	/// Converts a hit according to `spec`.
	///
	/// Source bytes are checked for well-formedness here so a corrupt
	/// document is reported per hit instead of surfacing later at render time.
	pub fn from_hit(mut hit: Hit, spec: &SearchSpec) -> Result<Self> {
		if spec.raw {
			return Ok(Self::Hit(Box::new(hit)));
		}
		if let Some(fields) = hit.fields.take().filter(|fields| !fields.is_empty()) {
			return Ok(Self::Fields(fields));
		}
		let id = hit.display_id().to_owned();
		let Some(source) = hit.source else {
			return Err(Error::EmptyHit { id });
		};
		if let Err(source_err) = serde_json::from_slice::<IgnoredAny>(&source) {
			return Err(Error::Document { id, source: source_err });
		}
		Ok(Self::Source(source))
	}

	/// Decodes the document into a JSON object.
	pub fn to_map(&self) -> Result<Map<String, Value>> {
		match self {
			Self::Fields(fields) => Ok(fields.clone()),
			Self::Source(raw) => Ok(serde_json::from_slice(raw)?),
			Self::Hit(hit) => hit.to_envelope(),
		}
	}

	/// Encodes the document as JSON. Source documents pass through as-is.
	pub fn to_json(&self) -> Result<Cow<'_, [u8]>> {
		match self {
			Self::Fields(fields) => Ok(Cow::Owned(serde_json::to_vec(fields)?)),
			Self::Source(raw) => Ok(Cow::Borrowed(raw)),
			Self::Hit(hit) => Ok(Cow::Owned(serde_json::to_vec(&hit.to_envelope()?)?)),
		}
	}
}

impl fmt::Display for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.to_json() {
			Ok(json) => f.write_str(&String::from_utf8_lossy(&json)),
			Err(err) => write!(f, "{err}"),
		}
	}
}
