use chrono::{DateTime, FixedOffset};
use lgrep_search::spec::TIMESTAMP_FIELDS;
use serde_json::{Map, Value};
use tracing::debug;

/// Key the normalized timestamp is stored under.
pub const NORMALIZED_FIELD: &str = "timestamp";

pub(crate) fn parse_rfc3339(value: &Value) -> Option<DateTime<FixedOffset>> {
	value.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

/// Copies the document's time into [`NORMALIZED_FIELD`].
///
/// Indices disagree on where the time lives; the first of `@timestamp` and
/// `date` that holds an RFC3339 string wins. A `timestamp` that already
/// parses is left untouched.
pub fn normalize_timestamp(doc: &mut Map<String, Value>) {
	if doc.get(NORMALIZED_FIELD).and_then(parse_rfc3339).is_some() {
		return;
	}
	let found = TIMESTAMP_FIELDS
		.iter()
		.find_map(|field| doc.get(*field).and_then(parse_rfc3339));
	match found {
		Some(ts) => {
			doc.insert(NORMALIZED_FIELD.to_owned(), Value::String(ts.to_rfc3339()));
		}
		None => debug!("timestamp could not be normalized from document"),
	}
}
