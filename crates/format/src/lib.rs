//! Rendering of search results for terminal output.
//!
//! A [`Formatter`] is built once from the user's format string and then
//! renders each streamed [`Document`] into a line of text. Format strings may
//! be shorthand (`.host .message`), full templates
//! (`{{.host}} {{ftime "%H:%M" .timestamp}}`) or raw (`.`).

mod curly;
mod error;
mod table;
mod template;
mod timestamp;

use lgrep_search::Document;
use serde_json::Value;
use tracing::debug;

pub use curly::{curly_format, field_tokens, is_raw_format};
pub use error::{FormatError, Result};
pub use table::Tabulator;
pub use template::Template;
pub use timestamp::{NORMALIZED_FIELD, normalize_timestamp};

/// Renders documents through a compiled format.
#[derive(Debug, Clone)]
pub struct Formatter {
	format: String,
	template: Option<Template>,
}

impl Formatter {
	/// Compiles `format`. Raw formats skip template compilation entirely.
	pub fn new(format: &str) -> Result<Self> {
		if is_raw_format(format) {
			return Ok(Self::raw());
		}
		let expanded = curly_format(format);
		debug!(format = %expanded, "using template format");
		Ok(Self {
			template: Some(Template::parse(&expanded)?),
			format: format.to_owned(),
		})
	}

	/// Formatter printing each document as JSON.
	pub fn raw() -> Self {
		Self {
			format: ".".to_owned(),
			template: None,
		}
	}

	pub fn is_raw(&self) -> bool {
		self.template.is_none()
	}

	/// The format string as given.
	pub fn format(&self) -> &str {
		&self.format
	}

	/// Renders one document, trimmed of surrounding whitespace.
	pub fn render(&self, doc: &Document) -> Result<String> {
		let Some(template) = &self.template else {
			let json = doc.to_json()?;
			return Ok(String::from_utf8_lossy(&json).trim().to_owned());
		};
		let mut map = doc.to_map()?;
		normalize_timestamp(&mut map);
		Ok(template.render(&Value::Object(map))?.trim().to_owned())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn source(value: Value) -> Document {
		Document::Source(serde_json::to_vec(&value).unwrap())
	}

	#[test]
	fn raw_format_passes_source_through() {
		let formatter = Formatter::new(".").unwrap();
		let doc = Document::Source(b"  {\"a\": 1}\n".to_vec());
		assert!(formatter.is_raw());
		assert_eq!(formatter.render(&doc).unwrap(), r#"{"a": 1}"#);
	}

	#[test]
	fn shorthand_renders_fields() {
		let formatter = Formatter::new(".host .message").unwrap();
		let doc = source(json!({ "host": "web-1", "message": "started " }));
		assert_eq!(formatter.render(&doc).unwrap(), "web-1 started");
	}

	#[test]
	fn timestamp_is_normalized_before_rendering() {
		let formatter = Formatter::new(r#"{{ftime "%Y-%m-%d" .timestamp}} {{.message}}"#).unwrap();
		let doc = source(json!({ "@timestamp": "2016-05-08T10:00:00Z", "message": "hi" }));
		assert_eq!(formatter.render(&doc).unwrap(), "2016-05-08 hi");
	}

	#[test]
	fn field_documents_render_like_sources() {
		let mut fields = serde_json::Map::new();
		fields.insert("host".into(), json!("web-2"));
		let formatter = Formatter::new(".host").unwrap();
		assert_eq!(formatter.render(&Document::Fields(fields)).unwrap(), "web-2");
	}

	#[test]
	fn undecodable_document_is_an_error() {
		let formatter = Formatter::new(".host").unwrap();
		let err = formatter.render(&Document::Source(b"{".to_vec())).unwrap_err();
		assert!(matches!(err, FormatError::Document(_)));
	}

	#[test]
	fn bad_template_fails_at_construction() {
		assert!(Formatter::new("{{.host").is_err());
	}
}
