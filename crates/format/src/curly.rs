//! Shorthand format strings.
//!
//! Users usually write `.host .message` rather than full templates. These
//! helpers turn the shorthand into `{{.host}} {{.message}}` and inspect the
//! result.

use regex::Regex;

use crate::Result;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Wraps every whitespace-delimited `.field` token in template braces.
///
/// Strings that already contain both `{{` and `}}` are treated as full
/// templates and returned unchanged.
pub fn curly_format(format: &str) -> String {
	if format.contains(OPEN) && format.contains(CLOSE) {
		return format.to_owned();
	}

	let mut out = String::with_capacity(format.len() + 8);
	let mut in_token = false;
	for ch in format.chars() {
		if ch == '.' && !in_token {
			out.push_str(OPEN);
			in_token = true;
		}
		if ch.is_whitespace() {
			if in_token {
				out.push_str(CLOSE);
			}
			in_token = false;
		}
		out.push(ch);
	}
	if in_token {
		out.push_str(CLOSE);
	}
	out
}

/// Returns true when `format` asks for the whole document as JSON.
pub fn is_raw_format(format: &str) -> bool {
	format == "." || format.contains("{{.}}")
}

/// Extracts the trimmed contents of every action in `format`.
///
/// Shorthand is expanded first, so `.one .two` yields `[".one", ".two"]`.
pub fn field_tokens(format: &str) -> Result<Vec<String>> {
	let matcher = Regex::new(r"\{\{([^{}]+)\}\}")?;
	let format = curly_format(format);
	Ok(matcher
		.captures_iter(&format)
		.map(|caps| caps[1].trim().to_owned())
		.collect())
}
