//! A small template language for rendering documents.
//!
//! Supported actions:
//!
//! * `{{.}}`: the whole document as compact JSON
//! * `{{.a.b}}`: a nested field; `{{."@timestamp"}}` quotes awkward keys
//! * `{{ftime "%Y-%m-%d" .timestamp}}`: a time field in a strftime layout
//!
//! Missing fields render as nothing.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::timestamp::parse_rfc3339;
use crate::{FormatError, Result};

/// A compiled format string.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
	segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
	Text(String),
	Action(Action),
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
	Field(FieldPath),
	Ftime { layout: String, field: FieldPath },
}

/// Keys to descend through; empty means the document itself.
#[derive(Debug, Clone, PartialEq, Default)]
struct FieldPath(Vec<String>);

impl FieldPath {
	fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
		self.0.iter().try_fold(root, |value, key| match value {
			Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
			_ => value.get(key.as_str()),
		})
	}
}

impl Template {
	/// Compiles a full template. Shorthand is not expanded here; see
	/// [`crate::curly_format`].
	pub fn parse(source: &str) -> Result<Self> {
		let mut segments = Vec::new();
		let mut rest = source;
		let mut offset = 0;
		while let Some(open) = rest.find("{{") {
			if open > 0 {
				segments.push(Segment::Text(rest[..open].to_owned()));
			}
			let body = &rest[open + 2..];
			let close = body.find("}}").ok_or(FormatError::Unclosed(offset + open))?;
			segments.push(Segment::Action(parse_action(body[..close].trim())?));
			let consumed = open + 2 + close + 2;
			offset += consumed;
			rest = &rest[consumed..];
		}
		if !rest.is_empty() {
			segments.push(Segment::Text(rest.to_owned()));
		}
		Ok(Self { segments })
	}

	/// Renders the template against `root`.
	pub fn render(&self, root: &Value) -> Result<String> {
		let mut out = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Text(text) => out.push_str(text),
				Segment::Action(Action::Field(path)) => {
					if let Some(value) = path.lookup(root) {
						write_value(&mut out, value);
					}
				}
				Segment::Action(Action::Ftime { layout, field }) => {
					if let Some(value) = field.lookup(root) {
						write_time(&mut out, layout, value)?;
					}
				}
			}
		}
		Ok(out)
	}
}

fn write_value(out: &mut String, value: &Value) {
	match value {
		Value::Null => {}
		Value::String(s) => out.push_str(s),
		other => out.push_str(&other.to_string()),
	}
}

fn write_time(out: &mut String, layout: &str, value: &Value) -> Result<()> {
	if let Some(ts) = parse_rfc3339(value) {
		write!(out, "{}", ts.format(layout))?;
		return Ok(());
	}
	// Epoch milliseconds, as date fields are commonly mapped.
	if let Some(ts) = value.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis) {
		write!(out, "{}", ts.format(layout))?;
		return Ok(());
	}
	write_value(out, value);
	Ok(())
}

fn parse_action(action: &str) -> Result<Action> {
	if action.is_empty() {
		return Err(FormatError::template(action, "empty action"));
	}
	if action.starts_with('.') {
		let (path, rest) = parse_path(action, action)?;
		expect_end(action, rest)?;
		return Ok(Action::Field(path));
	}

	let (name, args) = action.split_once(char::is_whitespace).unwrap_or((action, ""));
	match name {
		"ftime" => {
			let args = args.trim_start();
			let (layout, rest) = parse_quoted(args).ok_or_else(|| FormatError::template(action, "ftime expects a quoted layout"))?;
			if StrftimeItems::new(&layout).any(|item| matches!(item, Item::Error)) {
				return Err(FormatError::template(action, format!("invalid time layout {layout:?}")));
			}
			let (field, rest) = parse_path(action, rest.trim_start())?;
			expect_end(action, rest)?;
			Ok(Action::Ftime { layout, field })
		}
		other => Err(FormatError::template(action, format!("unknown function {other:?}"))),
	}
}

fn expect_end(action: &str, rest: &str) -> Result<()> {
	if rest.trim().is_empty() {
		Ok(())
	} else {
		Err(FormatError::template(action, format!("unexpected {:?}", rest.trim())))
	}
}

/// Parses `.a."b.c".d` from the front of `input`, returning the remainder.
fn parse_path<'a>(action: &str, input: &'a str) -> Result<(FieldPath, &'a str)> {
	let Some(after) = input.strip_prefix('.') else {
		return Err(FormatError::template(action, "expected a field path"));
	};
	if after.is_empty() || after.starts_with(char::is_whitespace) {
		return Ok((FieldPath::default(), after));
	}

	let mut keys = Vec::new();
	let mut rest = input;
	while let Some(after) = rest.strip_prefix('.') {
		if after.starts_with('"') {
			let (key, tail) = parse_quoted(after).ok_or_else(|| FormatError::template(action, "unterminated quoted field"))?;
			keys.push(key);
			rest = tail;
		} else {
			let end = after
				.find(|c: char| c == '.' || c.is_whitespace())
				.unwrap_or(after.len());
			if end == 0 {
				return Err(FormatError::template(action, "empty field name"));
			}
			keys.push(after[..end].to_owned());
			rest = &after[end..];
		}
	}
	Ok((FieldPath(keys), rest))
}

/// Parses a double-quoted string with `\"` and `\\` escapes.
fn parse_quoted(input: &str) -> Option<(String, &str)> {
	let body = input.strip_prefix('"')?;
	let mut out = String::new();
	let mut escaped = false;
	for (i, ch) in body.char_indices() {
		match ch {
			_ if escaped => {
				out.push(ch);
				escaped = false;
			}
			'\\' => escaped = true,
			'"' => return Some((out, &body[i + 1..])),
			_ => out.push(ch),
		}
	}
	None
}
