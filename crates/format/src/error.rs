//! Error types for result formatting.

use thiserror::Error;

/// Errors raised while compiling a format string or rendering a result.
#[derive(Debug, Error)]
pub enum FormatError {
	/// The format string could not be compiled into a template.
	#[error("format template invalid at '{action}': {reason}")]
	Template {
		/// Offending action text, without braces.
		action: String,
		/// What is wrong with it.
		reason: String,
	},

	/// A `{{` was never closed.
	#[error("format template has an unclosed action starting at byte {0}")]
	Unclosed(usize),

	/// Token extraction pattern failed to compile.
	#[error("field token pattern: {0}")]
	Pattern(#[from] regex::Error),

	/// The result could not be converted for rendering.
	#[error(transparent)]
	Document(#[from] lgrep_search::Error),

	/// Writing formatted output failed.
	#[error("failed to format value: {0}")]
	Write(#[from] std::fmt::Error),
}

impl FormatError {
	pub(crate) fn template(action: &str, reason: impl Into<String>) -> Self {
		Self::Template {
			action: action.to_owned(),
			reason: reason.into(),
		}
	}
}

/// Result type for formatting operations.
pub type Result<T> = std::result::Result<T, FormatError>;
