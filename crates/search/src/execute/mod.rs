//! Producers that drive a search and publish into a [`SearchStream`].
//!
//! Requests up to [`MAX_SEARCH_SIZE`](crate::spec::MAX_SEARCH_SIZE) are
//! served by one request ([`single`]); larger ones open a scroll and page
//! through it in fixed chunks ([`scroll`]).

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::debug;

pub(crate) mod scroll;
pub(crate) mod single;

/// Page size of each scroll round-trip, and the results channel capacity.
pub const SCROLL_CHUNK: usize = 100;

/// How long the server keeps a scroll alive between pages.
pub const SCROLL_KEEP_ALIVE: Duration = Duration::from_secs(30);

pub(crate) type SharedTransport = Arc<dyn crate::transport::SearchTransport>;

pub(crate) fn debug_body(kind: &str, path: &str, body: &Map<String, Value>) {
	match serde_json::to_string_pretty(body) {
		Ok(pretty) => debug!(kind, path, "outgoing request body:\n{pretty}"),
		Err(err) => debug!(kind, path, error = %err, "outgoing request body not printable"),
	}
}

#[cfg(test)]
mod tests {
	use std::io;
	use std::sync::{Arc, Mutex};

	use tracing::Level;

	use super::*;

	#[derive(Clone, Default)]
	struct Captured(Arc<Mutex<Vec<u8>>>);

	impl io::Write for Captured {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	fn logged_at(level: Level) -> String {
		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_max_level(level)
			.with_ansi(false)
			.with_writer(move || writer.clone())
			.finish();
		let mut body = Map::new();
		body.insert("size".into(), Value::from(3));
		tracing::subscriber::with_default(subscriber, || debug_body("search", "/logs-*/_search", &body));
		String::from_utf8(captured.0.lock().unwrap().clone()).unwrap()
	}

	#[test]
	fn request_bodies_only_show_at_debug_level() {
		assert_eq!(logged_at(Level::INFO), "");
		assert!(logged_at(Level::DEBUG).contains("\"size\": 3"));
	}
}
