#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use lgrep_search::{Error, Hit, Page, Result, ScrollRequest, SearchRequest, SearchTransport};
use serde_json::Value;

/// Calls observed by [`StubTransport`].
#[derive(Debug, Default)]
pub struct Calls {
	pub search: usize,
	pub scroll: usize,
	pub validate: usize,
	pub issued: Vec<String>,
	pub cleared: Vec<String>,
	pub continued_with: Vec<Option<String>>,
}

/// In-memory transport serving `available` numbered documents.
#[derive(Debug, Default)]
pub struct StubTransport {
	pub available: usize,
	/// Single-page response override.
	pub page: Option<Vec<Hit>>,
	/// Scroll call index (0-based) that fails with a server error.
	pub fail_scroll_at: Option<usize>,
	pub fail_search: bool,
	pub fail_clear: bool,
	pub invalid: bool,
	/// Scroll id returned by every page instead of a fresh one per call.
	pub stable_id: Option<&'static str>,
	/// Document number served with an undecodable source.
	pub corrupt: Option<usize>,
	/// End scrolls with an empty page carrying a fresh id, as servers do,
	/// rather than with end of stream.
	pub empty_tail: bool,
	pub calls: Mutex<Calls>,
}

impl StubTransport {
	pub fn with_documents(available: usize) -> Self {
		Self {
			available,
			..Self::default()
		}
	}

	fn hit(&self, n: usize) -> Hit {
		if self.corrupt == Some(n) {
			return Hit {
				source: Some(br#"{"n": "#.to_vec()),
				..numbered_hit(n)
			};
		}
		numbered_hit(n)
	}

	pub fn calls<T>(&self, f: impl FnOnce(&Calls) -> T) -> T {
		f(&self.calls.lock().unwrap())
	}
}

pub fn numbered_hit(n: usize) -> Hit {
	Hit {
		index: Some("logs-2016.05.08".into()),
		id: Some(n.to_string()),
		source: Some(format!(r#"{{"n":{n}}}"#).into_bytes()),
		..Hit::default()
	}
}

fn requested_size(body: &serde_json::Map<String, Value>) -> usize {
	body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize
}

#[async_trait]
impl SearchTransport for StubTransport {
	async fn search(&self, request: &SearchRequest) -> Result<Page> {
		self.calls.lock().unwrap().search += 1;
		if self.fail_search {
			return Err(Error::Status {
				status: 500,
				body: "boom".into(),
			});
		}
		let hits = match &self.page {
			Some(hits) => hits.clone(),
			None => (0..requested_size(&request.body).min(self.available)).map(numbered_hit).collect(),
		};
		Ok(Page {
			scroll_id: None,
			total: Some(self.available as u64),
			hits,
		})
	}

	async fn scroll(&self, request: &ScrollRequest, scroll_id: Option<&str>) -> Result<Page> {
		let (call, served) = {
			let mut calls = self.calls.lock().unwrap();
			let call = calls.scroll;
			calls.scroll += 1;
			calls.continued_with.push(scroll_id.map(str::to_owned));
			(call, call * requested_size(&request.body))
		};
		if self.fail_scroll_at == Some(call) {
			return Err(Error::Status {
				status: 503,
				body: "unavailable".into(),
			});
		}
		if served >= self.available && !self.empty_tail {
			return Err(Error::EndOfStream);
		}
		let upto = (served + requested_size(&request.body)).min(self.available);
		let next_id = match self.stable_id {
			Some(id) => id.to_owned(),
			None => format!("scroll-{call}"),
		};
		{
			let mut calls = self.calls.lock().unwrap();
			if !calls.issued.contains(&next_id) {
				calls.issued.push(next_id.clone());
			}
		}
		Ok(Page {
			scroll_id: Some(next_id),
			total: Some(self.available as u64),
			hits: (served.min(upto)..upto).map(|n| self.hit(n)).collect(),
		})
	}

	async fn clear_scroll(&self, scroll_ids: &[String]) -> Result<()> {
		if self.fail_clear {
			return Err(Error::Transport("connection reset".into()));
		}
		self.calls.lock().unwrap().cleared.extend_from_slice(scroll_ids);
		Ok(())
	}

	async fn validate(&self, _path: &str, _params: &[(String, String)], _body: &Value) -> Result<Vec<u8>> {
		self.calls.lock().unwrap().validate += 1;
		let valid = !self.invalid;
		Ok(serde_json::to_vec(&serde_json::json!({
			"valid": valid,
			"_shards": { "total": 1, "successful": 1, "failed": 0 },
			"explanations": if valid { serde_json::json!([]) } else {
				serde_json::json!([{ "index": "logs", "valid": false, "error": "[logs] unknown field" }])
			},
		}))?)
	}
}
