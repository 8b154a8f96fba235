//! Response payloads as the server sends them.

use lgrep_search::{Hit, Page};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
	#[serde(rename = "_scroll_id", default)]
	scroll_id: Option<String>,
	#[serde(default)]
	hits: HitsEnvelope,
}

#[derive(Debug, Default, Deserialize)]
struct HitsEnvelope {
	#[serde(default)]
	total: Option<TotalHits>,
	#[serde(default)]
	hits: Vec<WireHit>,
}

/// Older servers report a bare count, newer ones an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
	Count(u64),
	Object { value: u64 },
}

#[derive(Debug, Deserialize)]
struct WireHit {
	#[serde(rename = "_index", default)]
	index: Option<String>,
	#[serde(rename = "_type", default)]
	doc_type: Option<String>,
	#[serde(rename = "_id", default)]
	id: Option<String>,
	#[serde(rename = "_score", default)]
	score: Option<f64>,
	#[serde(rename = "_source", default)]
	source: Option<Box<RawValue>>,
	#[serde(default)]
	fields: Option<Map<String, Value>>,
	#[serde(default)]
	sort: Option<Vec<Value>>,
}

impl From<WireHit> for Hit {
	fn from(hit: WireHit) -> Self {
		Self {
			index: hit.index,
			doc_type: hit.doc_type,
			id: hit.id,
			score: hit.score,
			source: hit.source.map(|raw| raw.get().as_bytes().to_vec()),
			fields: hit.fields,
			sort: hit.sort,
		}
	}
}

impl From<SearchResponse> for Page {
	fn from(response: SearchResponse) -> Self {
		Self {
			scroll_id: response.scroll_id,
			total: response.hits.total.map(|total| match total {
				TotalHits::Count(count) | TotalHits::Object { value: count } => count,
			}),
			hits: response.hits.hits.into_iter().map(Hit::from).collect(),
		}
	}
}
