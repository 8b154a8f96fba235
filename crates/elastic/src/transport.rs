use std::time::Duration;

use async_trait::async_trait;
use lgrep_search::{Error, Page, Result, ScrollRequest, SearchRequest, SearchTransport};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::wire::SearchResponse;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9200/";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SCROLL_PATH: &str = "/_search/scroll";

/// Search transport speaking the Elasticsearch REST API over HTTP.
#[derive(Debug, Clone)]
pub struct ElasticTransport {
	client: Client,
	base: Url,
}

impl ElasticTransport {
	/// Creates a transport for the server at `endpoint`.
	///
	/// A path prefix on the endpoint (e.g. behind a proxy) is kept for every
	/// request.
	pub fn new(endpoint: &str) -> Result<Self> {
		Self::with_timeout(endpoint, REQUEST_TIMEOUT)
	}

	/// Like [`Self::new`] with a custom per-request timeout.
	pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
		let endpoint = endpoint.trim();
		if endpoint.is_empty() {
			return Err(Error::Config("no endpoint given".into()));
		}
		let base = Url::parse(endpoint).map_err(|e| Error::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
		if !matches!(base.scheme(), "http" | "https") {
			return Err(Error::Config(format!("unsupported endpoint scheme '{}'", base.scheme())));
		}
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| Error::Transport(e.to_string()))?;
		Ok(Self { client, base })
	}

	fn url(&self, path: &str, params: &[(String, String)]) -> Url {
		let mut url = self.base.clone();
		let prefix = self.base.path().trim_end_matches('/');
		url.set_path(&format!("{prefix}/{}", path.trim_start_matches('/')));
		if !params.is_empty() {
			url.query_pairs_mut().extend_pairs(params);
		}
		url
	}

	fn request(&self, method: Method, path: &str, params: &[(String, String)], body: &Value) -> RequestBuilder {
		let url = self.url(path, params);
		debug!(%method, %url, "sending request");
		self.client
			.request(method, url)
			.header(CONTENT_TYPE, "application/json")
			.json(body)
	}

	async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>> {
		let response = request.send().await.map_err(|e| Error::Transport(e.to_string()))?;
		let status = response.status();
		let body = response.bytes().await.map_err(|e| Error::Transport(e.to_string()))?;
		if !status.is_success() {
			return Err(Error::Status {
				status: status.as_u16(),
				body: String::from_utf8_lossy(&body).into_owned(),
			});
		}
		Ok(body.to_vec())
	}

	async fn fetch_page(&self, request: RequestBuilder) -> Result<Page> {
		let raw = self.send(request).await?;
		let response: SearchResponse = serde_json::from_slice(&raw)?;
		Ok(response.into())
	}
}

#[async_trait]
impl SearchTransport for ElasticTransport {
	async fn search(&self, request: &SearchRequest) -> Result<Page> {
		let body = Value::Object(request.body.clone());
		self.fetch_page(self.request(Method::POST, &request.path(), &[], &body))
			.await
	}

	async fn scroll(&self, request: &ScrollRequest, scroll_id: Option<&str>) -> Result<Page> {
		let keep_alive = request.keep_alive_param();
		let http = match scroll_id {
			None => {
				let params = [("scroll".to_owned(), keep_alive)];
				self.request(Method::POST, &request.path(), &params, &Value::Object(request.body.clone()))
			}
			Some(id) => self.request(Method::POST, SCROLL_PATH, &[], &json!({ "scroll": keep_alive, "scroll_id": id })),
		};
		// An empty page still carries a cursor the caller must clear.
		self.fetch_page(http).await
	}

	async fn clear_scroll(&self, scroll_ids: &[String]) -> Result<()> {
		if scroll_ids.is_empty() {
			return Ok(());
		}
		let body = json!({ "scroll_id": scroll_ids });
		match self.send(self.request(Method::DELETE, SCROLL_PATH, &[], &body)).await {
			Ok(_) => Ok(()),
			Err(Error::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
				debug!(count = scroll_ids.len(), "scroll already expired on server");
				Ok(())
			}
			Err(err) => Err(err),
		}
	}

	async fn validate(&self, path: &str, params: &[(String, String)], body: &Value) -> Result<Vec<u8>> {
		self.send(self.request(Method::GET, path, params, body)).await
	}
}
