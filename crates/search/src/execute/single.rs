use lgrep_worker::TaskClass;
use tracing::debug;

use super::{SCROLL_CHUNK, SharedTransport, debug_body};
use crate::document::Document;
use crate::query::Query;
use crate::spec::SearchSpec;
use crate::stream::{SearchStream, StreamSink};
use crate::transport::SearchRequest;

/// Starts a single-request search.
pub(crate) fn start(transport: SharedTransport, query: &Query, spec: &SearchSpec) -> SearchStream {
	let mut request = SearchRequest::new(query.body());
	spec.configure_search(&mut request);
	if spec.debug {
		debug_body("search", &request.path(), &request.body);
	}
	debug!(size = spec.size(), "searching with a single request");

	let (stream, sink) = SearchStream::channel(SCROLL_CHUNK);
	stream
		.group()
		.spawn(TaskClass::Fetch, run(transport, request, spec.clone(), sink));
	stream.group().seal();
	stream
}

/// Issues the request once and publishes its hits in server order.
///
/// Failures are reported and not retried; the caller can rerun the search.
async fn run(transport: SharedTransport, request: SearchRequest, spec: SearchSpec, sink: StreamSink) {
	let page = tokio::select! {
		biased;
		_ = sink.quit_token().cancelled() => return,
		page = transport.search(&request) => page,
	};
	let page = match page {
		Ok(page) => page,
		Err(err) => {
			debug!(error = %err, "search request failed");
			sink.report(err).await;
			return;
		}
	};

	debug!(hits = page.hits.len(), total = ?page.total, "search page received");
	for hit in page.hits {
		if sink.is_cancelled() {
			debug!("stream instructed to quit");
			return;
		}
		let delivered = match Document::from_hit(hit, &spec) {
			Ok(doc) => sink.publish(doc).await,
			Err(err) => sink.report(err).await,
		};
		if !delivered {
			return;
		}
	}
}
