use lgrep_worker::TaskClass;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{SCROLL_CHUNK, SCROLL_KEEP_ALIVE, SharedTransport, debug_body};
use crate::document::Document;
use crate::query::Query;
use crate::spec::SearchSpec;
use crate::stream::{SearchStream, StreamSink};
use crate::transport::ScrollRequest;
use crate::{Error, Result};

/// Starts a scrolled search.
///
/// Fails synchronously, before any task is spawned, when `spec`
/// has no index to bound the scroll.
pub(crate) fn start(transport: SharedTransport, query: &Query, spec: &SearchSpec) -> Result<SearchStream> {
	if !spec.has_index() {
		return Err(Error::IndexRequired);
	}
	debug!(size = spec.size(), "searching with scroll for large size");

	let mut request = ScrollRequest::new(query.body(), SCROLL_KEEP_ALIVE);
	spec.configure_scroll(&mut request);
	// Page in chunks; the requested total is enforced by counting.
	request.size(SCROLL_CHUNK);
	if spec.debug {
		debug_body("scroll", &request.path(), &request.body);
	}

	let (stream, sink) = SearchStream::channel(SCROLL_CHUNK);
	let (retire_tx, retire_rx) = mpsc::unbounded_channel();
	stream
		.group()
		.spawn(TaskClass::Cleanup, retire(transport.clone(), retire_rx));
	stream
		.group()
		.spawn(TaskClass::Fetch, run(transport, request, spec.clone(), sink, retire_tx));
	stream.group().seal();
	Ok(stream)
}

fn short_id(scroll_id: &str) -> &str {
	scroll_id.get(..10).unwrap_or(scroll_id)
}

/// Pages through the scroll until the requested size is reached, the cursor
/// is exhausted, an error occurs, or quit is requested.
///
/// Every scroll id seen is handed to the retirement queue before returning.
async fn run(
	transport: SharedTransport,
	request: ScrollRequest,
	spec: SearchSpec,
	sink: StreamSink,
	retire_tx: mpsc::UnboundedSender<String>,
) {
	let wanted = spec.size();
	let mut retrieved = 0usize;
	let mut current: Option<String> = None;

	'scroll: loop {
		match &current {
			Some(id) => debug!(scroll_id = short_id(id), retrieved, "fetching next scroll page"),
			None => debug!("fetching first scroll page"),
		}

		let page = tokio::select! {
			biased;
			_ = sink.quit_token().cancelled() => {
				debug!("stream instructed to quit");
				break 'scroll;
			}
			page = transport.scroll(&request, current.as_deref()) => page,
		};
		let page = match page {
			Ok(page) => page,
			Err(Error::EndOfStream) => {
				debug!(retrieved, "scroll exhausted");
				break 'scroll;
			}
			Err(err) => {
				debug!(retrieved, error = %err, "scroll failed");
				sink.report(Error::Scroll(Box::new(err))).await;
				break 'scroll;
			}
		};

		if let Some(next) = page.scroll_id.filter(|id| !id.is_empty())
			&& current.as_deref() != Some(next.as_str())
		{
			if let Some(previous) = current.replace(next) {
				queue_retirement(&retire_tx, previous);
			}
		}

		if page.hits.is_empty() {
			debug!(retrieved, "scroll returned an empty page");
			break 'scroll;
		}

		for hit in page.hits {
			let doc = match Document::from_hit(hit, &spec) {
				Ok(doc) => doc,
				Err(err) => {
					if !sink.report(err).await {
						break 'scroll;
					}
					continue;
				}
			};
			if !sink.publish(doc).await {
				debug!(retrieved, "stream stopped accepting results");
				break 'scroll;
			}
			retrieved += 1;
			if retrieved >= wanted {
				debug!(retrieved, "scroll streamed the requested amount of results");
				break 'scroll;
			}
		}
	}

	if let Some(last) = current {
		queue_retirement(&retire_tx, last);
	}
}

/// Hands `scroll_id` to the retirement task. Returns false if it is gone.
fn queue_retirement(retire_tx: &mpsc::UnboundedSender<String>, scroll_id: String) -> bool {
	match retire_tx.send(scroll_id) {
		Ok(()) => true,
		Err(mpsc::error::SendError(lost)) => {
			warn!(scroll_id = short_id(&lost), "scroll retirement task is gone, leaving cursor to expire");
			false
		}
	}
}

/// Clears retired scroll ids until the producer hangs up.
///
/// Failures are logged only; the server expires cursors after their
/// keep-alive regardless.
async fn retire(transport: SharedTransport, mut retired: mpsc::UnboundedReceiver<String>) {
	while let Some(first) = retired.recv().await {
		let mut batch = vec![first];
		while let Ok(next) = retired.try_recv() {
			batch.push(next);
		}
		debug!(count = batch.len(), "clearing retired scroll ids");
		if let Err(err) = transport.clear_scroll(&batch).await {
			warn!(count = batch.len(), error = %err, "failed to clear scroll, leaving it to expire");
		}
	}
}
