//! Result streams: the consumer-facing handle to a running search.
//!
//! A [`SearchStream`] owns the receiving ends of two bounded channels
//! (results and errors) and the [`TaskGroup`] of the background tasks that
//! feed them. Producers hold a [`StreamSink`]; dropping the sink closes both
//! channels at once, which is how the consumer learns the stream ended.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use lgrep_worker::{QuitToken, TaskGroup};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::document::Document;
use crate::{Error, Result};

/// How long [`SearchStream::request_quit`] waits for workers to exit.
pub const QUIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Observable lifecycle of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
	/// The producer is still publishing.
	Running,
	/// The producer closed its channels but workers may still be cleaning up.
	Draining,
	/// Every worker has exited.
	Stopped,
}

/// Consumer handle to a streaming search.
#[derive(Debug)]
pub struct SearchStream {
	results: mpsc::Receiver<Document>,
	errors: mpsc::Receiver<Error>,
	group: TaskGroup,
	/// Set once a quit has completed; guards repeat calls.
	quit_done: Mutex<bool>,
	stopped: AtomicBool,
}

/// Producer half of a stream.
#[derive(Debug)]
pub(crate) struct StreamSink {
	results: mpsc::Sender<Document>,
	errors: mpsc::Sender<Error>,
	quit: QuitToken,
}

impl SearchStream {
	/// Creates a stream whose results channel holds `capacity` documents.
	pub(crate) fn channel(capacity: usize) -> (Self, StreamSink) {
		let (results_tx, results) = mpsc::channel(capacity.max(1));
		let (errors_tx, errors) = mpsc::channel(1);
		let group = TaskGroup::new();
		let sink = StreamSink {
			results: results_tx,
			errors: errors_tx,
			quit: group.quit_token().clone(),
		};
		let stream = Self {
			results,
			errors,
			group,
			quit_done: Mutex::new(false),
			stopped: AtomicBool::new(false),
		};
		(stream, sink)
	}

	/// A stream that has already finished without producing anything.
	pub fn empty() -> Self {
		let (stream, sink) = Self::channel(1);
		drop(sink);
		stream.group.seal();
		stream
	}

	pub(crate) fn group(&self) -> &TaskGroup {
		&self.group
	}

	/// Current lifecycle state.
	pub fn state(&self) -> StreamState {
		if self.stopped.load(Ordering::Acquire) {
			StreamState::Stopped
		} else if self.results.is_closed() {
			StreamState::Draining
		} else {
			StreamState::Running
		}
	}

	/// Waits until every background task has exited.
	///
	/// Safe to call any number of times, including after the stream finished.
	pub async fn wait(&self) {
		self.group.wait().await;
		self.stopped.store(true, Ordering::Release);
	}

	/// Signals the workers to stop and waits up to [`QUIT_TIMEOUT`] for them.
	///
	/// The signal is always delivered; exit is not guaranteed on return. Call
	/// [`Self::wait`] afterwards to be sure cleanup finished. Repeat calls are
	/// no-ops.
	pub async fn request_quit(&self) {
		let mut quit_done = self.quit_done.lock().await;
		if *quit_done {
			return;
		}
		debug!("sending stream quit signal");
		self.group.quit_token().cancel();
		if self.group.wait_timeout(QUIT_TIMEOUT).await {
			self.stopped.store(true, Ordering::Release);
		} else {
			debug!(active = self.group.active(), "stream workers still running after quit timeout");
		}
		*quit_done = true;
	}

	/// Feeds every result and error to the given callbacks until the stream ends.
	///
	/// An error returned by `on_error` quits the stream and is returned; an
	/// error returned by `on_result` does the same. A clean end of stream
	/// returns `Ok(())`. Workers have always exited when this returns.
	pub async fn for_each<R, E>(&mut self, mut on_result: R, mut on_error: E) -> Result<()>
	where
		R: FnMut(Document) -> Result<()>,
		E: FnMut(Error) -> Result<()>,
	{
		let mut errors_open = true;
		let outcome = loop {
			tokio::select! {
				err = self.errors.recv(), if errors_open => match err {
					Some(err) => {
						if let Err(err) = on_error(err) {
							debug!("error encountered, stopping any ongoing search");
							self.request_quit().await;
							break Err(err);
						}
					}
					None => errors_open = false,
				},
				result = self.results.recv() => match result {
					Some(doc) => {
						if let Err(err) = on_result(doc) {
							debug!("result handler failed, stopping stream");
							self.request_quit().await;
							break Err(err);
						}
					}
					None => {
						debug!("stream results dried up");
						break self.drain_errors(&mut on_error).await;
					}
				},
			}
		};
		debug!("leaving stream loop, waiting for workers");
		self.wait().await;
		outcome
	}

	/// Reads the whole stream into memory, stopping at the first error.
	pub async fn collect_all(mut self) -> Result<Vec<Document>> {
		let mut documents = Vec::new();
		self.for_each(
			|doc| {
				documents.push(doc);
				Ok(())
			},
			Err,
		)
		.await?;
		Ok(documents)
	}

	async fn drain_errors<E>(&mut self, on_error: &mut E) -> Result<()>
	where
		E: FnMut(Error) -> Result<()>,
	{
		while let Some(err) = self.errors.recv().await {
			on_error(err)?;
		}
		Ok(())
	}
}

impl Drop for SearchStream {
	fn drop(&mut self) {
		self.group.quit_token().cancel();
	}
}

impl StreamSink {
	pub(crate) fn quit_token(&self) -> &QuitToken {
		&self.quit
	}

	pub(crate) fn is_cancelled(&self) -> bool {
		self.quit.is_cancelled()
	}

	/// Publishes one document unless quit is requested first.
	///
	/// Returns false when the producer should stop.
	pub(crate) async fn publish(&self, doc: Document) -> bool {
		tokio::select! {
			biased;
			_ = self.quit.cancelled() => false,
			sent = self.results.send(doc) => sent.is_ok(),
		}
	}

	/// Reports an error unless quit is requested first.
	///
	/// Returns false when the producer should stop.
	pub(crate) async fn report(&self, err: Error) -> bool {
		tokio::select! {
			biased;
			_ = self.quit.cancelled() => false,
			sent = self.errors.send(err) => sent.is_ok(),
		}
	}
}
