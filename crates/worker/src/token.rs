use tokio_util::sync::CancellationToken;

/// Cooperative quit signal shared between a stream handle and its workers.
///
/// Cancelling is idempotent: repeated calls after the first are no-ops, and
/// every clone observes the same state.
#[derive(Debug, Clone, Default)]
pub struct QuitToken {
	cancel: CancellationToken,
}

impl QuitToken {
	/// Creates a token in the not-cancelled state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true when a quit has been requested.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Requests quit.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when quit is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}
