use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use crate::{QuitToken, TaskClass};

/// Wait-group for the background tasks owned by one stream.
///
/// Tasks are spawned through the group so that [`Self::wait`] resolves only
/// once every one of them has exited. The group must be [sealed](Self::seal)
/// before waiting; sealing does not prevent already-running tasks from
/// spawning more work into it.
#[derive(Debug, Clone, Default)]
pub struct TaskGroup {
	tracker: TaskTracker,
	quit: QuitToken,
}

impl TaskGroup {
	/// Creates an empty, unsealed group with a fresh quit token.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the quit token shared by all tasks in this group.
	pub fn quit_token(&self) -> &QuitToken {
		&self.quit
	}

	/// Spawns a tracked task onto the current runtime.
	pub fn spawn<F>(&self, class: TaskClass, fut: F) -> JoinHandle<F::Output>
	where
		F: Future + Send + 'static,
		F::Output: Send + 'static,
	{
		tracing::trace!(worker_class = class.as_str(), active = self.tracker.len(), "worker.group.spawn");
		self.tracker.spawn(fut)
	}

	/// Marks the group as complete so waiters can resolve once it drains.
	pub fn seal(&self) {
		self.tracker.close();
	}

	/// Number of tasks still running.
	pub fn active(&self) -> usize {
		self.tracker.len()
	}

	/// Returns true once the group is sealed and every task has exited.
	pub fn is_idle(&self) -> bool {
		self.tracker.is_closed() && self.tracker.is_empty()
	}

	/// Waits for every tracked task to exit. Returns immediately when idle.
	pub async fn wait(&self) {
		self.tracker.wait().await;
	}

	/// Waits with a deadline. Returns `true` if the group drained in time.
	pub async fn wait_timeout(&self, timeout: Duration) -> bool {
		tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok()
	}
}
