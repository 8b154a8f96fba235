/// Execution classes used to label stream tasks in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Remote fetch work that publishes results to a consumer.
	Fetch,
	/// Best-effort remote cleanup that must not block consumers.
	Cleanup,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Fetch => "fetch",
			Self::Cleanup => "cleanup",
		}
	}
}
