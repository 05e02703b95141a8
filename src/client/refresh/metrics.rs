// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for the session refresh flow.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	shared: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the number of refresh cycles entered by a request that owned the guard.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh cycles that rotated the credentials.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh cycles that ended the session.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of 401s resolved by a sibling's refresh instead of a new one.
	pub fn shared(&self) -> u64 {
		self.shared.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_shared(&self) {
		self.shared.fetch_add(1, Ordering::Relaxed);
	}
}
