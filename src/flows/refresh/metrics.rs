// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters for refresh rotations, shared by every manager clone.
#[derive(Debug, Default)]
pub struct RotationMetrics {
	attempts: AtomicU64,
	rotated: AtomicU64,
	rejected: AtomicU64,
	replays: AtomicU64,
}
impl RotationMetrics {
	/// Rotation attempts, including rejected ones.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Rotations that issued a new pair.
	pub fn successes(&self) -> u64 {
		self.rotated.load(Ordering::Relaxed)
	}

	/// Rotations that returned an error; replays count here too.
	pub fn failures(&self) -> u64 {
		self.rejected.load(Ordering::Relaxed)
	}

	/// Replays of an already-rotated token; each one (re)revokes its family.
	pub fn reuse_detections(&self) -> u64 {
		self.replays.load(Ordering::Relaxed)
	}

	/// Point-in-time copy of every counter.
	pub fn snapshot(&self) -> RotationSnapshot {
		RotationSnapshot {
			attempts: self.attempts(),
			successes: self.successes(),
			failures: self.failures(),
			reuse_detections: self.reuse_detections(),
		}
	}

	pub(crate) fn record_attempt(&self) {
		bump(&self.attempts);
	}

	pub(crate) fn record_result<T, E>(&self, result: &Result<T, E>) {
		bump(if result.is_ok() { &self.rotated } else { &self.rejected });
	}

	pub(crate) fn record_reuse(&self) {
		bump(&self.replays);
	}
}

/// Copy of [`RotationMetrics`] taken by [`RotationMetrics::snapshot`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RotationSnapshot {
	/// See [`RotationMetrics::attempts`].
	pub attempts: u64,
	/// See [`RotationMetrics::successes`].
	pub successes: u64,
	/// See [`RotationMetrics::failures`].
	pub failures: u64,
	/// See [`RotationMetrics::reuse_detections`].
	pub reuse_detections: u64,
}

fn bump(counter: &AtomicU64) {
	counter.fetch_add(1, Ordering::Relaxed);
}
