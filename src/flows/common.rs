//! Shared helpers for flow implementations (observability wrapper, singleflight guards).

// self
use crate::{
	_prelude::*,
	auth::FamilyId,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Runs `fut` inside a flow span and records attempt plus success/failure.
pub(crate) async fn observe<T, F>(kind: FlowKind, stage: &'static str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	obs::record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

	span.record_outcome(outcome.as_str());
	obs::record_flow_outcome(kind, outcome);

	result
}

/// Map of per-family singleflight locks shared by every manager clone.
pub(crate) type FlowGuards = Mutex<HashMap<FamilyId, Arc<AsyncMutex<()>>>>;

/// Per-family singleflight handle; its entry leaves the guard map when the last handle drops.
///
/// Release runs from [`Drop`], so a flow cancelled while waiting for the lock cannot leak
/// its map entry.
pub(crate) struct FlowGuard<'a> {
	guards: &'a FlowGuards,
	family: FamilyId,
	lock: Arc<AsyncMutex<()>>,
}
impl<'a> FlowGuard<'a> {
	/// Returns (and creates on demand) the singleflight handle for a token family.
	pub(crate) fn acquire(guards: &'a FlowGuards, family: &FamilyId) -> Self {
		let lock = guards
			.lock()
			.entry(family.clone())
			.or_insert_with(|| Arc::new(AsyncMutex::new(())))
			.clone();

		Self { guards, family: family.clone(), lock }
	}

	/// Waits for exclusive use of the family.
	pub(crate) async fn lock(&self) -> async_lock::MutexGuard<'_, ()> {
		self.lock.lock().await
	}
}
impl Drop for FlowGuard<'_> {
	fn drop(&mut self) {
		let mut guards = self.guards.lock();

		// Handles are only cloned under the map lock, so a count of two (map plus
		// this handle) observed under that lock cannot grow concurrently.
		if Arc::strong_count(&self.lock) <= 2 {
			guards.remove(&self.family);
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		pin::pin,
		task::{Context, Waker},
	};
	// self
	use super::*;

	#[test]
	fn cancelled_waiter_releases_its_entry() {
		let guards = FlowGuards::default();
		let family = FamilyId::new("fam-1").expect("Family fixture should be valid.");
		let mut cx = Context::from_waker(Waker::noop());

		{
			let holder = FlowGuard::acquire(&guards, &family);
			let _held = holder.lock.try_lock().expect("Uncontended lock should be free.");

			{
				let waiter = FlowGuard::acquire(&guards, &family);
				let mut pending = pin!(async move {
					let _held = waiter.lock().await;
				});

				assert!(pending.as_mut().poll(&mut cx).is_pending());
				assert_eq!(guards.lock().len(), 1);
			}

			assert_eq!(guards.lock().len(), 1, "The holder still owns the entry.");
		}

		assert!(guards.lock().is_empty(), "Cancelled waiters must not leak entries.");
	}
}
