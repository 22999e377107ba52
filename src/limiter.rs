//! Process-wide spacing for outbound music-service calls.
//!
//! [`OutboundLimiter`] serializes every scheduled operation: callers queue in arrival order on a
//! fair [`tokio::sync::Mutex`], at most one operation runs at a time, and each start waits until
//! the configured interval has elapsed since the previous start. Bursts are delayed, never
//! rejected.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{
	sync::Mutex as AsyncMutex,
	time::{self, Instant},
};
// self
use crate::_prelude::*;

/// FIFO, one-at-a-time scheduler with a minimum start-to-start interval.
///
/// Share one instance (behind [`Arc`]) with every component that calls out.
#[derive(Debug)]
pub struct OutboundLimiter {
	min_interval: StdDuration,
	last_start: AsyncMutex<Option<Instant>>,
}
impl OutboundLimiter {
	/// Creates a limiter spacing operation starts by at least `min_interval`.
	pub fn new(min_interval: StdDuration) -> Self {
		Self { min_interval, last_start: AsyncMutex::new(None) }
	}

	/// Configured spacing.
	pub fn min_interval(&self) -> StdDuration {
		self.min_interval
	}

	/// Queues `op` and returns its result once it has run.
	///
	/// The queue slot is held until `op` completes, so its outcome (success or error) belongs to
	/// this caller alone and the next queued operation proceeds afterwards.
	pub async fn schedule<F, Fut, T>(&self, op: F) -> T
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = T>,
	{
		let mut last_start = self.last_start.lock().await;

		if let Some(previous) = *last_start {
			time::sleep_until(previous + self.min_interval).await;
		}

		*last_start = Some(Instant::now());

		op().await
	}
}
