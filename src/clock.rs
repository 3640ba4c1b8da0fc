//! Time sources for cache freshness, retry sleeps, and pagination budgets.
//!
//! Everything time-dependent goes through [`Clock`] so tests can substitute a
//! [`ManualClock`] whose sleeps complete immediately and advance virtual time.

// self
use crate::_prelude::*;

/// Boxed future returned by [`Clock::sleep`].
pub type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Source of the current instant and of suspension.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Current UTC instant.
	fn now(&self) -> OffsetDateTime;

	/// Suspends the calling task for `duration`.
	fn sleep(&self, duration: Duration) -> SleepFuture;
}

/// Wall clock backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}

	fn sleep(&self, duration: Duration) -> SleepFuture {
		let duration = StdDuration::try_from(duration).unwrap_or_default();

		Box::pin(tokio::time::sleep(duration))
	}
}

/// Deterministic clock: sleeps return immediately, advance the clock, and are recorded.
#[derive(Clone, Debug)]
pub struct ManualClock(Arc<Mutex<ManualState>>);
#[derive(Debug)]
struct ManualState {
	now: OffsetDateTime,
	sleeps: Vec<Duration>,
}
impl ManualClock {
	/// Creates a clock frozen at `now`.
	pub fn new(now: OffsetDateTime) -> Self {
		Self(Arc::new(Mutex::new(ManualState { now, sleeps: Vec::new() })))
	}

	/// Creates a clock frozen at the given Unix timestamp.
	pub fn at_unix(seconds: i64) -> Self {
		Self::new(OffsetDateTime::from_unix_timestamp(seconds).unwrap_or(OffsetDateTime::UNIX_EPOCH))
	}

	/// Moves the clock forward without recording a sleep.
	pub fn advance(&self, by: Duration) {
		self.0.lock().now += by;
	}

	/// Durations passed to [`Clock::sleep`], in call order.
	pub fn sleeps(&self) -> Vec<Duration> {
		self.0.lock().sleeps.clone()
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		self.0.lock().now
	}

	fn sleep(&self, duration: Duration) -> SleepFuture {
		{
			let mut state = self.0.lock();

			state.sleeps.push(duration);
			state.now += duration;
		}

		Box::pin(std::future::ready(()))
	}
}
