// self
use crate::{
	_prelude::*,
	obs::{OpKind, RetryReason},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by broker operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("docusign_broker.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a `warn` event describing a scheduled retry.
pub fn trace_retry(kind: OpKind, reason: RetryReason, attempt: u32, delay: Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			op = kind.as_str(),
			reason = reason.as_str(),
			attempt,
			delay_ms = delay.whole_milliseconds() as u64,
			"Retrying request."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, reason, attempt, delay);
	}
}

/// Emits a `debug` event for a noteworthy stage that has no span of its own.
pub fn trace_event(kind: OpKind, message: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(op = kind.as_str(), "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, message);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OpSpan::new(OpKind::Paginate, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn retry_trace_noop_is_safe() {
		trace_retry(OpKind::ApiRequest, RetryReason::Network, 1, Duration::seconds(1));
		trace_event(OpKind::Webhook, "filtered");
	}
}
