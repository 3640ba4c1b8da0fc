//! Optional observability helpers for broker operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `docusign_broker.op` with the `op` and
//!   `stage` (call site) fields, plus `warn` events for every scheduled retry.
//! - Enable `metrics` to increment `docusign_broker_op_total` for every attempt/success/failure,
//!   labeled by `op` + `outcome`, and `docusign_broker_retry_total` labeled by `op` + `reason`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// JWT grant exchange at the OAuth token endpoint.
	TokenExchange,
	/// Single resource API request (including its retries).
	ApiRequest,
	/// Multi-page listing.
	Paginate,
	/// Inbound webhook handling.
	Webhook,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::TokenExchange => "token_exchange",
			OpKind::ApiRequest => "api_request",
			OpKind::Paginate => "paginate",
			OpKind::Webhook => "webhook",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a broker operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Why a request is being retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetryReason {
	/// HTTP 429 from the remote.
	RateLimited,
	/// HTTP 5xx from the remote.
	ServerError,
	/// Transport reset, timeout, or refusal.
	Network,
}
impl RetryReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RetryReason::RateLimited => "rate_limited",
			RetryReason::ServerError => "server_error",
			RetryReason::Network => "network",
		}
	}
}
impl Display for RetryReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
