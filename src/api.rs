//! Authenticated access to the account-scoped resource API.
//!
//! [`ApiClient`] owns the transport, token manager, credentials, and retry policy so the
//! request executor ([`ApiClient::request`]) and the paginator ([`ApiClient::fetch_all`])
//! only deal with per-call data.

pub mod executor;
pub mod paginate;
pub mod sanitize;

pub use paginate::*;
pub use sanitize::*;

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	auth::TokenManager,
	clock::Clock,
	config::Credentials,
	http::HttpTransport,
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::{clock::SystemClock, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// API client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Retry settings applied by the request executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Retries after the first attempt.
	pub max_retries: u32,
	/// Backoff for the first retry; doubles on each subsequent retry.
	pub base_delay: Duration,
	/// Wait applied to a 429 that carries no usable rate-limit header.
	pub default_rate_limit_delay: Duration,
}
impl RetryPolicy {
	/// Exponential backoff for the retry following attempt `attempt` (zero-based).
	pub fn backoff(&self, attempt: u32) -> Duration {
		self.base_delay.saturating_mul(2_i32.saturating_pow(attempt))
	}

	/// Overrides the number of retries.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Overrides the base backoff delay.
	pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
		self.base_delay = base_delay;

		self
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_retries: 3,
			base_delay: Duration::milliseconds(1_000),
			default_rate_limit_delay: Duration::seconds(60),
		}
	}
}

/// One resource API call, relative to `/accounts/{account_id}`.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Path below the account base, e.g. `/envelopes`.
	pub path: String,
	/// Query parameters, appended in order.
	pub query: Vec<(String, String)>,
	/// Optional JSON body.
	pub body: Option<Value>,
	/// Per-attempt timeout; the client's default applies when unset.
	pub timeout: Option<StdDuration>,
}
impl RequestDescriptor {
	/// Creates a descriptor for `method` + `path` with no query, body, or timeout override.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), query: Vec::new(), body: None, timeout: None }
	}

	/// Shorthand for a `GET`.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Shorthand for a `POST` with a JSON body.
	pub fn post(path: impl Into<String>, body: Value) -> Self {
		Self::new(Method::POST, path).with_body(body)
	}

	/// Appends a query parameter.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Sets the JSON body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Sets the per-attempt timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Replaces `key` if present, otherwise appends it.
	pub(crate) fn set_query(&mut self, key: &str, value: String) {
		match self.query.iter_mut().find(|(k, _)| k == key) {
			Some((_, existing)) => *existing = value,
			None => self.query.push((key.to_owned(), value)),
		}
	}
}

/// Executes authenticated calls for one credential record.
pub struct ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport shared with the token manager.
	pub http_client: Arc<C>,
	/// Token manager supplying bearer tokens.
	pub tokens: TokenManager<C>,
	/// Validated credentials.
	pub credentials: Arc<Credentials>,
	/// Time source for sleeps and budgets.
	pub clock: Arc<dyn Clock>,
	/// Retry policy.
	pub retry: RetryPolicy,
	/// Per-attempt timeout for descriptors that do not carry their own.
	pub request_timeout: StdDuration,
}
impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Default per-attempt timeout (30 seconds).
	pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Creates a client that reuses the caller-provided transport, store, and clock.
	pub fn with_http_client(
		credentials: impl Into<Arc<Credentials>>,
		store: Arc<dyn TokenStore>,
		http_client: impl Into<Arc<C>>,
		clock: Arc<dyn Clock>,
	) -> Self {
		let http_client = http_client.into();
		let tokens = TokenManager::new(store, http_client.clone(), clock.clone());

		Self {
			http_client,
			tokens,
			credentials: credentials.into(),
			clock,
			retry: RetryPolicy::default(),
			request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Overrides the retry policy.
	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Overrides the default per-attempt timeout.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client with its own reqwest transport and the system clock.
	///
	/// Pass the host's process-wide store so tokens are shared across executions.
	pub fn new(credentials: impl Into<Arc<Credentials>>, store: Arc<dyn TokenStore>) -> Self {
		Self::with_http_client(
			credentials,
			store,
			ReqwestTransport::default(),
			Arc::new(SystemClock),
		)
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("credentials", &self.credentials)
			.field("retry", &self.retry)
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}
