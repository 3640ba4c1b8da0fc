//! Transport primitives shared by the token exchange and the resource API.
//!
//! [`HttpTransport`] is the broker's only dependency on an HTTP stack. Requests and responses
//! use the `http` types re-exported by `oauth2`, so custom transports (or scripted fakes in
//! tests) never see reqwest types. Implementations classify network failures into
//! [`NetworkFailure`] so the retry policy can tell resets and timeouts from hard errors.

// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{HeaderMap, header::RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{NetworkFailure, TransportError},
};

/// Header carrying the epoch second at which the rate-limit window resets.
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the
/// token manager and the API client behind an `Arc`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request`, aborting after `timeout` when supplied.
	///
	/// Non-success statuses are returned as responses; only failures to obtain a response
	/// surface as [`TransportError`].
	fn execute(&self, request: HttpRequest, timeout: Option<StdDuration>) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token and API requests should not follow redirects; configure any custom client
/// accordingly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest, timeout: Option<StdDuration>) -> TransportFuture<'_> {
		Box::pin(async move {
			let mut request = reqwest::Request::try_from(request)
				.map_err(|e| TransportError::network(NetworkFailure::Other, e))?;

			*request.timeout_mut() = timeout;

			let response = self.0.execute(request).await.map_err(map_reqwest_error)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(map_reqwest_error)?;
			let mut response_new = HttpResponse::new(body.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> TransportError {
	let kind = if err.is_timeout() {
		NetworkFailure::Timeout
	} else if let Some(io) = find_io_source(&err) {
		NetworkFailure::from_io_kind(io.kind())
	} else if err.is_connect() {
		NetworkFailure::ConnectionRefused
	} else {
		NetworkFailure::Other
	};

	TransportError::network(kind, err)
}

#[cfg(feature = "reqwest")]
fn find_io_source<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a std::io::Error> {
	let mut current = err.source();

	while let Some(source) = current {
		if let Some(io) = source.downcast_ref::<std::io::Error>() {
			return Some(io);
		}

		current = source.source();
	}

	None
}

/// Computes how long to wait before retrying a rate-limited response.
///
/// `Retry-After` (delta seconds or HTTP-date) wins over the reset header, which carries an
/// epoch second converted relative to `now`. Returns `None` when neither header is usable.
pub fn rate_limit_delay(headers: &HeaderMap, now: OffsetDateTime) -> Option<Duration> {
	parse_retry_after(headers, now).or_else(|| parse_rate_limit_reset(headers, now))
}

fn parse_retry_after(headers: &HeaderMap, now: OffsetDateTime) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		return Some((moment - now).max(Duration::ZERO));
	}

	None
}

fn parse_rate_limit_reset(headers: &HeaderMap, now: OffsetDateTime) -> Option<Duration> {
	let raw = headers.get(RATE_LIMIT_RESET)?.to_str().ok()?.trim();
	let reset = OffsetDateTime::from_unix_timestamp(raw.parse::<i64>().ok()?).ok()?;

	Some((reset - now).max(Duration::ZERO))
}
