//! Authenticated request execution with retry and backoff.

// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		Request, StatusCode,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	api::{ApiClient, RequestDescriptor, api_error_from_response, api_error_from_transport},
	error::{ApiError, ConfigError, TransportError},
	http::{self, HttpTransport},
	obs::{self, OpKind, OpOutcome, OpSpan, RetryReason},
};

const NETWORK_FAILURE_MESSAGE: &str = "Network error while calling the eSignature API.";
const INVALID_JSON_MESSAGE: &str = "The eSignature API returned a response that is not JSON.";

enum Attempt {
	Done(Result<Value>),
	Retry { reason: RetryReason, delay: Duration, failure: ApiError },
}

impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Executes `request` against `{api_base_url}/accounts/{account_id}{path}`.
	///
	/// A fresh bearer token is resolved for every attempt, so a retry that crosses the refresh
	/// window picks up the new token. Rate limits honor `Retry-After` or the reset header;
	/// server errors and transient network failures back off exponentially; other client
	/// errors fail immediately. Authentication failures are returned as-is and never retried.
	pub async fn request(&self, request: RequestDescriptor) -> Result<Value> {
		const KIND: OpKind = OpKind::ApiRequest;

		let span = OpSpan::new(KIND, "request");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(self.execute_with_retry(&request)).await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	async fn execute_with_retry(&self, request: &RequestDescriptor) -> Result<Value> {
		let url = self.request_url(request)?;
		let body = request.body.as_ref().map(|body| body.to_string().into_bytes());
		let timeout = request.timeout.unwrap_or(self.request_timeout);
		let mut attempt = 0;

		loop {
			let token = self.tokens.access_token_for(&self.credentials).await?;
			let http_request = build_request(request, &url, token.expose(), body.clone())?;
			let outcome = self.http_client.execute(http_request, Some(timeout)).await;

			match self.classify(outcome, attempt) {
				Attempt::Done(result) => return result,
				Attempt::Retry { failure, .. } if attempt >= self.retry.max_retries =>
					return Err(failure.into()),
				Attempt::Retry { reason, delay, .. } => {
					obs::record_retry(OpKind::ApiRequest, reason);
					obs::trace_retry(OpKind::ApiRequest, reason, attempt + 1, delay);

					self.clock.sleep(delay).await;

					attempt += 1;
				},
			}
		}
	}

	fn classify(&self, outcome: Result<HttpResponse, TransportError>, attempt: u32) -> Attempt {
		let attempts = attempt + 1;
		let response = match outcome {
			Ok(response) => response,
			Err(e) if e.failure().is_retryable() => {
				return Attempt::Retry {
					reason: RetryReason::Network,
					delay: self.retry.backoff(attempt),
					failure: api_error_from_transport(NETWORK_FAILURE_MESSAGE, attempts),
				};
			},
			Err(_) =>
				return Attempt::Done(Err(
					api_error_from_transport(NETWORK_FAILURE_MESSAGE, attempts).into()
				)),
		};
		let status = response.status();

		if status.is_success() {
			return Attempt::Done(parse_success(&response, attempts));
		}

		let failure = api_error_from_response(status.as_u16(), response.body(), attempts);

		if status == StatusCode::TOO_MANY_REQUESTS {
			let delay = http::rate_limit_delay(response.headers(), self.clock.now())
				.unwrap_or(self.retry.default_rate_limit_delay);

			Attempt::Retry { reason: RetryReason::RateLimited, delay, failure }
		} else if status.is_server_error() {
			Attempt::Retry {
				reason: RetryReason::ServerError,
				delay: self.retry.backoff(attempt),
				failure,
			}
		} else {
			Attempt::Done(Err(failure.into()))
		}
	}

	fn request_url(&self, request: &RequestDescriptor) -> Result<Url> {
		let path = if request.path.starts_with('/') {
			request.path.clone()
		} else {
			format!("/{}", request.path)
		};
		let mut url = Url::parse(&format!("{}{path}", self.credentials.account_base()))
			.map_err(|source| ConfigError::InvalidUrl { what: "resource request", source })?;

		if !request.query.is_empty() {
			url.query_pairs_mut().extend_pairs(request.query.iter());
		}

		Ok(url)
	}
}

fn build_request(
	request: &RequestDescriptor,
	url: &Url,
	token: &str,
	body: Option<Vec<u8>>,
) -> Result<HttpRequest> {
	let mut builder = Request::builder()
		.method(request.method.clone())
		.uri(url.as_str())
		.header(AUTHORIZATION, format!("Bearer {token}"))
		.header(ACCEPT, "application/json");

	if body.is_some() {
		builder = builder.header(CONTENT_TYPE, "application/json");
	}

	Ok(builder.body(body.unwrap_or_default()).map_err(ConfigError::from)?)
}

fn parse_success(response: &HttpResponse, attempts: u32) -> Result<Value> {
	let body = response.body();

	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	serde_json::from_slice(body).map_err(|_| {
		ApiError {
			status: Some(response.status().as_u16()),
			error_code: None,
			message: INVALID_JSON_MESSAGE.into(),
			attempts,
		}
		.into()
	})
}
