//! Cached JWT grant exchange.
//!
//! [`TokenManager::access_token`] returns a cached bearer token while more than the refresh
//! buffer remains before expiry, and otherwise signs a fresh assertion and exchanges it at
//! `https://{auth_host}/oauth/token`. Refreshes are not serialized: two callers racing on the
//! same key may both exchange, and whichever stores last wins. Both tokens are valid, so the
//! race costs at most one extra round trip.

// crates.io
use oauth2::{
	HttpResponse,
	basic::BasicErrorResponse,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AssertionClaims, PrivateKey, TokenSecret, sign_assertion},
	clock::Clock,
	config::Credentials,
	error::{AuthFailureReason, AuthenticationError, ConfigError},
	http::HttpTransport,
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::{CacheKey, TokenCacheEntry, TokenStore},
};

/// OAuth grant type for JWT bearer assertions.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime assumed when the token response omits `expires_in`.
pub const DEFAULT_EXPIRES_IN: Duration = Duration::hours(1);

/// Token exchange and cache front-end.
pub struct TokenManager<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for token endpoint calls.
	pub http_client: Arc<C>,
	/// Token cache.
	pub store: Arc<dyn TokenStore>,
	/// Time source for freshness checks and `iat`.
	pub clock: Arc<dyn Clock>,
	/// Minimum remaining lifetime for a cached token to be reused.
	pub refresh_buffer: Duration,
	/// Per-request timeout for token endpoint calls.
	pub request_timeout: StdDuration,
}
impl<C> TokenManager<C>
where
	C: ?Sized + HttpTransport,
{
	/// Default refresh buffer (5 minutes).
	pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::minutes(5);

	const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Creates a manager over the provided store, transport, and clock.
	pub fn new(
		store: Arc<dyn TokenStore>,
		http_client: impl Into<Arc<C>>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			clock,
			refresh_buffer: Self::DEFAULT_REFRESH_BUFFER,
			request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Overrides the refresh buffer; negative values clamp to zero.
	pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
		self.refresh_buffer = buffer.max(Duration::ZERO);

		self
	}

	/// Returns a live access token for the credential record.
	pub async fn access_token_for(&self, credentials: &Credentials) -> Result<TokenSecret> {
		self.access_token(
			&credentials.integration_key,
			&credentials.user_id,
			&credentials.private_key,
			&credentials.auth_host,
		)
		.await
	}

	/// Returns a cached token for `(client_id, subject_id, auth_host)` or exchanges a new one.
	pub async fn access_token(
		&self,
		client_id: &str,
		subject_id: &str,
		private_key: &PrivateKey,
		auth_host: &str,
	) -> Result<TokenSecret> {
		let key = CacheKey::new(client_id, subject_id, auth_host);
		let now = self.clock.now();

		if let Some(current) = <dyn TokenStore>::fetch(self.store.as_ref(), &key)
			.await?
			.filter(|entry| entry.is_live_at(now, self.refresh_buffer))
		{
			return Ok(current.access_token);
		}

		let entry = self.exchange(client_id, subject_id, private_key, auth_host).await?;
		let token = entry.access_token.clone();

		<dyn TokenStore>::save(self.store.as_ref(), key, entry).await?;

		Ok(token)
	}

	async fn exchange(
		&self,
		client_id: &str,
		subject_id: &str,
		private_key: &PrivateKey,
		auth_host: &str,
	) -> Result<TokenCacheEntry> {
		const KIND: OpKind = OpKind::TokenExchange;

		let span = OpSpan::new(KIND, "exchange");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let issued_at = self.clock.now();
				let claims = AssertionClaims::new(client_id, subject_id, auth_host, issued_at);
				let assertion = sign_assertion(&claims, private_key)?;
				let body = url::form_urlencoded::Serializer::new(String::new())
					.append_pair("grant_type", JWT_BEARER_GRANT)
					.append_pair("assertion", &assertion)
					.finish();
				let request = Request::builder()
					.method(Method::POST)
					.uri(format!("https://{auth_host}/oauth/token"))
					.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
					.header(ACCEPT, "application/json")
					.body(body.into_bytes())
					.map_err(ConfigError::from)?;
				let response =
					self.http_client.execute(request, Some(self.request_timeout)).await?;

				parse_token_response(&response, issued_at)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}
}
impl<C> Debug for TokenManager<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("refresh_buffer", &self.refresh_buffer)
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: Option<String>,
	expires_in: Option<i64>,
}

fn parse_token_response(
	response: &HttpResponse,
	issued_at: OffsetDateTime,
) -> Result<TokenCacheEntry> {
	let status = response.status();

	if !status.is_success() {
		let reason = serde_json::from_slice::<BasicErrorResponse>(response.body())
			.map(|body| AuthFailureReason::from_oauth_error(body.error().as_ref()))
			.unwrap_or(AuthFailureReason::Other);

		return Err(AuthenticationError::Rejected { status: status.as_u16(), reason }.into());
	}

	let de = &mut serde_json::Deserializer::from_slice(response.body());
	let parsed: TokenResponse = serde_path_to_error::deserialize(de)
		.map_err(|e| AuthenticationError::MalformedResponse { path: e.path().to_string() })?;
	let access_token = parsed
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or(AuthenticationError::MissingAccessToken)?;
	let expires_in = parsed
		.expires_in
		.filter(|secs| *secs > 0)
		.map(Duration::seconds)
		.unwrap_or(DEFAULT_EXPIRES_IN);

	Ok(TokenCacheEntry {
		access_token: TokenSecret::new(access_token),
		expires_at: issued_at + expires_in,
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() =
			oauth2::http::StatusCode::from_u16(status).expect("Fixture status is valid.");

		response
	}

	#[test]
	fn success_defaults_expires_in() {
		let issued = OffsetDateTime::UNIX_EPOCH;
		let entry = parse_token_response(&response(200, r#"{"access_token":"abc"}"#), issued)
			.expect("Token without expires_in should parse.");

		assert_eq!(entry.access_token.expose(), "abc");
		assert_eq!(entry.expires_at, issued + Duration::hours(1));
	}

	#[test]
	fn missing_access_token_is_distinct() {
		let err = parse_token_response(
			&response(200, r#"{"expires_in":3600}"#),
			OffsetDateTime::UNIX_EPOCH,
		)
		.expect_err("Missing access_token should fail.");

		assert!(matches!(err, Error::Authentication(AuthenticationError::MissingAccessToken)));
	}

	#[test]
	fn server_descriptions_are_never_forwarded() {
		let body = r#"{"error":"server_error","error_description":"db at 10.0.0.7 exploded"}"#;
		let err = parse_token_response(&response(500, body), OffsetDateTime::UNIX_EPOCH)
			.expect_err("Server error should fail.");

		assert!(matches!(
			err,
			Error::Authentication(AuthenticationError::Rejected {
				status: 500,
				reason: AuthFailureReason::Other
			})
		));
		assert!(!err.to_string().contains("10.0.0.7"));
	}

	#[test]
	fn consent_required_is_allow_listed() {
		let err = parse_token_response(
			&response(400, r#"{"error":"consent_required"}"#),
			OffsetDateTime::UNIX_EPOCH,
		)
		.expect_err("Consent errors should fail.");

		assert!(err.to_string().contains("consent_required"));
	}

	#[test]
	fn non_json_error_body_is_generic() {
		let err = parse_token_response(
			&response(502, "<html>bad gateway</html>"),
			OffsetDateTime::UNIX_EPOCH,
		)
		.expect_err("Gateway error should fail.");

		assert!(matches!(
			err,
			Error::Authentication(AuthenticationError::Rejected {
				reason: AuthFailureReason::Other,
				..
			})
		));
	}
}
