//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc, time::Duration as StdDuration};
// crates.io
use docusign_broker::{
	api::ApiClient,
	auth::TokenSecret,
	clock::ManualClock,
	config::{Credentials, RawCredentials},
	error::TransportError,
	http::{HttpTransport, ReqwestTransport, TransportFuture},
	reqwest::Client as ReqwestClient,
	store::{CacheKey, MemoryStore, TokenCacheEntry, TokenStore},
};
use oauth2::{
	HttpRequest, HttpResponse,
	http::{HeaderName, HeaderValue, Method, StatusCode},
};
use parking_lot::Mutex;
use time::{Duration, OffsetDateTime};

pub const INTEGRATION_KEY: &str = "5c2e8f4a-1b3d-4e6f-9a8b-7c6d5e4f3a2b";
pub const USER_ID: &str = "0f1e2d3c-4b5a-4968-8776-a5b4c3d2e1f0";
pub const ACCOUNT_ID: &str = "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d";
pub const WEBHOOK_SECRET: &str = "connect-hmac-secret";
pub const SEEDED_TOKEN: &str = "seeded-access-token";
pub const PRIVATE_KEY_PEM: &str = include_str!("../fixtures/rsa_private.pem");
pub const PUBLIC_KEY_PEM: &str = include_str!("../fixtures/rsa_public.pem");
pub const START_UNIX: i64 = 1_700_000_000;

/// Builds a reqwest transport that accepts the self-signed certificates produced by `httpmock`.
pub fn test_reqwest_transport() -> ReqwestTransport {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestTransport::with_client(client)
}

/// Demo-environment credentials pointed at `auth_host` and `api_base_url`.
pub fn credentials(auth_host: &str, api_base_url: &str) -> Credentials {
	let raw = RawCredentials {
		environment: Some("demo".into()),
		integration_key: Some(INTEGRATION_KEY.into()),
		user_id: Some(USER_ID.into()),
		account_id: Some(ACCOUNT_ID.into()),
		private_key: Some(PRIVATE_KEY_PEM.into()),
		webhook_secret: Some(WEBHOOK_SECRET.into()),
		api_base_url: Some(api_base_url.into()),
		auth_host: Some(auth_host.into()),
		..Default::default()
	};

	Credentials::try_from(raw).expect("Fixture credentials should validate.")
}

pub fn start_clock() -> ManualClock {
	ManualClock::at_unix(START_UNIX)
}

pub fn start_time() -> OffsetDateTime {
	OffsetDateTime::from_unix_timestamp(START_UNIX).expect("Fixture timestamp is valid.")
}

/// Store holding a token for `credentials` that stays live for the next hour.
pub async fn seeded_store(credentials: &Credentials) -> Arc<MemoryStore> {
	let store = Arc::new(MemoryStore::default());

	store
		.save(
			CacheKey::new(
				credentials.integration_key.as_str(),
				credentials.user_id.as_str(),
				credentials.auth_host.as_str(),
			),
			TokenCacheEntry {
				access_token: TokenSecret::new(SEEDED_TOKEN),
				expires_at: start_time() + Duration::hours(1),
			},
		)
		.await
		.expect("Seeding the store should succeed.");

	store
}

pub fn response(status: u16, body: &str) -> HttpResponse {
	response_with_headers(status, &[], body)
}

pub fn response_with_headers(
	status: u16,
	headers: &[(&'static str, &str)],
	body: &str,
) -> HttpResponse {
	let mut response = HttpResponse::new(body.as_bytes().to_vec());

	*response.status_mut() = StatusCode::from_u16(status).expect("Fixture status is valid.");

	for &(name, value) in headers {
		response.headers_mut().insert(
			HeaderName::from_static(name),
			HeaderValue::from_str(value).expect("Fixture header value is valid."),
		);
	}

	response
}

pub fn network_failure(kind: std::io::ErrorKind) -> Result<HttpResponse, TransportError> {
	Err(TransportError::Io(std::io::Error::from(kind)))
}

/// Request as observed by [`ScriptedTransport`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub method: Method,
	pub uri: String,
	pub authorization: Option<String>,
	pub content_type: Option<String>,
	pub body: Vec<u8>,
	pub timeout: Option<StdDuration>,
}
impl RecordedRequest {
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Transport answering from a fixed script and recording every request.
///
/// Each call optionally advances a [`ManualClock`] to simulate latency.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
	script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
	requests: Mutex<Vec<RecordedRequest>>,
	latency: Option<(ManualClock, Duration)>,
}
impl ScriptedTransport {
	pub fn new(script: impl IntoIterator<Item = Result<HttpResponse, TransportError>>) -> Self {
		Self { script: Mutex::new(script.into_iter().collect()), ..Default::default() }
	}

	pub fn with_latency(mut self, clock: ManualClock, per_call: Duration) -> Self {
		self.latency = Some((clock, per_call));

		self
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().clone()
	}

	pub fn remaining(&self) -> usize {
		self.script.lock().len()
	}
}
impl HttpTransport for ScriptedTransport {
	fn execute(&self, request: HttpRequest, timeout: Option<StdDuration>) -> TransportFuture<'_> {
		let header = |name: &str| {
			request.headers().get(name).and_then(|v| v.to_str().ok()).map(ToOwned::to_owned)
		};
		let recorded = RecordedRequest {
			method: request.method().clone(),
			uri: request.uri().to_string(),
			authorization: header("authorization"),
			content_type: header("content-type"),
			body: request.body().clone(),
			timeout,
		};

		self.requests.lock().push(recorded);

		if let Some((clock, per_call)) = &self.latency {
			clock.advance(*per_call);
		}

		let next = self.script.lock().pop_front().unwrap_or_else(|| {
			Err(TransportError::Io(std::io::Error::other("Transport script is exhausted.")))
		});

		Box::pin(async move { next })
	}
}

pub fn scripted_client(
	credentials: Credentials,
	store: Arc<MemoryStore>,
	transport: Arc<ScriptedTransport>,
	clock: &ManualClock,
) -> ApiClient<ScriptedTransport> {
	ApiClient::with_http_client(credentials, store, transport, Arc::new(clock.clone()))
}
