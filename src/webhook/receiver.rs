//! Request-level handling of inbound notifications.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::Credentials,
	obs::{self, OpKind, OpOutcome},
	webhook::{
		DEFAULT_MAX_AGE, WebhookAuthError, WebhookEnvelope, WebhookEvent, check_replay,
		verify_signature,
	},
};

/// Subscription entry matching every event.
pub const ALL_EVENTS: &str = "*";

const INVALID_PAYLOAD_MESSAGE: &str = "Invalid JSON payload.";

/// Result of handling one notification, mapped onto the HTTP answer.
#[derive(Clone, Debug, PartialEq)]
pub enum WebhookOutcome {
	/// Authentication failed; nothing from the body was trusted.
	Rejected(WebhookAuthError),
	/// The body is not a JSON notification.
	Malformed,
	/// Authenticated, but the event is outside the subscription.
	Filtered {
		/// Event tag that was dropped.
		event: String,
	},
	/// Authenticated and subscribed.
	Accepted(Box<WebhookEvent>),
}
impl WebhookOutcome {
	/// HTTP status to answer with.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::Rejected(e) => e.status_code(),
			Self::Malformed => 400,
			Self::Filtered { .. } | Self::Accepted(_) => 200,
		}
	}

	/// JSON body to answer with.
	pub fn body(&self) -> Value {
		match self {
			Self::Rejected(e) => serde_json::json!({ "error": e.to_string() }),
			Self::Malformed => serde_json::json!({ "error": INVALID_PAYLOAD_MESSAGE }),
			Self::Filtered { .. } => serde_json::json!({ "received": true, "filtered": true }),
			Self::Accepted(event) => serde_json::to_value(event).unwrap_or_default(),
		}
	}

	/// The accepted event, if any.
	pub fn into_event(self) -> Option<WebhookEvent> {
		match self {
			Self::Accepted(event) => Some(*event),
			_ => None,
		}
	}
}

/// Verifies and routes inbound notifications for one Connect configuration.
#[derive(Clone, Debug)]
pub struct WebhookReceiver {
	secret: Option<TokenSecret>,
	verify_signatures: bool,
	max_age: Duration,
	events: BTreeSet<String>,
}
impl WebhookReceiver {
	/// Creates a receiver that verifies signatures with `secret` and accepts every event.
	pub fn new(secret: Option<TokenSecret>) -> Self {
		Self { secret, verify_signatures: true, max_age: DEFAULT_MAX_AGE, events: BTreeSet::new() }
	}

	/// Creates a receiver using the credential record's webhook secret.
	pub fn from_credentials(credentials: &Credentials) -> Self {
		Self::new(credentials.webhook_secret.clone())
	}

	/// Turns HMAC and replay checks on or off.
	pub fn with_signature_verification(mut self, enabled: bool) -> Self {
		self.verify_signatures = enabled;

		self
	}

	/// Overrides the replay window.
	pub fn with_max_age(mut self, max_age: Duration) -> Self {
		self.max_age = max_age;

		self
	}

	/// Restricts accepted events; an empty set or [`ALL_EVENTS`] accepts everything.
	pub fn with_events<I, S>(mut self, events: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.events = events.into_iter().map(Into::into).collect();

		self
	}

	/// Whether `event` is part of the subscription.
	pub fn accepts_event(&self, event: &str) -> bool {
		self.events.is_empty() || self.events.contains(ALL_EVENTS) || self.events.contains(event)
	}

	/// Checks the signature header and secret against `body`.
	///
	/// A missing header is reported before a missing secret.
	pub fn authenticate(
		&self,
		signature: Option<&str>,
		body: &[u8],
	) -> Result<(), WebhookAuthError> {
		if !self.verify_signatures {
			return Ok(());
		}

		let signature = signature
			.map(str::trim)
			.filter(|signature| !signature.is_empty())
			.ok_or(WebhookAuthError::MissingSignature)?;
		let secret = self
			.secret
			.as_ref()
			.filter(|secret| !secret.is_empty())
			.ok_or(WebhookAuthError::SecretNotConfigured)?;

		if verify_signature(body, signature, secret.expose()) {
			Ok(())
		} else {
			Err(WebhookAuthError::InvalidSignature)
		}
	}

	/// Handles one notification received at `now`.
	pub fn handle(
		&self,
		signature: Option<&str>,
		body: &[u8],
		now: OffsetDateTime,
	) -> WebhookOutcome {
		const KIND: OpKind = OpKind::Webhook;

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let outcome = self.route(signature, body, now);

		match &outcome {
			WebhookOutcome::Rejected(_) | WebhookOutcome::Malformed =>
				obs::record_op_outcome(KIND, OpOutcome::Failure),
			WebhookOutcome::Filtered { .. } => {
				obs::trace_event(KIND, "Event outside the subscription.");
				obs::record_op_outcome(KIND, OpOutcome::Success);
			},
			WebhookOutcome::Accepted(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
		}

		outcome
	}

	fn route(&self, signature: Option<&str>, body: &[u8], now: OffsetDateTime) -> WebhookOutcome {
		if let Err(e) = self.authenticate(signature, body) {
			return WebhookOutcome::Rejected(e);
		}

		let Ok(payload) = serde_json::from_slice::<Value>(body) else {
			return WebhookOutcome::Malformed;
		};
		let Ok(envelope) = serde_json::from_value::<WebhookEnvelope>(payload.clone()) else {
			return WebhookOutcome::Malformed;
		};

		if self.verify_signatures && !check_replay(envelope.generated_at(), now, self.max_age) {
			return WebhookOutcome::Rejected(WebhookAuthError::Expired);
		}
		if !self.accepts_event(&envelope.event) {
			return WebhookOutcome::Filtered { event: envelope.event };
		}

		WebhookOutcome::Accepted(Box::new(WebhookEvent::from_envelope(envelope, payload)))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::webhook::sign_payload;

	const SECRET: &str = "whsec-test";

	fn now() -> OffsetDateTime {
		OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("Fixture timestamp is valid.")
	}

	fn receiver() -> WebhookReceiver {
		WebhookReceiver::new(Some(TokenSecret::new(SECRET)))
	}

	#[test]
	fn check_order_is_header_then_secret_then_signature() {
		let body = br#"{"event":"envelope-sent"}"#;
		let unconfigured = WebhookReceiver::new(None);

		assert_eq!(
			unconfigured.handle(None, body, now()),
			WebhookOutcome::Rejected(WebhookAuthError::MissingSignature)
		);
		assert_eq!(unconfigured.handle(Some("bm9wZQ=="), body, now()).status_code(), 500);
		assert_eq!(
			receiver().handle(None, body, now()),
			WebhookOutcome::Rejected(WebhookAuthError::MissingSignature)
		);
		assert_eq!(
			receiver().handle(Some("bm9wZQ=="), body, now()),
			WebhookOutcome::Rejected(WebhookAuthError::InvalidSignature)
		);
	}

	#[test]
	fn rejection_bodies_never_echo_the_secret() {
		let outcome = receiver().handle(Some(SECRET), b"{}", now());

		assert_eq!(outcome.status_code(), 401);
		assert!(!outcome.body().to_string().contains(SECRET));
	}

	#[test]
	fn signed_garbage_is_malformed() {
		let body = b"not json";
		let signature = sign_payload(body, SECRET).expect("Signing should succeed.");
		let outcome = receiver().handle(Some(&signature), body, now());

		assert_eq!(outcome.status_code(), 400);
		assert_eq!(outcome.body()["error"], INVALID_PAYLOAD_MESSAGE);
	}

	#[test]
	fn unverified_receivers_skip_replay() {
		let body = br#"{"event":"envelope-sent","generatedDateTime":"2001-01-01T00:00:00Z"}"#;
		let outcome =
			WebhookReceiver::new(None).with_signature_verification(false).handle(None, body, now());

		assert_eq!(outcome.status_code(), 200);
		assert!(outcome.into_event().is_some());
	}

	#[test]
	fn wildcard_accepts_everything() {
		let subscribed = receiver().with_events(["envelope-completed"]);

		assert!(subscribed.accepts_event("envelope-completed"));
		assert!(!subscribed.accepts_event("envelope-sent"));
		assert!(receiver().with_events([ALL_EVENTS]).accepts_event("envelope-sent"));
		assert!(receiver().accepts_event("recipient-signed"));
	}
}
