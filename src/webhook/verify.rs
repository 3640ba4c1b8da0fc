//! HMAC-SHA256 signatures and timestamp freshness.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
// self
use crate::{_prelude::*, webhook::WebhookAuthError};

type HmacSha256 = Hmac<Sha256>;

/// Default replay window.
pub const DEFAULT_MAX_AGE: Duration = Duration::minutes(5);

/// Computes the base64 HMAC-SHA256 of `payload`, i.e. the value of the signature header.
pub fn sign_payload(payload: &[u8], secret: &str) -> Result<String, WebhookAuthError> {
	if secret.is_empty() {
		return Err(WebhookAuthError::SecretNotConfigured);
	}

	let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
		.map_err(|_| WebhookAuthError::SecretNotConfigured)?;

	mac.update(payload);

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Checks `signature` against the HMAC of `payload` in constant time.
///
/// Any empty input yields `false`.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
	let signature = signature.trim();

	if payload.is_empty() || signature.is_empty() || secret.is_empty() {
		return false;
	}

	let Ok(expected) = sign_payload(payload, secret) else {
		return false;
	};

	expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

/// Returns `true` when the event is fresh enough to accept.
///
/// A missing timestamp passes; events from the future are accepted.
pub fn check_replay(
	event_time: Option<OffsetDateTime>,
	now: OffsetDateTime,
	max_age: Duration,
) -> bool {
	match event_time {
		Some(event_time) => now - event_time <= max_age,
		None => true,
	}
}
