//! User-presentable messages for failed API calls.
//!
//! Provider error bodies are trimmed to [`MAX_MESSAGE_LEN`] characters, and any message that
//! mentions tokens, keys, or secrets is replaced with [`AUTH_FAILURE_MESSAGE`].

// self
use crate::{_prelude::*, error::ApiError};

/// Cap applied to provider-supplied messages.
pub const MAX_MESSAGE_LEN: usize = 200;
/// Replacement for messages that may reveal credential details.
pub const AUTH_FAILURE_MESSAGE: &str =
	"Authentication failed. Please verify the integration credentials.";

const SENSITIVE_MARKERS: [&str; 3] = ["token", "key", "secret"];

/// Static message for a status code.
pub fn status_message(status: u16) -> &'static str {
	match status {
		400 => "Bad request: the eSignature API rejected the request parameters.",
		401 => "Unauthorized: the credentials were rejected.",
		403 => "Forbidden: the user lacks permission for this operation.",
		404 => "Not found: the requested resource does not exist.",
		409 => "Conflict: the resource was modified concurrently.",
		413 => "Payload too large: reduce the document size.",
		422 => "Unprocessable entity: the request failed validation.",
		429 => "Rate limit exceeded: too many requests to the eSignature API.",
		500 => "Internal server error at the eSignature API.",
		502 => "Bad gateway: the eSignature API is unreachable.",
		503 => "Service unavailable: the eSignature API is temporarily down.",
		504 => "Gateway timeout: the eSignature API did not respond in time.",
		400..=499 => "The eSignature API rejected the request.",
		_ => "The eSignature API returned an unexpected error.",
	}
}

/// Replaces credential-revealing text and caps the length.
pub fn sanitize_message(message: &str) -> String {
	let lowered = message.to_lowercase();

	if SENSITIVE_MARKERS.iter().any(|marker| lowered.contains(marker)) {
		return AUTH_FAILURE_MESSAGE.into();
	}

	truncate(message, MAX_MESSAGE_LEN)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderErrorBody {
	error_code: Option<String>,
	message: Option<String>,
}

/// Builds the sanitized [`ApiError`] for a non-success response.
pub fn api_error_from_response(status: u16, body: &[u8], attempts: u32) -> ApiError {
	let parsed = serde_json::from_slice::<ProviderErrorBody>(body).ok();
	let error_code = parsed.as_ref().and_then(|b| b.error_code.clone()).filter(|c| !c.is_empty());
	let provider_message = parsed.and_then(|b| b.message).filter(|m| !m.is_empty());
	let raw = match (&error_code, provider_message) {
		(Some(code), Some(message)) => format!("{code}: {message}"),
		(Some(code), None) => code.clone(),
		(None, Some(message)) => message,
		(None, None) => status_message(status).to_owned(),
	};
	let message = sanitize_message(&raw);
	let error_code = error_code.filter(|_| message != AUTH_FAILURE_MESSAGE);

	ApiError { status: Some(status), error_code, message, attempts }
}

/// Builds the sanitized [`ApiError`] for a transport failure.
pub fn api_error_from_transport(message: &str, attempts: u32) -> ApiError {
	ApiError { status: None, error_code: None, message: sanitize_message(message), attempts }
}

fn truncate(message: &str, limit: usize) -> String {
	match message.char_indices().nth(limit) {
		Some((idx, _)) => message[..idx].to_owned(),
		None => message.to_owned(),
	}
}
