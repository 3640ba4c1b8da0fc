//! Inbound Connect notifications: signature checks, replay protection, and event routing.
//!
//! The webhook path never touches the token manager. [`WebhookReceiver::handle`] takes the raw
//! body and the signature header and returns a [`WebhookOutcome`] carrying the HTTP status
//! and JSON body the host should answer with.

pub mod envelope;
pub mod receiver;
pub mod verify;

pub use envelope::*;
pub use receiver::*;
pub use verify::*;

// self
use crate::_prelude::*;

/// Header carrying the first HMAC signature of the body.
pub const SIGNATURE_HEADER: &str = "X-DocuSign-Signature-1";

/// Reasons an inbound notification is refused before its content is trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum WebhookAuthError {
	/// Signature verification is enabled but no secret is configured.
	#[error("Webhook secret is not configured.")]
	SecretNotConfigured,
	/// The signature header is absent or empty.
	#[error("Missing webhook signature.")]
	MissingSignature,
	/// The signature does not match the body.
	#[error("Invalid webhook signature.")]
	InvalidSignature,
	/// The notification timestamp is older than the replay window.
	#[error("Webhook event is too old.")]
	Expired,
}
impl WebhookAuthError {
	/// HTTP status the receiver answers with.
	pub const fn status_code(self) -> u16 {
		match self {
			Self::SecretNotConfigured => 500,
			Self::MissingSignature | Self::InvalidSignature | Self::Expired => 401,
		}
	}
}
