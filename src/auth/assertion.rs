//! JWT bearer assertions for the impersonation grant.

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use crate::{_prelude::*, auth::PrivateKey, error::AuthenticationError};

/// Scope requested by every assertion.
pub const ASSERTION_SCOPE: &str = "signature impersonation";
/// Lifetime of a signed assertion.
pub const ASSERTION_LIFETIME: Duration = Duration::hours(1);

/// Claims carried by the signed assertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Integration key.
	pub iss: String,
	/// Impersonated user id.
	pub sub: String,
	/// OAuth host the assertion is presented to.
	pub aud: String,
	/// Issued-at, Unix seconds.
	pub iat: i64,
	/// Expiry, Unix seconds.
	pub exp: i64,
	/// Requested scope.
	pub scope: String,
}
impl AssertionClaims {
	/// Builds claims issued at `issued_at` and valid for [`ASSERTION_LIFETIME`].
	pub fn new(
		client_id: impl Into<String>,
		subject_id: impl Into<String>,
		auth_host: impl Into<String>,
		issued_at: OffsetDateTime,
	) -> Self {
		let iat = issued_at.unix_timestamp();

		Self {
			iss: client_id.into(),
			sub: subject_id.into(),
			aud: auth_host.into(),
			iat,
			exp: iat + ASSERTION_LIFETIME.whole_seconds(),
			scope: ASSERTION_SCOPE.into(),
		}
	}
}

/// Signs `claims` with RS256, producing `header.payload.signature`.
///
/// Errors never include key material.
pub fn sign_assertion(
	claims: &AssertionClaims,
	key: &PrivateKey,
) -> Result<String, AuthenticationError> {
	let encoding_key = EncodingKey::from_rsa_pem(key.expose_pem())
		.map_err(|_| AuthenticationError::InvalidPrivateKey)?;
	let mut header = Header::new(Algorithm::RS256);

	header.typ = Some("JWT".into());

	jsonwebtoken::encode(&header, claims, &encoding_key).map_err(|_| AuthenticationError::Signing)
}

/// Builds the one-time consent link that resolves `consent_required` for the impersonated
/// user.
pub fn consent_url(auth_host: &str, client_id: &str, redirect_uri: &str) -> Result<Url> {
	let mut url = Url::parse(&format!("https://{auth_host}/oauth/auth")).map_err(|source| {
		crate::error::ConfigError::InvalidUrl { what: "consent URL", source }
	})?;

	url.query_pairs_mut()
		.append_pair("response_type", "code")
		.append_pair("scope", ASSERTION_SCOPE)
		.append_pair("client_id", client_id)
		.append_pair("redirect_uri", redirect_uri);

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn claims_expire_one_hour_after_issue() {
		let issued = OffsetDateTime::from_unix_timestamp(1_700_000_000)
			.expect("Fixture timestamp is valid.");
		let claims = AssertionClaims::new("abc", "u1", "account-d.example.com", issued);

		assert_eq!(claims.iss, "abc");
		assert_eq!(claims.sub, "u1");
		assert_eq!(claims.aud, "account-d.example.com");
		assert_eq!(claims.iat, 1_700_000_000);
		assert_eq!(claims.exp, 1_700_003_600);
		assert_eq!(claims.scope, "signature impersonation");
	}

	#[test]
	fn garbage_key_is_rejected_without_echo() {
		let claims = AssertionClaims::new("abc", "u1", "h", OffsetDateTime::UNIX_EPOCH);
		let err = sign_assertion(&claims, &PrivateKey::from_pem("not-a-key-material-xyz"))
			.expect_err("Garbage PEM should be rejected.");

		assert!(matches!(err, AuthenticationError::InvalidPrivateKey));
		assert!(!err.to_string().contains("xyz"));
	}

	#[test]
	fn consent_url_encodes_scope() {
		let url = consent_url("account-d.docusign.com", "abc", "https://example.com/cb")
			.expect("Consent URL should build.");

		assert_eq!(url.host_str(), Some("account-d.docusign.com"));
		assert!(url.as_str().contains("scope=signature+impersonation"));
		assert!(url.as_str().contains("client_id=abc"));
	}
}
