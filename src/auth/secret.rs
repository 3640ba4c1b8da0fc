//! Redacting wrappers for access tokens, signing keys, and webhook secrets.

// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the secret is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// RSA private key in PEM form used to sign JWT assertions.
///
/// Keys pasted into single-line credential fields often arrive with literal `\n` sequences;
/// those are normalized into real line breaks on construction.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);
impl PrivateKey {
	/// Wraps a PEM string, normalizing escaped newlines.
	pub fn from_pem(pem: impl AsRef<str>) -> Self {
		Self(pem.as_ref().replace("\\n", "\n").trim().to_owned())
	}

	/// Returns the PEM bytes for signing. Callers must avoid logging them.
	pub fn expose_pem(&self) -> &[u8] {
		self.0.as_bytes()
	}

	/// Whether the key is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for PrivateKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("PrivateKey").field(&"<redacted>").finish()
	}
}
