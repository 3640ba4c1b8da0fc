//! Broker-level error types shared across validation, authentication, API calls, and webhooks.
//!
//! No variant carries raw private keys, access tokens, or webhook secrets; server-supplied
//! text is either allow-listed or sanitized before it reaches a message.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller-supplied field failed a format check before any network call.
	#[error(transparent)]
	Validation(#[from] crate::validate::ValidationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// JWT grant exchange failed.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Resource API rejected the call or retries were exhausted.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Transport failure (DNS, TCP, TLS) outside the retrying request path.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Inbound webhook failed authentication.
	#[error(transparent)]
	WebhookAuth(#[from] crate::webhook::WebhookAuthError),

	/// Pagination exceeded its wall-clock budget before the result set was complete.
	#[error("Pagination timed out after {elapsed} with {retrieved} items retrieved.")]
	PaginationTimeout {
		/// Number of items collected before the budget ran out.
		retrieved: usize,
		/// Elapsed time when the timeout was detected.
		elapsed: Duration,
	},
}

/// Configuration and validation failures raised while wiring the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A required credential field is absent or empty.
	#[error("Credential field `{field}` is required.")]
	MissingField {
		/// Credential field name as supplied by the host.
		field: &'static str,
	},
	/// Region tag is not part of the endpoint table.
	#[error("Unknown region `{region}`.")]
	UnknownRegion {
		/// Region tag as supplied by the host.
		region: String,
	},
	/// Environment tag is neither production nor demo.
	#[error("Unknown environment `{environment}`.")]
	UnknownEnvironment {
		/// Environment tag as supplied by the host.
		environment: String,
	},
	/// A configured or derived URL cannot be parsed.
	#[error("URL for {what} is invalid.")]
	InvalidUrl {
		/// Which URL failed to parse.
		what: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Credential JSON could not be deserialized.
	#[error("Credentials could not be parsed at `{path}`.")]
	CredentialsParse {
		/// JSON path of the offending field.
		path: String,
	},
}

/// Reasons the token endpoint may give that are safe to surface verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthFailureReason {
	/// The impersonated user has not granted consent to the integration key.
	ConsentRequired,
	/// The assertion was rejected (bad key, clock skew, wrong user or audience).
	InvalidGrant,
	/// The request was malformed.
	InvalidRequest,
	/// Any other server response; its text is never forwarded.
	Other,
}
impl AuthFailureReason {
	/// Maps an OAuth `error` code onto the allow-list.
	pub fn from_oauth_error(code: &str) -> Self {
		match code {
			"consent_required" => Self::ConsentRequired,
			"invalid_grant" => Self::InvalidGrant,
			"invalid_request" => Self::InvalidRequest,
			_ => Self::Other,
		}
	}

	/// Returns the stable OAuth code for allow-listed reasons.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ConsentRequired => "consent_required",
			Self::InvalidGrant => "invalid_grant",
			Self::InvalidRequest => "invalid_request",
			Self::Other => "other",
		}
	}

	/// Human-readable description that never echoes server-provided text.
	pub const fn description(self) -> &'static str {
		match self {
			Self::ConsentRequired =>
				"consent_required: the user must grant consent to the integration key",
			Self::InvalidGrant =>
				"invalid_grant: the JWT assertion was rejected; check the integration key, user ID, and private key",
			Self::InvalidRequest => "invalid_request: the token request was malformed",
			Self::Other => "the authorization server rejected the request",
		}
	}
}
impl Display for AuthFailureReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.description())
	}
}

/// JWT grant exchange failures.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// Token endpoint answered with a non-success status.
	#[error("Authentication failed with status {status}: {reason}.")]
	Rejected {
		/// HTTP status returned by the token endpoint.
		status: u16,
		/// Allow-listed reason.
		reason: AuthFailureReason,
	},
	/// Success response did not include an access token.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Success response could not be parsed.
	#[error("Token endpoint returned malformed JSON at `{path}`.")]
	MalformedResponse {
		/// JSON path of the offending field.
		path: String,
	},
	/// The supplied private key is not a usable RSA PEM key.
	#[error("Private key is not a valid RSA PEM key.")]
	InvalidPrivateKey,
	/// The assertion could not be signed.
	#[error("JWT assertion could not be signed.")]
	Signing,
}

/// Non-success outcome of a resource API call after the retry policy gave up.
///
/// `message` is already sanitized: it is capped, and anything mentioning tokens, keys, or
/// secrets has been replaced with a generic authentication message.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct ApiError {
	/// HTTP status of the final attempt, absent for transport failures.
	pub status: Option<u16>,
	/// Provider error code (for example `ENVELOPE_DOES_NOT_EXIST`), when supplied.
	pub error_code: Option<String>,
	/// Sanitized, user-presentable message.
	pub message: String,
	/// Number of attempts made, including the first.
	pub attempts: u32,
}

/// Network failure classes relevant to retry decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkFailure {
	/// The request or connection timed out.
	Timeout,
	/// The remote refused the connection.
	ConnectionRefused,
	/// The connection was reset mid-flight.
	ConnectionReset,
	/// Any other failure (DNS, TLS, protocol).
	Other,
}
impl NetworkFailure {
	/// Whether the failure is considered transient.
	pub const fn is_retryable(self) -> bool {
		!matches!(self, Self::Other)
	}

	/// Classifies an `std::io::ErrorKind`.
	pub fn from_io_kind(kind: std::io::ErrorKind) -> Self {
		use std::io::ErrorKind;

		match kind {
			ErrorKind::TimedOut => Self::Timeout,
			ErrorKind::ConnectionRefused => Self::ConnectionRefused,
			ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe =>
				Self::ConnectionReset,
			_ => Self::Other,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the remote endpoint.")]
	Network {
		/// Failure class used by the retry policy.
		kind: NetworkFailure,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the remote endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error with its failure class.
	pub fn network(kind: NetworkFailure, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { kind, source: Box::new(src) }
	}

	/// Returns the failure class for retry decisions.
	pub fn failure(&self) -> NetworkFailure {
		match self {
			Self::Network { kind, .. } => *kind,
			Self::Io(e) => NetworkFailure::from_io_kind(e.kind()),
		}
	}
}
