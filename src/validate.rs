//! Fail-fast format checks for caller-supplied fields.
//!
//! Every predicate is pure. [`validate_field`] treats empty values as "not provided" for all
//! kinds except [`FieldKind::Required`], so required-ness is asserted separately from format.

// std
use std::sync::LazyLock;
// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use regex::Regex;
use time::{Date, PrimitiveDateTime, format_description::well_known::Iso8601, macros};
// self
use crate::_prelude::*;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("Email pattern must compile.")
});
static UUID: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
		.expect("UUID pattern must compile.")
});
static BASE64: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("Base64 pattern must compile."));

/// Hostnames (or hostname prefixes) that must never be the target of a caller-supplied URL.
///
/// Matching is by equality or string prefix on the literal host, so `10.` covers the whole
/// `10.0.0.0/8` block and the sixteen `172.x.` entries cover `172.16.0.0/12`.
pub const BLOCKED_HOSTS: &[&str] = &[
	"localhost",
	"127.0.0.1",
	"127.",
	"0.0.0.0",
	"::1",
	"[::1]",
	"0:0:0:0:0:0:0:1",
	"[0:0:0:0:0:0:0:1]",
	"10.",
	"172.16.",
	"172.17.",
	"172.18.",
	"172.19.",
	"172.20.",
	"172.21.",
	"172.22.",
	"172.23.",
	"172.24.",
	"172.25.",
	"172.26.",
	"172.27.",
	"172.28.",
	"172.29.",
	"172.30.",
	"172.31.",
	"192.168.",
	"169.254.",
];

/// Field format kinds understood by [`validate_field`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
	/// Value must be present and non-empty.
	Required,
	/// RFC 5322-shaped email address.
	Email,
	/// Canonical hyphenated UUID.
	Uuid,
	/// Standard-alphabet base64 that decodes to at least one byte.
	Base64,
	/// `http` or `https` URL outside the SSRF blocklist.
	Url,
	/// `https` URL outside the SSRF blocklist.
	HttpsUrl,
	/// ISO-8601 date or date-time.
	IsoDate,
}
impl FieldKind {
	fn describe(self) -> &'static str {
		match self {
			Self::Required => "is required",
			Self::Email => "must be a valid email address",
			Self::Uuid => "must be a valid UUID",
			Self::Base64 => "must be valid base64-encoded content",
			Self::Url => "must be a valid public http(s) URL",
			Self::HttpsUrl => "must be a valid public https URL",
			Self::IsoDate => "must be a valid ISO 8601 date",
		}
	}
}

/// Raised when a field fails its format check.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Field `{field}` {}.", .kind.describe())]
pub struct ValidationError {
	/// Name of the offending field.
	pub field: String,
	/// Check that failed.
	pub kind: FieldKind,
}

/// Returns `true` when `value` looks like `local@domain.tld`.
pub fn is_valid_email(value: &str) -> bool {
	EMAIL.is_match(value)
}

/// Returns `true` for canonical 8-4-4-4-12 hex UUIDs, case-insensitively.
pub fn is_valid_uuid(value: &str) -> bool {
	UUID.is_match(value)
}

/// Returns `true` when `value` uses the standard base64 alphabet and decodes to content.
pub fn is_valid_base64(value: &str) -> bool {
	if !BASE64.is_match(value) {
		return false;
	}

	matches!(STANDARD.decode(value), Ok(bytes) if !bytes.is_empty())
}

/// Returns `true` for `http`/`https` URLs whose host is not internal.
///
/// With `require_https` only `https` is accepted. The check inspects the literal host only;
/// names that later resolve to internal addresses are not detected here.
pub fn is_valid_url(value: &str, require_https: bool) -> bool {
	let Ok(url) = Url::parse(value) else {
		return false;
	};

	match url.scheme() {
		"https" => {},
		"http" if !require_https => {},
		_ => return false,
	}

	let Some(host) = url.host_str() else {
		return false;
	};
	let host = host.to_ascii_lowercase();

	!is_blocked_host(&host)
}

/// Returns `true` for ISO-8601 date-times (with or without offset) and plain dates.
pub fn is_valid_iso_date(value: &str) -> bool {
	OffsetDateTime::parse(value, &Iso8601::DEFAULT).is_ok()
		|| PrimitiveDateTime::parse(value, &Iso8601::DEFAULT).is_ok()
		|| Date::parse(value, macros::format_description!("[year]-[month]-[day]")).is_ok()
}

/// Checks `value` against `kind`, failing with a [`ValidationError`] naming `field`.
///
/// Empty values pass every kind except [`FieldKind::Required`].
pub fn validate_field(
	field: &str,
	value: Option<&str>,
	kind: FieldKind,
) -> Result<(), ValidationError> {
	let value = value.map(str::trim).filter(|v| !v.is_empty());
	let valid = match (kind, value) {
		(FieldKind::Required, v) => v.is_some(),
		(_, None) => true,
		(FieldKind::Email, Some(v)) => is_valid_email(v),
		(FieldKind::Uuid, Some(v)) => is_valid_uuid(v),
		(FieldKind::Base64, Some(v)) => is_valid_base64(v),
		(FieldKind::Url, Some(v)) => is_valid_url(v, false),
		(FieldKind::HttpsUrl, Some(v)) => is_valid_url(v, true),
		(FieldKind::IsoDate, Some(v)) => is_valid_iso_date(v),
	};

	if valid { Ok(()) } else { Err(ValidationError { field: field.to_owned(), kind }) }
}

fn is_blocked_host(host: &str) -> bool {
	BLOCKED_HOSTS.iter().any(|blocked| host == *blocked || host.starts_with(blocked))
}
