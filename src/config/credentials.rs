//! Validated credential record supplied by the host's credential store.

// self
use crate::{
	_prelude::*,
	auth::{PrivateKey, TokenSecret},
	config::{Environment, Region, RegionEndpoint},
	error::ConfigError,
	validate::{self, FieldKind},
};

/// Credential record as the host stores it; every field may be absent.
///
/// Convert into [`Credentials`] with [`TryFrom`] to validate it once.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCredentials {
	/// `production` or `demo`.
	pub environment: Option<String>,
	/// Region tag (`na`, `eu`, `au`, `ca`, `demo`).
	pub region: Option<String>,
	/// Integration key (OAuth client id).
	pub integration_key: Option<String>,
	/// User id impersonated by the JWT grant.
	pub user_id: Option<String>,
	/// Account id every API call is namespaced under.
	pub account_id: Option<String>,
	/// RSA private key in PEM form.
	pub private_key: Option<String>,
	/// Shared secret for Connect webhook HMAC signatures.
	pub webhook_secret: Option<String>,
	/// Overrides the region table's API base URL.
	pub api_base_url: Option<String>,
	/// Overrides the region table's OAuth host.
	pub auth_host: Option<String>,
}
impl RawCredentials {
	/// Parses the host's JSON credential record.
	pub fn from_json(json: &str) -> Result<Self> {
		let de = &mut serde_json::Deserializer::from_str(json);

		serde_path_to_error::deserialize(de)
			.map_err(|e| ConfigError::CredentialsParse { path: e.path().to_string() }.into())
	}
}
impl Debug for RawCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RawCredentials")
			.field("environment", &self.environment)
			.field("region", &self.region)
			.field("integration_key", &self.integration_key)
			.field("user_id", &self.user_id)
			.field("account_id", &self.account_id)
			.field("private_key_set", &self.private_key.is_some())
			.field("webhook_secret_set", &self.webhook_secret.is_some())
			.finish()
	}
}

/// Validated credentials with resolved endpoints.
#[derive(Clone)]
pub struct Credentials {
	/// Account environment.
	pub environment: Environment,
	/// Account region.
	pub region: Region,
	/// Integration key (OAuth client id).
	pub integration_key: String,
	/// Impersonated user id.
	pub user_id: String,
	/// Account id.
	pub account_id: String,
	/// JWT signing key.
	pub private_key: PrivateKey,
	/// Connect HMAC secret, when configured.
	pub webhook_secret: Option<TokenSecret>,
	/// REST API base URL.
	pub api_base_url: Url,
	/// OAuth host (no scheme).
	pub auth_host: String,
}
impl Credentials {
	/// Parses and validates the host's JSON credential record in one step.
	pub fn from_json(json: &str) -> Result<Self> {
		RawCredentials::from_json(json)?.try_into()
	}

	/// Base URL for account-scoped calls: `{api_base_url}/accounts/{account_id}`.
	pub fn account_base(&self) -> String {
		format!("{}/accounts/{}", self.api_base_url.as_str().trim_end_matches('/'), self.account_id)
	}
}
impl TryFrom<RawCredentials> for Credentials {
	type Error = Error;

	fn try_from(raw: RawCredentials) -> Result<Self> {
		let environment = match non_empty(raw.environment) {
			Some(tag) => tag.parse()?,
			None => Environment::default(),
		};
		let region = match non_empty(raw.region) {
			Some(tag) => tag.parse()?,
			None => Region::default(),
		};
		let integration_key = require("integrationKey", raw.integration_key)?;
		let user_id = require("userId", raw.user_id)?;
		let account_id = require("accountId", raw.account_id)?;
		let private_key = PrivateKey::from_pem(require("privateKey", raw.private_key)?);

		validate::validate_field("integrationKey", Some(&integration_key), FieldKind::Uuid)?;
		validate::validate_field("userId", Some(&user_id), FieldKind::Uuid)?;
		validate::validate_field("accountId", Some(&account_id), FieldKind::Uuid)?;

		let (default_api, default_auth) = RegionEndpoint::resolve(environment, region);
		let api_base_url = non_empty(raw.api_base_url).unwrap_or_else(|| default_api.to_owned());
		let api_base_url = Url::parse(&api_base_url)
			.map_err(|source| ConfigError::InvalidUrl { what: "apiBaseUrl", source })?;
		let auth_host = non_empty(raw.auth_host).unwrap_or_else(|| default_auth.to_owned());

		Ok(Self {
			environment,
			region,
			integration_key,
			user_id,
			account_id,
			private_key,
			webhook_secret: non_empty(raw.webhook_secret).map(TokenSecret::new),
			api_base_url,
			auth_host,
		})
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("environment", &self.environment)
			.field("region", &self.region)
			.field("integration_key", &self.integration_key)
			.field("user_id", &self.user_id)
			.field("account_id", &self.account_id)
			.field("api_base_url", &self.api_base_url.as_str())
			.field("auth_host", &self.auth_host)
			.field("webhook_secret_set", &self.webhook_secret.is_some())
			.finish()
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn require(field: &'static str, value: Option<String>) -> Result<String> {
	non_empty(value).ok_or_else(|| ConfigError::MissingField { field }.into())
}
