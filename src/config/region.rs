//! Static region/environment endpoint table.

// self
use crate::{_prelude::*, error::ConfigError};

/// Deployment environment of the eSignature account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	#[default]
	/// Live accounts.
	Production,
	/// Developer sandbox accounts.
	Demo,
}
impl Environment {
	/// Returns the stable tag used in credential records.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Production => "production",
			Self::Demo => "demo",
		}
	}
}
impl FromStr for Environment {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"production" | "prod" | "live" => Ok(Self::Production),
			"demo" | "sandbox" | "developer" => Ok(Self::Demo),
			other => Err(ConfigError::UnknownEnvironment { environment: other.to_owned() }),
		}
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Hosting region of the eSignature account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
	#[default]
	/// North America.
	Na,
	/// European Union.
	Eu,
	/// Australia.
	Au,
	/// Canada.
	Ca,
	/// Developer sandbox.
	Demo,
}
impl Region {
	/// All regions in table order.
	pub const ALL: [Region; 5] = [Self::Na, Self::Eu, Self::Au, Self::Ca, Self::Demo];

	/// Returns the stable tag used in credential records.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Na => "na",
			Self::Eu => "eu",
			Self::Au => "au",
			Self::Ca => "ca",
			Self::Demo => "demo",
		}
	}

	/// Returns the endpoint row for this region.
	pub const fn endpoint(self) -> RegionEndpoint {
		match self {
			Self::Na => RegionEndpoint {
				api_base_url: "https://na1.docusign.net/restapi/v2.1",
				auth_host: "account.docusign.com",
				auth_host_demo: "account-d.docusign.com",
			},
			Self::Eu => RegionEndpoint {
				api_base_url: "https://eu.docusign.net/restapi/v2.1",
				auth_host: "account.docusign.com",
				auth_host_demo: "account-d.docusign.com",
			},
			Self::Au => RegionEndpoint {
				api_base_url: "https://au.docusign.net/restapi/v2.1",
				auth_host: "account.docusign.com",
				auth_host_demo: "account-d.docusign.com",
			},
			Self::Ca => RegionEndpoint {
				api_base_url: "https://ca.docusign.net/restapi/v2.1",
				auth_host: "account.docusign.com",
				auth_host_demo: "account-d.docusign.com",
			},
			Self::Demo => RegionEndpoint {
				api_base_url: "https://demo.docusign.net/restapi/v2.1",
				auth_host: "account-d.docusign.com",
				auth_host_demo: "account-d.docusign.com",
			},
		}
	}
}
impl FromStr for Region {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let tag = s.trim().to_ascii_lowercase();

		Self::ALL
			.into_iter()
			.find(|region| region.as_str() == tag)
			.ok_or(ConfigError::UnknownRegion { region: tag })
	}
}
impl Display for Region {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One row of the endpoint table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionEndpoint {
	/// REST API base URL, without the `/accounts/{id}` suffix.
	pub api_base_url: &'static str,
	/// OAuth host for production accounts.
	pub auth_host: &'static str,
	/// OAuth host for demo accounts.
	pub auth_host_demo: &'static str,
}
impl RegionEndpoint {
	/// Resolves the API base URL and auth host for an environment/region pair.
	///
	/// Demo accounts always live on the demo row regardless of the region tag.
	pub const fn resolve(environment: Environment, region: Region) -> (&'static str, &'static str) {
		match environment {
			Environment::Demo => {
				let row = Region::Demo.endpoint();

				(row.api_base_url, row.auth_host_demo)
			},
			Environment::Production => {
				let row = region.endpoint();

				(row.api_base_url, row.auth_host)
			},
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn every_region_row_is_https() {
		for region in Region::ALL {
			let row = region.endpoint();

			assert!(row.api_base_url.starts_with("https://"), "{region} API must use HTTPS.");
			assert!(Url::parse(row.api_base_url).is_ok());
			assert_eq!(region.as_str().parse::<Region>().ok(), Some(region));
		}
	}

	#[test]
	fn demo_environment_overrides_region() {
		let (api, auth) = RegionEndpoint::resolve(Environment::Demo, Region::Eu);

		assert_eq!(api, "https://demo.docusign.net/restapi/v2.1");
		assert_eq!(auth, "account-d.docusign.com");

		let (api, auth) = RegionEndpoint::resolve(Environment::Production, Region::Eu);

		assert_eq!(api, "https://eu.docusign.net/restapi/v2.1");
		assert_eq!(auth, "account.docusign.com");
	}

	#[test]
	fn unknown_tags_fail() {
		assert!(matches!("mars".parse::<Region>(), Err(ConfigError::UnknownRegion { .. })));
		assert!(matches!(
			"staging".parse::<Environment>(),
			Err(ConfigError::UnknownEnvironment { .. })
		));
		assert_eq!(" EU ".parse::<Region>().ok(), Some(Region::Eu));
		assert_eq!("sandbox".parse::<Environment>().ok(), Some(Environment::Demo));
	}
}
