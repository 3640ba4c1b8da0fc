//! Authenticated DocuSign eSignature access for workflow hosts: cached JWT grants, resilient
//! paginated requests, and verified Connect webhooks.
//!
//! The crate is organized leaf-first:
//!
//! - [`validate`] performs fail-fast format checks on caller-supplied fields.
//! - [`auth`] signs JWT assertions and caches the exchanged access tokens in a [`store`].
//! - [`api`] executes authenticated requests with retry/backoff and drives pagination.
//! - [`webhook`] verifies inbound Connect notifications independently of the token path.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod store;
pub mod validate;
pub mod webhook;

mod _prelude {
	pub use std::{
		collections::{BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
