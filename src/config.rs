//! Client configuration: target environment, tenant, API version, and fan-out limits.

// std
use std::num::NonZeroUsize;
// self
use crate::{_prelude::*, error::ConfigError};

/// Deployment target selecting the API origin and the credential names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	/// Live tenant data at `https://api.younium.com`.
	Production,
	/// Sandbox tenant data at `https://api.sandbox.younium.com`.
	Sandbox,
}
impl Environment {
	/// Returns the API origin for the environment.
	pub const fn base_origin(self) -> &'static str {
		match self {
			Environment::Production => "https://api.younium.com",
			Environment::Sandbox => "https://api.sandbox.younium.com",
		}
	}

	/// Returns the qualifier used in secret names and cache keys.
	pub const fn qualifier(self) -> &'static str {
		match self {
			Environment::Production => "Prod",
			Environment::Sandbox => "Sandbox",
		}
	}

	/// Returns `true` for [`Environment::Production`].
	pub const fn is_production(self) -> bool {
		matches!(self, Environment::Production)
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(match self {
			Environment::Production => "production",
			Environment::Sandbox => "sandbox",
		})
	}
}
impl FromStr for Environment {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"prod" | "production" => Ok(Environment::Production),
			"sandbox" => Ok(Environment::Sandbox),
			_ => Err(ConfigError::UnknownEnvironment(s.to_owned())),
		}
	}
}

/// Validated settings shared by every request a [`Client`](crate::Client) issues.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Deployment target.
	pub environment: Environment,
	/// Tenant identifier sent as the `legal-entity` header.
	pub legal_entity: String,
	/// Default `api-version` header value.
	pub api_version: String,
	/// Origin every endpoint is resolved against.
	pub base_url: Url,
	/// Upper bound on concurrent page fetches; `None` fetches all pages at once.
	pub max_concurrent_pages: Option<NonZeroUsize>,
}
impl ClientConfig {
	/// Default `api-version` header value.
	pub const DEFAULT_API_VERSION: &'static str = "2.1";
	/// Fixed page size requested by the page aggregator.
	pub const PAGE_SIZE: u32 = 100;

	/// Starts a builder for the given environment and tenant.
	pub fn builder(
		environment: Environment,
		legal_entity: impl Into<String>,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new(environment, legal_entity.into())
	}

	/// Resolves an endpoint path (optionally carrying a query) against the base origin.
	pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let endpoint = endpoint.trim_start_matches('/');
		let raw = format!("{base}/{endpoint}");

		Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { value: raw, source })
	}

	/// Secret name holding the client identifier for this environment.
	pub fn client_id_secret_name(&self) -> String {
		format!("Younium{}ClientId", self.environment.qualifier())
	}

	/// Secret name holding the client secret for this environment.
	pub fn client_secret_secret_name(&self) -> String {
		format!("Younium{}Secret", self.environment.qualifier())
	}

	/// Key under which tokens for this environment are cached.
	pub fn token_cache_key(&self) -> String {
		format!("YouniumToken{}", self.environment.qualifier())
	}

	/// Concurrency used for page fan-out given the number of pages left to fetch.
	pub(crate) fn page_concurrency(&self, pending: usize) -> usize {
		match self.max_concurrent_pages {
			Some(limit) => limit.get(),
			None => pending.max(1),
		}
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	environment: Environment,
	legal_entity: String,
	api_version: Option<String>,
	base_url: Option<String>,
	max_concurrent_pages: Option<NonZeroUsize>,
}
impl ClientConfigBuilder {
	fn new(environment: Environment, legal_entity: String) -> Self {
		Self { environment, legal_entity, api_version: None, base_url: None, max_concurrent_pages: None }
	}

	/// Overrides the default `api-version` header value.
	pub fn api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = Some(version.into());

		self
	}

	/// Overrides the environment's API origin (mock servers, proxies).
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Caps the number of concurrently fetched pages.
	pub fn max_concurrent_pages(mut self, limit: NonZeroUsize) -> Self {
		self.max_concurrent_pages = Some(limit);

		self
	}

	/// Validates the settings and produces a [`ClientConfig`].
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		if !is_header_value(&self.legal_entity) {
			return Err(ConfigError::InvalidLegalEntity(self.legal_entity));
		}

		let api_version = self.api_version.unwrap_or_else(|| ClientConfig::DEFAULT_API_VERSION.into());

		if !is_header_value(&api_version) {
			return Err(ConfigError::InvalidApiVersion(api_version));
		}

		let raw = self.base_url.unwrap_or_else(|| self.environment.base_origin().into());
		let base_url = Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidUrl { value: raw.clone(), source })?;

		if base_url.cannot_be_a_base() {
			return Err(ConfigError::UnsupportedBaseUrl(raw));
		}

		Ok(ClientConfig {
			environment: self.environment,
			legal_entity: self.legal_entity,
			api_version,
			base_url,
			max_concurrent_pages: self.max_concurrent_pages,
		})
	}
}

// Visible ASCII plus inner spaces, the subset every transport accepts.
pub(crate) fn is_header_value(value: &str) -> bool {
	!value.trim().is_empty() && value.bytes().all(|b| b == b' ' || b == b'\t' || (0x21..0x7f).contains(&b))
}
