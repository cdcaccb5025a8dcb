//! API client: session-aware request executor plus CRUD and collection helpers.
//!
//! [`Client`] owns the transport, the token issuer, the token cache strategy, and one
//! [`Session`]. Every call runs `ensure_token` first, attaches the session's default headers plus
//! `api-version`, and classifies the response into an [`ApiResult`].

// std
use std::time::{Duration as StdDuration, Instant};
// self
use crate::{
	_prelude::*,
	auth::{PassthroughTokenCache, SecretProvider, Token, TokenCache, TokenIssuer},
	config::{self, ClientConfig},
	error::ConfigError,
	http::{ApiRequest, HttpMethod, HttpTransport},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	response::{ApiResult, JsonObject},
	session::Session,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = Client<ReqwestTransport>;

/// Resources whose server-assigned `id` is copied back after a create call.
pub trait Identified {
	/// Stores the `id` returned by the API (`None` when the response carried none).
	fn set_id(&mut self, id: Option<String>);
}

/// Per-call knobs: deadline and `api-version` override.
///
/// The deadline covers the token refresh and every request the call issues, including all page
/// fetches of a collection. Dropping the call's future cancels whatever is still in flight.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
	/// Instant after which no further request is sent.
	pub deadline: Option<Instant>,
	/// Overrides the client's `api-version` header for this call.
	pub api_version: Option<String>,
}
impl CallOptions {
	/// Options without deadline or overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an absolute deadline.
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Sets a deadline `timeout` from now.
	pub fn with_timeout(self, timeout: StdDuration) -> Self {
		self.with_deadline(Instant::now() + timeout)
	}

	/// Overrides the `api-version` header.
	pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = Some(version.into());

		self
	}

	/// Time left before the deadline, or [`Error::DeadlineExceeded`] once it has passed.
	pub fn remaining(&self) -> Result<Option<StdDuration>> {
		match self.deadline {
			None => Ok(None),
			Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
				Some(left) if !left.is_zero() => Ok(Some(left)),
				_ => Err(Error::DeadlineExceeded),
			},
		}
	}
}

/// Younium API client bound to one environment and one legal entity.
pub struct Client<T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) config: ClientConfig,
	transport: Arc<T>,
	issuer: TokenIssuer<T>,
	token_cache: Arc<dyn TokenCache>,
	token_cache_key: String,
	session: Session,
}
impl<T> Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		secrets: Arc<dyn SecretProvider>,
		transport: impl Into<Arc<T>>,
	) -> Result<Self> {
		let transport = transport.into();
		let issuer = TokenIssuer::new(&config, transport.clone(), secrets)?;

		Ok(Self {
			token_cache_key: config.token_cache_key(),
			session: Session::new(config.legal_entity.clone()),
			token_cache: Arc::new(PassthroughTokenCache),
			issuer,
			transport,
			config,
		})
	}

	/// Replaces the token cache strategy (defaults to [`PassthroughTokenCache`]).
	pub fn with_token_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
		self.token_cache = cache;

		self
	}

	/// Validated configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Session holding the cached token and default headers.
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Currently cached token, if any.
	pub fn cached_token(&self) -> Option<Token> {
		self.session.token()
	}

	/// Drops the cached token so the next call refreshes.
	pub fn invalidate_token(&self) -> Option<Token> {
		self.session.invalidate()
	}

	/// Returns a token valid for at least 30 more minutes, refreshing it when needed.
	///
	/// Fails with [`Error::DeadlineExceeded`] if the deadline passes while the token is obtained,
	/// including time spent waiting on the token cache.
	pub async fn ensure_token(&self, options: &CallOptions) -> Result<Token> {
		options.remaining()?;

		let token = self
			.session
			.ensure_token(self.token_cache.as_ref(), &self.token_cache_key, || {
				Box::pin(self.issuer.issue(options))
			})
			.await?;

		options.remaining()?;

		Ok(token)
	}

	/// Sends one authenticated request and classifies the response.
	pub async fn send(
		&self,
		method: HttpMethod,
		url: Url,
		body: Option<&Value>,
		options: &CallOptions,
	) -> Result<ApiResult> {
		const KIND: OperationKind = OperationKind::Send;

		let span = OperationSpan::new(KIND, method.as_str());

		obs::record_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				options.remaining()?;
				self.ensure_token(options).await?;

				let api_version = options.api_version.as_deref().unwrap_or(&self.config.api_version);

				if !config::is_header_value(api_version) {
					return Err(Error::from(ConfigError::InvalidApiVersion(api_version.to_owned())));
				}

				let headers = self.session.default_headers();
				let mut request = ApiRequest::new(method, url)
					.with_headers(&headers)
					.with_header("api-version", api_version)
					.with_timeout(options.remaining()?);

				if let Some(body) = body {
					request = request.with_json_body(body)?;
				}

				let response = self.transport.execute(request).await?;

				ApiResult::classify(&response)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Single GET against `{base}/{endpoint}`.
	pub async fn get(&self, endpoint: &str, options: &CallOptions) -> Result<ApiResult> {
		let url = self.config.endpoint_url(endpoint)?;

		self.send(HttpMethod::Get, url, None, options).await
	}

	/// POSTs `object` and copies the returned `id` into it (`null` when absent).
	pub async fn create_object(
		&self,
		endpoint: &str,
		object: &mut JsonObject,
		options: &CallOptions,
	) -> Result<ApiResult> {
		let url = self.config.endpoint_url(endpoint)?;
		let body = Value::Object(object.clone());
		let result = self.send(HttpMethod::Post, url, Some(&body), options).await?;

		object.insert("id".into(), result.id().map(Value::String).unwrap_or(Value::Null));

		Ok(result)
	}

	/// POSTs a typed resource without its `null` fields and stores the returned `id` on it.
	pub async fn create<R>(
		&self,
		endpoint: &str,
		resource: &mut R,
		options: &CallOptions,
	) -> Result<ApiResult>
	where
		R: Serialize + Identified,
	{
		let url = self.config.endpoint_url(endpoint)?;
		let mut body = serde_json::to_value(&*resource)?;

		strip_nulls(&mut body);

		let result = self.send(HttpMethod::Post, url, Some(&body), options).await?;

		resource.set_id(result.id());

		Ok(result)
	}

	/// PATCHes `object` and returns the response unchanged.
	pub async fn update(
		&self,
		endpoint: &str,
		object: &JsonObject,
		options: &CallOptions,
	) -> Result<ApiResult> {
		let url = self.config.endpoint_url(endpoint)?;
		let body = Value::Object(object.clone());

		self.send(HttpMethod::Patch, url, Some(&body), options).await
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport> {
	/// Creates a client backed by a fresh reqwest transport.
	pub fn new(config: ClientConfig, secrets: Arc<dyn SecretProvider>) -> Result<Self> {
		let http = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::with_transport(config, secrets, ReqwestTransport::with_client(http))
	}
}
impl<T> Debug for Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("environment", &self.config.environment)
			.field("legal_entity", &self.config.legal_entity)
			.field("base_url", &self.config.base_url.as_str())
			.field("token_cached", &self.session.token().is_some())
			.finish()
	}
}

/// Removes `null`-valued object fields at every depth; `null` array items are kept.
pub fn strip_nulls(value: &mut Value) {
	match value {
		Value::Object(fields) => {
			fields.retain(|_, field| !field.is_null());
			fields.values_mut().for_each(strip_nulls);
		},
		Value::Array(items) => items.iter_mut().for_each(strip_nulls),
		_ => {},
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn strip_nulls_recurses_into_objects() {
		let mut value = json!({
			"name": "Widget",
			"description": null,
			"owner": { "id": null, "name": "Ops" },
			"tags": [null, { "k": null, "v": 1 }]
		});

		strip_nulls(&mut value);

		assert_eq!(
			value,
			json!({ "name": "Widget", "owner": { "name": "Ops" }, "tags": [null, { "v": 1 }] })
		);
	}

	#[test]
	fn call_options_report_remaining_time() {
		assert!(matches!(CallOptions::new().remaining(), Ok(None)));

		let remaining = CallOptions::new()
			.with_timeout(StdDuration::from_secs(60))
			.remaining()
			.expect("Future deadline should leave time.")
			.expect("Deadline should yield a remaining duration.");

		assert!(remaining <= StdDuration::from_secs(60));

		let past = Instant::now().checked_sub(StdDuration::from_secs(1)).unwrap_or_else(Instant::now);
		let err = CallOptions::new().with_deadline(past).remaining().expect_err("Deadline passed.");

		assert!(matches!(err, Error::DeadlineExceeded));
	}
}
