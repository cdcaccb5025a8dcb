//! Client-credentials exchange against `POST {base}/auth/token`.
//!
//! The endpoint takes a JSON body `{"clientId": .., "secret": ..}` rather than the form-encoded
//! OAuth 2.0 grant, and answers with a JSON token object even on failure. The issuer therefore
//! decodes the body whatever the status and leaves "is there an access token?" to the session.

// self
use crate::{
	_prelude::*,
	auth::{SecretProvider, Token},
	client::CallOptions,
	config::ClientConfig,
	error,
	http::{ApiRequest, HttpMethod, HttpTransport},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
};

/// Exchanges environment-qualified client credentials for a [`Token`].
pub struct TokenIssuer<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	secrets: Arc<dyn SecretProvider>,
	token_url: Url,
	client_id_name: String,
	secret_name: String,
}
impl<T> TokenIssuer<T>
where
	T: ?Sized + HttpTransport,
{
	/// Builds an issuer for the environment and origin in `config`.
	pub fn new(
		config: &ClientConfig,
		transport: Arc<T>,
		secrets: Arc<dyn SecretProvider>,
	) -> Result<Self> {
		Ok(Self {
			transport,
			secrets,
			token_url: config.endpoint_url("auth/token")?,
			client_id_name: config.client_id_secret_name(),
			secret_name: config.client_secret_secret_name(),
		})
	}

	/// Token endpoint URL.
	pub fn token_url(&self) -> &Url {
		&self.token_url
	}

	/// Fetches the credentials and calls the token endpoint once, within the call deadline.
	///
	/// The deadline is checked again once the secrets arrive, and the token request only gets the
	/// time that is left.
	pub async fn issue(&self, options: &CallOptions) -> Result<Token> {
		const KIND: OperationKind = OperationKind::TokenIssue;

		let span = OperationSpan::new(KIND, "issue");

		obs::record_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				options.remaining()?;

				let (client_id, secret) = futures::try_join!(
					self.secrets.get_secret(&self.client_id_name),
					self.secrets.get_secret(&self.secret_name),
				)?;
				let body = serde_json::json!({ "clientId": client_id, "secret": secret });
				let request = ApiRequest::new(HttpMethod::Post, self.token_url.clone())
					.with_header("accept", "application/json")
					.with_json_body(&body)?
					.with_timeout(options.remaining()?);
				let response = self.transport.execute(request).await?;

				error::decode::<Token>(response.status, &response.body)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
impl<T> Debug for TokenIssuer<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer")
			.field("token_url", &self.token_url.as_str())
			.field("client_id_name", &self.client_id_name)
			.field("secret_name", &self.secret_name)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration as StdDuration,
	};
	// self
	use super::*;
	use crate::{
		auth::{SecretFuture, StaticSecretProvider},
		config::Environment,
		error::TransportError,
		http::{ApiResponse, TransportFuture},
	};

	#[derive(Default)]
	struct CountingTransport {
		calls: AtomicUsize,
		last_timeout: Mutex<Option<StdDuration>>,
	}
	impl HttpTransport for CountingTransport {
		fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			*self.last_timeout.lock() = request.timeout;

			Box::pin(async {
				Ok::<_, TransportError>(ApiResponse::new(
					200,
					"{\"accessToken\":\"jwt\",\"expires\":\"2999-01-01T00:00:00Z\"}",
				))
			})
		}
	}

	struct SlowSecrets {
		delay: StdDuration,
		inner: StaticSecretProvider,
	}
	impl SecretProvider for SlowSecrets {
		fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a> {
			Box::pin(async move {
				tokio::time::sleep(self.delay).await;

				self.inner.get_secret(name).await
			})
		}
	}

	fn issuer(transport: Arc<CountingTransport>, delay: StdDuration) -> TokenIssuer<CountingTransport> {
		let config = ClientConfig::builder(Environment::Production, "Acme")
			.base_url("https://api.test.local")
			.build()
			.expect("Config should build.");
		let inner = StaticSecretProvider::default()
			.with_secret("YouniumProdClientId", "client")
			.with_secret("YouniumProdSecret", "secret");

		TokenIssuer::new(&config, transport, Arc::new(SlowSecrets { delay, inner }))
			.expect("Issuer should build.")
	}

	#[tokio::test]
	async fn slow_secrets_cannot_outlive_the_deadline() {
		let transport = Arc::new(CountingTransport::default());
		let options = CallOptions::new().with_timeout(StdDuration::from_millis(50));
		let err = issuer(transport.clone(), StdDuration::from_millis(200))
			.issue(&options)
			.await
			.expect_err("Deadline should pass while secrets load.");

		assert!(matches!(err, Error::DeadlineExceeded));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn token_request_gets_only_the_remaining_budget() {
		let transport = Arc::new(CountingTransport::default());
		let options = CallOptions::new().with_timeout(StdDuration::from_millis(500));
		let token = issuer(transport.clone(), StdDuration::from_millis(100))
			.issue(&options)
			.await
			.expect("Token should be issued inside the deadline.");
		let timeout = (*transport.last_timeout.lock()).expect("Token request should carry a timeout.");

		assert_eq!(token.access_token(), Some("jwt"));
		assert!(timeout <= StdDuration::from_millis(400), "Timeout {timeout:?} ignores the secret wait.");
	}
}
