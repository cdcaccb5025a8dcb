//! Secret provider contract and the small adapters shipped with the crate.
//!
//! Credential storage is owned by the embedding application. The client only asks a
//! [`SecretProvider`] for `Younium{Prod|Sandbox}ClientId` and `Younium{Prod|Sandbox}Secret`
//! whenever it has to mint a token.

// self
use crate::_prelude::*;

/// Boxed future returned by [`SecretProvider::get_secret`].
pub type SecretFuture<'a> = Pin<Box<dyn Future<Output = Result<String, SecretError>> + 'a + Send>>;

/// Asynchronous lookup of named secrets (vaults, key stores, environment).
pub trait SecretProvider
where
	Self: Send + Sync,
{
	/// Returns the value stored under `name`.
	fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a>;
}

/// Error type produced by [`SecretProvider`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SecretError {
	/// No secret exists under the requested name.
	#[error("Secret `{name}` was not found.")]
	NotFound {
		/// Requested secret name.
		name: String,
	},
	/// Backend-level failure for the secret store.
	#[error("Secret backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Fixed in-memory secrets for tests, demos, and wiring that resolves credentials up front.
#[derive(Clone, Default)]
pub struct StaticSecretProvider(Arc<RwLock<HashMap<String, String>>>);
impl StaticSecretProvider {
	/// Adds or replaces a secret and returns the provider for chaining.
	pub fn with_secret(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, value);

		self
	}

	/// Adds or replaces a secret.
	pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
		self.0.write().insert(name.into(), value.into());
	}
}
impl SecretProvider for StaticSecretProvider {
	fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a> {
		let found = self.0.read().get(name).cloned();

		Box::pin(async move { found.ok_or_else(|| SecretError::NotFound { name: name.to_owned() }) })
	}
}
impl Debug for StaticSecretProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut names = self.0.read().keys().cloned().collect::<Vec<_>>();

		names.sort();

		f.debug_struct("StaticSecretProvider").field("names", &names).finish()
	}
}

/// Reads secrets from process environment variables named after the secret.
#[derive(Clone, Debug, Default)]
pub struct EnvSecretProvider {
	prefix: String,
}
impl EnvSecretProvider {
	/// Looks up `<prefix><name>` instead of `<name>`.
	pub fn with_prefix(prefix: impl Into<String>) -> Self {
		Self { prefix: prefix.into() }
	}
}
impl SecretProvider for EnvSecretProvider {
	fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a> {
		let var = format!("{}{name}", self.prefix);
		let found = match std::env::var(&var) {
			Ok(value) => Ok(value),
			Err(std::env::VarError::NotPresent) => Err(SecretError::NotFound { name: var }),
			Err(err) => Err(SecretError::Backend { message: format!("{var}: {err}") }),
		};

		Box::pin(async move { found })
	}
}
