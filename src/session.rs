//! Per-client session state: the cached token and the default header set derived from it.
//!
//! Each [`Client`](crate::Client) owns exactly one [`Session`], which binds one environment and
//! one legal entity. The state is replaced wholesale on refresh; concurrent refreshes may race and
//! the last writer wins, which is harmless because every writer installs a valid token.

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenCache, TokenFuture},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
};

/// Header name carrying the tenant identifier.
pub const LEGAL_ENTITY_HEADER: &str = "legal-entity";

#[derive(Clone, Debug)]
struct SessionState {
	token: Token,
	headers: BTreeMap<String, String>,
}

/// Token and default headers for one client instance.
#[derive(Debug)]
pub struct Session {
	legal_entity: String,
	state: RwLock<Option<SessionState>>,
}
impl Session {
	/// TTL handed to the [`TokenCache`] strategy.
	pub const TOKEN_CACHE_TTL: Duration = Duration::minutes(30);

	/// Creates an empty session for `legal_entity`.
	pub fn new(legal_entity: impl Into<String>) -> Self {
		Self { legal_entity: legal_entity.into(), state: RwLock::new(None) }
	}

	/// Tenant identifier attached to every request.
	pub fn legal_entity(&self) -> &str {
		&self.legal_entity
	}

	/// Currently cached token, if any.
	pub fn token(&self) -> Option<Token> {
		self.state.read().as_ref().map(|state| state.token.clone())
	}

	/// Default headers derived from the cached token; empty before the first refresh.
	pub fn default_headers(&self) -> BTreeMap<String, String> {
		self.state.read().as_ref().map(|state| state.headers.clone()).unwrap_or_default()
	}

	/// Drops the cached token so the next call refreshes.
	pub fn invalidate(&self) -> Option<Token> {
		self.state.write().take().map(|state| state.token)
	}

	/// Returns the cached token while it stays fresh, otherwise mints one through `cache`.
	///
	/// `issue` is only invoked when a refresh is needed. A token without an access token fails
	/// with [`Error::Authentication`] and leaves the session untouched.
	pub async fn ensure_token<'a, F>(
		&'a self,
		cache: &'a dyn TokenCache,
		cache_key: &'a str,
		issue: F,
	) -> Result<Token>
	where
		F: FnOnce() -> TokenFuture<'a>,
	{
		if let Some(token) = self.token().filter(Token::is_fresh) {
			obs::log_token_reused(token.expires.as_deref());

			return Ok(token);
		}

		const KIND: OperationKind = OperationKind::EnsureToken;

		let span = OperationSpan::new(KIND, "refresh");

		obs::record_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = cache.get_or_compute(cache_key, issue(), Self::TOKEN_CACHE_TTL).await?;

				self.install(token)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	fn install(&self, token: Token) -> Result<Token> {
		let Some(secret) = token.access_token.as_ref().filter(|secret| !secret.is_blank()) else {
			return Err(Error::Authentication { message: token.error_message() });
		};
		let headers = BTreeMap::from([
			("authorization".to_owned(), secret.bearer_header()),
			("accept".to_owned(), "application/json".to_owned()),
			(LEGAL_ENTITY_HEADER.to_owned(), self.legal_entity.clone()),
		]);

		*self.state.write() = Some(SessionState { token: token.clone(), headers });

		Ok(token)
	}
}
