//! Pluggable token cache consulted whenever the session has to mint a token.
//!
//! The session calls [`TokenCache::get_or_compute`] with an environment-qualified key, the
//! issuer future, and a 30 minute TTL. [`PassthroughTokenCache`] (the default) always awaits the
//! issuer, so caching across sessions only happens when an application wires in a real cache such
//! as [`MemoryTokenCache`] or its own implementation backed by shared storage.

// self
use crate::{_prelude::*, auth::Token};

/// Boxed future resolving to a [`Token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<Token>> + 'a + Send>>;

/// Cache strategy for issued tokens.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Returns a cached token for `key` if one is younger than `ttl`, else awaits `compute`.
	fn get_or_compute<'a>(
		&'a self,
		key: &'a str,
		compute: TokenFuture<'a>,
		ttl: Duration,
	) -> TokenFuture<'a>;
}

/// Default strategy: never caches, always awaits the issuer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughTokenCache;
impl TokenCache for PassthroughTokenCache {
	fn get_or_compute<'a>(
		&'a self,
		_key: &'a str,
		compute: TokenFuture<'a>,
		_ttl: Duration,
	) -> TokenFuture<'a> {
		compute
	}
}

#[derive(Clone, Debug)]
struct CachedToken {
	token: Token,
	stored_at: OffsetDateTime,
}

/// In-process TTL cache shared by every client holding a clone of it.
///
/// Computations are serialized per key so concurrent sessions reuse one issuer call. Tokens
/// without an access token are handed back to the caller but never stored.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenCache {
	entries: Arc<RwLock<HashMap<String, CachedToken>>>,
	guards: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}
impl MemoryTokenCache {
	/// Drops the cached token for `key`, if any.
	pub fn invalidate(&self, key: &str) -> Option<Token> {
		self.entries.write().remove(key).map(|entry| entry.token)
	}

	/// Number of cached tokens.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns `true` if nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	fn lookup(&self, key: &str, ttl: Duration, now: OffsetDateTime) -> Option<Token> {
		self.entries
			.read()
			.get(key)
			.filter(|entry| now - entry.stored_at < ttl)
			.map(|entry| entry.token.clone())
	}

	fn guard(&self, key: &str) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(key.to_owned()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl TokenCache for MemoryTokenCache {
	fn get_or_compute<'a>(
		&'a self,
		key: &'a str,
		compute: TokenFuture<'a>,
		ttl: Duration,
	) -> TokenFuture<'a> {
		Box::pin(async move {
			if let Some(token) = self.lookup(key, ttl, OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			let guard = self.guard(key);
			let _singleflight = guard.lock().await;

			if let Some(token) = self.lookup(key, ttl, OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			let token = compute.await?;

			if token.access_token().is_some() {
				let entry = CachedToken { token: token.clone(), stored_at: OffsetDateTime::now_utc() };

				self.entries.write().insert(key.to_owned(), entry);
			}

			Ok(token)
		})
	}
}
