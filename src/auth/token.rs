//! Token payload returned by the `/auth/token` endpoint plus freshness helpers.

pub mod secret;

// crates.io
use time::{
	PrimitiveDateTime,
	format_description::well_known::{Iso8601, Rfc3339},
};
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Access token response; immutable once parsed and replaced wholesale on refresh.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
	/// Bearer token; callers must avoid logging it.
	#[serde(default)]
	pub access_token: Option<TokenSecret>,
	/// Refresh token, when issued.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Expiry timestamp exactly as sent by the API.
	#[serde(default)]
	pub expires: Option<String>,
	/// Vendor-supplied error messages.
	#[serde(default)]
	pub errors: Option<Vec<Option<String>>>,
}
impl Token {
	/// Tokens expiring within this window are refreshed.
	pub const REFRESH_MARGIN: Duration = Duration::minutes(30);

	/// Returns the access token when present and not blank.
	pub fn access_token(&self) -> Option<&str> {
		self.access_token.as_ref().filter(|secret| !secret.is_blank()).map(TokenSecret::expose)
	}

	/// Parses [`Token::expires`] as RFC 3339, falling back to an offset-less ISO 8601 UTC stamp.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		let raw = self.expires.as_deref()?.trim();

		OffsetDateTime::parse(raw, &Rfc3339)
			.ok()
			.or_else(|| PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).ok().map(|dt| dt.assume_utc()))
	}

	/// Returns `true` when the token stays valid for more than [`Token::REFRESH_MARGIN`] after `now`.
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires| now + Self::REFRESH_MARGIN < expires)
	}

	/// [`Token::is_fresh_at`] against the current UTC clock.
	pub fn is_fresh(&self) -> bool {
		self.is_fresh_at(OffsetDateTime::now_utc())
	}

	/// Joins the non-null vendor errors, or `"No token"` when there are none.
	pub fn error_message(&self) -> String {
		let messages = self
			.errors
			.iter()
			.flatten()
			.flatten()
			.map(String::as_str)
			.collect::<Vec<_>>();

		if messages.is_empty() { "No token".into() } else { messages.join(", ") }
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires", &self.expires)
			.field("errors", &self.errors)
			.finish()
	}
}
