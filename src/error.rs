//! Client-level error types shared across the session, executor, and page aggregator.

// self
use crate::{_prelude::*, auth::SecretError};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Secret provider could not supply a credential.
	#[error(transparent)]
	Secret(#[from] SecretError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint answered without a usable access token.
	#[error("Authentication failed: {message}.")]
	Authentication {
		/// Vendor-supplied error strings joined with `", "`.
		message: String,
	},
	/// Non-success status with a body that is not an object-shaped error envelope.
	#[error("API request failed with HTTP status {status}.")]
	Http {
		/// HTTP status code.
		status: u16,
		/// Parsed response body kept for diagnostics.
		body: Value,
	},
	/// Structured error envelope returned where a page of results was required.
	#[error("API returned an error envelope with HTTP status {status}.")]
	Api {
		/// HTTP status code.
		status: u16,
		/// Error envelope returned by the API.
		body: Value,
	},
	/// Response body could not be decoded into the expected shape.
	#[error("Response body could not be decoded.")]
	Decode {
		/// HTTP status code of the undecodable response, when known.
		status: Option<u16>,
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request payload or response body is not valid JSON.
	#[error("Invalid JSON payload.")]
	InvalidJson(#[from] serde_json::Error),
	/// The call deadline passed before the request could be sent.
	#[error("Call deadline exceeded.")]
	DeadlineExceeded,
	/// Cursor pagination pointed back to a page that was already fetched.
	#[error("Cursor pagination revisited `{url}`.")]
	CursorLoop {
		/// Repeated cursor URL.
		url: Url,
	},
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL or endpoint URL cannot be parsed.
	#[error("URL `{value}` is invalid.")]
	InvalidUrl {
		/// Offending input.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL cannot carry a path (e.g. `mailto:`).
	#[error("Base URL `{0}` cannot be used as an API origin.")]
	UnsupportedBaseUrl(String),
	/// Legal entity is empty or not a valid header value.
	#[error("Legal entity `{0}` is not a valid header value.")]
	InvalidLegalEntity(String),
	/// API version is empty or not a valid header value.
	#[error("API version `{0}` is not a valid header value.")]
	InvalidApiVersion(String),
	/// Environment name is not recognized.
	#[error("Unknown environment `{0}`; expected `production` or `sandbox`.")]
	UnknownEnvironment(String),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded its timeout.
	#[error("Request timed out while calling the API.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

pub(crate) fn decode<T>(status: u16, body: &str) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_str(body);
	let value = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| Error::Decode { status: Some(status), source })?;

	de.end().map_err(Error::InvalidJson)?;

	Ok(value)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_error_converts_with_source() {
		let secret_error = SecretError::NotFound { name: "YouniumProdSecret".into() };
		let error: Error = secret_error.clone().into();

		assert!(matches!(error, Error::Secret(_)));
		assert!(error.to_string().contains("YouniumProdSecret"));
	}

	#[test]
	fn decode_reports_json_path() {
		#[derive(Debug, Deserialize)]
		struct Counter {
			#[allow(dead_code)]
			count: u32,
		}

		let err = decode::<Counter>(200, "{\"count\":\"many\"}")
			.expect_err("String count should not decode into u32.");

		match err {
			Error::Decode { status, source } => {
				assert_eq!(status, Some(200));
				assert_eq!(source.path().to_string(), "count");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn decode_rejects_trailing_characters() {
		let err = decode::<Value>(200, "{} trailing").expect_err("Trailing data should fail.");

		assert!(matches!(err, Error::InvalidJson(_)));
	}
}
