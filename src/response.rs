//! Response classification.
//!
//! The API answers validation failures with non-2xx statuses and a parseable JSON object, and it
//! sometimes answers successes with objects that carry `errors`. The client does not second-guess
//! either: any object-shaped body comes back untouched as an [`ApiResult`], tagged by the HTTP
//! status, and only non-object bodies with a failing status become [`Error::Http`].

// self
use crate::{_prelude::*, error, http::ApiResponse, obs};

/// JSON document type exchanged with the API.
pub type JsonObject = serde_json::Map<String, Value>;

/// Parsed API response.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResult {
	/// 2xx response; non-object payloads are wrapped as `{"data": <value>}`.
	Ok(JsonObject),
	/// Object-shaped body returned with a non-2xx status.
	ErrorEnvelope {
		/// HTTP status code.
		status: u16,
		/// Body exactly as returned by the API.
		body: JsonObject,
	},
}
impl ApiResult {
	/// Classifies a raw transport response.
	pub fn classify(response: &ApiResponse) -> Result<Self> {
		let status = response.status;
		let raw = response.body.as_str();

		if raw.starts_with('{') && raw.ends_with('}') {
			let body = error::decode::<JsonObject>(status, raw)?;

			return Ok(if response.is_success() {
				ApiResult::Ok(body)
			} else {
				ApiResult::ErrorEnvelope { status, body }
			});
		}

		let value =
			if raw.trim().is_empty() { Value::Null } else { error::decode::<Value>(status, raw)? };

		if !response.is_success() {
			obs::log_http_failure(status, &value);

			return Err(Error::Http { status, body: value });
		}

		Ok(ApiResult::Ok(match value {
			Value::Object(object) => object,
			other => JsonObject::from_iter([("data".to_owned(), other)]),
		}))
	}

	/// Returns `true` for [`ApiResult::ErrorEnvelope`].
	pub fn is_error_envelope(&self) -> bool {
		matches!(self, ApiResult::ErrorEnvelope { .. })
	}

	/// Status of an error envelope; `None` for successes.
	pub fn status(&self) -> Option<u16> {
		match self {
			ApiResult::Ok(_) => None,
			ApiResult::ErrorEnvelope { status, .. } => Some(*status),
		}
	}

	/// Borrows the body.
	pub fn as_object(&self) -> &JsonObject {
		match self {
			ApiResult::Ok(body) | ApiResult::ErrorEnvelope { body, .. } => body,
		}
	}

	/// Consumes the result and returns the body.
	pub fn into_object(self) -> JsonObject {
		match self {
			ApiResult::Ok(body) | ApiResult::ErrorEnvelope { body, .. } => body,
		}
	}

	/// `id` field of the body as a string; numeric ids are rendered in decimal.
	pub fn id(&self) -> Option<String> {
		match self.as_object().get("id")? {
			Value::String(id) => Some(id.clone()),
			Value::Number(id) => Some(id.to_string()),
			_ => None,
		}
	}

	/// Returns `true` if the body carries any of the API's error-envelope keys.
	pub fn has_error_shape(&self) -> bool {
		let body = self.as_object();

		["errors", "title", "type", "status"].iter().any(|key| body.contains_key(*key))
	}

	/// Flattens every string found under `errors`, in document order.
	pub fn error_messages(&self) -> Vec<String> {
		fn collect(value: &Value, out: &mut Vec<String>) {
			match value {
				Value::String(message) => out.push(message.clone()),
				Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
				Value::Object(fields) => fields.values().for_each(|field| collect(field, out)),
				_ => {},
			}
		}

		let mut messages = Vec::new();

		if let Some(errors) = self.as_object().get("errors") {
			collect(errors, &mut messages);
		}

		messages
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	const VALIDATION_ERROR: &str = "{\"errors\":{\"message\":[\"No accounts could be found\"]},\"type\":\"https://tools.ietf.org/html/rfc7231#section-6.5.1\",\"title\":\"One or more validation errors occurred.\",\"status\":400}";

	#[test]
	fn object_body_is_returned_regardless_of_status() {
		let result = ApiResult::classify(&ApiResponse::new(400, VALIDATION_ERROR))
			.expect("Object-shaped errors should not raise.");

		assert!(result.is_error_envelope());
		assert_eq!(result.status(), Some(400));
		assert!(result.has_error_shape());
		assert_eq!(result.error_messages(), vec!["No accounts could be found".to_owned()]);
		assert_eq!(
			Value::Object(result.into_object()),
			serde_json::from_str::<Value>(VALIDATION_ERROR).expect("Fixture should parse.")
		);
	}

	#[test]
	fn object_body_with_success_status_is_ok() {
		let result = ApiResult::classify(&ApiResponse::new(201, "{\"id\":\"123\"}"))
			.expect("Object body should classify.");

		assert_eq!(result, ApiResult::Ok(JsonObject::from_iter([("id".into(), json!("123"))])));
		assert_eq!(result.id().as_deref(), Some("123"));
		assert!(!result.has_error_shape());
	}

	#[test]
	fn non_object_success_is_wrapped() {
		let result =
			ApiResult::classify(&ApiResponse::new(200, "[1,2]")).expect("Array body should wrap.");

		assert_eq!(Value::Object(result.into_object()), json!({ "data": [1, 2] }));
	}

	#[test]
	fn padded_object_is_parsed_then_returned_directly() {
		let result = ApiResult::classify(&ApiResponse::new(200, " {\"a\":1}\n"))
			.expect("Whitespace-padded object should classify.");

		assert_eq!(Value::Object(result.into_object()), json!({ "a": 1 }));
	}

	#[test]
	fn non_object_failure_raises_http_error() {
		let err = ApiResult::classify(&ApiResponse::new(503, "\"maintenance\""))
			.expect_err("Non-object failure should raise.");

		match err {
			Error::Http { status, body } => {
				assert_eq!(status, 503);
				assert_eq!(body, json!("maintenance"));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn empty_body_becomes_null() {
		let result = ApiResult::classify(&ApiResponse::new(204, "")).expect("Empty 204 should classify.");

		assert_eq!(Value::Object(result.into_object()), json!({ "data": null }));

		let err = ApiResult::classify(&ApiResponse::new(500, "")).expect_err("Empty 500 should raise.");

		assert!(matches!(err, Error::Http { status: 500, body: Value::Null }));
	}

	#[test]
	fn garbage_body_is_a_decode_error() {
		let err = ApiResult::classify(&ApiResponse::new(502, "<html>Bad gateway</html>"))
			.expect_err("HTML should not decode.");

		assert!(matches!(err, Error::Decode { status: Some(502), .. }));
	}
}
