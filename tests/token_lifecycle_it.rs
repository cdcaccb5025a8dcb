// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
// self
use younium_client::{
	CallOptions, ClientConfig, Environment, Error,
	auth::{MemoryTokenCache, SecretError, StaticSecretProvider},
	client::ReqwestApiClient,
};

fn expiring_in(delta: Duration) -> String {
	(OffsetDateTime::now_utc() + delta).format(&Rfc3339).expect("Expiry fixture should format.")
}

fn secrets() -> StaticSecretProvider {
	StaticSecretProvider::default()
		.with_secret("YouniumSandboxClientId", "client-1")
		.with_secret("YouniumSandboxSecret", "secret-1")
}

fn build_client(server: &MockServer, secrets: StaticSecretProvider) -> ReqwestApiClient {
	let config = ClientConfig::builder(Environment::Sandbox, "Acme")
		.base_url(server.base_url())
		.build()
		.expect("Config should build against the mock server.");

	ReqwestApiClient::new(config, Arc::new(secrets)).expect("Client should build.")
}

async fn mock_products(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/Products");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "pageNumber": 1, "totalPages": 1, "data": [] }));
		})
		.await
}

#[tokio::test]
async fn fresh_token_is_requested_once() {
	let server = MockServer::start_async().await;
	let auth = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/token")
				.header("content-type", "application/json")
				.json_body(json!({ "clientId": "client-1", "secret": "secret-1" }));
			then.status(200).json_body(json!({
				"accessToken": "jwt-1",
				"refreshToken": "refresh-1",
				"expires": expiring_in(Duration::hours(2)),
			}));
		})
		.await;
	let products = mock_products(&server).await;
	let client = build_client(&server, secrets());

	for _ in 0..2 {
		client.products(&CallOptions::new()).await.expect("Products should load.");
	}

	auth.assert_calls_async(1).await;
	products.assert_calls_async(2).await;

	let token = client.cached_token().expect("Token should be cached after a call.");

	assert_eq!(token.access_token(), Some("jwt-1"));
}

#[tokio::test]
async fn token_inside_refresh_margin_is_renewed_per_call() {
	let server = MockServer::start_async().await;
	let auth = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(200).json_body(json!({
				"accessToken": "short-lived",
				"expires": expiring_in(Duration::minutes(10)),
			}));
		})
		.await;
	let products = mock_products(&server).await;
	let client = build_client(&server, secrets());

	for _ in 0..3 {
		client.products(&CallOptions::new()).await.expect("Products should load.");
	}

	auth.assert_calls_async(3).await;
	products.assert_calls_async(3).await;
}

#[tokio::test]
async fn rejected_credentials_surface_vendor_errors() {
	let server = MockServer::start_async().await;
	let auth = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(401).json_body(json!({ "accessToken": null, "errors": ["bad secret"] }));
		})
		.await;
	let products = mock_products(&server).await;
	let client = build_client(&server, secrets());
	let err = client.products(&CallOptions::new()).await.expect_err("Bad secret should fail.");

	match err {
		Error::Authentication { message } => assert_eq!(message, "bad secret"),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	auth.assert_calls_async(1).await;
	products.assert_calls_async(0).await;
	assert!(client.cached_token().is_none());
}

#[tokio::test]
async fn missing_secret_fails_before_any_request() {
	let server = MockServer::start_async().await;
	let auth = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(200).json_body(json!({ "accessToken": "unused" }));
		})
		.await;
	let client = build_client(
		&server,
		StaticSecretProvider::default().with_secret("YouniumSandboxClientId", "client-1"),
	);
	let err = client.ensure_token(&CallOptions::new()).await.expect_err("Missing secret should fail.");

	match err {
		Error::Secret(SecretError::NotFound { name }) => assert_eq!(name, "YouniumSandboxSecret"),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	auth.assert_calls_async(0).await;
}

#[tokio::test]
async fn shared_memory_cache_spans_clients() {
	let server = MockServer::start_async().await;
	let auth = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(200).json_body(json!({
				"accessToken": "shared",
				"expires": expiring_in(Duration::hours(1)),
			}));
		})
		.await;
	let cache = Arc::new(MemoryTokenCache::default());
	let first = build_client(&server, secrets()).with_token_cache(cache.clone());
	let second = build_client(&server, secrets()).with_token_cache(cache.clone());
	let a = first.ensure_token(&CallOptions::new()).await.expect("First client should authenticate.");
	let b = second.ensure_token(&CallOptions::new()).await.expect("Second client should reuse the cache.");

	assert_eq!(a, b);
	assert_eq!(cache.len(), 1);

	auth.assert_calls_async(1).await;
}
