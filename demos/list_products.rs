//! Lists products from a mocked Younium sandbox using static credentials, then creates one.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use younium_client::{
	CallOptions, ClientConfig, Environment, JsonObject,
	auth::{MemoryTokenCache, StaticSecretProvider},
	client::ReqwestApiClient,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(200).json_body(json!({
				"accessToken": "demo-access",
				"expires": "2999-01-01T00:00:00Z",
			}));
		})
		.await;

	for (page, items) in [(1, json!([{ "id": "p-1" }])), (2, json!([{ "id": "p-2" }]))] {
		server
			.mock_async(move |when, then| {
				when.method(GET).path("/Products").query_param("pageNumber", page.to_string());
				then.status(200).json_body(json!({
					"pageNumber": page,
					"pageSize": 100,
					"totalPages": 2,
					"totalCount": 2,
					"data": items,
				}));
			})
			.await;
	}

	server
		.mock_async(|when, then| {
			when.method(POST).path("/Products");
			then.status(201).json_body(json!({ "id": "p-3" }));
		})
		.await;

	let config = ClientConfig::builder(Environment::Sandbox, "Demo AB")
		.base_url(server.base_url())
		.build()?;
	let secrets = StaticSecretProvider::default()
		.with_secret("YouniumSandboxClientId", "demo-client")
		.with_secret("YouniumSandboxSecret", "demo-secret");
	let client = ReqwestApiClient::new(config, Arc::new(secrets))?
		.with_token_cache(Arc::new(MemoryTokenCache::default()));
	let options = CallOptions::new();
	let products = client.products(&options).await?;

	println!("fetched {} of {} products", products.len(), products.total_count);

	let mut product = JsonObject::new();

	product.insert("name".into(), json!("Demo widget"));
	client.create_object("Products", &mut product, &options).await?;

	println!("created product {}", product["id"]);

	token_mock.assert_calls_async(1).await;

	Ok(())
}
