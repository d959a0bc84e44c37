//! Reads a custom table and runs a named query against a mock PowerSchool server, sharing one
//! client-credentials token between both calls.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use powerschool_api::{
	client::DefaultClient,
	config::ClientConfig,
	store::{MemoryCache, TokenCache},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token").body("grant_type=client_credentials");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"expires_in\":3600}");
		})
		.await;
	let table_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/ws/schema/table/u_customtable")
				.header("authorization", "Bearer demo-access")
				.query_param("projection", "id,column1");
			then.status(200).header("content-type", "application/json").body(
				json!({
					"name": "u_customtable",
					"record": [
						{ "id": 1, "tables": { "u_customtable": { "column1": "alpha" } } },
						{ "id": 2, "tables": { "u_customtable": { "column1": "beta" } } },
					],
				})
				.to_string(),
			);
		})
		.await;
	let query_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/ws/schema/query/com.org.plugin.entity.active_students")
				.json_body(json!({ "grade": "9" }));
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "record": [{ "dcid": "101" }, { "dcid": "102" }] }).to_string());
		})
		.await;
	let config = ClientConfig::builder()
		.server_address(server.base_url())
		.client_id("demo-client")
		.client_secret("super-secret")
		.default_cache_key()
		.build()?;
	let cache: Arc<dyn TokenCache> = Arc::new(MemoryCache::default());
	let client = DefaultClient::new(config, Some(cache));
	let rows = client.table("u_customtable").projection(["id", "column1"]).get().await?;

	for row in &rows {
		println!("u_customtable row: {}.", row["column1"]);
	}

	let students = client
		.named_query("com.org.plugin.entity.active_students")
		.with(json!({ "grade": 9 }))
		.post()
		.await?;

	println!("Active students: {}.", students.count());

	token_mock.assert_async().await;
	table_mock.assert_async().await;
	query_mock.assert_async().await;

	Ok(())
}
