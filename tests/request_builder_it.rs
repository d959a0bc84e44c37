// crates.io
use httpmock::prelude::*;
// self
use powerschool_api::{_preludet::*, auth::AccessToken, store::TokenCache};

const CLIENT_ID: &str = "plugin-client";
const CLIENT_SECRET: &str = "plugin-secret";
const TABLE_PATH: &str = "/ws/schema/table/u_customtable";
const QUERY_PATH: &str = "/ws/schema/query/com.org.plugin.entity.query_name";

async fn authenticated_client(server: &MockServer) -> ReqwestTestClient {
	let (client, cache) = build_reqwest_test_client(&server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let token = AccessToken::new("T", OffsetDateTime::now_utc(), Duration::hours(1));

	cache
		.put(TEST_CACHE_KEY, token, Duration::hours(1))
		.await
		.expect("Seeding the token cache should succeed.");

	client
}

fn page_body(ids: &[u32]) -> String {
	let records = ids
		.iter()
		.map(|id| json!({ "id": id, "tables": { "u_customtable": { "column1": format!("row-{id}") } } }))
		.collect::<Vec<_>>();

	json!({ "name": "u_customtable", "record": records }).to_string()
}

#[tokio::test]
async fn table_get_sends_projection_filters_and_sort() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(TABLE_PATH)
				.header("authorization", "Bearer T")
				.query_param("projection", "id,column1,column2")
				.query_param("pagesize", "5")
				.query_param("q", "column1==value;column2==value")
				.query_param("sort", "string,null")
				.query_param("sortdescending", "true");
			then.status(200).header("content-type", "application/json").body(page_body(&[1, 2]));
		})
		.await;
	let response = client
		.table("u_customtable")
		.projection(["id", "column1", "column2"])
		.page_size(5)
		.q("column1==value;column2==value")
		.sort("string,null", true)
		.get()
		.await
		.expect("Table read should succeed.");
	let columns = response.records().map(|record| record["column1"].clone()).collect::<Vec<_>>();

	assert_eq!(response.table_name(), Some("u_customtable"));
	assert_eq!(columns, vec![json!("row-1"), json!("row-2")]);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn table_get_defaults_projection_to_wildcard() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("{TABLE_PATH}/7")).query_param("projection", "*");
			then.status(200).header("content-type", "application/json").body(
				json!({
					"id": 7,
					"name": "u_customtable",
					"tables": { "u_customtable": { "column1": "seven" } },
				})
				.to_string(),
			);
		})
		.await;
	let response = client.table("u_customtable").id(7).get().await.expect("Record read should succeed.");

	assert_eq!(response.count(), 1);
	assert_eq!(response.get(0), Some(&json!({ "column1": "seven" })));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn named_query_posts_sanitized_body() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(QUERY_PATH)
				.header("content-type", "application/json")
				.query_param("page", "2")
				.query_param("pagesize", "10")
				.query_param("$q", "othernumber=lt=100")
				.query_param("count", "true")
				.json_body(json!({ "string": "value1", "number": "1", "boolean": "0", "null": "" }));
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "count": 1, "record": [{ "string": "value1" }] }).to_string());
		})
		.await;
	let response = client
		.request()
		.page_size(10)
		.page(2)
		.filter("othernumber=lt=100")
		.include_count()
		.named_query_with(
			"com.org.plugin.entity.query_name",
			json!({ "string": "value1", "number": 1, "boolean": false, "null": null }),
		)
		.await
		.expect("Named query should succeed.");

	assert_eq!(response.count(), 1);
	assert_eq!(response.meta_value("count"), Some(&json!(1)));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn resource_reads_unwrap_entity_wrappers() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/ws/v1/district/school").query_param("expansions", "school_boundary");
			then.status(200).header("content-type", "application/json").body(
				json!({
					"schools": {
						"@expansions": "school_boundary, full_time_equivalencies",
						"school": [{ "id": 1 }, { "id": 2 }],
					},
				})
				.to_string(),
			);
		})
		.await;
	let response = client
		.resource("/ws/v1/district/school")
		.expansions(["school_boundary"])
		.record_key("school")
		.get()
		.await
		.expect("Resource read should succeed.");

	assert_eq!(response.count(), 2);
	assert_eq!(response.expansions(), ["school_boundary", "full_time_equivalencies"]);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn count_hits_count_endpoint() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("{TABLE_PATH}/count"));
			then.status(200).header("content-type", "application/json").body("{\"count\":42}");
		})
		.await;
	let response = client.table("u_customtable").count().await.expect("Count should succeed.");

	assert_eq!(response.meta_value("count"), Some(&json!(42)));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn data_subscription_changes_targets_dataversion_endpoint() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/ws/dataversion/my_app/12");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"$dataversion\":\"13\",\"tables\":{\"students\":[1,2]}}");
		})
		.await;
	let response = client
		.request()
		.data_subscription_changes("my_app", 12)
		.await
		.expect("Subscription changes should load.");

	assert_eq!(response.get_path("tables.students.1"), Some(&json!(2)));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn paginator_walks_pages_then_rewinds() {
	let server = MockServer::start_async().await;
	let client = authenticated_client(&server).await;
	let mut pages = Vec::new();

	for (page, ids) in [("1", vec![1, 2]), ("2", vec![3, 4]), ("3", vec![5])] {
		let body = page_body(&ids);

		pages.push(
			server
				.mock_async(|when, then| {
					when.method(GET)
						.path(TABLE_PATH)
						.query_param("pagesize", "2")
						.query_param("page", page);
					then.status(200).header("content-type", "application/json").body(body);
				})
				.await,
		);
	}

	let end = server
		.mock_async(|when, then| {
			when.method(GET).path(TABLE_PATH).query_param("page", "4");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"name\":\"u_customtable\"}");
		})
		.await;
	let mut paginator = client.table("u_customtable").paginate(2);
	let mut seen = Vec::new();

	while let Some(page) = paginator.next_page().await.expect("Page fetch should succeed.") {
		seen.extend(page.records().map(|record| record["column1"].clone()));
	}

	assert_eq!(seen, vec![json!("row-1"), json!("row-2"), json!("row-3"), json!("row-4"), json!("row-5")]);
	assert_eq!(paginator.page_number(), 1);

	let restarted = paginator
		.next_page()
		.await
		.expect("Restarted page fetch should succeed.")
		.expect("Listing should restart at page 1.");

	assert_eq!(restarted.count(), 2);

	pages[0].assert_calls_async(2).await;
	pages[1].assert_calls_async(1).await;
	pages[2].assert_calls_async(1).await;
	end.assert_calls_async(1).await;
}
