use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use cgr_api::{routes, state::AppState};
use cgr_config::{Cache, Config, Postgres, Search, Service, Storage};
use cgr_domain::Collection;
use cgr_service::{Backends, MemoryBackend, SearchService};
use cgr_storage::fingerprints;
use cgr_testkit::{TestDatabase, fixtures::entry};

fn test_config(dsn: String, deferred_threshold: u32) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn, pool_max_conns: 1, schema: None } },
		search: Search {
			deferred_threshold,
			similarity_threshold: 0.0,
			store_timeout_ms: 5_000,
			cache_timeout_ms: 5_000,
		},
		cache: Cache { retention_seconds: 86_400, sweep_interval_seconds: 86_400 },
	}
}

fn memory_app(deferred_threshold: u32) -> Router {
	let backend = Arc::new(MemoryBackend::new());

	backend.insert_entry(Collection::Molecules, entry(1, 10, &[1, 2, 3])).expect("insert");
	backend.insert_entry(Collection::Molecules, entry(2, 10, &[1, 2, 3, 4])).expect("insert");
	backend.insert_entry(Collection::Molecules, entry(3, 20, &[2, 5])).expect("insert");
	backend.insert_entry(Collection::Reactions, entry(1, 30, &[7, 8])).expect("insert");

	let service = SearchService::with_backends(
		test_config("postgres://unused@localhost/cgr".to_string(), deferred_threshold),
		Backends::memory(backend),
	);

	routes::router(AppState::from_service(service))
}

async fn post_json(app: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(uri)
				.header("content-type", "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.unwrap_or_else(|err| panic!("Failed to call {uri}: {err}"));
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

	(status, json)
}

#[tokio::test]
async fn health_ok() {
	let response = memory_app(1_000)
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn molecule_search_returns_inline_columns() {
	let payload = serde_json::json!({
		"fingerprint": [1, 2],
		"operator": "substructure",
		"signature": [1, 2, 3]
	});
	let (status, json) = post_json(memory_app(1_000), "/v1/molecules/search", payload).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["status"], "inline");
	assert_eq!(json["parent_ids"], serde_json::json!([10]));
	assert_eq!(json["entry_ids"], serde_json::json!([1]));
}

#[tokio::test]
async fn deferred_search_is_readable_by_signature() {
	let app = memory_app(2);
	let payload = serde_json::json!({
		"fingerprint": [2],
		"operator": "similar",
		"signature": [9, 9]
	});
	let (status, json) = post_json(app.clone(), "/v1/molecules/search", payload.clone()).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["status"], "deferred");
	assert_eq!(json["parent_ids"], serde_json::json!([]));
	assert_eq!(json["scores"], serde_json::json!([]));

	let (status, json) =
		post_json(app.clone(), "/v1/molecules/cached", serde_json::json!({ "signature": [9, 9] }))
			.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["operator"], "similar");
	assert_eq!(json["parent_ids"].as_array().map(Vec::len), Some(2));
	assert!(json["created_at"].is_string());

	let (status, json) = post_json(app.clone(), "/v1/molecules/search", payload).await;

	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(json["error_code"], "CACHE_WRITE_CONFLICT");

	let (status, json) =
		post_json(app, "/v1/reactions/cached", serde_json::json!({ "signature": [9, 9] })).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(json["error_code"], "CACHE_MISS");
}

#[tokio::test]
async fn bad_queries_are_client_errors() {
	let (status, json) = post_json(
		memory_app(1_000),
		"/v1/reactions/search",
		serde_json::json!({ "fingerprint": [7], "operator": "overlap", "signature": [] }),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "UNKNOWN_OPERATOR");
	assert!(json["message"].as_str().is_some_and(|message| message.contains("overlap")));

	let (status, json) = post_json(
		memory_app(1_000),
		"/v1/reactions/search",
		serde_json::json!({ "fingerprint": [], "operator": "similar", "signature": [] }),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_FINGERPRINT");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CGR_PG_DSN to run."]
async fn postgres_search_defers_and_reads_back() {
	let Some(base_dsn) = cgr_testkit::env_dsn() else {
		eprintln!("Skipping HTTP tests; set CGR_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let state = AppState::new(test_config(test_db.dsn().to_string(), 3))
		.await
		.expect("Failed to initialize app state.");
	let db = cgr_storage::db::Db::connect(&state.service.cfg.storage.postgres)
		.await
		.expect("Failed to connect to Postgres.");

	for id in 1..=3 {
		fingerprints::insert_entry(&db, Collection::Reactions, &entry(id, id * 10, &[1, id + 1]))
			.await
			.expect("Failed to index entry.");
	}

	let app = routes::router(state);
	let (status, json) = post_json(
		app.clone(),
		"/v1/reactions/search",
		serde_json::json!({ "fingerprint": [1], "operator": "similar", "signature": [42] }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["status"], "deferred");

	let (status, json) =
		post_json(app, "/v1/reactions/cached", serde_json::json!({ "signature": [42] })).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["parent_ids"].as_array().map(Vec::len), Some(3));

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
