use time::{Duration, OffsetDateTime};

use cgr_domain::{CachedResultSet, Collection, Fingerprint, Operator};
use cgr_storage::{Error, db::Db, fingerprints, search_cache};
use cgr_testkit::{
	TestDatabase,
	fixtures::{cached_set, entry},
};

async fn bootstrap(schema: Option<&str>) -> Option<(TestDatabase, Db)> {
	let Some(base_dsn) = cgr_testkit::env_dsn() else {
		eprintln!("Skipping Postgres test; set CGR_PG_DSN to run this test.");

		return None;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = Db::connect(&test_db.postgres_config(schema))
		.await
		.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	Some((test_db, db))
}

fn cached(signature: &[u8], created_at: OffsetDateTime) -> CachedResultSet {
	cached_set(signature, Operator::Similar, &[(10, 1, 0.9), (20, 3, 0.4)], created_at)
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CGR_PG_DSN to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some((test_db, db)) = bootstrap(Some("cgr")).await else {
		return;
	};

	db.ensure_schema().await.expect("Second bootstrap must succeed.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_schema = 'cgr'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 4);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CGR_PG_DSN to run."]
async fn candidates_follow_operator_semantics() {
	let Some((test_db, db)) = bootstrap(None).await else {
		return;
	};

	for item in [entry(1, 10, &[1, 2, 3]), entry(2, 10, &[1, 2, 3, 4]), entry(3, 20, &[5, 6])] {
		fingerprints::insert_entry(&db, Collection::Molecules, &item)
			.await
			.expect("Failed to insert entry.");
	}

	let query = Fingerprint::query([1, 2]).expect("valid query");
	let mut substructure =
		fingerprints::fetch_candidates(&db, Collection::Molecules, &query, Operator::Substructure)
			.await
			.expect("Failed to fetch candidates.");

	substructure.sort_by_key(|item| item.entry_id);

	assert_eq!(substructure.iter().map(|item| item.entry_id).collect::<Vec<_>>(), vec![1, 2]);

	let query = Fingerprint::query([2, 6]).expect("valid query");
	let similar =
		fingerprints::fetch_candidates(&db, Collection::Molecules, &query, Operator::Similar)
			.await
			.expect("Failed to fetch candidates.");

	assert_eq!(similar.len(), 3);

	let reactions =
		fingerprints::fetch_candidates(&db, Collection::Reactions, &query, Operator::Similar)
			.await
			.expect("Failed to fetch candidates.");

	assert!(reactions.is_empty());

	let duplicate = fingerprints::insert_entry(&db, Collection::Molecules, &entry(1, 11, &[9])).await;

	assert!(matches!(duplicate, Err(Error::Conflict(_))));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CGR_PG_DSN to run."]
async fn cache_rejects_live_duplicates_and_replaces_expired_rows() {
	let Some((test_db, db)) = bootstrap(None).await else {
		return;
	};
	let now = OffsetDateTime::now_utc();
	let live_since = now - Duration::days(1);

	search_cache::insert_cached(&db, Collection::Molecules, &cached(b"sig", now), live_since)
		.await
		.expect("Failed to insert cached result set.");

	let duplicate =
		search_cache::insert_cached(&db, Collection::Molecules, &cached(b"sig", now), live_since)
			.await;

	assert!(matches!(duplicate, Err(Error::Conflict(_))));

	search_cache::insert_cached(&db, Collection::Reactions, &cached(b"sig", now), live_since)
		.await
		.expect("Signatures are scoped per collection.");

	let stale = now - Duration::days(3);

	search_cache::insert_cached(&db, Collection::Molecules, &cached(b"old", stale), live_since)
		.await
		.expect("Failed to insert stale row.");
	search_cache::insert_cached(&db, Collection::Molecules, &cached(b"old", now), live_since)
		.await
		.expect("Expired rows must be replaceable.");

	let fetched = search_cache::fetch_cached(&db, Collection::Molecules, b"old", live_since)
		.await
		.expect("Failed to fetch cached result set.")
		.expect("Replaced row must be visible.");

	assert_eq!(fetched.parent_ids, vec![10, 20]);
	assert_eq!(fetched.operator, Operator::Similar);
	assert!((fetched.created_at - now).abs() < Duration::seconds(1));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CGR_PG_DSN to run."]
async fn delete_before_cutoff_keeps_boundary_rows() {
	let Some((test_db, db)) = bootstrap(None).await else {
		return;
	};
	// Postgres keeps microseconds; whole seconds keep the boundary row exactly at the cutoff.
	let now = OffsetDateTime::now_utc().replace_nanosecond(0).expect("valid timestamp");
	let cutoff = now - Duration::days(1);
	let ancient = now - Duration::days(30);

	for (signature, created_at) in
		[(b"a".as_slice(), ancient), (b"b".as_slice(), cutoff), (b"c".as_slice(), now)]
	{
		search_cache::insert_cached(
			&db,
			Collection::Reactions,
			&cached(signature, created_at),
			ancient,
		)
		.await
		.expect("Failed to insert cached result set.");
	}

	let deleted = search_cache::delete_cached_before(&db, Collection::Reactions, cutoff)
		.await
		.expect("Failed to delete expired rows.");

	assert_eq!(deleted, 1);

	for signature in [b"b".as_slice(), b"c".as_slice()] {
		let kept = search_cache::fetch_cached(&db, Collection::Reactions, signature, ancient)
			.await
			.expect("Failed to fetch cached result set.");

		assert!(kept.is_some());
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
