//! Deferred result sets, one table per collection, keyed by signature.

use time::OffsetDateTime;

use cgr_domain::{CachedResultSet, Collection};

use crate::{Error, Result, db::Db, models::SearchCacheRow};

/// Persists `entry` unless a row with the same signature was created at or after `live_since`.
///
/// An older row under the same signature has outlived retention and is replaced in the same
/// transaction. Concurrent writers of one signature serialize on the primary key; the loser gets
/// [`Error::Conflict`].
pub async fn insert_cached(
	db: &Db,
	collection: Collection,
	entry: &CachedResultSet,
	live_since: OffsetDateTime,
) -> Result<()> {
	if !entry.is_consistent() {
		return Err(Error::InvalidArgument(
			"Cached result set columns must have equal lengths.".to_string(),
		));
	}

	let mut tx = db.pool.begin().await?;
	let replaced = sqlx::query(delete_stale_sql(collection))
		.bind(entry.signature.as_slice())
		.bind(live_since)
		.execute(&mut *tx)
		.await?;
	let inserted = sqlx::query(insert_sql(collection))
		.bind(entry.signature.as_slice())
		.bind(entry.operator.as_str())
		.bind(entry.parent_ids.as_slice())
		.bind(entry.entry_ids.as_slice())
		.bind(entry.scores.as_slice())
		.bind(entry.created_at)
		.execute(&mut *tx)
		.await?;

	if inserted.rows_affected() == 0 {
		return Err(Error::Conflict(format!(
			"A live {collection} result set already exists for this signature."
		)));
	}

	tx.commit().await?;

	if replaced.rows_affected() > 0 {
		tracing::debug!(%collection, "Replaced an expired cached result set.");
	}

	Ok(())
}

pub async fn fetch_cached(
	db: &Db,
	collection: Collection,
	signature: &[u8],
	live_since: OffsetDateTime,
) -> Result<Option<CachedResultSet>> {
	let row: Option<SearchCacheRow> = sqlx::query_as(select_sql(collection))
		.bind(signature)
		.bind(live_since)
		.fetch_optional(&db.pool)
		.await?;

	row.map(CachedResultSet::try_from).transpose()
}

/// Removes every row created strictly before `cutoff` in one statement.
pub async fn delete_cached_before(
	db: &Db,
	collection: Collection,
	cutoff: OffsetDateTime,
) -> Result<u64> {
	let result = sqlx::query(delete_before_sql(collection)).bind(cutoff).execute(&db.pool).await?;

	Ok(result.rows_affected())
}

fn delete_stale_sql(collection: Collection) -> &'static str {
	match collection {
		Collection::Molecules =>
			"DELETE FROM molecule_search_cache WHERE signature = $1 AND created_at < $2",
		Collection::Reactions =>
			"DELETE FROM reaction_search_cache WHERE signature = $1 AND created_at < $2",
	}
}

fn insert_sql(collection: Collection) -> &'static str {
	match collection {
		Collection::Molecules =>
			"\
INSERT INTO molecule_search_cache (
	signature,
	operator,
	molecule_ids,
	structure_ids,
	tanimotos,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6)
ON CONFLICT (signature) DO NOTHING",
		Collection::Reactions =>
			"\
INSERT INTO reaction_search_cache (
	signature,
	operator,
	reaction_ids,
	reaction_index_ids,
	tanimotos,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6)
ON CONFLICT (signature) DO NOTHING",
	}
}

fn select_sql(collection: Collection) -> &'static str {
	match collection {
		Collection::Molecules =>
			"\
SELECT
	signature,
	operator,
	molecule_ids AS parent_ids,
	structure_ids AS entry_ids,
	tanimotos,
	created_at
FROM molecule_search_cache
WHERE signature = $1 AND created_at >= $2",
		Collection::Reactions =>
			"\
SELECT
	signature,
	operator,
	reaction_ids AS parent_ids,
	reaction_index_ids AS entry_ids,
	tanimotos,
	created_at
FROM reaction_search_cache
WHERE signature = $1 AND created_at >= $2",
	}
}

fn delete_before_sql(collection: Collection) -> &'static str {
	match collection {
		Collection::Molecules => "DELETE FROM molecule_search_cache WHERE created_at < $1",
		Collection::Reactions => "DELETE FROM reaction_search_cache WHERE created_at < $1",
	}
}
