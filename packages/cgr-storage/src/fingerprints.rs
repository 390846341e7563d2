//! Candidate retrieval over the fingerprint collections.
//!
//! `similar` selects rows whose bit array overlaps the query (`&&`), `substructure` selects rows
//! whose bit array contains it (`@>`). Both operators are served by the GIN index on `bit_array`.
//! Scoring and the `similar` score floor are left to the caller.

use cgr_domain::{Collection, Fingerprint, IndexedEntry, Operator};

use crate::{Error, Result, db::Db, models::FingerprintRow};

pub async fn fetch_candidates(
	db: &Db,
	collection: Collection,
	query: &Fingerprint,
	operator: Operator,
) -> Result<Vec<IndexedEntry>> {
	let rows: Vec<FingerprintRow> = sqlx::query_as(candidates_sql(collection, operator))
		.bind(query.as_slice())
		.fetch_all(&db.pool)
		.await?;

	rows.into_iter().map(IndexedEntry::try_from).collect()
}

/// Stores a new entry. Entries are immutable, so an existing `entry_id` is a conflict.
pub async fn insert_entry(db: &Db, collection: Collection, entry: &IndexedEntry) -> Result<()> {
	sqlx::query(insert_sql(collection))
		.bind(entry.entry_id)
		.bind(entry.parent_id)
		.bind(entry.fingerprint.as_slice())
		.execute(&db.pool)
		.await
		.map_err(|err| {
			Error::from_write(err, || {
				format!("{collection} entry {} already exists.", entry.entry_id)
			})
		})?;

	Ok(())
}

fn candidates_sql(collection: Collection, operator: Operator) -> &'static str {
	match (collection, operator) {
		(Collection::Molecules, Operator::Similar) =>
			"\
SELECT structure_id AS entry_id, molecule_id AS parent_id, bit_array
FROM molecule_structures
WHERE bit_array && $1",
		(Collection::Molecules, Operator::Substructure) =>
			"\
SELECT structure_id AS entry_id, molecule_id AS parent_id, bit_array
FROM molecule_structures
WHERE bit_array @> $1",
		(Collection::Reactions, Operator::Similar) =>
			"\
SELECT reaction_index_id AS entry_id, reaction_id AS parent_id, bit_array
FROM reaction_indexes
WHERE bit_array && $1",
		(Collection::Reactions, Operator::Substructure) =>
			"\
SELECT reaction_index_id AS entry_id, reaction_id AS parent_id, bit_array
FROM reaction_indexes
WHERE bit_array @> $1",
	}
}

fn insert_sql(collection: Collection) -> &'static str {
	match collection {
		Collection::Molecules =>
			"INSERT INTO molecule_structures (structure_id, molecule_id, bit_array) VALUES ($1, $2, $3)",
		Collection::Reactions =>
			"INSERT INTO reaction_indexes (reaction_index_id, reaction_id, bit_array) VALUES ($1, $2, $3)",
	}
}
