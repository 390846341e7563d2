use time::OffsetDateTime;

use cgr_domain::{CachedResultSet, Fingerprint, IndexedEntry, Operator};

use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
pub struct FingerprintRow {
	pub entry_id: i32,
	pub parent_id: i32,
	pub bit_array: Vec<i32>,
}
impl TryFrom<FingerprintRow> for IndexedEntry {
	type Error = Error;

	fn try_from(row: FingerprintRow) -> Result<Self> {
		let fingerprint = Fingerprint::new(row.bit_array).map_err(|err| {
			Error::Corrupt(format!("Entry {} has an invalid fingerprint: {err}", row.entry_id))
		})?;

		Ok(Self { entry_id: row.entry_id, parent_id: row.parent_id, fingerprint })
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct SearchCacheRow {
	pub signature: Vec<u8>,
	pub operator: String,
	pub parent_ids: Vec<i32>,
	pub entry_ids: Vec<i32>,
	pub tanimotos: Vec<f32>,
	pub created_at: OffsetDateTime,
}
impl TryFrom<SearchCacheRow> for CachedResultSet {
	type Error = Error;

	fn try_from(row: SearchCacheRow) -> Result<Self> {
		let operator = row
			.operator
			.parse::<Operator>()
			.map_err(|err| {
				Error::Corrupt(format!("Cached result set has an invalid operator: {err}"))
			})?;
		let entry = Self {
			signature: row.signature,
			operator,
			parent_ids: row.parent_ids,
			entry_ids: row.entry_ids,
			scores: row.tanimotos,
			created_at: row.created_at,
		};

		if !entry.is_consistent() {
			return Err(Error::Corrupt(
				"Cached result set columns have different lengths.".to_string(),
			));
		}

		Ok(entry)
	}
}
