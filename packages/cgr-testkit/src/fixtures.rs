use time::OffsetDateTime;

use cgr_domain::{CachedResultSet, Fingerprint, IndexedEntry, Operator};

/// Panics on negative feature ids.
pub fn entry(entry_id: i32, parent_id: i32, features: &[i32]) -> IndexedEntry {
	let fingerprint = Fingerprint::new(features.iter().copied())
		.unwrap_or_else(|err| panic!("Invalid fixture fingerprint {features:?}: {err}"));

	IndexedEntry { entry_id, parent_id, fingerprint }
}

/// `count` entries with one parent each, every fingerprint holding feature 1.
pub fn single_feature_parents(count: i32) -> Vec<IndexedEntry> {
	(1..=count).map(|id| entry(id, id, &[1, id + 1])).collect()
}

pub fn cached_set(
	signature: &[u8],
	operator: Operator,
	rows: &[(i32, i32, f32)],
	created_at: OffsetDateTime,
) -> CachedResultSet {
	CachedResultSet {
		signature: signature.to_vec(),
		operator,
		parent_ids: rows.iter().map(|row| row.0).collect(),
		entry_ids: rows.iter().map(|row| row.1).collect(),
		scores: rows.iter().map(|row| row.2).collect(),
		created_at,
	}
}
