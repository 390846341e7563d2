use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::time as tokio_time;

use cgr_domain::{CachedResultSet, Collection, Fingerprint, Operator};

use crate::{Error, QueryContext, Result, SearchService, Stage};

const SIGNATURE_SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedResultResponse {
	pub signature: Vec<u8>,
	pub operator: Operator,
	pub parent_ids: Vec<i32>,
	pub entry_ids: Vec<i32>,
	pub scores: Vec<f32>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl From<CachedResultSet> for CachedResultResponse {
	fn from(entry: CachedResultSet) -> Self {
		Self {
			signature: entry.signature,
			operator: entry.operator,
			parent_ids: entry.parent_ids,
			entry_ids: entry.entry_ids,
			scores: entry.scores,
			created_at: entry.created_at,
		}
	}
}

impl SearchService {
	pub async fn fetch_cached_molecules(&self, signature: &[u8]) -> Result<Option<CachedResultSet>> {
		self.fetch_cached(Collection::Molecules, signature).await
	}

	pub async fn fetch_cached_reactions(&self, signature: &[u8]) -> Result<Option<CachedResultSet>> {
		self.fetch_cached(Collection::Reactions, signature).await
	}

	/// Reads a deferred result set. Rows past the retention window read as `None` even before the
	/// evictor removes them.
	pub async fn fetch_cached(
		&self,
		collection: Collection,
		signature: &[u8],
	) -> Result<Option<CachedResultSet>> {
		let context = QueryContext::new(collection, signature);
		let live_since = OffsetDateTime::now_utc() - self.retention();
		let timeout = self.cache_timeout();

		tokio_time::timeout(timeout, self.backends.cache.get(collection, signature, live_since))
			.await
			.map_err(|_| Error::Timeout {
				stage: Stage::CacheGet,
				timeout_ms: timeout.as_millis() as u64,
				context: Some(context.clone()),
			})?
			.map_err(|err| Error::CacheReadFailure { context, message: err.to_string() })
	}
}

/// Deterministic cache key for a query: blake3 over a canonical JSON payload of the collection,
/// operator, sorted feature ids and `salt`.
pub fn build_signature(
	collection: Collection,
	fingerprint: &Fingerprint,
	operator: Operator,
	salt: &str,
) -> Vec<u8> {
	let payload = serde_json::json!({
		"kind": "search_result",
		"schema_version": SIGNATURE_SCHEMA_VERSION,
		"collection": collection.as_str(),
		"operator": operator.as_str(),
		"features": fingerprint.as_slice(),
		"salt": salt,
	});

	blake3::hash(payload.to_string().as_bytes()).as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fp(features: &[i32]) -> Fingerprint {
		Fingerprint::new(features.iter().copied()).expect("valid fingerprint")
	}

	#[test]
	fn signature_ignores_feature_order() {
		let a = build_signature(Collection::Molecules, &fp(&[3, 1, 2]), Operator::Similar, "");
		let b = build_signature(Collection::Molecules, &fp(&[1, 2, 3]), Operator::Similar, "");

		assert_eq!(a, b);
		assert_eq!(a.len(), 32);
	}

	#[test]
	fn signature_separates_query_dimensions() {
		let base = build_signature(Collection::Molecules, &fp(&[1, 2]), Operator::Similar, "s");

		for other in [
			build_signature(Collection::Reactions, &fp(&[1, 2]), Operator::Similar, "s"),
			build_signature(Collection::Molecules, &fp(&[1, 2]), Operator::Substructure, "s"),
			build_signature(Collection::Molecules, &fp(&[1, 3]), Operator::Similar, "s"),
			build_signature(Collection::Molecules, &fp(&[1, 2]), Operator::Similar, "t"),
		] {
			assert_ne!(base, other);
		}
	}
}
