use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Fingerprint, Operator};

/// Stored structural variant. Many entries may share one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedEntry {
	pub entry_id: i32,
	pub parent_id: i32,
	pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
	pub entry_id: i32,
	pub parent_id: i32,
	pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
	pub parent_id: i32,
	pub entry_id: i32,
	pub score: f32,
}

/// Deduplicated hits, one per parent, best score first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
	pub hits: Vec<SearchHit>,
}
impl SearchResult {
	pub fn len(&self) -> usize {
		self.hits.len()
	}

	pub fn is_empty(&self) -> bool {
		self.hits.is_empty()
	}

	/// Splits the hits into parallel `(parent_ids, entry_ids, scores)` columns.
	pub fn into_columns(self) -> (Vec<i32>, Vec<i32>, Vec<f32>) {
		let mut parent_ids = Vec::with_capacity(self.hits.len());
		let mut entry_ids = Vec::with_capacity(self.hits.len());
		let mut scores = Vec::with_capacity(self.hits.len());

		for hit in self.hits {
			parent_ids.push(hit.parent_id);
			entry_ids.push(hit.entry_id);
			scores.push(hit.score);
		}

		(parent_ids, entry_ids, scores)
	}
}

/// A deferred result set persisted under a caller-supplied signature.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResultSet {
	pub signature: Vec<u8>,
	pub operator: Operator,
	pub parent_ids: Vec<i32>,
	pub entry_ids: Vec<i32>,
	pub scores: Vec<f32>,
	pub created_at: OffsetDateTime,
}
impl CachedResultSet {
	pub fn from_result(
		signature: Vec<u8>,
		operator: Operator,
		result: SearchResult,
		created_at: OffsetDateTime,
	) -> Self {
		let (parent_ids, entry_ids, scores) = result.into_columns();

		Self { signature, operator, parent_ids, entry_ids, scores, created_at }
	}

	pub fn len(&self) -> usize {
		self.parent_ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.parent_ids.is_empty()
	}

	/// The parallel columns must have equal length.
	pub fn is_consistent(&self) -> bool {
		self.parent_ids.len() == self.entry_ids.len() && self.entry_ids.len() == self.scores.len()
	}
}
