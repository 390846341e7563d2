use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::time as tokio_time;

use cgr_domain::{
	Collection, Fingerprint, Operator, ScoredCandidate, SearchResult, reduce, tanimoto,
};

use crate::{Error, GateOutcome, QueryContext, Result, SearchService, Stage};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
	pub fingerprint: Vec<i32>,
	pub operator: String,
	/// Opaque cache key for the deferred path, normally from [`crate::build_signature`].
	pub signature: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
	Inline,
	/// Too many matches to return inline; read them back by signature.
	Deferred,
}

/// Parallel columns, one row per parent, best score first. All three are empty when deferred.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
	pub status: ResultStatus,
	pub parent_ids: Vec<i32>,
	pub entry_ids: Vec<i32>,
	pub scores: Vec<f32>,
}
impl SearchResponse {
	pub fn deferred() -> Self {
		Self {
			status: ResultStatus::Deferred,
			parent_ids: Vec::new(),
			entry_ids: Vec::new(),
			scores: Vec::new(),
		}
	}
}
impl From<GateOutcome> for SearchResponse {
	fn from(outcome: GateOutcome) -> Self {
		match outcome {
			GateOutcome::Inline(result) => {
				let (parent_ids, entry_ids, scores) = result.into_columns();

				Self { status: ResultStatus::Inline, parent_ids, entry_ids, scores }
			},
			GateOutcome::Deferred => Self::deferred(),
		}
	}
}

impl SearchService {
	pub async fn search_molecules(&self, req: SearchRequest) -> Result<SearchResponse> {
		self.search(Collection::Molecules, req).await
	}

	pub async fn search_reactions(&self, req: SearchRequest) -> Result<SearchResponse> {
		self.search(Collection::Reactions, req).await
	}

	pub async fn search(&self, collection: Collection, req: SearchRequest) -> Result<SearchResponse> {
		let SearchRequest { fingerprint, operator, signature } = req;
		let context = QueryContext::new(collection, &signature).with_operator(operator.as_str());
		let operator = operator
			.parse::<Operator>()
			.map_err(|_| Error::UnknownOperator { context: context.clone() })?;
		let query = Fingerprint::query(fingerprint).map_err(|err| Error::InvalidFingerprint {
			context: context.clone(),
			message: err.to_string(),
		})?;
		let candidates = self.candidate_search(collection, &query, operator, &context).await?;
		let candidate_count = candidates.len();
		let result: SearchResult = reduce(candidates);

		tracing::debug!(
			%collection,
			%operator,
			candidate_count,
			result_count = result.len(),
			"Scored and deduplicated candidates."
		);

		let now = OffsetDateTime::now_utc();
		let outcome = self.gate(collection, result, signature, operator, now).await?;

		Ok(outcome.into())
	}

	/// Retrieves candidates for `query` and scores each against it. No deduplication.
	///
	/// `similar` retrieval only guarantees a shared feature, so candidates scoring below
	/// `search.similarity_threshold` are dropped here. `substructure` keeps every match.
	pub async fn candidate_search(
		&self,
		collection: Collection,
		query: &Fingerprint,
		operator: Operator,
		context: &QueryContext,
	) -> Result<Vec<ScoredCandidate>> {
		let timeout = self.store_timeout();
		let entries =
			tokio_time::timeout(timeout, self.backends.store.candidates(collection, query, operator))
				.await
				.map_err(|_| Error::Timeout {
					stage: Stage::FetchCandidates,
					timeout_ms: timeout.as_millis() as u64,
					context: Some(context.clone()),
				})?
				.map_err(|err| Error::StoreUnavailable {
					context: context.clone(),
					message: err.to_string(),
				})?;

		let min_score = match operator {
			Operator::Similar => self.cfg.search.similarity_threshold,
			Operator::Substructure => 0.0,
		};
		let retrieved = entries.len();
		let scored: Vec<ScoredCandidate> = entries
			.into_iter()
			.map(|entry| ScoredCandidate {
				entry_id: entry.entry_id,
				parent_id: entry.parent_id,
				score: tanimoto(&entry.fingerprint, query),
			})
			.filter(|candidate| candidate.score >= min_score)
			.collect();

		if scored.len() < retrieved {
			tracing::debug!(
				%collection,
				min_score,
				dropped = retrieved - scored.len(),
				"Dropped candidates below the similarity threshold."
			);
		}

		Ok(scored)
	}
}
