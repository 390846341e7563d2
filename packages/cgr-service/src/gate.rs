use time::OffsetDateTime;
use tokio::time as tokio_time;

use cgr_domain::{CachedResultSet, Collection, GateDecision, Operator, SearchResult};

use crate::{Error, QueryContext, Result, SearchService, Stage};

#[derive(Clone, Debug, PartialEq)]
pub enum GateOutcome {
	Inline(SearchResult),
	/// The result was persisted under its signature; nothing is returned inline.
	Deferred,
}

impl SearchService {
	/// Returns `result` inline when it is below `search.deferred_threshold`, otherwise persists it
	/// with `created_at = now`.
	///
	/// A failed write fails the whole call. The result is never returned inline as a fallback.
	pub async fn gate(
		&self,
		collection: Collection,
		result: SearchResult,
		signature: Vec<u8>,
		operator: Operator,
		now: OffsetDateTime,
	) -> Result<GateOutcome> {
		let threshold = self.cfg.search.deferred_threshold;

		if GateDecision::for_len(result.len(), threshold) == GateDecision::Inline {
			return Ok(GateOutcome::Inline(result));
		}

		let context = QueryContext::new(collection, &signature).with_operator(operator.as_str());
		let count = result.len();
		let entry = CachedResultSet::from_result(signature, operator, result, now);
		let live_since = now - self.retention();
		let timeout = self.cache_timeout();

		tokio_time::timeout(timeout, self.backends.cache.put(collection, &entry, live_since))
			.await
			.map_err(|_| Error::Timeout {
				stage: Stage::CachePut,
				timeout_ms: timeout.as_millis() as u64,
				context: Some(context.clone()),
			})?
			.map_err(|err| match err {
				cgr_storage::Error::Conflict(_) => {
					tracing::warn!(%context, "Rejected duplicate cached result set.");

					Error::CacheWriteConflict { context: context.clone() }
				},
				other =>
					Error::CacheWriteFailure { context: context.clone(), message: other.to_string() },
			})?;

		tracing::info!(
			%collection,
			%operator,
			count,
			threshold,
			signature = %context.signature,
			"Deferred oversized result set to cache."
		);

		Ok(GateOutcome::Deferred)
	}
}
