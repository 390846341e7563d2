use std::{sync::Arc, time::Duration as StdDuration};

use time::{Duration, OffsetDateTime};
use tokio::time as tokio_time;

use cgr_config::Config;
use cgr_domain::Collection;

use crate::{Error, Result, ResultCache, Stage};

/// Removes cached result sets that have outlived the retention window.
#[derive(Clone)]
pub struct CacheEvictor {
	cache: Arc<dyn ResultCache>,
	retention: Duration,
	timeout: StdDuration,
}
impl CacheEvictor {
	pub fn new(cache: Arc<dyn ResultCache>, retention: Duration, timeout: StdDuration) -> Self {
		Self { cache, retention, timeout }
	}

	pub fn from_config(cfg: &Config, cache: Arc<dyn ResultCache>) -> Self {
		Self::new(
			cache,
			Duration::seconds(cfg.cache.retention_seconds),
			StdDuration::from_millis(cfg.search.cache_timeout_ms),
		)
	}

	pub fn retention(&self) -> Duration {
		self.retention
	}

	/// Rows created strictly before this instant are expired.
	pub fn cutoff(&self, now: OffsetDateTime) -> OffsetDateTime {
		now - self.retention
	}

	/// Deletes every expired row in every collection and returns the number removed.
	///
	/// Each collection is swept with one conditional delete. A failure in one collection does not
	/// stop the others; the first failure is returned after all have been attempted.
	pub async fn sweep(&self, now: OffsetDateTime) -> Result<u64> {
		let cutoff = self.cutoff(now);
		let mut total = 0;
		let mut first_err = None;

		for collection in Collection::ALL {
			match self.sweep_collection(collection, cutoff).await {
				Ok(count) => {
					tracing::info!(%collection, count, "Purged expired cached result sets.");

					total += count;
				},
				Err(err) => {
					tracing::warn!(%collection, error = %err, "Cache sweep failed.");

					first_err.get_or_insert(err);
				},
			}
		}

		match first_err {
			Some(err) => Err(err),
			None => Ok(total),
		}
	}

	async fn sweep_collection(&self, collection: Collection, cutoff: OffsetDateTime) -> Result<u64> {
		tokio_time::timeout(self.timeout, self.cache.delete_older_than(collection, cutoff))
			.await
			.map_err(|_| Error::Timeout {
				stage: Stage::Sweep(collection),
				timeout_ms: self.timeout.as_millis() as u64,
				context: None,
			})?
			.map_err(|err| Error::SweepFailure { collection, message: err.to_string() })
	}
}
