pub mod cache;
pub mod evict;
pub mod gate;
pub mod memory;
pub mod search;

mod error;

pub use cache::{CachedResultResponse, build_signature};
pub use cgr_domain::{CachedResultSet, Collection, Fingerprint, IndexedEntry, Operator};
pub use error::{Error, QueryContext, Result, Stage};
pub use evict::CacheEvictor;
pub use gate::GateOutcome;
pub use memory::MemoryBackend;
pub use search::{ResultStatus, SearchRequest, SearchResponse};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration as StdDuration};

use time::{Duration, OffsetDateTime};

use cgr_config::Config;
use cgr_storage::{db::Db, fingerprints, search_cache};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read-only candidate retrieval over an indexed fingerprint collection.
pub trait FingerprintStore
where
	Self: Send + Sync,
{
	/// Entries overlapping `query` (`Similar`) or containing it (`Substructure`), in no
	/// particular order.
	fn candidates<'a>(
		&'a self,
		collection: Collection,
		query: &'a Fingerprint,
		operator: Operator,
	) -> BoxFuture<'a, cgr_storage::Result<Vec<IndexedEntry>>>;
}

/// Persistent store of deferred result sets.
pub trait ResultCache
where
	Self: Send + Sync,
{
	/// Fails with `Conflict` when a row with the same signature was created at or after
	/// `live_since`.
	fn put<'a>(
		&'a self,
		collection: Collection,
		entry: &'a CachedResultSet,
		live_since: OffsetDateTime,
	) -> BoxFuture<'a, cgr_storage::Result<()>>;

	/// Rows created before `live_since` read as absent.
	fn get<'a>(
		&'a self,
		collection: Collection,
		signature: &'a [u8],
		live_since: OffsetDateTime,
	) -> BoxFuture<'a, cgr_storage::Result<Option<CachedResultSet>>>;

	fn delete_older_than<'a>(
		&'a self,
		collection: Collection,
		cutoff: OffsetDateTime,
	) -> BoxFuture<'a, cgr_storage::Result<u64>>;
}

#[derive(Clone)]
pub struct Backends {
	pub store: Arc<dyn FingerprintStore>,
	pub cache: Arc<dyn ResultCache>,
}
impl Backends {
	pub fn new(store: Arc<dyn FingerprintStore>, cache: Arc<dyn ResultCache>) -> Self {
		Self { store, cache }
	}

	pub fn postgres(db: Db) -> Self {
		let backend = Arc::new(PgBackend { db });

		Self { store: backend.clone(), cache: backend }
	}

	pub fn memory(backend: Arc<MemoryBackend>) -> Self {
		Self { store: backend.clone(), cache: backend }
	}
}

pub struct SearchService {
	pub cfg: Config,
	pub backends: Backends,
}
impl SearchService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, backends: Backends::postgres(db) }
	}

	pub fn with_backends(cfg: Config, backends: Backends) -> Self {
		Self { cfg, backends }
	}

	pub fn evictor(&self) -> CacheEvictor {
		CacheEvictor::from_config(&self.cfg, self.backends.cache.clone())
	}

	pub(crate) fn retention(&self) -> Duration {
		Duration::seconds(self.cfg.cache.retention_seconds)
	}

	pub(crate) fn store_timeout(&self) -> StdDuration {
		StdDuration::from_millis(self.cfg.search.store_timeout_ms)
	}

	pub(crate) fn cache_timeout(&self) -> StdDuration {
		StdDuration::from_millis(self.cfg.search.cache_timeout_ms)
	}
}

struct PgBackend {
	db: Db,
}
impl FingerprintStore for PgBackend {
	fn candidates<'a>(
		&'a self,
		collection: Collection,
		query: &'a Fingerprint,
		operator: Operator,
	) -> BoxFuture<'a, cgr_storage::Result<Vec<IndexedEntry>>> {
		Box::pin(fingerprints::fetch_candidates(&self.db, collection, query, operator))
	}
}
impl ResultCache for PgBackend {
	fn put<'a>(
		&'a self,
		collection: Collection,
		entry: &'a CachedResultSet,
		live_since: OffsetDateTime,
	) -> BoxFuture<'a, cgr_storage::Result<()>> {
		Box::pin(search_cache::insert_cached(&self.db, collection, entry, live_since))
	}

	fn get<'a>(
		&'a self,
		collection: Collection,
		signature: &'a [u8],
		live_since: OffsetDateTime,
	) -> BoxFuture<'a, cgr_storage::Result<Option<CachedResultSet>>> {
		Box::pin(search_cache::fetch_cached(&self.db, collection, signature, live_since))
	}

	fn delete_older_than<'a>(
		&'a self,
		collection: Collection,
		cutoff: OffsetDateTime,
	) -> BoxFuture<'a, cgr_storage::Result<u64>> {
		Box::pin(search_cache::delete_cached_before(&self.db, collection, cutoff))
	}
}
