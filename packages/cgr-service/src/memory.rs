//! Process-local backend with the same visibility and conflict rules as the Postgres tables.

use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard},
};

use time::OffsetDateTime;

use cgr_domain::{CachedResultSet, Collection, Fingerprint, IndexedEntry, Operator};
use cgr_storage::Error as StorageError;

use crate::{BoxFuture, FingerprintStore, ResultCache};

#[derive(Default)]
struct Tables {
	entries: HashMap<Collection, Vec<IndexedEntry>>,
	cache: HashMap<(Collection, Vec<u8>), CachedResultSet>,
}

#[derive(Default)]
pub struct MemoryBackend {
	tables: Mutex<Tables>,
}
impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Indexes one entry. Entry ids are unique per collection.
	pub fn insert_entry(
		&self,
		collection: Collection,
		entry: IndexedEntry,
	) -> cgr_storage::Result<()> {
		let mut tables = self.lock();
		let entries = tables.entries.entry(collection).or_default();

		if entries.iter().any(|existing| existing.entry_id == entry.entry_id) {
			return Err(StorageError::Conflict(format!(
				"{collection} entry {} already exists.",
				entry.entry_id
			)));
		}

		entries.push(entry);

		Ok(())
	}

	/// Number of cached rows held for `collection`, expired ones included.
	pub fn cached_len(&self, collection: Collection) -> usize {
		self.lock().cache.keys().filter(|(owner, _)| *owner == collection).count()
	}

	fn lock(&self) -> MutexGuard<'_, Tables> {
		self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn candidates_now(
		&self,
		collection: Collection,
		query: &Fingerprint,
		operator: Operator,
	) -> Vec<IndexedEntry> {
		let tables = self.lock();
		let Some(entries) = tables.entries.get(&collection) else {
			return Vec::new();
		};

		entries
			.iter()
			.filter(|entry| match operator {
				Operator::Similar => entry.fingerprint.overlaps(query),
				Operator::Substructure => entry.fingerprint.contains(query),
			})
			.cloned()
			.collect()
	}

	fn put_now(
		&self,
		collection: Collection,
		entry: &CachedResultSet,
		live_since: OffsetDateTime,
	) -> cgr_storage::Result<()> {
		if !entry.is_consistent() {
			return Err(StorageError::InvalidArgument(
				"Cached result set columns must have equal lengths.".to_string(),
			));
		}

		let mut tables = self.lock();
		let key = (collection, entry.signature.clone());

		if tables.cache.get(&key).is_some_and(|existing| existing.created_at >= live_since) {
			return Err(StorageError::Conflict(format!(
				"A live {collection} result set already exists for this signature."
			)));
		}

		tables.cache.insert(key, entry.clone());

		Ok(())
	}

	fn get_now(
		&self,
		collection: Collection,
		signature: &[u8],
		live_since: OffsetDateTime,
	) -> Option<CachedResultSet> {
		self.lock()
			.cache
			.get(&(collection, signature.to_vec()))
			.filter(|entry| entry.created_at >= live_since)
			.cloned()
	}

	fn delete_now(&self, collection: Collection, cutoff: OffsetDateTime) -> u64 {
		let mut tables = self.lock();
		let before = tables.cache.len();

		tables
			.cache
			.retain(|(owner, _), entry| *owner != collection || entry.created_at >= cutoff);

		(before - tables.cache.len()) as u64
	}
}
impl FingerprintStore for MemoryBackend {
	fn candidates<'a>(
		&'a self,
		collection: Collection,
		query: &'a Fingerprint,
		operator: Operator,
	) -> BoxFuture<'a, cgr_storage::Result<Vec<IndexedEntry>>> {
		Box::pin(async move { Ok(self.candidates_now(collection, query, operator)) })
	}
}
impl ResultCache for MemoryBackend {
	fn put<'a>(
		&'a self,
		collection: Collection,
		entry: &'a CachedResultSet,
		live_since: OffsetDateTime,
	) -> BoxFuture<'a, cgr_storage::Result<()>> {
		Box::pin(async move { self.put_now(collection, entry, live_since) })
	}

	fn get<'a>(
		&'a self,
		collection: Collection,
		signature: &'a [u8],
		live_since: OffsetDateTime,
	) -> BoxFuture<'a, cgr_storage::Result<Option<CachedResultSet>>> {
		Box::pin(async move { Ok(self.get_now(collection, signature, live_since)) })
	}

	fn delete_older_than<'a>(
		&'a self,
		collection: Collection,
		cutoff: OffsetDateTime,
	) -> BoxFuture<'a, cgr_storage::Result<u64>> {
		Box::pin(async move { Ok(self.delete_now(collection, cutoff)) })
	}
}
