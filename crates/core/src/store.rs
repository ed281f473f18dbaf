//! Keyed record storage.
//!
//! A store holds one collection of records of a single type. Records are kept in insertion
//! order; overwriting a record by key keeps its original position. Every store also owns a
//! monotonically increasing id sequence and an atomic conditional insert, which the booking
//! flow uses to reserve a slot without a check-then-act race.
//!
//! Two implementations are provided:
//! - [`InMemoryStore`] for tests and ephemeral use
//! - [`JsonFileStore`] which persists the whole collection as one JSON document
//!
//! ## File layout
//!
//! ```text
//! <data_dir>/
//!   patients.json       # {"last_id": 0, "records": [...]}
//!   appointments.json
//! ```
//!
//! Writes go to a sibling temporary file which is then renamed over the original, so a
//! crash mid-write leaves the previous contents intact.

use crate::constants::STORE_FILE_EXTENSION;
use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A value that can live in a [`RecordStore`].
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Primary key type.
    type Key: Clone + Eq + Hash + fmt::Display + Send + Sync;

    /// Collection name, also used as the file stem by [`JsonFileStore`].
    const COLLECTION: &'static str;

    fn key(&self) -> Self::Key;

    /// Identifier of the owning patient, used by [`RecordStore::query_by_owner`].
    fn owner(&self) -> &str;
}

pub trait RecordStore<R: Record>: Send + Sync {
    /// Inserts `record`, or overwrites the record with the same key.
    fn put(&self, record: R) -> StoreResult<()>;

    fn get_by_id(&self, key: &R::Key) -> StoreResult<Option<R>>;

    fn exists(&self, key: &R::Key) -> StoreResult<bool> {
        Ok(self.get_by_id(key)?.is_some())
    }

    /// All records owned by `owner`, in insertion order.
    fn query_by_owner(&self, owner: &str) -> StoreResult<Vec<R>> {
        self.query(&|record: &R| record.owner() == owner)
    }

    /// All records matching `predicate`, in insertion order.
    fn query(&self, predicate: &dyn Fn(&R) -> bool) -> StoreResult<Vec<R>>;

    /// Allocates the next id of this collection's sequence. The first id is 1.
    fn next_id(&self) -> StoreResult<u64>;

    /// Inserts `record` unless a stored record matches `conflict` or already has the same
    /// key. The check and the insert happen under one lock.
    ///
    /// Returns `true` if the record was inserted.
    fn insert_unless(&self, record: R, conflict: &dyn Fn(&R) -> bool) -> StoreResult<bool>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "R: Record")]
struct Collection<R> {
    last_id: u64,
    records: Vec<R>,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self {
            last_id: 0,
            records: Vec::new(),
        }
    }
}

impl<R: Record> Collection<R> {
    fn position(&self, key: &R::Key) -> Option<usize> {
        self.records.iter().position(|r| &r.key() == key)
    }

    fn upsert(&mut self, record: R) {
        match self.position(&record.key()) {
            Some(idx) => self.records[idx] = record,
            None => self.records.push(record),
        }
    }

    fn get(&self, key: &R::Key) -> Option<R> {
        self.position(key).map(|idx| self.records[idx].clone())
    }

    fn filter(&self, predicate: &dyn Fn(&R) -> bool) -> Vec<R> {
        self.records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    fn allocate_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn insert_unless(&mut self, record: R, conflict: &dyn Fn(&R) -> bool) -> bool {
        let key = record.key();
        if self.records.iter().any(|r| r.key() == key || conflict(r)) {
            return false;
        }
        self.records.push(record);
        true
    }
}

fn lock<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| StoreError::LockPoisoned)
}

/// Volatile store backed by a `Vec` behind a mutex.
#[derive(Debug)]
pub struct InMemoryStore<R> {
    inner: Mutex<Collection<R>>,
}

impl<R: Record> InMemoryStore<R> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Collection::default()),
        }
    }
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    fn put(&self, record: R) -> StoreResult<()> {
        lock(&self.inner)?.upsert(record);
        Ok(())
    }

    fn get_by_id(&self, key: &R::Key) -> StoreResult<Option<R>> {
        Ok(lock(&self.inner)?.get(key))
    }

    fn query(&self, predicate: &dyn Fn(&R) -> bool) -> StoreResult<Vec<R>> {
        Ok(lock(&self.inner)?.filter(predicate))
    }

    fn next_id(&self) -> StoreResult<u64> {
        Ok(lock(&self.inner)?.allocate_id())
    }

    fn insert_unless(&self, record: R, conflict: &dyn Fn(&R) -> bool) -> StoreResult<bool> {
        Ok(lock(&self.inner)?.insert_unless(record, conflict))
    }
}

/// Durable store keeping one JSON document per collection.
///
/// The collection is loaded into memory on open and rewritten on every mutation. A
/// mutation is applied to a copy first; the in-memory state only changes once the file
/// has been written, so a failed write leaves both untouched.
#[derive(Debug)]
pub struct JsonFileStore<R> {
    path: PathBuf,
    inner: Mutex<Collection<R>>,
}

impl<R: Record> JsonFileStore<R> {
    /// Opens (or creates) the `R::COLLECTION` store under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if:
    /// - the data directory cannot be created,
    /// - an existing store file cannot be read or parsed.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(data_dir).map_err(StoreError::StorageDirCreation)?;

        let path = data_dir
            .join(R::COLLECTION)
            .with_extension(STORE_FILE_EXTENSION);

        let collection = if path.is_file() {
            let contents = fs::read_to_string(&path).map_err(StoreError::FileRead)?;
            serde_json::from_str(&contents).map_err(StoreError::Deserialization)?
        } else {
            Collection::default()
        };

        tracing::debug!(
            "opened {} store at {} ({} records)",
            R::COLLECTION,
            path.display(),
            collection.records.len()
        );

        Ok(Self {
            path,
            inner: Mutex::new(collection),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, collection: &Collection<R>) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(collection).map_err(StoreError::Serialization)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(StoreError::FileWrite)?;
        fs::rename(&tmp, &self.path).map_err(StoreError::FileWrite)
    }

    fn commit<T>(&self, mutate: impl FnOnce(&mut Collection<R>) -> T) -> StoreResult<T> {
        let mut guard = lock(&self.inner)?;
        let mut next = guard.clone();
        let out = mutate(&mut next);
        self.persist(&next)?;
        *guard = next;
        Ok(out)
    }
}

impl<R: Record> RecordStore<R> for JsonFileStore<R> {
    fn put(&self, record: R) -> StoreResult<()> {
        self.commit(|c| c.upsert(record))
    }

    fn get_by_id(&self, key: &R::Key) -> StoreResult<Option<R>> {
        Ok(lock(&self.inner)?.get(key))
    }

    fn query(&self, predicate: &dyn Fn(&R) -> bool) -> StoreResult<Vec<R>> {
        Ok(lock(&self.inner)?.filter(predicate))
    }

    fn next_id(&self) -> StoreResult<u64> {
        self.commit(|c| c.allocate_id())
    }

    fn insert_unless(&self, record: R, conflict: &dyn Fn(&R) -> bool) -> StoreResult<bool> {
        let mut guard = lock(&self.inner)?;
        let mut next = guard.clone();
        if !next.insert_unless(record, conflict) {
            return Ok(false);
        }
        self.persist(&next)?;
        *guard = next;
        Ok(true)
    }
}
