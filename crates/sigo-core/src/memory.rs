//! [`MemoryStore`]: an in-process [`RecordStore`].
//!
//! Records are held as JSON values keyed by `(kind, id)`, so every read hands
//! out a fresh copy. Nothing survives the process.

use std::{
  collections::{BTreeMap, HashMap},
  sync::{Mutex, MutexGuard},
};

use thiserror::Error;

use crate::{
  audit::{AuditEntry, EntityKind},
  store::{Counter, Record, RecordStore},
};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
  #[error("{kind} {id} already exists")]
  Duplicate { kind: EntityKind, id: u64 },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("store lock poisoned")]
  Poisoned,
}

#[derive(Debug, Default)]
struct Inner {
  records:  BTreeMap<(EntityKind, u64), serde_json::Value>,
  counters: HashMap<Counter, u64>,
  /// Oldest first; reversed on read.
  audit:    Vec<AuditEntry>,
}

/// A record store that lives entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> Result<MutexGuard<'_, Inner>, MemoryStoreError> {
    self.inner.lock().map_err(|_| MemoryStoreError::Poisoned)
  }

  fn decode_all<R: Record>(&self) -> Result<Vec<R>, MemoryStoreError> {
    let inner = self.lock()?;
    inner
      .records
      .range((R::KIND, u64::MIN)..=(R::KIND, u64::MAX))
      .map(|(_, value)| Ok(serde_json::from_value(value.clone())?))
      .collect()
  }
}

impl RecordStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn next_id(&self, counter: Counter) -> Result<u64, MemoryStoreError> {
    let mut inner = self.lock()?;
    let last = inner.counters.entry(counter).or_insert(0);
    *last += 1;
    Ok(*last)
  }

  async fn list<R: Record>(&self) -> Result<Vec<R>, MemoryStoreError> { self.decode_all() }

  async fn get<R: Record>(&self, id: u64) -> Result<Option<R>, MemoryStoreError> {
    let inner = self.lock()?;
    inner
      .records
      .get(&(R::KIND, id))
      .map(|value| serde_json::from_value(value.clone()))
      .transpose()
      .map_err(MemoryStoreError::from)
  }

  async fn insert<R: Record>(&self, record: R) -> Result<(), MemoryStoreError> {
    let value = serde_json::to_value(&record)?;
    let mut inner = self.lock()?;
    let key = (R::KIND, record.id());
    if inner.records.contains_key(&key) {
      return Err(MemoryStoreError::Duplicate { kind: R::KIND, id: record.id() });
    }
    inner.records.insert(key, value);
    Ok(())
  }

  async fn replace<R: Record>(&self, record: R) -> Result<bool, MemoryStoreError> {
    let value = serde_json::to_value(&record)?;
    let mut inner = self.lock()?;
    match inner.records.get_mut(&(R::KIND, record.id())) {
      Some(slot) => {
        *slot = value;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn remove_where<R, F>(&self, predicate: F) -> Result<usize, MemoryStoreError>
  where
    R: Record,
    F: Fn(&R) -> bool + Send + 'static,
  {
    let doomed: Vec<u64> = self
      .decode_all::<R>()?
      .iter()
      .filter(|r| predicate(*r))
      .map(|r| r.id())
      .collect();

    let mut inner = self.lock()?;
    for id in &doomed {
      inner.records.remove(&(R::KIND, *id));
    }
    Ok(doomed.len())
  }

  async fn append_audit(&self, entry: AuditEntry) -> Result<(), MemoryStoreError> {
    self.lock()?.audit.push(entry);
    Ok(())
  }

  async fn audit_entries(&self) -> Result<Vec<AuditEntry>, MemoryStoreError> {
    Ok(self.lock()?.audit.iter().rev().cloned().collect())
  }
}
