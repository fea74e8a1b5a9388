//! The `RecordStore` trait and the [`Record`] contract.
//!
//! The trait is implemented by storage backends (e.g. `sigo-store-sqlite`,
//! or the in-process [`crate::memory::MemoryStore`]). The registry depends on
//! this abstraction, not on any concrete medium.

use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};
use strum::{Display, EnumString};

use crate::audit::{AuditEntry, EntityKind};

// ─── Record ──────────────────────────────────────────────────────────────────

/// A value kept in one of the keyed collections.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
  /// The collection this record lives in.
  const KIND: EntityKind;

  fn id(&self) -> u64;
}

// ─── Counters ────────────────────────────────────────────────────────────────

/// Named id sequences, one per collection plus one for the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Counter {
  Person,
  Absence,
  Restriction,
  Audit,
}

impl From<EntityKind> for Counter {
  fn from(kind: EntityKind) -> Self {
    match kind {
      EntityKind::Person => Self::Person,
      EntityKind::Absence => Self::Absence,
      EntityKind::Restriction => Self::Restriction,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Keyed record collections plus an append-only audit log.
///
/// Backends give no cross-call atomicity; the registry orders its calls so
/// that a rejected operation never reaches the store.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Issue the next id of `counter`. Ids start at 1 and never repeat.
  fn next_id(
    &self,
    counter: Counter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// All records of a collection, in ascending id order.
  fn list<R: Record>(&self) -> impl Future<Output = Result<Vec<R>, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get<R: Record>(
    &self,
    id: u64,
  ) -> impl Future<Output = Result<Option<R>, Self::Error>> + Send + '_;

  /// Persist a new record. Fails if its id is already taken.
  fn insert<R: Record>(
    &self,
    record: R,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Overwrite the record with the same id. Returns `false` if none existed.
  fn replace<R: Record>(
    &self,
    record: R,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every record of a collection matching `predicate`, returning how
  /// many were removed.
  fn remove_where<R, F>(
    &self,
    predicate: F,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_
  where
    R: Record,
    F: Fn(&R) -> bool + Send + 'static;

  /// Append an entry to the audit log.
  fn append_audit(
    &self,
    entry: AuditEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The whole audit log, newest first.
  fn audit_entries(&self) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + '_;
}
