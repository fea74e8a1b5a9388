//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;

use sigo_core::{
  audit::AuditEntry,
  store::{Counter, Record, RecordStore},
};

use crate::{
  Error, Result,
  encode::{RawAuditEntry, decode_id, encode_dt, encode_id, encode_snapshot},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SIGO record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory database.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn next_id(&self, counter: Counter) -> Result<u64> {
    let name = counter.to_string();

    let value: i64 = self
      .conn
      .call(move |conn| {
        let value = conn.query_row(
          "INSERT INTO counters (name, value) VALUES (?1, 1)
           ON CONFLICT(name) DO UPDATE SET value = value + 1
           RETURNING value",
          rusqlite::params![name],
          |r| r.get(0),
        )?;
        Ok(value)
      })
      .await?;

    decode_id(value)
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn list<R: Record>(&self) -> Result<Vec<R>> {
    let kind = R::KIND.to_string();

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare("SELECT body FROM records WHERE kind = ?1 ORDER BY id")?;
        let rows = stmt
          .query_map(rusqlite::params![kind], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    bodies
      .iter()
      .map(|body| serde_json::from_str(body).map_err(Error::from))
      .collect()
  }

  async fn get<R: Record>(&self, id: u64) -> Result<Option<R>> {
    let kind = R::KIND.to_string();
    let id = encode_id(id)?;

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        let body = conn
          .query_row(
            "SELECT body FROM records WHERE kind = ?1 AND id = ?2",
            rusqlite::params![kind, id],
            |r| r.get(0),
          )
          .optional()?;
        Ok(body)
      })
      .await?;

    Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
  }

  async fn insert<R: Record>(&self, record: R) -> Result<()> {
    let kind = R::KIND.to_string();
    let id = encode_id(record.id())?;
    let body = serde_json::to_string(&record)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (kind, id, body) VALUES (?1, ?2, ?3)",
          rusqlite::params![kind, id, body],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn replace<R: Record>(&self, record: R) -> Result<bool> {
    let kind = R::KIND.to_string();
    let id = encode_id(record.id())?;
    let body = serde_json::to_string(&record)?;

    let changed = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE records SET body = ?3 WHERE kind = ?1 AND id = ?2",
          rusqlite::params![kind, id, body],
        )?;
        Ok(changed)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn remove_where<R, F>(&self, predicate: F) -> Result<usize>
  where
    R: Record,
    F: Fn(&R) -> bool + Send + 'static,
  {
    let doomed = self
      .list::<R>()
      .await?
      .iter()
      .filter(|r| predicate(*r))
      .map(|r| encode_id(r.id()))
      .collect::<Result<Vec<i64>>>()?;

    if doomed.is_empty() {
      return Ok(0);
    }

    let kind = R::KIND.to_string();
    let removed = doomed.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare("DELETE FROM records WHERE kind = ?1 AND id = ?2")?;
          for id in &doomed {
            stmt.execute(rusqlite::params![kind, id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(removed)
  }

  // ── Audit log ─────────────────────────────────────────────────────────────

  async fn append_audit(&self, entry: AuditEntry) -> Result<()> {
    let id          = encode_id(entry.id)?;
    let entity      = entry.entity.to_string();
    let entity_id   = encode_id(entry.entity_id)?;
    let action      = entry.action.to_string();
    let recorded_at = encode_dt(entry.timestamp);
    let before      = encode_snapshot(entry.before.as_ref())?;
    let after       = encode_snapshot(entry.after.as_ref())?;
    let actor       = entry.actor;
    let description = entry.description;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audit_log
             (id, entity, entity_id, action, actor, recorded_at,
              before_json, after_json, description)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id,
            entity,
            entity_id,
            action,
            actor,
            recorded_at,
            before,
            after,
            description
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn audit_entries(&self) -> Result<Vec<AuditEntry>> {
    let raws: Vec<RawAuditEntry> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {} FROM audit_log ORDER BY id DESC", RawAuditEntry::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawAuditEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditEntry::into_entry).collect()
  }
}
