//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, enums by their display names
//! and snapshots as compact JSON.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sigo_core::audit::{AuditAction, AuditEntry, EntityKind};

use crate::{Error, Result};

// ─── Ids ─────────────────────────────────────────────────────────────────────

pub fn encode_id(id: u64) -> Result<i64> { i64::try_from(id).map_err(|_| Error::IdOutOfRange(id)) }

pub fn decode_id(raw: i64) -> Result<u64> { u64::try_from(raw).map_err(|_| Error::NegativeId(raw)) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::UnknownValue { column, value: s.to_owned() })
}

pub fn decode_entity(s: &str) -> Result<EntityKind> { decode_enum("entity", s) }

pub fn decode_action(s: &str) -> Result<AuditAction> { decode_enum("action", s) }

// ─── Snapshots ───────────────────────────────────────────────────────────────

pub fn encode_snapshot(value: Option<&serde_json::Value>) -> Result<Option<String>> {
  Ok(value.map(serde_json::to_string).transpose()?)
}

fn decode_snapshot(s: Option<&str>) -> Result<Option<serde_json::Value>> {
  Ok(s.map(serde_json::from_str).transpose()?)
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Raw values read directly from an `audit_log` row.
pub struct RawAuditEntry {
  pub id:          i64,
  pub entity:      String,
  pub entity_id:   i64,
  pub action:      String,
  pub actor:       String,
  pub recorded_at: String,
  pub before_json: Option<String>,
  pub after_json:  Option<String>,
  pub description: String,
}

impl RawAuditEntry {
  pub const COLUMNS: &'static str = "id, entity, entity_id, action, actor, recorded_at, \
                                     before_json, after_json, description";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      entity:      row.get(1)?,
      entity_id:   row.get(2)?,
      action:      row.get(3)?,
      actor:       row.get(4)?,
      recorded_at: row.get(5)?,
      before_json: row.get(6)?,
      after_json:  row.get(7)?,
      description: row.get(8)?,
    })
  }

  pub fn into_entry(self) -> Result<AuditEntry> {
    Ok(AuditEntry {
      id:          decode_id(self.id)?,
      entity:      decode_entity(&self.entity)?,
      entity_id:   decode_id(self.entity_id)?,
      action:      decode_action(&self.action)?,
      actor:       self.actor,
      timestamp:   decode_dt(&self.recorded_at)?,
      before:      decode_snapshot(self.before_json.as_deref())?,
      after:       decode_snapshot(self.after_json.as_deref())?,
      description: self.description,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_round_trip_within_range() {
    assert_eq!(encode_id(42).unwrap(), 42);
    assert!(matches!(encode_id(u64::MAX), Err(Error::IdOutOfRange(_))));
    assert!(matches!(decode_id(-1), Err(Error::NegativeId(-1))));
  }

  #[test]
  fn unknown_discriminants_are_reported() {
    assert_eq!(decode_action("UPDATE").unwrap(), AuditAction::Update);
    assert_eq!(decode_entity("restriction").unwrap(), EntityKind::Restriction);
    let err = decode_action("ARCHIVE").unwrap_err();
    assert!(matches!(err, Error::UnknownValue { column: "action", .. }));
  }

  #[test]
  fn timestamps_keep_utc() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
    assert!(decode_dt("15/01/2026").is_err());
  }
}
