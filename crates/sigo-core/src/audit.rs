//! Audit log entries.
//!
//! Every successful mutation appends one entry. Entries are never updated or
//! removed, and are read newest first.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::date::is_within_inclusive;

/// The collection an audited record belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Person,
  Absence,
  Restriction,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AuditAction {
  Create,
  Update,
  Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
  pub id:          u64,
  pub entity:      EntityKind,
  pub entity_id:   u64,
  pub action:      AuditAction,
  /// Identity of the user who performed the action.
  pub actor:       String,
  pub timestamp:   DateTime<Utc>,
  /// Record state before the action; absent on create.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub before:      Option<serde_json::Value>,
  /// Record state after the action; absent on delete.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub after:       Option<serde_json::Value>,
  pub description: String,
}

/// Parameters for [`crate::Registry::audit_log`].
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
  pub entity: Option<EntityKind>,
  /// Earliest local calendar day to include.
  pub from:   Option<NaiveDate>,
  /// Latest local calendar day to include.
  pub until:  Option<NaiveDate>,
  /// Case-insensitive substring of the actor identity.
  pub actor:  Option<String>,
}

impl AuditQuery {
  pub fn matches(&self, entry: &AuditEntry) -> bool {
    if self.entity.is_some_and(|kind| kind != entry.entity) {
      return false;
    }

    let day = entry.timestamp.with_timezone(&Local).date_naive();
    let from = self.from.unwrap_or(NaiveDate::MIN);
    let until = self.until.unwrap_or(NaiveDate::MAX);
    if !is_within_inclusive(day, from, until) {
      return false;
    }

    match self.actor.as_deref().map(str::trim) {
      Some(needle) if !needle.is_empty() => {
        entry.actor.to_lowercase().contains(&needle.to_lowercase())
      }
      _ => true,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  fn entry(entity: EntityKind, actor: &str, timestamp: DateTime<Utc>) -> AuditEntry {
    AuditEntry {
      id: 1,
      entity,
      entity_id: 7,
      action: AuditAction::Create,
      actor: actor.into(),
      timestamp,
      before: None,
      after: None,
      description: String::new(),
    }
  }

  #[test]
  fn empty_query_matches_everything() {
    let e = entry(EntityKind::Absence, "capitao@4cia.pm", Utc::now());
    assert!(AuditQuery::default().matches(&e));
  }

  #[test]
  fn filters_by_entity_and_actor() {
    let e = entry(EntityKind::Absence, "Capitao@4cia.pm", Utc::now());

    let by_kind = AuditQuery { entity: Some(EntityKind::Person), ..Default::default() };
    assert!(!by_kind.matches(&e));

    let by_actor = AuditQuery { actor: Some("CAPITAO".into()), ..Default::default() };
    assert!(by_actor.matches(&e));

    let other_actor = AuditQuery { actor: Some("tenente".into()), ..Default::default() };
    assert!(!other_actor.matches(&e));
  }

  #[test]
  fn date_window_is_inclusive_local_days() {
    let at = Local
      .with_ymd_and_hms(2026, 3, 10, 23, 30, 0)
      .single()
      .unwrap()
      .with_timezone(&Utc);
    let e = entry(EntityKind::Person, "x", at);
    let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

    let same_day = AuditQuery { from: Some(day), until: Some(day), ..Default::default() };
    assert!(same_day.matches(&e));

    let after = AuditQuery {
      from: Some(day + Duration::days(1)),
      ..Default::default()
    };
    assert!(!after.matches(&e));
  }

  #[test]
  fn wire_names() {
    assert_eq!(EntityKind::Restriction.to_string(), "restriction");
    assert_eq!(AuditAction::Delete.to_string(), "DELETE");
    assert_eq!(serde_json::to_string(&AuditAction::Update).unwrap(), "\"UPDATE\"");
  }
}
