//! Operational status derivation.
//!
//! Status is never stored. It is recomputed from a person's absences and
//! restrictions for a reference date, applying a strict precedence:
//! AFASTADO > APTO_COM_RESTRICAO > APTO. Precedence is categorical; which
//! record started most recently does not matter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  absence::{Absence, AbsenceType},
  date::is_within_inclusive,
  person::Person,
  restriction::Restriction,
};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationalStatus {
  /// Fit for duty.
  Apto,
  /// Fit for duty with functional limitations.
  AptoComRestricao,
  /// Temporarily unfit; off duty.
  Afastado,
}

/// The derived status of one person on one date, with the record that caused
/// it. At most one of the two record fields is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
  pub status:             OperationalStatus,
  pub active_absence:     Option<Absence>,
  pub active_restriction: Option<Restriction>,
}

impl StatusResult {
  pub fn apto() -> Self {
    Self {
      status:             OperationalStatus::Apto,
      active_absence:     None,
      active_restriction: None,
    }
  }

  pub fn afastado(absence: Absence) -> Self {
    Self {
      status:             OperationalStatus::Afastado,
      active_absence:     Some(absence),
      active_restriction: None,
    }
  }

  pub fn restricted(restriction: Restriction) -> Self {
    Self {
      status:             OperationalStatus::AptoComRestricao,
      active_absence:     None,
      active_restriction: Some(restriction),
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// One precedence tier of the status rules. Tiers are evaluated in
/// [`Tier::PRECEDENCE`] order; the first that matches decides the status and
/// [`OperationalStatus::Apto`] is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
  /// Any absence covering the date.
  Absence,
  /// Any restriction covering the date.
  Restriction,
}

impl Tier {
  pub const PRECEDENCE: [Tier; 2] = [Tier::Absence, Tier::Restriction];

  /// The status this tier yields when it matches.
  pub fn status(self) -> OperationalStatus {
    match self {
      Self::Absence => OperationalStatus::Afastado,
      Self::Restriction => OperationalStatus::AptoComRestricao,
    }
  }

  /// The first covering record of this tier, scanning in slice order.
  pub fn evaluate(
    self,
    absences: &[Absence],
    restrictions: &[Restriction],
    on: NaiveDate,
  ) -> Option<StatusResult> {
    match self {
      Self::Absence => absences
        .iter()
        .find(|a| is_within_inclusive(on, a.start_date, a.end_date))
        .cloned()
        .map(StatusResult::afastado),
      Self::Restriction => restrictions
        .iter()
        .find(|r| is_within_inclusive(on, r.start_date, r.end_date))
        .cloned()
        .map(StatusResult::restricted),
    }
  }
}

/// Resolve a person's status on `on` from their records.
///
/// Both slices are expected in display order (latest start first); when
/// several records of the winning tier cover the date, the first one is
/// reported.
pub fn resolve_status(
  absences: &[Absence],
  restrictions: &[Restriction],
  on: NaiveDate,
) -> StatusResult {
  Tier::PRECEDENCE
    .iter()
    .find_map(|tier| tier.evaluate(absences, restrictions, on))
    .unwrap_or_else(StatusResult::apto)
}

// ─── Board ───────────────────────────────────────────────────────────────────

/// A person together with their derived status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonStatus {
  pub person: Person,
  pub status: StatusResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
  pub total:              usize,
  pub apto:               usize,
  pub apto_com_restricao: usize,
  pub afastado:           usize,
}

impl StatusSummary {
  fn count(&mut self, status: OperationalStatus) {
    self.total += 1;
    match status {
      OperationalStatus::Apto => self.apto += 1,
      OperationalStatus::AptoComRestricao => self.apto_com_restricao += 1,
      OperationalStatus::Afastado => self.afastado += 1,
    }
  }
}

/// Status of every active person on a reference date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBoard {
  pub reference_date:    NaiveDate,
  pub entries:           Vec<PersonStatus>,
  pub summary:           StatusSummary,
  /// Active absences per type, catalog order; zero counts omitted.
  pub absences_by_type:  Vec<(AbsenceType, usize)>,
}

impl StatusBoard {
  pub fn new(reference_date: NaiveDate, entries: Vec<PersonStatus>) -> Self {
    let mut summary = StatusSummary::default();
    let mut by_type = std::collections::BTreeMap::<AbsenceType, usize>::new();

    for entry in &entries {
      summary.count(entry.status.status);
      if let Some(absence) = &entry.status.active_absence {
        *by_type.entry(absence.kind).or_default() += 1;
      }
    }

    Self {
      reference_date,
      entries,
      summary,
      absences_by_type: by_type.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{date::parse_date, restriction::RestrictionCode};

  fn d(s: &str) -> NaiveDate { parse_date(s).unwrap() }

  fn absence(id: u64, start: &str, end: &str) -> Absence {
    Absence {
      id,
      person_id: 1,
      kind: AbsenceType::Medico,
      start_date: d(start),
      end_date: d(end),
      document: None,
      note: None,
      created_at: Utc::now(),
      created_by: "test".into(),
    }
  }

  fn restriction(id: u64, start: &str, end: &str) -> Restriction {
    Restriction {
      id,
      person_id: 1,
      codes: vec![RestrictionCode::Ef],
      start_date: d(start),
      end_date: d(end),
      total_days: crate::date::inclusive_day_count(d(start), d(end)),
      note: None,
      created_at: Utc::now(),
      created_by: "test".into(),
    }
  }

  #[test]
  fn absence_outranks_restriction() {
    let absences = [absence(1, "2026-01-01", "2026-01-31")];
    let restrictions = [restriction(1, "2026-01-01", "2026-06-30")];

    let on_leave = resolve_status(&absences, &restrictions, d("2026-01-15"));
    assert_eq!(on_leave.status, OperationalStatus::Afastado);
    assert_eq!(on_leave.active_absence.map(|a| a.id), Some(1));
    assert!(on_leave.active_restriction.is_none());

    let restricted = resolve_status(&absences, &restrictions, d("2026-03-01"));
    assert_eq!(restricted.status, OperationalStatus::AptoComRestricao);
    assert!(restricted.active_absence.is_none());
    assert_eq!(restricted.active_restriction.map(|r| r.id), Some(1));

    let fit = resolve_status(&absences, &restrictions, d("2027-01-01"));
    assert_eq!(fit, StatusResult::apto());
  }

  #[test]
  fn precedence_ignores_recency() {
    // The restriction starts later than the absence but still loses.
    let absences = [absence(1, "2026-01-01", "2026-01-31")];
    let restrictions = [restriction(1, "2026-01-20", "2026-01-25")];
    let result = resolve_status(&absences, &restrictions, d("2026-01-22"));
    assert_eq!(result.status, OperationalStatus::Afastado);
  }

  #[test]
  fn first_covering_restriction_is_reported() {
    let restrictions = [
      restriction(2, "2026-02-01", "2026-02-28"),
      restriction(1, "2026-01-01", "2026-12-31"),
    ];
    let result = resolve_status(&[], &restrictions, d("2026-02-10"));
    assert_eq!(result.active_restriction.map(|r| r.id), Some(2));
  }

  #[test]
  fn bounds_are_inclusive() {
    let absences = [absence(1, "2026-01-01", "2026-01-10")];
    assert_eq!(
      resolve_status(&absences, &[], d("2026-01-10")).status,
      OperationalStatus::Afastado
    );
    assert_eq!(resolve_status(&absences, &[], d("2026-01-11")).status, OperationalStatus::Apto);
  }

  #[test]
  fn tiers_map_to_statuses() {
    assert_eq!(Tier::PRECEDENCE[0].status(), OperationalStatus::Afastado);
    assert_eq!(Tier::PRECEDENCE[1].status(), OperationalStatus::AptoComRestricao);
    assert_eq!(OperationalStatus::AptoComRestricao.to_string(), "APTO_COM_RESTRICAO");
    assert_eq!(
      serde_json::to_string(&OperationalStatus::AptoComRestricao).unwrap(),
      "\"APTO_COM_RESTRICAO\""
    );
  }
}
