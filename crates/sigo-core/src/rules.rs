//! Validation and conflict rules.
//!
//! Pure functions over already-loaded records. The registry loads what a rule
//! needs, runs it, and only touches the store once every rule has passed.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::{
  Error, FieldErrors, Result,
  absence::Absence,
  date::{compare_dates, ranges_overlap},
  person::Person,
  restriction::RestrictionCode,
};

const REQUIRED: &str = "this field is required";

// ─── Persons ─────────────────────────────────────────────────────────────────

/// Check a person about to be written against the rest of the register.
///
/// Required-field failures are collected across all fields first. Uniqueness
/// of the registration number is checked against every other person.
pub fn validate_person(person: &Person, others: &[Person]) -> Result<()> {
  let mut errors = FieldErrors::new();
  if person.registration_number.trim().is_empty() {
    errors.insert("registrationNumber", REQUIRED);
  }
  if person.full_name.trim().is_empty() {
    errors.insert("fullName", REQUIRED);
  }
  if person.short_name.trim().is_empty() {
    errors.insert("shortName", REQUIRED);
  }
  errors.into_result()?;

  let taken = others.iter().any(|other| {
    other.id != person.id && other.registration_number == person.registration_number
  });
  if taken {
    return Err(Error::DuplicateRegistrationNumber(person.registration_number.clone()));
  }
  Ok(())
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// `end` must not precede `start`.
pub fn check_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
  if compare_dates(end, start).is_lt() {
    return Err(Error::InvalidDateRange { start, end });
  }
  Ok(())
}

// ─── Absences ────────────────────────────────────────────────────────────────

/// The first absence of `person_id` sharing a day with `start..=end`.
///
/// Candidates are scanned latest start first; `exclude` skips the record
/// being updated.
pub fn find_absence_overlap<'a>(
  existing: &'a [Absence],
  person_id: u64,
  start: NaiveDate,
  end: NaiveDate,
  exclude: Option<u64>,
) -> Option<&'a Absence> {
  let mut candidates: Vec<&Absence> = existing
    .iter()
    .filter(|a| a.person_id == person_id && Some(a.id) != exclude)
    .collect();
  candidates.sort_by(|a, b| latest_first(a.start_date, a.id, b.start_date, b.id));

  candidates
    .into_iter()
    .find(|a| ranges_overlap(start, end, a.start_date, a.end_date))
}

/// Date sanity, then overlap with the person's other absences.
pub fn validate_absence(candidate: &Absence, existing: &[Absence], exclude: Option<u64>) -> Result<()> {
  check_date_range(candidate.start_date, candidate.end_date)?;

  if let Some(clash) = find_absence_overlap(
    existing,
    candidate.person_id,
    candidate.start_date,
    candidate.end_date,
    exclude,
  ) {
    return Err(Error::OverlapConflict(Box::new(clash.clone())));
  }
  Ok(())
}

// ─── Restrictions ────────────────────────────────────────────────────────────

/// Resolve raw code tokens against the catalog, preserving order.
pub fn validate_codes<S: AsRef<str>>(codes: &[S]) -> Result<Vec<RestrictionCode>> {
  if codes.is_empty() {
    return Err(Error::EmptyCodeSet);
  }
  codes
    .iter()
    .map(|raw| {
      let raw = raw.as_ref().trim();
      RestrictionCode::from_str(raw).map_err(|_| Error::InvalidCode(raw.to_owned()))
    })
    .collect()
}

/// Codes first, then dates. Restrictions are never checked for overlap.
pub fn validate_restriction<S: AsRef<str>>(
  codes: &[S],
  start: NaiveDate,
  end: NaiveDate,
) -> Result<Vec<RestrictionCode>> {
  let codes = validate_codes(codes)?;
  check_date_range(start, end)?;
  Ok(codes)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Ordering for "latest start date first", ties broken by the newer id.
pub(crate) fn latest_first(
  start_a: NaiveDate,
  id_a: u64,
  start_b: NaiveDate,
  id_b: u64,
) -> std::cmp::Ordering {
  compare_dates(start_b, start_a).then(id_b.cmp(&id_a))
}

/// Trim a required text field.
pub(crate) fn clean(text: &str) -> String { text.trim().to_owned() }

/// Trim an optional text field; blank becomes `None`.
pub(crate) fn clean_opt(text: Option<String>) -> Option<String> {
  text
    .map(|t| t.trim().to_owned())
    .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{absence::AbsenceType, date::parse_date, person::Rank};

  fn d(s: &str) -> NaiveDate { parse_date(s).unwrap() }

  fn person(id: u64, re: &str) -> Person {
    Person {
      id,
      registration_number: re.into(),
      full_name: "Carlos Eduardo Costa".into(),
      short_name: "COSTA".into(),
      rank: Rank::Sd,
      active: true,
      created_at: Utc::now(),
      created_by: "test".into(),
    }
  }

  fn absence(id: u64, person_id: u64, start: &str, end: &str) -> Absence {
    Absence {
      id,
      person_id,
      kind: AbsenceType::Medico,
      start_date: d(start),
      end_date: d(end),
      document: None,
      note: None,
      created_at: Utc::now(),
      created_by: "test".into(),
    }
  }

  #[test]
  fn required_fields_are_all_reported() {
    let mut p = person(1, " ");
    p.short_name = String::new();
    let err = validate_person(&p, &[]).unwrap_err();
    let Error::RequiredFieldsMissing(fields) = err else {
      panic!("expected field errors, got {err:?}");
    };
    assert_eq!(fields.len(), 2);
    assert!(fields.get("registrationNumber").is_some());
    assert!(fields.get("shortName").is_some());
    assert!(fields.get("fullName").is_none());
  }

  #[test]
  fn duplicate_registration_excludes_self() {
    let existing = vec![person(1, "345678"), person(2, "456789")];
    assert!(validate_person(&person(1, "345678"), &existing).is_ok());

    let err = validate_person(&person(3, "456789"), &existing).unwrap_err();
    assert!(matches!(err, Error::DuplicateRegistrationNumber(ref re) if re == "456789"));
    assert_eq!(err.field(), Some("registrationNumber"));
  }

  #[test]
  fn reversed_range_is_rejected() {
    assert!(check_date_range(d("2026-01-10"), d("2026-01-10")).is_ok());
    let err = check_date_range(d("2026-01-10"), d("2026-01-09")).unwrap_err();
    assert!(matches!(err, Error::InvalidDateRange { .. }));
    assert_eq!(err.field(), Some("endDate"));
  }

  #[test]
  fn overlap_scan_reports_latest_start_first() {
    let existing = vec![
      absence(1, 7, "2026-01-01", "2026-01-10"),
      absence(2, 7, "2026-01-15", "2026-01-20"),
      absence(3, 8, "2026-01-01", "2026-12-31"),
    ];
    let hit = find_absence_overlap(&existing, 7, d("2026-01-05"), d("2026-01-16"), None);
    assert_eq!(hit.map(|a| a.id), Some(2));

    let miss = find_absence_overlap(&existing, 7, d("2026-01-11"), d("2026-01-14"), None);
    assert!(miss.is_none());

    let own = find_absence_overlap(&existing, 7, d("2026-01-01"), d("2026-01-12"), Some(1));
    assert!(own.is_none());
  }

  #[test]
  fn conflict_message_names_existing_record() {
    let existing = vec![absence(1, 7, "2026-01-01", "2026-01-10")];
    let err = validate_absence(&absence(0, 7, "2026-01-10", "2026-01-20"), &existing, None)
      .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.conflicting_absence().map(|a| a.id), Some(1));
    let msg = err.to_string();
    assert!(msg.contains("MEDICO"), "{msg}");
    assert!(msg.contains("01/01/2026"), "{msg}");
    assert!(msg.contains("10/01/2026"), "{msg}");
  }

  #[test]
  fn codes_resolve_in_order() {
    let codes = validate_codes(&["EF", "lp", "EF"]).unwrap();
    assert_eq!(codes, vec![RestrictionCode::Ef, RestrictionCode::Lp, RestrictionCode::Ef]);
  }

  #[test]
  fn code_errors() {
    let empty: [&str; 0] = [];
    assert!(matches!(validate_codes(&empty), Err(Error::EmptyCodeSet)));

    let err = validate_codes(&["EF", "XX", "YY"]).unwrap_err();
    assert!(matches!(err, Error::InvalidCode(ref c) if c == "XX"));
    assert_eq!(err.field(), Some("codes"));
  }

  #[test]
  fn restriction_checks_codes_before_dates() {
    let err = validate_restriction(&["XX"], d("2026-02-01"), d("2026-01-01")).unwrap_err();
    assert!(matches!(err, Error::InvalidCode(_)));

    let err = validate_restriction(&["EF"], d("2026-02-01"), d("2026-01-01")).unwrap_err();
    assert!(matches!(err, Error::InvalidDateRange { .. }));
  }

  #[test]
  fn optional_text_is_trimmed_to_none() {
    assert_eq!(clean_opt(Some("  ".into())), None);
    assert_eq!(clean_opt(Some(" Atestado 01 ".into())), Some("Atestado 01".into()));
    assert_eq!(clean(" SILVA "), "SILVA");
  }
}
