//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use sigo_core::{
  Error as CoreError, Registry,
  absence::{Absence, AbsenceType, NewAbsence},
  audit::{AuditAction, AuditQuery, EntityKind},
  date::parse_date,
  person::{NewPerson, Person, PersonQuery, Rank},
  restriction::{NewRestriction, RestrictionPatch, parse_codes},
  status::OperationalStatus,
  store::{Counter, RecordStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn registry() -> Registry<SqliteStore> { Registry::new(store().await, "capitao@4cia.pm") }

fn d(s: &str) -> NaiveDate { parse_date(s).unwrap() }

fn silva() -> NewPerson {
  NewPerson {
    registration_number: "123456".into(),
    full_name:           "João Pedro Silva Santos".into(),
    short_name:          "SILVA".into(),
    rank:                Rank::Sgt,
    active:              true,
  }
}

// ─── Store contract ──────────────────────────────────────────────────────────

#[tokio::test]
async fn counters_are_independent_and_monotonic() {
  let s = store().await;
  assert_eq!(s.next_id(Counter::Person).await.unwrap(), 1);
  assert_eq!(s.next_id(Counter::Person).await.unwrap(), 2);
  assert_eq!(s.next_id(Counter::Absence).await.unwrap(), 1);
  assert_eq!(s.next_id(Counter::Person).await.unwrap(), 3);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  let result = s.get::<Person>(99).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn replace_missing_returns_false() {
  let r = registry().await;
  let person = r.create_person(silva()).await.unwrap();

  let s = store().await;
  assert!(!s.replace(person.clone()).await.unwrap());

  s.insert(person.clone()).await.unwrap();
  assert!(s.replace(person).await.unwrap());
}

#[tokio::test]
async fn duplicate_insert_fails() {
  let r = registry().await;
  let person = r.create_person(silva()).await.unwrap();
  assert!(r.store().insert(person).await.is_err());
}

#[tokio::test]
async fn remove_where_only_touches_one_collection() {
  let r = registry().await;
  let p = r.create_person(silva()).await.unwrap();
  r.create_absence(NewAbsence {
    person_id:  p.id,
    kind:       AbsenceType::Ferias,
    start_date: d("2026-01-01"),
    end_date:   d("2026-01-10"),
    document:   None,
    note:       None,
  })
  .await
  .unwrap();

  // Person and absence both carry id 1.
  let removed = r.store().remove_where::<Absence, _>(|_| true).await.unwrap();
  assert_eq!(removed, 1);
  assert!(r.get_person(p.id).await.unwrap().is_some());

  let none = r.store().remove_where::<Absence, _>(|_| true).await.unwrap();
  assert_eq!(none, 0);
}

#[tokio::test]
async fn records_survive_reopen() {
  let dir = std::env::temp_dir().join(format!("sigo-store-test-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("reopen.db");
  let _ = std::fs::remove_file(&path);

  {
    let r = Registry::new(SqliteStore::open(&path).await.unwrap(), "capitao@4cia.pm");
    r.create_person(silva()).await.unwrap();
  }

  let r = Registry::new(SqliteStore::open(&path).await.unwrap(), "capitao@4cia.pm");
  let persons = r.list_persons(&PersonQuery::default()).await.unwrap();
  assert_eq!(persons.len(), 1);
  assert_eq!(persons[0].short_name, "SILVA");

  let next = r
    .create_person(NewPerson { registration_number: "345678".into(), ..silva() })
    .await
    .unwrap();
  assert_eq!(next.id, 2);

  let _ = std::fs::remove_dir_all(&dir);
}

// ─── Registry over SQLite ────────────────────────────────────────────────────

#[tokio::test]
async fn status_precedence_over_time() {
  let r = registry().await;
  let p = r.create_person(silva()).await.unwrap();
  r.create_absence(NewAbsence {
    person_id:  p.id,
    kind:       AbsenceType::Medico,
    start_date: d("2026-01-01"),
    end_date:   d("2026-01-31"),
    document:   Some("Atestado 12/2026".into()),
    note:       None,
  })
  .await
  .unwrap();
  r.create_restriction(NewRestriction {
    person_id:  p.id,
    codes:      parse_codes("EF"),
    start_date: d("2026-01-01"),
    end_date:   d("2026-06-30"),
    total_days: None,
    note:       None,
  })
  .await
  .unwrap();

  let cases = [
    ("2026-01-15", OperationalStatus::Afastado),
    ("2026-03-01", OperationalStatus::AptoComRestricao),
    ("2027-01-01", OperationalStatus::Apto),
  ];
  for (on, expected) in cases {
    assert_eq!(r.derive_status(p.id, d(on)).await.unwrap().status, expected, "on {on}");
  }
}

#[tokio::test]
async fn touching_absence_is_rejected() {
  let r = registry().await;
  let p = r.create_person(silva()).await.unwrap();
  let absence = |start: &str, end: &str| NewAbsence {
    person_id:  p.id,
    kind:       AbsenceType::Ferias,
    start_date: d(start),
    end_date:   d(end),
    document:   None,
    note:       None,
  };

  r.create_absence(absence("2026-01-01", "2026-01-10")).await.unwrap();
  let err = r.create_absence(absence("2026-01-10", "2026-01-20")).await.unwrap_err();
  assert!(matches!(err, CoreError::OverlapConflict(_)));
  assert_eq!(r.absences_for(p.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn restriction_days_recomputed_on_update() {
  let r = registry().await;
  let p = r.create_person(silva()).await.unwrap();
  let created = r
    .create_restriction(NewRestriction {
      person_id:  p.id,
      codes:      parse_codes("EF, LP"),
      start_date: d("2026-01-01"),
      end_date:   d("2026-01-10"),
      total_days: Some(1),
      note:       None,
    })
    .await
    .unwrap();
  assert_eq!(created.total_days, 10);

  let updated = r
    .update_restriction(created.id, RestrictionPatch {
      start_date: Some(d("2026-01-05")),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.total_days, 6);

  let stored = r.get_restriction(created.id).await.unwrap().unwrap();
  assert_eq!(stored, updated);
}

#[tokio::test]
async fn delete_person_cascades_and_audits_once() {
  let r = registry().await;
  let p = r.create_person(silva()).await.unwrap();
  r.create_absence(NewAbsence {
    person_id:  p.id,
    kind:       AbsenceType::Licenca,
    start_date: d("2026-01-01"),
    end_date:   d("2026-01-31"),
    document:   None,
    note:       None,
  })
  .await
  .unwrap();

  r.delete_person(p.id).await.unwrap();

  assert!(r.absences_for(p.id).await.unwrap().is_empty());
  assert_eq!(
    r.derive_status(p.id, d("2026-01-15")).await.unwrap().status,
    OperationalStatus::Apto
  );

  let log = r.audit_log(&AuditQuery::default()).await.unwrap();
  assert_eq!(log.len(), 3);
  assert_eq!(log[0].entity, EntityKind::Person);
  assert_eq!(log[0].action, AuditAction::Delete);
  assert_eq!(log[0].before.as_ref().unwrap()["shortName"], "SILVA");
  assert!(log[0].after.is_none());
  assert_eq!(log[2].action, AuditAction::Create);
}

#[tokio::test]
async fn audit_filter_by_actor() {
  let r = registry().await;
  r.create_person(silva()).await.unwrap();

  let mine = r
    .audit_log(&AuditQuery { actor: Some("CAPITAO".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(mine.len(), 1);

  let theirs = r
    .audit_log(&AuditQuery { actor: Some("tenente".into()), ..Default::default() })
    .await
    .unwrap();
  assert!(theirs.is_empty());
}
