//! [`Registry`]: the operations exposed to callers.
//!
//! Every mutation runs in the same order: load what the rules need, validate,
//! write, append one audit entry. A rejected operation returns before the
//! first write, so it leaves no partial state and no audit entry behind.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  absence::{Absence, AbsencePatch, AbsenceQuery, NewAbsence},
  audit::{AuditAction, AuditEntry, AuditQuery, EntityKind},
  date::{format_date_br, inclusive_day_count},
  person::{NewPerson, Person, PersonPatch, PersonQuery},
  restriction::{NewRestriction, Restriction, RestrictionPatch},
  rules::{self, clean, clean_opt, latest_first},
  status::{PersonStatus, StatusBoard, StatusResult, resolve_status},
  store::{Counter, Record, RecordStore},
};

/// Front door to the register, bound to one store and one acting user.
#[derive(Debug, Clone)]
pub struct Registry<S> {
  store: S,
  actor: String,
}

impl<S: RecordStore> Registry<S> {
  /// `actor` is stamped on every record created and every audit entry.
  pub fn new(store: S, actor: impl Into<String>) -> Self {
    Self { store, actor: actor.into() }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn actor(&self) -> &str { &self.actor }

  // ── Persons ─────────────────────────────────────────────────────────────

  pub async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let mut person = Person {
      id:                  0,
      registration_number: clean(&input.registration_number),
      full_name:           clean(&input.full_name),
      short_name:          clean(&input.short_name),
      rank:                input.rank,
      active:              input.active,
      created_at:          Utc::now(),
      created_by:          self.actor.clone(),
    };

    let others = self.list_all::<Person>().await?;
    rules::validate_person(&person, &others).inspect_err(|e| reject(EntityKind::Person, e))?;

    person.id = self.next_id(Counter::Person).await?;
    self.store.insert(person.clone()).await.map_err(Error::store)?;

    let description = format!(
      "created person {} (registration {})",
      person.display_name(),
      person.registration_number
    );
    self.audit(AuditAction::Create, &person, None, Some(&person), description).await?;
    Ok(person)
  }

  pub async fn update_person(&self, id: u64, patch: PersonPatch) -> Result<Person> {
    let before = self.require::<Person>(id).await?;
    let mut person = before.clone();
    patch.apply(&mut person);
    person.registration_number = clean(&person.registration_number);
    person.full_name = clean(&person.full_name);
    person.short_name = clean(&person.short_name);

    let others = self.list_all::<Person>().await?;
    rules::validate_person(&person, &others).inspect_err(|e| reject(EntityKind::Person, e))?;

    self.replace(person.clone()).await?;
    let description = format!("updated person {}", person.display_name());
    self.audit(AuditAction::Update, &person, Some(&before), Some(&person), description).await?;
    Ok(person)
  }

  /// Delete a person and, with them, every absence and restriction they own.
  pub async fn delete_person(&self, id: u64) -> Result<()> {
    let person = self.require::<Person>(id).await?;

    let absences = self
      .store
      .remove_where::<Absence, _>(move |a| a.person_id == id)
      .await
      .map_err(Error::store)?;
    let restrictions = self
      .store
      .remove_where::<Restriction, _>(move |r| r.person_id == id)
      .await
      .map_err(Error::store)?;
    self
      .store
      .remove_where::<Person, _>(move |p| p.id == id)
      .await
      .map_err(Error::store)?;
    debug!(person = id, absences, restrictions, "cascaded person delete");

    let description = format!(
      "removed person {} (registration {})",
      person.display_name(),
      person.registration_number
    );
    self.audit(AuditAction::Delete, &person, Some(&person), None, description).await
  }

  pub async fn get_person(&self, id: u64) -> Result<Option<Person>> {
    self.store.get::<Person>(id).await.map_err(Error::store)
  }

  /// Persons matching `query`, in id order.
  pub async fn list_persons(&self, query: &PersonQuery) -> Result<Vec<Person>> {
    let mut persons = self.list_all::<Person>().await?;
    persons.retain(|p| {
      (!query.active_only || p.active)
        && query.text.as_deref().is_none_or(|text| p.matches_text(text))
    });
    Ok(persons)
  }

  // ── Absences ────────────────────────────────────────────────────────────

  pub async fn create_absence(&self, input: NewAbsence) -> Result<Absence> {
    let person = self.require::<Person>(input.person_id).await?;

    let mut absence = Absence {
      id:         0,
      person_id:  input.person_id,
      kind:       input.kind,
      start_date: input.start_date,
      end_date:   input.end_date,
      document:   clean_opt(input.document),
      note:       clean_opt(input.note),
      created_at: Utc::now(),
      created_by: self.actor.clone(),
    };

    let existing = self.list_all::<Absence>().await?;
    rules::validate_absence(&absence, &existing, None)
      .inspect_err(|e| reject(EntityKind::Absence, e))?;

    absence.id = self.next_id(Counter::Absence).await?;
    self.store.insert(absence.clone()).await.map_err(Error::store)?;

    let description = format!(
      "registered {} absence from {} to {} for {}",
      absence.kind,
      format_date_br(absence.start_date),
      format_date_br(absence.end_date),
      person.display_name()
    );
    self.audit(AuditAction::Create, &absence, None, Some(&absence), description).await?;
    Ok(absence)
  }

  pub async fn update_absence(&self, id: u64, patch: AbsencePatch) -> Result<Absence> {
    let before = self.require::<Absence>(id).await?;
    let mut absence = before.clone();
    patch.apply(&mut absence);
    absence.document = clean_opt(absence.document);
    absence.note = clean_opt(absence.note);

    if absence.person_id != before.person_id {
      self.require::<Person>(absence.person_id).await?;
    }

    let existing = self.list_all::<Absence>().await?;
    rules::validate_absence(&absence, &existing, Some(id))
      .inspect_err(|e| reject(EntityKind::Absence, e))?;

    self.replace(absence.clone()).await?;
    let description = format!("updated absence from {} to {}", before.kind, absence.kind);
    self.audit(AuditAction::Update, &absence, Some(&before), Some(&absence), description).await?;
    Ok(absence)
  }

  pub async fn delete_absence(&self, id: u64) -> Result<()> {
    let absence = self.require::<Absence>(id).await?;
    self.remove::<Absence>(id).await?;

    let owner = self.owner_label(absence.person_id).await?;
    let description = format!("removed {} absence of {owner}", absence.kind);
    self.audit(AuditAction::Delete, &absence, Some(&absence), None, description).await
  }

  pub async fn get_absence(&self, id: u64) -> Result<Option<Absence>> {
    self.store.get::<Absence>(id).await.map_err(Error::store)
  }

  /// Absences matching `query`, latest start first.
  pub async fn list_absences(&self, query: &AbsenceQuery) -> Result<Vec<Absence>> {
    let mut absences = self.list_all::<Absence>().await?;
    absences.retain(|a| {
      query.person_id.is_none_or(|id| a.person_id == id)
        && query.kind.is_none_or(|kind| a.kind == kind)
    });
    absences.sort_by(|a, b| latest_first(a.start_date, a.id, b.start_date, b.id));
    Ok(absences)
  }

  /// A person's absences, latest start first.
  pub async fn absences_for(&self, person_id: u64) -> Result<Vec<Absence>> {
    self
      .list_absences(&AbsenceQuery { person_id: Some(person_id), kind: None })
      .await
  }

  // ── Restrictions ────────────────────────────────────────────────────────

  pub async fn create_restriction(&self, input: NewRestriction) -> Result<Restriction> {
    let person = self.require::<Person>(input.person_id).await?;

    let codes = rules::validate_restriction(&input.codes, input.start_date, input.end_date)
      .inspect_err(|e| reject(EntityKind::Restriction, e))?;

    let restriction = Restriction {
      id: self.next_id(Counter::Restriction).await?,
      person_id: input.person_id,
      codes,
      start_date: input.start_date,
      end_date: input.end_date,
      total_days: inclusive_day_count(input.start_date, input.end_date),
      note: clean_opt(input.note),
      created_at: Utc::now(),
      created_by: self.actor.clone(),
    };
    self.store.insert(restriction.clone()).await.map_err(Error::store)?;

    let description = format!(
      "registered restriction {} from {} to {} for {}",
      restriction.codes_label(),
      format_date_br(restriction.start_date),
      format_date_br(restriction.end_date),
      person.display_name()
    );
    self
      .audit(AuditAction::Create, &restriction, None, Some(&restriction), description)
      .await?;
    Ok(restriction)
  }

  pub async fn update_restriction(&self, id: u64, patch: RestrictionPatch) -> Result<Restriction> {
    let before = self.require::<Restriction>(id).await?;

    let person_id = patch.person_id.unwrap_or(before.person_id);
    if person_id != before.person_id {
      self.require::<Person>(person_id).await?;
    }
    let start_date = patch.start_date.unwrap_or(before.start_date);
    let end_date = patch.end_date.unwrap_or(before.end_date);
    let raw_codes: Vec<String> = match patch.codes {
      Some(codes) => codes,
      None => before.codes.iter().map(ToString::to_string).collect(),
    };

    let codes = rules::validate_restriction(&raw_codes, start_date, end_date)
      .inspect_err(|e| reject(EntityKind::Restriction, e))?;

    let restriction = Restriction {
      person_id,
      codes,
      start_date,
      end_date,
      total_days: inclusive_day_count(start_date, end_date),
      note: match patch.note {
        Some(note) => clean_opt(note),
        None => before.note.clone(),
      },
      ..before.clone()
    };

    self.replace(restriction.clone()).await?;
    let description = format!(
      "updated restriction {} ({} days)",
      restriction.codes_label(),
      restriction.total_days
    );
    self
      .audit(AuditAction::Update, &restriction, Some(&before), Some(&restriction), description)
      .await?;
    Ok(restriction)
  }

  pub async fn delete_restriction(&self, id: u64) -> Result<()> {
    let restriction = self.require::<Restriction>(id).await?;
    self.remove::<Restriction>(id).await?;

    let owner = self.owner_label(restriction.person_id).await?;
    let description = format!("removed restriction {} of {owner}", restriction.codes_label());
    self
      .audit(AuditAction::Delete, &restriction, Some(&restriction), None, description)
      .await
  }

  pub async fn get_restriction(&self, id: u64) -> Result<Option<Restriction>> {
    self.store.get::<Restriction>(id).await.map_err(Error::store)
  }

  /// A person's restrictions, latest start first.
  pub async fn restrictions_for(&self, person_id: u64) -> Result<Vec<Restriction>> {
    let mut restrictions = self.list_all::<Restriction>().await?;
    restrictions.retain(|r| r.person_id == person_id);
    restrictions.sort_by(|a, b| latest_first(a.start_date, a.id, b.start_date, b.id));
    Ok(restrictions)
  }

  // ── Status ──────────────────────────────────────────────────────────────

  /// The operational status of `person_id` on `on`, from the store as it is
  /// right now.
  ///
  /// The person collection is not consulted: an unknown or deleted id has no
  /// records and therefore resolves to APTO.
  pub async fn derive_status(&self, person_id: u64, on: NaiveDate) -> Result<StatusResult> {
    let absences = self.absences_for(person_id).await?;
    let restrictions = self.restrictions_for(person_id).await?;
    Ok(resolve_status(&absences, &restrictions, on))
  }

  /// Status of every active person on `on`.
  pub async fn status_board(&self, on: NaiveDate) -> Result<StatusBoard> {
    let persons = self
      .list_persons(&PersonQuery { active_only: true, ..Default::default() })
      .await?;

    let mut entries = Vec::with_capacity(persons.len());
    for person in persons {
      let status = self.derive_status(person.id, on).await?;
      entries.push(PersonStatus { person, status });
    }
    Ok(StatusBoard::new(on, entries))
  }

  // ── Audit ───────────────────────────────────────────────────────────────

  /// Audit entries matching `query`, newest first.
  pub async fn audit_log(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>> {
    let mut entries = self.store.audit_entries().await.map_err(Error::store)?;
    entries.retain(|e| query.matches(e));
    Ok(entries)
  }

  // ── Internals ───────────────────────────────────────────────────────────

  async fn next_id(&self, counter: Counter) -> Result<u64> {
    self.store.next_id(counter).await.map_err(Error::store)
  }

  async fn list_all<R: Record>(&self) -> Result<Vec<R>> {
    self.store.list::<R>().await.map_err(Error::store)
  }

  async fn require<R: Record>(&self, id: u64) -> Result<R> {
    self
      .store
      .get::<R>(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(R::KIND, id))
  }

  async fn replace<R: Record>(&self, record: R) -> Result<()> {
    let id = record.id();
    if self.store.replace(record).await.map_err(Error::store)? {
      Ok(())
    } else {
      Err(Error::not_found(R::KIND, id))
    }
  }

  async fn remove<R: Record>(&self, id: u64) -> Result<()> {
    let removed = self
      .store
      .remove_where::<R, _>(move |r| r.id() == id)
      .await
      .map_err(Error::store)?;
    if removed == 0 {
      return Err(Error::not_found(R::KIND, id));
    }
    Ok(())
  }

  async fn owner_label(&self, person_id: u64) -> Result<String> {
    Ok(
      self
        .get_person(person_id)
        .await?
        .map(|p| p.display_name())
        .unwrap_or_else(|| format!("person {person_id}")),
    )
  }

  async fn audit<R: Record>(
    &self,
    action: AuditAction,
    record: &R,
    before: Option<&R>,
    after: Option<&R>,
    description: String,
  ) -> Result<()> {
    let entry = AuditEntry {
      id: self.next_id(Counter::Audit).await?,
      entity: R::KIND,
      entity_id: record.id(),
      action,
      actor: self.actor.clone(),
      timestamp: Utc::now(),
      before: before.map(serde_json::to_value).transpose()?,
      after: after.map(serde_json::to_value).transpose()?,
      description,
    };
    self.store.append_audit(entry).await.map_err(Error::store)?;
    info!(entity = %R::KIND, id = record.id(), %action, "recorded");
    Ok(())
  }
}

fn reject(kind: EntityKind, error: &Error) {
  warn!(entity = %kind, %error, "rejected");
}
