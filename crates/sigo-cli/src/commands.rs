//! Subcommand dispatch. Each command returns the text to print.

use anyhow::Context as _;
use serde::Serialize;
use sigo_core::{
  Error, Registry,
  absence::{AbsencePatch, AbsenceQuery, NewAbsence},
  audit::{AuditQuery, EntityKind},
  date::today,
  person::{NewPerson, PersonPatch, PersonQuery},
  restriction::{NewRestriction, RestrictionCode, RestrictionPatch, parse_codes},
  store::RecordStore,
};
use strum::IntoEnumIterator;

use crate::{AbsenceCommand, Command, PersonCommand, RestrictionCommand, display};

/// Renders either as pretty JSON or through a table function.
fn render<T: Serialize + ?Sized>(
  json: bool,
  value: &T,
  table: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
  if json {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
  } else {
    Ok(table(value))
  }
}

fn done(json: bool, what: &str, id: u64) -> String {
  if json {
    format!("{}\n", serde_json::json!({ "deleted": what, "id": id }))
  } else {
    format!("removed {what} {id}\n")
  }
}

pub async fn run<S: RecordStore>(
  registry: &Registry<S>,
  command: Command,
  json: bool,
) -> anyhow::Result<String> {
  match command {
    Command::Person(cmd) => person(registry, cmd, json).await,
    Command::Absence(cmd) => absence(registry, cmd, json).await,
    Command::Restriction(cmd) => restriction(registry, cmd, json).await,
    Command::Status { person, on } => {
      let result = registry.derive_status(person, on.unwrap_or_else(today)).await?;
      render(json, &result, display::status)
    }
    Command::Board { on } => {
      let board = registry.status_board(on.unwrap_or_else(today)).await?;
      render(json, &board, display::board)
    }
    Command::Audit { entity, from, until, actor } => {
      let entries = registry
        .audit_log(&AuditQuery { entity, from, until, actor })
        .await?;
      render(json, entries.as_slice(), display::audit)
    }
    Command::Codes => {
      if json {
        let catalog: Vec<_> = RestrictionCode::iter()
          .map(|c| serde_json::json!({ "code": c, "description": c.description() }))
          .collect();
        Ok(format!("{}\n", serde_json::to_string_pretty(&catalog)?))
      } else {
        Ok(display::codes())
      }
    }
  }
}

// ─── Persons ─────────────────────────────────────────────────────────────────

async fn person<S: RecordStore>(
  registry: &Registry<S>,
  command: PersonCommand,
  json: bool,
) -> anyhow::Result<String> {
  match command {
    PersonCommand::Add { registration_number, full_name, short_name, rank, inactive } => {
      let p = registry
        .create_person(NewPerson {
          registration_number,
          full_name,
          short_name,
          rank,
          active: !inactive,
        })
        .await?;
      render(json, &p, display::person)
    }
    PersonCommand::Edit { id, registration_number, full_name, short_name, rank, active } => {
      let p = registry
        .update_person(id, PersonPatch {
          registration_number,
          full_name,
          short_name,
          rank,
          active,
        })
        .await?;
      render(json, &p, display::person)
    }
    PersonCommand::Rm { id } => {
      registry.delete_person(id).await?;
      Ok(done(json, "person", id))
    }
    PersonCommand::List { text, active_only } => {
      let persons = registry.list_persons(&PersonQuery { text, active_only }).await?;
      render(json, persons.as_slice(), display::persons)
    }
    PersonCommand::Show { id, on } => {
      let p = registry
        .get_person(id)
        .await?
        .ok_or(Error::NotFound { kind: EntityKind::Person, id })?;
      let on = on.unwrap_or_else(today);
      let status = registry.derive_status(id, on).await?;
      let absences = registry.absences_for(id).await?;
      let restrictions = registry.restrictions_for(id).await?;

      if json {
        let value = serde_json::json!({
          "person": p,
          "referenceDate": on,
          "status": status,
          "absences": absences,
          "restrictions": restrictions,
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&value)?));
      }

      Ok(format!(
        "{}  status: {}\nAbsences\n{}\nRestrictions\n{}",
        display::person(&p),
        display::status(&status),
        display::absences(&absences),
        display::restrictions(&restrictions),
      ))
    }
  }
}

// ─── Absences ────────────────────────────────────────────────────────────────

async fn absence<S: RecordStore>(
  registry: &Registry<S>,
  command: AbsenceCommand,
  json: bool,
) -> anyhow::Result<String> {
  match command {
    AbsenceCommand::Add { person, fields } => {
      let a = registry
        .create_absence(NewAbsence {
          person_id:  person,
          kind:       fields.kind.context("--type is required")?,
          start_date: fields.from.context("--from is required")?,
          end_date:   fields.until.context("--until is required")?,
          document:   fields.document,
          note:       fields.note,
        })
        .await?;
      render(json, std::slice::from_ref(&a), display::absences)
    }
    AbsenceCommand::Edit { id, person, fields } => {
      let a = registry
        .update_absence(id, AbsencePatch {
          person_id:  person,
          kind:       fields.kind,
          start_date: fields.from,
          end_date:   fields.until,
          document:   fields.document.map(Some),
          note:       fields.note.map(Some),
        })
        .await?;
      render(json, std::slice::from_ref(&a), display::absences)
    }
    AbsenceCommand::Rm { id } => {
      registry.delete_absence(id).await?;
      Ok(done(json, "absence", id))
    }
    AbsenceCommand::List { person, kind } => {
      let absences = registry
        .list_absences(&AbsenceQuery { person_id: person, kind })
        .await?;
      render(json, absences.as_slice(), display::absences)
    }
  }
}

// ─── Restrictions ────────────────────────────────────────────────────────────

async fn restriction<S: RecordStore>(
  registry: &Registry<S>,
  command: RestrictionCommand,
  json: bool,
) -> anyhow::Result<String> {
  match command {
    RestrictionCommand::Add { person, fields } => {
      let r = registry
        .create_restriction(NewRestriction {
          person_id:  person,
          codes:      parse_codes(fields.codes.as_deref().unwrap_or_default()),
          start_date: fields.from.context("--from is required")?,
          end_date:   fields.until.context("--until is required")?,
          total_days: None,
          note:       fields.note,
        })
        .await?;
      render(json, std::slice::from_ref(&r), display::restrictions)
    }
    RestrictionCommand::Edit { id, person, fields } => {
      let r = registry
        .update_restriction(id, RestrictionPatch {
          person_id:  person,
          codes:      fields.codes.as_deref().map(parse_codes),
          start_date: fields.from,
          end_date:   fields.until,
          total_days: None,
          note:       fields.note.map(Some),
        })
        .await?;
      render(json, std::slice::from_ref(&r), display::restrictions)
    }
    RestrictionCommand::Rm { id } => {
      registry.delete_restriction(id).await?;
      Ok(done(json, "restriction", id))
    }
  }
}
