//! Plain-text rendering of register data.

use std::fmt::Write as _;

use sigo_core::{
  absence::Absence,
  audit::AuditEntry,
  date::format_date_br,
  person::Person,
  restriction::{Restriction, RestrictionCode},
  status::{OperationalStatus, StatusBoard, StatusResult},
};
use strum::IntoEnumIterator;

// ─── Table ───────────────────────────────────────────────────────────────────

/// Left-aligned columns padded to the widest cell.
pub struct Table {
  header: Vec<&'static str>,
  rows:   Vec<Vec<String>>,
}

impl Table {
  pub fn new(header: &[&'static str]) -> Self {
    Self { header: header.to_vec(), rows: Vec::new() }
  }

  pub fn row(&mut self, cells: Vec<String>) { self.rows.push(cells); }

  pub fn render(&self) -> String {
    let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
    for row in &self.rows {
      for (w, cell) in widths.iter_mut().zip(row) {
        *w = (*w).max(cell.chars().count());
      }
    }

    let mut out = String::new();
    let header: Vec<String> = self.header.iter().map(|h| (*h).to_owned()).collect();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &self.rows {
      push_line(&mut out, row, &widths);
    }
    out
  }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
  let last = cells.len().saturating_sub(1);
  for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
    if i == last {
      out.push_str(cell);
    } else {
      let pad = width.saturating_sub(cell.chars().count());
      let _ = write!(out, "{cell}{}  ", " ".repeat(pad));
    }
  }
  out.push('\n');
}

// ─── Records ─────────────────────────────────────────────────────────────────

fn opt(text: Option<&str>) -> String { text.unwrap_or("-").to_owned() }

pub fn persons(persons: &[Person]) -> String {
  let mut table = Table::new(&["ID", "RE", "RANK", "SHORT NAME", "FULL NAME", "ACTIVE"]);
  for p in persons {
    table.row(vec![
      p.id.to_string(),
      p.registration_number.clone(),
      p.rank.to_string(),
      p.short_name.clone(),
      p.full_name.clone(),
      if p.active { "yes" } else { "no" }.to_owned(),
    ]);
  }
  table.render()
}

pub fn person(p: &Person) -> String {
  format!(
    "{} (#{})\n  registration: {}\n  full name:    {}\n  rank:         {}\n  active:       {}\n  created:      {} by {}\n",
    p.display_name(),
    p.id,
    p.registration_number,
    p.full_name,
    p.rank.label(),
    if p.active { "yes" } else { "no" },
    p.created_at.format("%d/%m/%Y %H:%M"),
    p.created_by,
  )
}

pub fn absences(absences: &[Absence]) -> String {
  let mut table = Table::new(&["ID", "PERSON", "TYPE", "FROM", "UNTIL", "DOCUMENT", "NOTE"]);
  for a in absences {
    table.row(vec![
      a.id.to_string(),
      a.person_id.to_string(),
      a.kind.to_string(),
      format_date_br(a.start_date),
      format_date_br(a.end_date),
      opt(a.document.as_deref()),
      opt(a.note.as_deref()),
    ]);
  }
  table.render()
}

pub fn restrictions(restrictions: &[Restriction]) -> String {
  let mut table = Table::new(&["ID", "PERSON", "CODES", "FROM", "UNTIL", "DAYS", "NOTE"]);
  for r in restrictions {
    table.row(vec![
      r.id.to_string(),
      r.person_id.to_string(),
      r.codes_label(),
      format_date_br(r.start_date),
      format_date_br(r.end_date),
      r.total_days.to_string(),
      opt(r.note.as_deref()),
    ]);
  }
  table.render()
}

// ─── Status ──────────────────────────────────────────────────────────────────

fn status_cause(result: &StatusResult) -> String {
  if let Some(a) = &result.active_absence {
    return format!(
      "{} {} to {}",
      a.kind.label(),
      format_date_br(a.start_date),
      format_date_br(a.end_date)
    );
  }
  if let Some(r) = &result.active_restriction {
    return format!(
      "{} {} to {}",
      r.codes_label(),
      format_date_br(r.start_date),
      format_date_br(r.end_date)
    );
  }
  String::new()
}

pub fn status(result: &StatusResult) -> String {
  match result.status {
    OperationalStatus::Apto => format!("{}\n", result.status),
    _ => format!("{} ({})\n", result.status, status_cause(result)),
  }
}

pub fn board(board: &StatusBoard) -> String {
  let mut out = format!("Status on {}\n\n", format_date_br(board.reference_date));

  let mut table = Table::new(&["ID", "NAME", "STATUS", "CAUSE"]);
  for entry in &board.entries {
    table.row(vec![
      entry.person.id.to_string(),
      entry.person.display_name(),
      entry.status.status.to_string(),
      status_cause(&entry.status),
    ]);
  }
  out.push_str(&table.render());

  let s = &board.summary;
  let _ = writeln!(
    out,
    "\ntotal {}  apto {}  com restrição {}  afastado {}",
    s.total, s.apto, s.apto_com_restricao, s.afastado
  );
  for (kind, count) in &board.absences_by_type {
    let _ = writeln!(out, "  {}: {count}", kind.label());
  }
  out
}

// ─── Audit ───────────────────────────────────────────────────────────────────

pub fn audit(entries: &[AuditEntry]) -> String {
  let mut table = Table::new(&["WHEN", "ACTOR", "ACTION", "ENTITY", "DESCRIPTION"]);
  for e in entries {
    table.row(vec![
      e.timestamp
        .with_timezone(&chrono::Local)
        .format("%d/%m/%Y %H:%M")
        .to_string(),
      e.actor.clone(),
      e.action.to_string(),
      format!("{} #{}", e.entity, e.entity_id),
      e.description.clone(),
    ]);
  }
  table.render()
}

pub fn codes() -> String {
  let mut table = Table::new(&["CODE", "DESCRIPTION"]);
  for code in RestrictionCode::iter() {
    table.row(vec![code.to_string(), code.description().to_owned()]);
  }
  table.render()
}
