//! Error types for `sigo-core`.
//!
//! Every variant is a recoverable, caller-facing rejection except
//! [`Error::Store`] and [`Error::Serialization`], which wrap backend failures.

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{absence::Absence, audit::EntityKind, date::format_date_br};

// ─── Field errors ────────────────────────────────────────────────────────────

/// Validation messages keyed by input field name.
///
/// Collected across all fields before being returned so a form can show every
/// problem at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.insert(field, message.into());
  }

  pub fn get(&self, field: &str) -> Option<&str> {
    self.0.get(field).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
    self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
  }

  /// `Ok(())` when no field failed, otherwise
  /// [`Error::RequiredFieldsMissing`] carrying every message.
  pub fn into_result(self) -> Result<()> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(Error::RequiredFieldsMissing(self))
    }
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "missing required fields: ")?;
    for (i, field) in self.0.keys().enumerate() {
      if i > 0 {
        write!(f, ", ")?;
      }
      write!(f, "{field}")?;
    }
    Ok(())
  }
}

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  RequiredFieldsMissing(FieldErrors),

  #[error("registration number {0:?} is already registered")]
  DuplicateRegistrationNumber(String),

  #[error("end date {end} must be on or after start date {start}")]
  InvalidDateRange { start: NaiveDate, end: NaiveDate },

  #[error(
    "a {} absence from {} to {} already exists for this person",
    .0.kind,
    format_date_br(.0.start_date),
    format_date_br(.0.end_date)
  )]
  OverlapConflict(Box<Absence>),

  #[error("at least one restriction code is required")]
  EmptyCodeSet,

  #[error("unknown restriction code: {0:?}")]
  InvalidCode(String),

  #[error("{kind} {id} not found")]
  NotFound { kind: EntityKind, id: u64 },

  #[error("invalid calendar date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),

  #[error("date arithmetic out of range")]
  DateOutOfRange,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn not_found(kind: EntityKind, id: u64) -> Self {
    Self::NotFound { kind, id }
  }

  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// The input field a field-level rejection should be shown against.
  ///
  /// `None` for rejections that are not tied to a single field (conflicts,
  /// missing records, backend failures). Required-field failures carry their
  /// own per-field map instead.
  pub fn field(&self) -> Option<&'static str> {
    match self {
      Self::DuplicateRegistrationNumber(_) => Some("registrationNumber"),
      Self::InvalidDateRange { .. } => Some("endDate"),
      Self::EmptyCodeSet | Self::InvalidCode(_) => Some("codes"),
      _ => None,
    }
  }

  /// Whether this rejection is a collision with an existing record.
  pub fn is_conflict(&self) -> bool { matches!(self, Self::OverlapConflict(_)) }

  /// The existing record a conflict collided with.
  pub fn conflicting_absence(&self) -> Option<&Absence> {
    match self {
      Self::OverlapConflict(existing) => Some(existing),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
