//! Absence (afastamento): a period during which a person is off duty.
//!
//! Absences for the same person never share a day; see
//! [`crate::rules::find_absence_overlap`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{audit::EntityKind, store::Record};

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
  EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum AbsenceType {
  Ferias,
  Medico,
  Licenca,
  Curso,
  Outros,
}

impl AbsenceType {
  pub fn label(self) -> &'static str {
    match self {
      Self::Ferias => "Férias",
      Self::Medico => "Médico",
      Self::Licenca => "Licença",
      Self::Curso => "Curso",
      Self::Outros => "Outros",
    }
  }
}

/// A stored absence. `start_date..=end_date` is an inclusive calendar range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
  pub id:         u64,
  pub person_id:  u64,
  #[serde(rename = "type")]
  pub kind:       AbsenceType,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  /// Supporting document reference, e.g. a medical certificate number.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub document:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note:       Option<String>,
  pub created_at: DateTime<Utc>,
  pub created_by: String,
}

impl Record for Absence {
  const KIND: EntityKind = EntityKind::Absence;

  fn id(&self) -> u64 { self.id }
}

/// Input to [`crate::Registry::create_absence`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAbsence {
  pub person_id:  u64,
  #[serde(rename = "type")]
  pub kind:       AbsenceType,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  #[serde(default)]
  pub document:   Option<String>,
  #[serde(default)]
  pub note:       Option<String>,
}

/// Partial update for [`crate::Registry::update_absence`].
///
/// The optional text fields use a nested `Option`: `Some(None)` clears the
/// stored value, `None` keeps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsencePatch {
  pub person_id:  Option<u64>,
  #[serde(rename = "type")]
  pub kind:       Option<AbsenceType>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub document:   Option<Option<String>>,
  pub note:       Option<Option<String>>,
}

impl AbsencePatch {
  pub(crate) fn apply(self, absence: &mut Absence) {
    if let Some(v) = self.person_id {
      absence.person_id = v;
    }
    if let Some(v) = self.kind {
      absence.kind = v;
    }
    if let Some(v) = self.start_date {
      absence.start_date = v;
    }
    if let Some(v) = self.end_date {
      absence.end_date = v;
    }
    if let Some(v) = self.document {
      absence.document = v;
    }
    if let Some(v) = self.note {
      absence.note = v;
    }
  }
}

/// Parameters for [`crate::Registry::list_absences`].
#[derive(Debug, Clone, Default)]
pub struct AbsenceQuery {
  pub person_id: Option<u64>,
  pub kind:      Option<AbsenceType>,
}
