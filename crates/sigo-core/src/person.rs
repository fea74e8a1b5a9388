//! Person: a registered member of the unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{audit::EntityKind, store::Record};

/// Military rank, lowest first.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Rank {
  /// Soldado.
  #[default]
  Sd,
  /// Cabo.
  Cb,
  /// Sargento.
  Sgt,
  /// Subtenente.
  St,
  /// Tenente.
  Ten,
  /// Capitão.
  Cap,
}

impl Rank {
  pub fn label(self) -> &'static str {
    match self {
      Self::Sd => "Soldado",
      Self::Cb => "Cabo",
      Self::Sgt => "Sargento",
      Self::St => "Subtenente",
      Self::Ten => "Tenente",
      Self::Cap => "Capitão",
    }
  }
}

/// A registered person. `registration_number` is unique across the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub id:                  u64,
  pub registration_number: String,
  pub full_name:           String,
  /// The name the person is known by on duty ("nome de guerra").
  pub short_name:          String,
  pub rank:                Rank,
  pub active:              bool,
  pub created_at:          DateTime<Utc>,
  pub created_by:          String,
}

impl Person {
  /// `SGT SILVA`-style label used in listings and audit descriptions.
  pub fn display_name(&self) -> String { format!("{} {}", self.rank, self.short_name) }

  /// Whether any of the identifying fields contains `needle`, ignoring case.
  pub fn matches_text(&self, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty()
      || [&self.registration_number, &self.short_name, &self.full_name]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
  }
}

impl Record for Person {
  const KIND: EntityKind = EntityKind::Person;

  fn id(&self) -> u64 { self.id }
}

/// Input to [`crate::Registry::create_person`].
/// `id`, `created_at` and `created_by` are always assigned by the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
  pub registration_number: String,
  pub full_name:           String,
  pub short_name:          String,
  pub rank:                Rank,
  #[serde(default = "default_active")]
  pub active:              bool,
}

fn default_active() -> bool { true }

/// Partial update for [`crate::Registry::update_person`]; `None` keeps the
/// stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPatch {
  pub registration_number: Option<String>,
  pub full_name:           Option<String>,
  pub short_name:          Option<String>,
  pub rank:                Option<Rank>,
  pub active:              Option<bool>,
}

impl PersonPatch {
  pub(crate) fn apply(self, person: &mut Person) {
    if let Some(v) = self.registration_number {
      person.registration_number = v;
    }
    if let Some(v) = self.full_name {
      person.full_name = v;
    }
    if let Some(v) = self.short_name {
      person.short_name = v;
    }
    if let Some(v) = self.rank {
      person.rank = v;
    }
    if let Some(v) = self.active {
      person.active = v;
    }
  }
}

/// Parameters for [`crate::Registry::list_persons`].
#[derive(Debug, Clone, Default)]
pub struct PersonQuery {
  /// Case-insensitive substring over registration number, short and full name.
  pub text:        Option<String>,
  pub active_only: bool,
}
