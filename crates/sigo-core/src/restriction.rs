//! Restriction (restrição): a period of duty with functional limitations.
//!
//! Unlike absences, restrictions for the same person may overlap: they stack.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{audit::EntityKind, store::Record};

// ─── Code catalog ────────────────────────────────────────────────────────────

/// The closed catalog of 43 restriction codes.
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
pub enum RestrictionCode {
  Aa,
  Ab,
  Ac,
  Ad,
  Ae,
  Af,
  Ag,
  Ah,
  Ai,
  Aj,
  Cf,
  Cm,
  Cp,
  Dc,
  Di,
  Ec,
  Ef,
  Em,
  Es,
  Fa,
  Ff,
  Fv,
  Lp,
  Me,
  Mo,
  Pc,
  Pe,
  Pi,
  Po,
  Pv,
  Rc,
  Rd,
  Rp,
  Se,
  Sp,
  Sv,
  Tf,
  Tp,
  Tr,
  Ua,
  Uu,
  Vb,
  Vp,
}

impl RestrictionCode {
  pub fn description(self) -> &'static str {
    match self {
      Self::Aa => "Afastamento de armas de fogo",
      Self::Ab => "Afastamento de atividades de busca",
      Self::Ac => "Afastamento de condução de veículos",
      Self::Ad => "Afastamento de digitação",
      Self::Ae => "Afastamento de esforço físico",
      Self::Af => "Afastamento de atividades físicas",
      Self::Ag => "Afastamento de atividades gerais",
      Self::Ah => "Afastamento de atividades em altura",
      Self::Ai => "Afastamento de atividades insalubres",
      Self::Aj => "Afastamento de jornada noturna",
      Self::Cf => "Comparecimento para fisioterapia",
      Self::Cm => "Comparecimento médico",
      Self::Cp => "Comparecimento para psicoterapia",
      Self::Dc => "Dispensa de corrida",
      Self::Di => "Dispensa de instrução",
      Self::Ec => "Evitar condução",
      Self::Ef => "Educação Física",
      Self::Em => "Evitar marcha",
      Self::Es => "Evitar sol",
      Self::Fa => "Flexibilização de atividades",
      Self::Ff => "Flexibilização de função",
      Self::Fv => "Fardamento voluntário",
      Self::Lp => "Limitação de permanência em pé",
      Self::Me => "Medicação em uso",
      Self::Mo => "Movimentação reduzida",
      Self::Pc => "Proibido carregar peso",
      Self::Pe => "Proibido esforço",
      Self::Pi => "Proibido instrução",
      Self::Po => "Policiamento",
      Self::Pv => "Proibido viagem",
      Self::Rc => "Restrição de carga",
      Self::Rd => "Repouso domiciliar",
      Self::Rp => "Restrição parcial",
      Self::Se => "Serviço externo",
      Self::Sp => "Serviço de permanência",
      Self::Sv => "Serviço voluntário",
      Self::Tf => "Tratamento fisioterápico",
      Self::Tp => "Tratamento psicológico",
      Self::Tr => "Treinamento restrito",
      Self::Ua => "Uso de aparelho ortopédico",
      Self::Uu => "Uso de uniforme",
      Self::Vb => "Vedado atividade burocrática",
      Self::Vp => "Vedado policiamento",
    }
  }
}

/// Split a free-text code list (`"EF, LP; po sp"`) into upper-cased tokens.
///
/// Tokens are not checked against the catalog here; that is the job of
/// [`crate::rules::validate_codes`], which reports the first unknown one.
pub fn parse_codes(text: &str) -> Vec<String> {
  text
    .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_uppercase)
    .collect()
}

// ─── Restriction ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restriction {
  pub id:         u64,
  pub person_id:  u64,
  /// Never empty. Order is preserved as entered.
  pub codes:      Vec<RestrictionCode>,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  /// Inclusive day count of `start_date..=end_date`; always computed by the
  /// registry.
  pub total_days: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note:       Option<String>,
  pub created_at: DateTime<Utc>,
  pub created_by: String,
}

impl Restriction {
  /// `EF, LP, PO`.
  pub fn codes_label(&self) -> String {
    self
      .codes
      .iter()
      .map(ToString::to_string)
      .collect::<Vec<_>>()
      .join(", ")
  }
}

impl Record for Restriction {
  const KIND: EntityKind = EntityKind::Restriction;

  fn id(&self) -> u64 { self.id }
}

/// Input to [`crate::Registry::create_restriction`].
///
/// Codes arrive as raw tokens and are checked against the catalog on
/// submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestriction {
  pub person_id:  u64,
  pub codes:      Vec<String>,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  /// Ignored. Accepted so client payloads that carry it still deserialise;
  /// the stored value is recomputed from the dates.
  #[serde(default)]
  pub total_days: Option<i64>,
  #[serde(default)]
  pub note:       Option<String>,
}

/// Partial update for [`crate::Registry::update_restriction`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionPatch {
  pub person_id:  Option<u64>,
  pub codes:      Option<Vec<String>>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  /// Ignored, as on [`NewRestriction`].
  pub total_days: Option<i64>,
  pub note:       Option<Option<String>>,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn catalog_has_43_codes() {
    assert_eq!(RestrictionCode::iter().count(), 43);
    assert_eq!(RestrictionCode::iter().next(), Some(RestrictionCode::Aa));
    assert_eq!(RestrictionCode::iter().last(), Some(RestrictionCode::Vp));
  }

  #[test]
  fn codes_round_trip_through_text() {
    for code in RestrictionCode::iter() {
      let text = code.to_string();
      assert_eq!(text.len(), 2);
      assert_eq!(RestrictionCode::from_str(&text).unwrap(), code);
      assert!(!code.description().is_empty());
    }
    assert_eq!(RestrictionCode::from_str("ef").unwrap(), RestrictionCode::Ef);
    assert!(RestrictionCode::from_str("ZZ").is_err());
  }

  #[test]
  fn parse_codes_splits_and_normalises() {
    assert_eq!(parse_codes("EF, lp;PO  sp"), vec!["EF", "LP", "PO", "SP"]);
    assert_eq!(parse_codes(" , ;"), Vec::<String>::new());
    assert_eq!(parse_codes("ef,ef"), vec!["EF", "EF"]);
  }
}
