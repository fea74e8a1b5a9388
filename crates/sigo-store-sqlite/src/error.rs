//! Error type for `sigo-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored discriminant no longer names a known variant.
  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },

  #[error("id {0} does not fit in an SQLite integer")]
  IdOutOfRange(u64),

  #[error("negative id {0} in database")]
  NegativeId(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
