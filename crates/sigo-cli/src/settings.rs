//! Runtime settings: an optional TOML file, then `SIGO_*` environment
//! variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const DEFAULT_STORE_PATH: &str = "~/.local/share/sigo/sigo.db";
pub const DEFAULT_USER: &str = "capitao@4cia.pm";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database file. A leading `~` is expanded.
  pub store_path:   PathBuf,
  /// Identity stamped on created records and audit entries.
  pub current_user: String,
}

impl Settings {
  /// Load `file` (if it exists) layered under the environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", DEFAULT_STORE_PATH)?
      .set_default("current_user", DEFAULT_USER)?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("SIGO"))
      .build()
      .context("failed to read config file")?;

    let mut loaded: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    loaded.store_path = expand_tilde(&loaded.store_path);
    Ok(loaded)
  }

  /// Apply command-line overrides.
  pub fn with_overrides(mut self, store: Option<PathBuf>, user: Option<String>) -> Self {
    if let Some(path) = store {
      self.store_path = expand_tilde(&path);
    }
    if let Some(user) = user.filter(|u| !u.trim().is_empty()) {
      self.current_user = user.trim().to_owned();
    }
    self
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
