//! Layered configuration: TOML file, then `TTC_*` environment variables,
//! then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use ttc_client::{
  ApiConfig,
  config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS},
};

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }

fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Where the bearer token is persisted between runs.
  #[serde(default)]
  pub token_path:   Option<PathBuf>,
}

impl Settings {
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("TTC"))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn api(&self) -> ApiConfig {
    ApiConfig {
      base_url:     self.base_url.clone(),
      timeout_secs: self.timeout_secs,
    }
  }

  pub fn token_path(&self) -> PathBuf {
    self.token_path.clone().unwrap_or_else(default_token_path)
  }
}

/// `<config_dir>/ttc/config.toml`, or `./ttc.toml` when there is no config
/// directory.
pub fn default_config_path() -> PathBuf {
  dirs::config_dir()
    .map(|dir| dir.join("ttc").join("config.toml"))
    .unwrap_or_else(|| PathBuf::from("ttc.toml"))
}

fn default_token_path() -> PathBuf {
  dirs::data_dir()
    .map(|dir| dir.join("ttc").join("token"))
    .unwrap_or_else(|| PathBuf::from(".ttc-token"))
}
