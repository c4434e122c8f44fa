//! Connection settings for the backend API.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }

fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// API root, including the version prefix.
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url:     default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl ApiConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      ..Self::default()
    }
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}
