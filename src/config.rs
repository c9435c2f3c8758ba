use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheOptions, DEFAULT_IDLE_DELAY, DEFAULT_MAX_DELAY, MAX_CACHE_SIZE};

/// Environment variable overriding `api.url`.
pub const API_URL_ENV: &str = "RBIBLIA_API_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Display locale; content endpoints are scoped by it
  #[serde(default = "default_locale")]
  pub locale: String,
  /// Translation opened when none is given on the command line
  pub default_translation: Option<String>,
  #[serde(default)]
  pub cache: CacheConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig::default(),
      locale: default_locale(),
      default_translation: None,
      cache: CacheConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the content API (the `/api/...` paths are appended)
  #[serde(default = "default_api_url")]
  pub url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: default_api_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Chapters kept in memory before the oldest is evicted
  pub max_entries: usize,
  /// Upper bound on how long a prefetch may wait for an idle runtime
  pub prefetch_max_delay_ms: u64,
  pub idle_delay_ms: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      max_entries: MAX_CACHE_SIZE,
      prefetch_max_delay_ms: DEFAULT_MAX_DELAY.as_millis() as u64,
      idle_delay_ms: DEFAULT_IDLE_DELAY.as_millis() as u64,
    }
  }
}

impl CacheConfig {
  pub fn options(&self) -> CacheOptions {
    CacheOptions {
      capacity: self.max_entries,
      idle_delay: Duration::from_millis(self.idle_delay_ms),
      prefetch_max_delay: Duration::from_millis(self.prefetch_max_delay_ms),
    }
  }
}

fn default_locale() -> String {
  "pl".to_string()
}

fn default_api_url() -> String {
  "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./rbiblia.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/rbiblia/config.yaml
  ///
  /// Falls back to defaults when no file is found. `RBIBLIA_API_URL`
  /// overrides the API URL in every case.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
      config.api.url = url;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("rbiblia.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("rbiblia").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full() {
    let config = Config::parse(
      r#"
api:
  url: https://example.org
  timeout_secs: 3
locale: en
default_translation: en_kjv
cache:
  max_entries: 10
  prefetch_max_delay_ms: 500
  idle_delay_ms: 20
"#,
    )
    .unwrap();

    assert_eq!(config.api.url, "https://example.org");
    assert_eq!(config.api.timeout_secs, 3);
    assert_eq!(config.locale, "en");
    assert_eq!(config.default_translation.as_deref(), Some("en_kjv"));

    let options = config.cache.options();
    assert_eq!(options.capacity, 10);
    assert_eq!(options.prefetch_max_delay, Duration::from_millis(500));
    assert_eq!(options.idle_delay, Duration::from_millis(20));
  }

  #[test]
  fn test_parse_defaults() {
    let config = Config::parse("default_translation: pl_ubg").unwrap();
    assert_eq!(config.locale, "pl");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.cache.options(), CacheOptions::default());
  }

  #[test]
  fn test_partial_cache_section() {
    let config = Config::parse("cache:\n  max_entries: 5\n").unwrap();
    assert_eq!(config.cache.max_entries, 5);
    assert_eq!(config.cache.prefetch_max_delay_ms, 2000);
  }

  #[test]
  fn test_missing_explicit_path() {
    let result = Config::load(Some(Path::new("/nonexistent/rbiblia.yaml")));
    assert!(result.is_err());
  }
}
