//! Loading app configuration (upstream fallbacks + form defaults) from TOML.
//!
//! See `AppConfig` for the expected schema. The `API_URL` / `API_KEY`
//! environment variables override `[upstream]` and are read per request in
//! `upstream.rs`, not here.

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub upstream: UpstreamSettings,
  #[serde(default)]
  pub form: FormDefaults,
}

/// Where submissions and status lookups are forwarded, and with which token.
/// An empty `api_key` means the Authorization header is omitted entirely.
#[derive(Clone, Debug, Deserialize)]
pub struct UpstreamSettings {
  #[serde(default = "default_api_url")]
  pub api_url: String,
  #[serde(default)]
  pub api_key: String,
}

impl Default for UpstreamSettings {
  fn default() -> Self {
    Self { api_url: default_api_url(), api_key: String::new() }
  }
}

fn default_api_url() -> String {
  "http://localhost:3000".into()
}

/// Defaults the form editor starts from. `default_quantity` is also the
/// fallback when the quantity field does not parse as a positive integer.
#[derive(Clone, Debug, Deserialize)]
pub struct FormDefaults {
  #[serde(default = "default_quantity")]
  pub default_quantity: u32,
}

impl Default for FormDefaults {
  fn default() -> Self {
    Self { default_quantity: default_quantity() }
  }
}

fn default_quantity() -> u32 {
  5
}

/// Attempt to load `AppConfig` from GESTOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("GESTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "gestor_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "gestor_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "gestor_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_toml_yields_defaults() {
    let cfg: AppConfig = toml::from_str("").expect("parse");
    assert_eq!(cfg.upstream.api_url, "http://localhost:3000");
    assert!(cfg.upstream.api_key.is_empty());
    assert_eq!(cfg.form.default_quantity, 5);
  }

  #[test]
  fn sections_override_individually() {
    let cfg: AppConfig = toml::from_str(
      "[upstream]\napi_url = \"https://tasks.example.com\"\n\n[form]\ndefault_quantity = 10\n",
    )
    .expect("parse");
    assert_eq!(cfg.upstream.api_url, "https://tasks.example.com");
    assert!(cfg.upstream.api_key.is_empty());
    assert_eq!(cfg.form.default_quantity, 10);
  }
}
