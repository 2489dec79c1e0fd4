//! Application state shared by HTTP and WebSocket handlers.
//!
//! This is intentionally small: the form state itself lives inside each
//! WebSocket connection (see `routes::ws`), so the shared state is just the
//! upstream client and the form defaults.

use tracing::{info, instrument};

use crate::config::{load_app_config_from_env, AppConfig, FormDefaults};
use crate::upstream::Upstream;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Upstream,
    pub defaults: FormDefaults,
}

impl AppState {
    /// Build state from env: load the optional TOML config and report what
    /// the upstream client will fall back to when API_URL/API_KEY are unset.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();

        if cfg.upstream.api_key.is_empty() && std::env::var("API_KEY").is_err() {
            info!(target: "gestor_backend", "No API key configured; upstream calls go out without Authorization");
        } else {
            info!(target: "gestor_backend", "API key configured for upstream calls");
        }
        info!(
            target: "gestor_backend",
            fallback_api_url = %cfg.upstream.api_url,
            default_quantity = cfg.form.default_quantity,
            "Upstream + form configuration loaded"
        );

        Self::with_config(cfg)
    }

    /// Build state from an explicit config (used by tests to point the
    /// upstream client at a stub server).
    pub fn with_config(cfg: AppConfig) -> Self {
        Self {
            upstream: Upstream::new(cfg.upstream),
            defaults: cfg.form,
        }
    }
}
