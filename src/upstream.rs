//! Minimal client for the external task-management API.
//!
//! We only call two endpoints: `POST /api/sources` (create source + tasks)
//! and `GET /api/tasks/{id}` (status lookup). Responses are relayed as
//! `(status, body)` pairs; the caller decides how to map non-2xx bodies.
//!
//! NOTE: We never log the API key and we keep payload truncations short.
//! There is deliberately no request timeout and no retry: each call is
//! forwarded at most once and runs to completion or failure.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::UpstreamSettings;
use crate::util::trunc_for_log;

#[derive(Clone)]
pub struct Upstream {
  client: reqwest::Client,
  fallback: UpstreamSettings,
}

impl Upstream {
  pub fn new(fallback: UpstreamSettings) -> Self {
    Self { client: reqwest::Client::new(), fallback }
  }

  /// Resolve settings at call time: env wins over the TOML fallback, which
  /// wins over the built-in default.
  fn settings(&self) -> UpstreamSettings {
    let api_url = std::env::var("API_URL")
      .ok()
      .filter(|v| !v.is_empty())
      .unwrap_or_else(|| self.fallback.api_url.clone());
    let api_key = std::env::var("API_KEY")
      .ok()
      .filter(|v| !v.is_empty())
      .unwrap_or_else(|| self.fallback.api_key.clone());
    UpstreamSettings { api_url, api_key }
  }

  /// POST the submission payload verbatim to `{API_URL}/api/sources`.
  #[instrument(level = "info", skip(self, payload))]
  pub async fn create_source(&self, payload: &Value) -> Result<(u16, Value), String> {
    let settings = self.settings();
    let url = format!("{}/api/sources", settings.api_url);
    info!(
      target: "upstream",
      %url,
      payload = %trunc_for_log(&payload.to_string(), 120),
      "Enviando solicitud a la API externa"
    );

    let mut req = self
      .client
      .post(&url)
      .header(USER_AGENT, "gestor-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(payload);
    if !settings.api_key.is_empty() {
      req = req.header(AUTHORIZATION, format!("Bearer {}", settings.api_key));
    }

    let res = req.send().await.map_err(|e| e.to_string())?;
    let status = res.status().as_u16();
    let body: Value = res.json().await.map_err(|e| e.to_string())?;
    info!(target: "upstream", %status, "Respuesta de /api/sources");
    Ok((status, body))
  }

  /// GET `{API_URL}/api/tasks/{task_id}`.
  #[instrument(level = "info", skip(self), fields(%task_id))]
  pub async fn task_status(&self, task_id: &str) -> Result<(u16, Value), String> {
    let settings = self.settings();
    let url = format!("{}/api/tasks/{}", settings.api_url, task_id);
    info!(target: "upstream", %url, "Consultando estado de task");

    let mut req = self
      .client
      .get(&url)
      .header(USER_AGENT, "gestor-backend/0.1")
      .header(CONTENT_TYPE, "application/json");
    if !settings.api_key.is_empty() {
      req = req.header(AUTHORIZATION, format!("Bearer {}", settings.api_key));
    }

    let res = req.send().await.map_err(|e| e.to_string())?;
    let status = res.status().as_u16();
    let body: Value = res.json().await.map_err(|e| e.to_string())?;
    info!(target: "upstream", %status, "Respuesta de /api/tasks");
    Ok((status, body))
  }
}

/// Try to extract a clean error message from an upstream error body.
pub fn extract_error(body: &Value) -> Option<String> {
  body.get("error").and_then(Value::as_str).map(str::to_string)
}
