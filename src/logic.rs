//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Request-shape validation for the submission body
//!   - Forwarding to the upstream API and mapping its outcome into a relay
//!   - Typed summaries of relayed bodies for structured display

use serde_json::{json, Value};
use tracing::{error, instrument};

use crate::domain::{SourceCreated, StatusTone, SubmissionResponse, TaskStatus};
use crate::state::AppState;
use crate::upstream::extract_error;

/// What a forwarder hands back to its caller: the status code and the JSON
/// body to relay to the browser.
#[derive(Clone, Debug)]
pub struct Relay {
  pub status: u16,
  pub body: Value,
}

fn is_ok(status: u16) -> bool {
  (200..300).contains(&status)
}

/// Boundary check for the submission body: `source_base64` and `format`
/// must be non-empty strings and `tasks` must be an array.
pub fn submission_shape_ok(body: &Value) -> bool {
  let non_empty_str = |key: &str| {
    body
      .get(key)
      .and_then(Value::as_str)
      .map(|s| !s.is_empty())
      .unwrap_or(false)
  };
  non_empty_str("source_base64")
    && non_empty_str("format")
    && body.get("tasks").map(Value::is_array).unwrap_or(false)
}

/// Forward a submission body verbatim and map the outcome:
/// 2xx → status + body unchanged; other statuses → status + extracted error;
/// transport/parse failure → 500. At most one attempt, never a retry.
#[instrument(level = "info", skip_all)]
pub async fn forward_submission(state: &AppState, payload: &Value) -> Relay {
  match state.upstream.create_source(payload).await {
    Ok((status, body)) => {
      if is_ok(status) {
        Relay { status, body }
      } else {
        let message = extract_error(&body).unwrap_or_else(|| "Error de la API externa".into());
        error!(target: "gestor_backend", %status, error = %message, "La API externa rechazó la solicitud");
        Relay { status, body: json!({ "error": message }) }
      }
    }
    Err(e) => {
      error!(target: "gestor_backend", error = %e, "Fallo al contactar la API externa");
      let message = if e.is_empty() { "Error interno del servidor".to_string() } else { e };
      Relay { status: 500, body: json!({ "error": message }) }
    }
  }
}

/// Same relay semantics for the status lookup. `source_id` is required by
/// the route contract but the upstream lookup is by task id alone; the
/// parameter is accepted and ignored here rather than silently dropped from
/// the contract.
#[instrument(level = "info", skip(state), fields(%task_id))]
pub async fn forward_status(state: &AppState, task_id: &str) -> Relay {
  match state.upstream.task_status(task_id).await {
    Ok((status, body)) => {
      if is_ok(status) {
        Relay { status, body }
      } else {
        let message = extract_error(&body).unwrap_or_else(|| "Error al consultar estado".into());
        error!(target: "gestor_backend", %status, error = %message, "La API externa rechazó la consulta de estado");
        Relay { status, body: json!({ "error": message }) }
      }
    }
    Err(e) => {
      error!(target: "gestor_backend", error = %e, "Fallo al consultar la API externa");
      let message = if e.is_empty() { "Error interno del servidor".to_string() } else { e };
      Relay { status: 500, body: json!({ "error": message }) }
    }
  }
}

/// Best-effort typed view of a successful submission body. `None` when the
/// body does not match the expected shape; the verbatim body is still
/// relayed either way.
pub fn submission_summary(body: &Value) -> Option<SourceCreated> {
  serde_json::from_value::<SubmissionResponse>(body.clone())
    .ok()
    .and_then(|r| r.data)
}

/// Best-effort typed view of a status body, plus the badge tone for it.
pub fn status_view(body: &Value) -> (TaskStatus, StatusTone) {
  let status = serde_json::from_value::<TaskStatus>(body.clone()).unwrap_or_default();
  let tone = StatusTone::for_status(&status.status);
  (status, tone)
}
