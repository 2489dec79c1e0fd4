//! HTTP endpoint handlers: the health probe and the two forwarders.
//!
//! The forwarders validate the request shape, hand off to core logic, and
//! relay whatever the upstream API answered. A body that fails JSON parsing
//! is reported as 500, the same as any other failure inside the handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{response::IntoResponse, Json};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::logic::{forward_status, forward_submission, submission_shape_ok, Relay};
use crate::protocol::{HealthOut, StatusIn};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

fn relay_response(relay: Relay) -> (StatusCode, Json<Value>) {
  // Upstream statuses are relayed as received; anything unrepresentable
  // degrades to 500.
  let status = StatusCode::from_u16(relay.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
  (status, Json(relay.body))
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_submit_tasks(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
  let Json(body) = match payload {
    Ok(body) => body,
    Err(rejection) => {
      warn!(target: "gestor_backend", error = %rejection.body_text(), "Submission body is not JSON");
      return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": rejection.body_text() })));
    }
  };

  if !submission_shape_ok(&body) {
    warn!(target: "gestor_backend", "Submission body missing required fields");
    return (
      StatusCode::BAD_REQUEST,
      Json(json!({ "error": "Payload inválido. Se requieren: source_base64, format, tasks" })),
    );
  }

  relay_response(forward_submission(&state, &body).await)
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_check_task_status(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<StatusIn>, JsonRejection>,
) -> impl IntoResponse {
  let Json(q) = match payload {
    Ok(body) => body,
    Err(rejection) => {
      warn!(target: "gestor_backend", error = %rejection.body_text(), "Status body is not JSON");
      return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": rejection.body_text() })));
    }
  };

  // Absent and empty-string ids both count as missing.
  let source_id = q.source_id.as_deref().filter(|s| !s.is_empty());
  let task_id = q.task_id.as_deref().filter(|s| !s.is_empty());
  let (Some(source_id), Some(task_id)) = (source_id, task_id) else {
    return (
      StatusCode::BAD_REQUEST,
      Json(json!({ "error": "Se requieren sourceId y taskId" })),
    );
  };

  info!(target: "gestor_backend", %source_id, %task_id, "HTTP status lookup");
  relay_response(forward_status(&state, task_id).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::net::SocketAddr;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  use axum::body::Body;
  use axum::http::{header, HeaderMap, Request};
  use axum::routing::{get, post};
  use axum::Router;
  use tower::ServiceExt;

  use crate::config::{AppConfig, FormDefaults, UpstreamSettings};
  use crate::routes::build_router;

  /// Stub upstream that answers with fixed replies and counts every hit.
  fn stub_router(hits: Arc<AtomicUsize>, sources_reply: (u16, Value), task_reply: (u16, Value)) -> Router {
    let sources_hits = hits.clone();
    let task_hits = hits;
    Router::new()
      .route(
        "/api/sources",
        post(move |Json(_body): Json<Value>| async move {
          sources_hits.fetch_add(1, Ordering::SeqCst);
          let (status, body) = sources_reply;
          (StatusCode::from_u16(status).expect("status"), Json(body))
        }),
      )
      .route(
        "/api/tasks/:id",
        get(move || async move {
          task_hits.fetch_add(1, Ordering::SeqCst);
          let (status, body) = task_reply;
          (StatusCode::from_u16(status).expect("status"), Json(body))
        }),
      )
  }

  async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
      axum::serve(listener, app).await.expect("serve");
    });
    addr
  }

  fn state_for(addr: SocketAddr, api_key: &str) -> Arc<AppState> {
    Arc::new(AppState::with_config(AppConfig {
      upstream: UpstreamSettings {
        api_url: format!("http://{addr}"),
        api_key: api_key.to_string(),
      },
      form: FormDefaults::default(),
    }))
  }

  async fn call(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    let res = app
      .oneshot(
        Request::builder()
          .method("POST")
          .uri(path)
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from(body.to_string()))
          .expect("request"),
      )
      .await
      .expect("response");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).expect("json body");
    (status, body)
  }

  fn valid_submission() -> Value {
    json!({
      "source_base64": "aG9sYQ==",
      "format": "pdf",
      "tasks": [{ "type": "activity", "config": {
        "activity_type": "build_phrase", "quantity": 5, "concepts": ["valores"]
      }}],
      "concepts": ["valores"],
    })
  }

  #[tokio::test]
  async fn submit_missing_tasks_is_rejected_before_upstream() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn(stub_router(hits.clone(), (201, json!({})), (200, json!({})))).await;
    let app = build_router(state_for(addr, ""));

    let (status, body) = call(app, "/api/submit-tasks", json!({
      "source_base64": "aG9sYQ==",
      "format": "pdf",
    }))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error message").contains("source_base64"));
    assert_eq!(hits.load(Ordering::SeqCst), 0, "upstream must not be contacted");
  }

  #[tokio::test]
  async fn submit_relays_a_successful_upstream_response_unchanged() {
    let hits = Arc::new(AtomicUsize::new(0));
    let reply = json!({ "data": { "source_id": "abc" } });
    let addr = spawn(stub_router(hits.clone(), (201, reply.clone()), (200, json!({})))).await;
    let app = build_router(state_for(addr, ""));

    let (status, body) = call(app, "/api/submit-tasks", valid_submission()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, reply);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn submit_maps_an_upstream_failure_to_its_error_message() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn(stub_router(
      hits.clone(),
      (502, json!({ "error": "fuente corrupta" })),
      (200, json!({})),
    ))
    .await;
    let app = build_router(state_for(addr, ""));

    let (status, body) = call(app, "/api/submit-tasks", valid_submission()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "fuente corrupta" }));
  }

  #[tokio::test]
  async fn submit_falls_back_to_the_generic_message_without_an_error_key() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn(stub_router(hits.clone(), (500, json!({ "detail": "?" })), (200, json!({})))).await;
    let app = build_router(state_for(addr, ""));

    let (status, body) = call(app, "/api/submit-tasks", valid_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Error de la API externa" }));
  }

  #[tokio::test]
  async fn status_requires_both_ids() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn(stub_router(hits.clone(), (201, json!({})), (200, json!({})))).await;
    let app = build_router(state_for(addr, ""));

    let (status, body) = call(app.clone(), "/api/check-task-status", json!({ "sourceId": "s1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Se requieren sourceId y taskId" }));

    // Empty strings are as missing as absent keys.
    let (status, _) = call(app, "/api/check-task-status", json!({ "sourceId": "s1", "taskId": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(hits.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn status_relays_upstream_errors_with_their_status() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn(stub_router(
      hits.clone(),
      (201, json!({})),
      (404, json!({ "error": "not found" })),
    ))
    .await;
    let app = build_router(state_for(addr, ""));

    let (status, body) = call(
      app,
      "/api/check-task-status",
      json!({ "sourceId": "s1", "taskId": "t1" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "not found" }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn status_relays_a_successful_lookup_unchanged() {
    let hits = Arc::new(AtomicUsize::new(0));
    let reply = json!({ "status": "processing", "message": "en cola" });
    let addr = spawn(stub_router(hits.clone(), (201, json!({})), (200, reply.clone()))).await;
    let app = build_router(state_for(addr, ""));

    let (status, body) = call(
      app,
      "/api/check-task-status",
      json!({ "sourceId": "s1", "taskId": "t1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, reply);
  }

  #[tokio::test]
  async fn bearer_header_follows_the_configured_key() {
    // Dedicated stub that echoes the Authorization header back.
    let echo = Router::new().route(
      "/api/sources",
      post(|headers: HeaderMap, Json(_b): Json<Value>| async move {
        let auth = headers
          .get(header::AUTHORIZATION)
          .and_then(|v| v.to_str().ok())
          .unwrap_or("")
          .to_string();
        (StatusCode::CREATED, Json(json!({ "auth": auth })))
      }),
    );
    let addr = spawn(echo).await;

    let app = build_router(state_for(addr, "secreto"));
    let (_, body) = call(app, "/api/submit-tasks", valid_submission()).await;
    assert_eq!(body, json!({ "auth": "Bearer secreto" }));

    let app = build_router(state_for(addr, ""));
    let (_, body) = call(app, "/api/submit-tasks", valid_submission()).await;
    assert_eq!(body, json!({ "auth": "" }));
  }

  #[tokio::test]
  async fn unreachable_upstream_maps_to_500() {
    // Nothing is listening here.
    let addr: SocketAddr = "127.0.0.1:1".parse().expect("addr");
    let app = build_router(state_for(addr, ""));

    let (status, body) = call(app, "/api/submit-tasks", valid_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some_and(|s| !s.is_empty()));
  }
}
