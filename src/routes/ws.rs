//! WebSocket upgrade + message loop. Each client message is parsed as JSON
//! and applied to the connection's own draft. We reply with a single JSON
//! message per request; mutations answer with a full draft snapshot.
//!
//! The draft and the last successful response live on the connection's
//! stack, so they disappear with the tab and are never shared.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::ActivityType;
use crate::draft::RequestDraft;
use crate::logic::{forward_status, forward_submission, status_view, submission_summary};
use crate::protocol::{to_out, ClientWsMessage, ServerWsMessage};
use crate::source::SourceFile;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "gestor_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let session = Uuid::new_v4();
  info!(target: "gestor_backend", %session, "WebSocket connected");

  // Connection-local form state: one draft and the last successful
  // submission body per browser tab.
  let mut draft = RequestDraft::new(&state.defaults);
  let mut last_response: Option<Value> = None;

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "gestor_backend", %session, "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut draft, &mut last_response).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "gestor_backend", %session, error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "gestor_backend", %session, "WebSocket disconnected");
}

#[instrument(level = "debug", skip_all)]
async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  draft: &mut RequestDraft,
  last_response: &mut Option<Value>,
) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::AttachSource { name, mime, data_base64 } => {
      match SourceFile::from_data_uri(&name, &mime, &data_base64) {
        Ok(source) => {
          info!(target: "gestor_backend", file = %source.name, size_bytes = source.size_bytes, "Source attached");
          draft.attach_source(source);
          ServerWsMessage::Draft { draft: to_out(draft) }
        }
        // Prior selection stays as it was.
        Err(e) => ServerWsMessage::Rejected { message: e.to_string() },
      }
    }

    ClientWsMessage::ClearSource => {
      draft.clear_source();
      ServerWsMessage::Draft { draft: to_out(draft) }
    }

    // Blank or duplicate input is a silent no-op; the snapshot says it all.
    ClientWsMessage::AddConcept { text } => {
      draft.concepts.add(&text);
      ServerWsMessage::Draft { draft: to_out(draft) }
    }

    ClientWsMessage::RemoveConcept { index } => {
      draft.concepts.remove(index);
      ServerWsMessage::Draft { draft: to_out(draft) }
    }

    ClientWsMessage::SetActivityType { value } => match ActivityType::parse(&value) {
      Some(activity_type) => {
        draft.pending.activity_type = activity_type;
        ServerWsMessage::Draft { draft: to_out(draft) }
      }
      None => ServerWsMessage::Rejected { message: format!("Tipo de actividad desconocido: {}", value) },
    },

    // Raw field text; parsing happens when the task is confirmed.
    ClientWsMessage::SetQuantity { value } => {
      draft.pending.quantity = value;
      ServerWsMessage::Draft { draft: to_out(draft) }
    }

    ClientWsMessage::AddTaskConcept { text } => {
      draft.pending.concepts.add(&text);
      ServerWsMessage::Draft { draft: to_out(draft) }
    }

    ClientWsMessage::RemoveTaskConcept { index } => {
      draft.pending.concepts.remove(index);
      ServerWsMessage::Draft { draft: to_out(draft) }
    }

    ClientWsMessage::ConfirmTask => match draft.confirm_task(&state.defaults) {
      Ok(()) => {
        info!(target: "gestor_backend", tasks = draft.tasks.len(), "Task confirmed");
        ServerWsMessage::Draft { draft: to_out(draft) }
      }
      Err(e) => ServerWsMessage::Rejected { message: e.to_string() },
    },

    ClientWsMessage::RemoveTask { index } => {
      draft.remove_task(index);
      ServerWsMessage::Draft { draft: to_out(draft) }
    }

    ClientWsMessage::Submit => match draft.payload() {
      Ok(payload) => {
        let body = match serde_json::to_value(&payload) {
          Ok(v) => v,
          Err(e) => return ServerWsMessage::Error { message: format!("Serialization error: {}", e) },
        };
        let relay = forward_submission(state, &body).await;
        let ok = (200..300).contains(&relay.status);
        info!(target: "gestor_backend", status = relay.status, %ok, "WS submit forwarded");

        let summary = if ok { submission_summary(&relay.body) } else { None };
        if ok {
          *last_response = Some(relay.body.clone());
        }
        ServerWsMessage::Submitted { status: relay.status, body: relay.body, summary }
      }
      Err(e) => ServerWsMessage::Rejected { message: e.to_string() },
    },

    ClientWsMessage::LastResponse => ServerWsMessage::LastResponse { response: last_response.clone() },

    ClientWsMessage::CheckStatus { source_id, task_id } => {
      if source_id.is_empty() || task_id.is_empty() {
        return ServerWsMessage::Rejected { message: "Por favor completa Source ID y Task ID".into() };
      }
      // `source_id` is part of the contract but the upstream lookup is by
      // task id alone.
      let relay = forward_status(state, &task_id).await;
      let (_, tone) = status_view(&relay.body);
      info!(target: "gestor_backend", %source_id, %task_id, status = relay.status, "WS status lookup");
      ServerWsMessage::Status { status: relay.status, body: relay.body, tone }
    }
  }
}
