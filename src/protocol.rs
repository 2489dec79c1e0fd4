//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ActivityType, SourceCreated, StatusTone, TaskSpec};
use crate::draft::RequestDraft;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    AttachSource {
        name: String,
        mime: String,
        #[serde(rename = "dataBase64")]
        data_base64: String,
    },
    ClearSource,
    AddConcept {
        text: String,
    },
    RemoveConcept {
        index: usize,
    },
    SetActivityType {
        value: String,
    },
    SetQuantity {
        value: String,
    },
    AddTaskConcept {
        text: String,
    },
    RemoveTaskConcept {
        index: usize,
    },
    ConfirmTask,
    RemoveTask {
        index: usize,
    },
    Submit,
    LastResponse,
    CheckStatus {
        #[serde(rename = "sourceId")]
        source_id: String,
        #[serde(rename = "taskId")]
        task_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    /// Full snapshot of the connection's draft, sent after every mutation.
    Draft {
        draft: DraftOut,
    },
    /// Alert-equivalent: the requested change was not applied.
    Rejected {
        message: String,
    },
    Submitted {
        status: u16,
        body: Value,
        summary: Option<SourceCreated>,
    },
    LastResponse {
        response: Option<Value>,
    },
    Status {
        status: u16,
        body: Value,
        tone: StatusTone,
    },
    Error {
        message: String,
    },
}

/// DTO describing the draft to the frontend.
#[derive(Debug, Serialize)]
pub struct DraftOut {
    pub source: Option<SourceOut>,
    pub concepts: Vec<String>,
    pub tasks: Vec<TaskSpec>,
    pub pending: PendingOut,
    pub activity_types: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SourceOut {
    pub name: String,
    pub size_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct PendingOut {
    pub activity_type: ActivityType,
    pub quantity: String,
    pub concepts: Vec<String>,
}

/// Convert the internal draft to the public DTO.
pub fn to_out(d: &RequestDraft) -> DraftOut {
    DraftOut {
        source: d.source.as_ref().map(|s| SourceOut {
            name: s.name.clone(),
            size_bytes: s.size_bytes,
        }),
        concepts: d.concepts.as_slice().to_vec(),
        tasks: d.tasks.clone(),
        pending: PendingOut {
            activity_type: d.pending.activity_type,
            quantity: d.pending.quantity.clone(),
            concepts: d.pending.concepts.as_slice().to_vec(),
        },
        activity_types: ActivityType::ALL.iter().map(|t| t.as_str()).collect(),
    }
}

//
// HTTP request DTOs
//

/// Body of `POST /api/check-task-status`. Both ids are required by the
/// contract; presence is checked by the handler so it can answer with the
/// user-facing message instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct StatusIn {
    #[serde(default, rename = "sourceId")]
    pub source_id: Option<String>,
    #[serde(default, rename = "taskId")]
    pub task_id: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
