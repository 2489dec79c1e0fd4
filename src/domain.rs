//! Domain models used by the backend: activity types, task descriptors, the
//! submission payload, and typed views of what the upstream API returns.

use serde::{Deserialize, Serialize};

/// Activity families the upstream generator understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
  MultipleChoiceCheckbox,
  MultipleChoiceRadio,
  BuildPhrase,
  CompletePhrase,
}

impl Default for ActivityType {
  fn default() -> Self { ActivityType::MultipleChoiceCheckbox }
}

impl ActivityType {
  pub const ALL: [ActivityType; 4] = [
    ActivityType::MultipleChoiceCheckbox,
    ActivityType::MultipleChoiceRadio,
    ActivityType::BuildPhrase,
    ActivityType::CompletePhrase,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ActivityType::MultipleChoiceCheckbox => "multiple_choice_checkbox",
      ActivityType::MultipleChoiceRadio => "multiple_choice_radio",
      ActivityType::BuildPhrase => "build_phrase",
      ActivityType::CompletePhrase => "complete_phrase",
    }
  }

  /// Parse the wire/form spelling. Unknown values are a caller problem.
  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.iter().copied().find(|t| t.as_str() == s)
  }
}

/// Per-task generation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
  pub activity_type: ActivityType,
  pub quantity: u32,
  pub concepts: Vec<String>,
}

/// One requested unit of activity-generation work.
/// Serializes as `{"type": "activity", "config": {...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskSpec {
  Activity { config: TaskConfig },
}

impl TaskSpec {
  pub fn config(&self) -> &TaskConfig {
    match self {
      TaskSpec::Activity { config } => config,
    }
  }
}

/// Document format declared in the submission. Only PDF is reachable in the
/// form flow, so only PDF exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
  Pdf,
}

/// Body sent to the upstream `POST /api/sources` endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionPayload {
  pub source_base64: String,
  pub format: SourceFormat,
  pub tasks: Vec<TaskSpec>,
  pub concepts: Vec<String>,
}

//
// Typed views of upstream responses. The bodies are relayed verbatim as JSON;
// these structs only exist to summarize them for display, so every field is
// optional and unknown shapes simply yield an empty view.
//

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubmissionResponse {
  #[serde(default)]
  pub data: Option<SourceCreated>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SourceCreated {
  #[serde(default)]
  pub source_id: Option<String>,
  #[serde(default)]
  pub source_uri: Option<String>,
  #[serde(default)]
  pub tasks: Vec<CreatedTask>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreatedTask {
  #[serde(default)]
  pub task_id: Option<String>,
  #[serde(default)]
  pub config: Option<TaskConfig>,
}

/// What `GET /api/tasks/{id}` is expected to return.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskStatus {
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub data: Option<serde_json::Value>,
}

/// Color family for a status string, mirrored by the frontend badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
  Green,
  Blue,
  Red,
  Gray,
}

impl StatusTone {
  pub fn for_status(status: &str) -> Self {
    match status.to_ascii_lowercase().as_str() {
      "completed" | "success" => StatusTone::Green,
      "pending" | "processing" => StatusTone::Blue,
      "failed" | "error" => StatusTone::Red,
      _ => StatusTone::Gray,
    }
  }
}

/// Parse the raw quantity field from the form. Anything that is not a
/// positive integer falls back to `default`.
pub fn parse_quantity(raw: &str, default: u32) -> u32 {
  match raw.trim().parse::<u32>() {
    Ok(n) if n > 0 => n,
    _ => default,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn task_spec_wire_shape() {
    let task = TaskSpec::Activity {
      config: TaskConfig {
        activity_type: ActivityType::BuildPhrase,
        quantity: 3,
        concepts: vec!["valores".into()],
      },
    };
    let v = serde_json::to_value(&task).expect("serialize");
    assert_eq!(v["type"], "activity");
    assert_eq!(v["config"]["activity_type"], "build_phrase");
    assert_eq!(v["config"]["quantity"], 3);
  }

  #[test]
  fn payload_format_serializes_as_pdf() {
    let p = SubmissionPayload {
      source_base64: "Zm9v".into(),
      format: SourceFormat::Pdf,
      tasks: vec![],
      concepts: vec![],
    };
    let v = serde_json::to_value(&p).expect("serialize");
    assert_eq!(v["format"], "pdf");
  }

  #[test]
  fn activity_type_parse_roundtrip() {
    for t in ActivityType::ALL {
      assert_eq!(ActivityType::parse(t.as_str()), Some(t));
    }
    assert_eq!(ActivityType::parse("essay"), None);
  }

  #[test]
  fn quantity_falls_back_on_garbage() {
    assert_eq!(parse_quantity("abc", 5), 5);
    assert_eq!(parse_quantity("", 5), 5);
    assert_eq!(parse_quantity("0", 5), 5);
    assert_eq!(parse_quantity("-3", 5), 5);
    assert_eq!(parse_quantity(" 12 ", 5), 12);
  }

  #[test]
  fn status_tone_classification() {
    assert_eq!(StatusTone::for_status("completed"), StatusTone::Green);
    assert_eq!(StatusTone::for_status("SUCCESS"), StatusTone::Green);
    assert_eq!(StatusTone::for_status("pending"), StatusTone::Blue);
    assert_eq!(StatusTone::for_status("Processing"), StatusTone::Blue);
    assert_eq!(StatusTone::for_status("failed"), StatusTone::Red);
    assert_eq!(StatusTone::for_status("error"), StatusTone::Red);
    assert_eq!(StatusTone::for_status("queued"), StatusTone::Gray);
    assert_eq!(StatusTone::for_status(""), StatusTone::Gray);
  }

  #[test]
  fn upstream_views_tolerate_unknown_shapes() {
    let r: SubmissionResponse = serde_json::from_value(serde_json::json!({"ok": true})).expect("parse");
    assert!(r.data.is_none());

    let r: SubmissionResponse = serde_json::from_value(serde_json::json!({
      "data": {"source_id": "abc", "tasks": [{"task_id": "t1"}]}
    }))
    .expect("parse");
    let data = r.data.expect("data");
    assert_eq!(data.source_id.as_deref(), Some("abc"));
    assert_eq!(data.tasks.len(), 1);
    assert!(data.tasks[0].config.is_none());
  }
}
