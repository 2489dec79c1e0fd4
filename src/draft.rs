//! The request under construction: concept lists, the pending-task editor,
//! confirmed tasks, and payload assembly.
//!
//! A `RequestDraft` is local to one WebSocket connection (one browser tab);
//! nothing here is shared or persisted. Validation messages are the exact
//! user-facing strings the form shows.

use serde::Serialize;
use thiserror::Error;

use crate::config::FormDefaults;
use crate::domain::{parse_quantity, ActivityType, SourceFormat, SubmissionPayload, TaskConfig, TaskSpec};
use crate::source::SourceFile;

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
  #[error("Por favor selecciona un archivo")]
  MissingSource,
  #[error("Por favor añade al menos una task")]
  NoTasks,
  #[error("Por favor selecciona al menos un concepto para la task")]
  TaskWithoutConcepts,
}

/// Ordered list of free-text concept labels. Input is trimmed; blank or
/// duplicate entries are ignored, and removal out of range is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConceptList(Vec<String>);

impl ConceptList {
  /// Returns whether the list changed.
  pub fn add(&mut self, raw: &str) -> bool {
    let concept = raw.trim();
    if concept.is_empty() || self.0.iter().any(|c| c == concept) {
      return false;
    }
    self.0.push(concept.to_string());
    true
  }

  /// Returns whether the list changed.
  pub fn remove(&mut self, index: usize) -> bool {
    if index >= self.0.len() {
      return false;
    }
    self.0.remove(index);
    true
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_slice(&self) -> &[String] {
    &self.0
  }

  fn take(&mut self) -> Vec<String> {
    std::mem::take(&mut self.0)
  }
}

/// The task being edited in the form, before it is confirmed into the list.
/// `quantity` stays raw text until confirmation, like the input field it
/// mirrors.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTask {
  pub activity_type: ActivityType,
  pub quantity: String,
  pub concepts: ConceptList,
}

impl PendingTask {
  fn new(defaults: &FormDefaults) -> Self {
    Self {
      activity_type: ActivityType::default(),
      quantity: defaults.default_quantity.to_string(),
      concepts: ConceptList::default(),
    }
  }
}

/// Everything one browser tab has assembled so far.
#[derive(Clone, Debug)]
pub struct RequestDraft {
  pub source: Option<SourceFile>,
  pub concepts: ConceptList,
  pub tasks: Vec<TaskSpec>,
  pub pending: PendingTask,
}

impl RequestDraft {
  pub fn new(defaults: &FormDefaults) -> Self {
    Self {
      source: None,
      concepts: ConceptList::default(),
      tasks: Vec::new(),
      pending: PendingTask::new(defaults),
    }
  }

  pub fn attach_source(&mut self, source: SourceFile) {
    self.source = Some(source);
  }

  pub fn clear_source(&mut self) {
    self.source = None;
  }

  /// Move the pending editor into the task list. Requires at least one
  /// selected concept; on success the editor resets to its defaults.
  pub fn confirm_task(&mut self, defaults: &FormDefaults) -> Result<(), DraftError> {
    if self.pending.concepts.is_empty() {
      return Err(DraftError::TaskWithoutConcepts);
    }

    let config = TaskConfig {
      activity_type: self.pending.activity_type,
      quantity: parse_quantity(&self.pending.quantity, defaults.default_quantity),
      concepts: self.pending.concepts.take(),
    };
    self.tasks.push(TaskSpec::Activity { config });
    self.pending = PendingTask::new(defaults);
    Ok(())
  }

  /// Returns whether the list changed; out of range is a no-op.
  pub fn remove_task(&mut self, index: usize) -> bool {
    if index >= self.tasks.len() {
      return false;
    }
    self.tasks.remove(index);
    true
  }

  /// Assemble the submission body from the current state. Fails before any
  /// network activity when the draft is not submittable.
  pub fn payload(&self) -> Result<SubmissionPayload, DraftError> {
    let source = self.source.as_ref().ok_or(DraftError::MissingSource)?;
    if self.tasks.is_empty() {
      return Err(DraftError::NoTasks);
    }

    Ok(SubmissionPayload {
      source_base64: source.base64.clone(),
      format: SourceFormat::Pdf,
      tasks: self.tasks.clone(),
      concepts: self.concepts.as_slice().to_vec(),
    })
  }
}
