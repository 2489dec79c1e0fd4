//! Uploaded document handling: PDF acceptance and base64 payload extraction.
//!
//! The browser does the actual reading (FileReader → data URI); this module
//! owns what happens once that string reaches the server.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SourceError {
  #[error("Por favor selecciona un archivo PDF válido")]
  NotAPdf,
  #[error("El archivo no se pudo decodificar como base64")]
  InvalidBase64,
}

/// A selected document, ready to be embedded in a submission payload.
#[derive(Clone, Debug, Serialize)]
pub struct SourceFile {
  pub name: String,
  pub mime: String,
  pub base64: String,
  pub size_bytes: usize,
}

/// A file is accepted when it declares the PDF MIME type or its name ends
/// in ".pdf" (case-sensitive).
pub fn accepts_pdf(name: &str, mime: &str) -> bool {
  mime == "application/pdf" || name.ends_with(".pdf")
}

impl SourceFile {
  /// Build from a FileReader-style data URI. The payload is everything after
  /// the first comma; a bare base64 string is taken whole. The payload is
  /// decoded once so we know the document's byte size and that the string is
  /// actually base64.
  pub fn from_data_uri(name: &str, mime: &str, data_uri: &str) -> Result<Self, SourceError> {
    if !accepts_pdf(name, mime) {
      return Err(SourceError::NotAPdf);
    }

    let payload = match data_uri.split_once(',') {
      Some((_, rest)) => rest,
      None => data_uri,
    };

    let bytes = BASE64.decode(payload).map_err(|_| SourceError::InvalidBase64)?;

    Ok(Self {
      name: name.to_string(),
      mime: mime.to_string(),
      base64: payload.to_string(),
      size_bytes: bytes.len(),
    })
  }
}
