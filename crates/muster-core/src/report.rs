//! Report-side records: raw inputs, structured reports, fragmentary orders,
//! AI suggestions, and communication-log events.
//!
//! `structured_json` payloads are opaque to this crate; their schema is owned
//! by the external API that writes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── RawInput ────────────────────────────────────────────────────────────────

/// How a raw input reached the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
  #[default]
  Voice,
  Text,
}

impl InputType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Voice => "voice",
      Self::Text => "text",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "voice" => Ok(Self::Voice),
      "text" => Ok(Self::Text),
      other => Err(Error::UnknownDiscriminant {
        kind:  "input type",
        value: other.to_owned(),
      }),
    }
  }
}

/// A verbatim voice or text input from a soldier, kept as full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInput {
  pub input_id:      String,
  pub soldier_id:    String,
  pub timestamp:     DateTime<Utc>,
  pub raw_text:      String,
  /// Reference to an audio artifact (e.g. a wav filename), if any.
  pub raw_audio_ref: Option<String>,
  pub input_type:    InputType,
  /// Transcription confidence, 0.0–1.0.
  pub confidence:    f64,
  pub location_ref:  Option<String>,
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
  #[default]
  Generated,
  Reviewed,
}

impl ReportStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Generated => "generated",
      Self::Reviewed => "reviewed",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "generated" => Ok(Self::Generated),
      "reviewed" => Ok(Self::Reviewed),
      other => Err(Error::UnknownDiscriminant {
        kind:  "report status",
        value: other.to_owned(),
      }),
    }
  }
}

/// A structured report derived from a raw input.
///
/// `report_type` is a free-text category (CASEVAC, SITREP, SPOTREP,
/// EOINCREP, …) — an opaque label to this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
  pub report_id:       String,
  pub soldier_id:      String,
  pub unit_id:         String,
  pub timestamp:       DateTime<Utc>,
  pub report_type:     String,
  /// Opaque serialized payload; schema owned by the external API.
  pub structured_json: String,
  pub confidence:      f64,
  /// The raw input this report was generated from, if known.
  pub source_input_id: Option<String>,
  pub status:          ReportStatus,
  pub reviewed_by:     Option<String>,
  pub reviewed_at:     Option<DateTime<Utc>>,
}

// ─── Frago ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragoStatus {
  #[default]
  Pending,
  InProgress,
  Completed,
}

impl FragoStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::InProgress => "in_progress",
      Self::Completed => "completed",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "pending" => Ok(Self::Pending),
      "in_progress" => Ok(Self::InProgress),
      "completed" => Ok(Self::Completed),
      other => Err(Error::UnknownDiscriminant {
        kind:  "frago status",
        value: other.to_owned(),
      }),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragoPriority {
  Low,
  #[default]
  Medium,
  High,
}

impl FragoPriority {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "low",
      Self::Medium => "medium",
      Self::High => "high",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "low" => Ok(Self::Low),
      "medium" => Ok(Self::Medium),
      "high" => Ok(Self::High),
      other => Err(Error::UnknownDiscriminant {
        kind:  "frago priority",
        value: other.to_owned(),
      }),
    }
  }
}

/// A fragmentary order — a short follow-on directive to a unit.
///
/// `frago_number` is the human-readable sequence number ("FRAGO #7") drawn
/// from the frago stream of the sequence allocator; the writer assigns it
/// after allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frago {
  pub frago_id:           String,
  pub unit_id:            String,
  pub task:               String,
  pub assigned_by:        Option<String>,
  pub assigned_at:        Option<DateTime<Utc>>,
  pub status:             FragoStatus,
  pub priority:           FragoPriority,
  pub deadline:           Option<DateTime<Utc>>,
  pub frago_number:       Option<i64>,
  /// AI-suggested field values, serialized as text.
  pub suggested_fields:   Option<String>,
  /// Operator-confirmed field values, serialized as text.
  pub final_fields:       Option<String>,
  /// Rendered order document, if one was produced.
  pub formatted_document: Option<String>,
  /// JSON array of report ids this order was drafted from.
  pub source_reports:     Option<String>,
}

// ─── Suggestion ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
  Low,
  #[default]
  Medium,
  High,
}

impl Urgency {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "LOW",
      Self::Medium => "MEDIUM",
      Self::High => "HIGH",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "LOW" => Ok(Self::Low),
      "MEDIUM" => Ok(Self::Medium),
      "HIGH" => Ok(Self::High),
      other => Err(Error::UnknownDiscriminant {
        kind:  "urgency",
        value: other.to_owned(),
      }),
    }
  }
}

/// An AI-proposed action tied to a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
  pub suggestion_id:   String,
  /// Report category the suggestion proposes, e.g. `"CASEVAC"`.
  pub suggestion_type: String,
  /// Free-text review state, e.g. `"pending"`.
  pub status:          String,
  pub unit_id:         Option<String>,
  pub urgency:         Urgency,
  pub reason:          String,
  pub confidence:      f64,
  /// Ids of the reports that motivated the suggestion.
  pub source_reports:  Vec<String>,
  pub reviewed_at:     Option<DateTime<Utc>>,
  pub reviewed_by:     Option<String>,
}

// ─── CommEvent ───────────────────────────────────────────────────────────────

/// One entry in the communication log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommEvent {
  pub log_id:        String,
  pub device_id:     Option<String>,
  pub soldier_id:    Option<String>,
  pub topic:         String,
  pub message_type:  String,
  pub message_size:  Option<i64>,
  pub timestamp:     DateTime<Utc>,
  pub success:       bool,
  pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_discriminants_round_trip() {
    for status in [FragoStatus::Pending, FragoStatus::InProgress, FragoStatus::Completed] {
      assert_eq!(FragoStatus::parse(status.as_str()).unwrap(), status);
    }
    for urgency in [Urgency::Low, Urgency::Medium, Urgency::High] {
      assert_eq!(Urgency::parse(urgency.as_str()).unwrap(), urgency);
    }
  }

  #[test]
  fn unknown_discriminant_errors() {
    let err = ReportStatus::parse("approved").unwrap_err();
    assert!(matches!(err, Error::UnknownDiscriminant { kind: "report status", .. }));
  }
}
