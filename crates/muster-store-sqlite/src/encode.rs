//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enum-like fields are stored
//! as the discriminant strings defined in `muster-core`. Suggestion
//! `source_reports` lists are stored as compact JSON arrays.

use chrono::{DateTime, Utc};
use muster_core::{
  report::{Report, ReportStatus},
  soldier::{Soldier, SoldierStatus},
  unit::{Unit, UnitLevel},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_opt_dt(dt: Option<DateTime<Utc>>) -> Option<String> {
  dt.map(encode_dt)
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Source-report lists ─────────────────────────────────────────────────────

pub fn encode_source_reports(ids: &[String]) -> Result<String> {
  Ok(serde_json::to_string(ids)?)
}

pub fn decode_source_reports(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `units` row.
pub struct RawUnit {
  pub unit_id:        String,
  pub name:           String,
  pub parent_unit_id: Option<String>,
  pub level:          String,
}

impl RawUnit {
  pub fn into_unit(self) -> Unit {
    Unit {
      unit_id:        self.unit_id,
      name:           self.name,
      parent_unit_id: self.parent_unit_id,
      // Free-text echelon labels never fail to decode.
      level:          UnitLevel::parse(&self.level),
    }
  }
}

/// Raw strings read directly from a `soldiers` row.
pub struct RawSoldier {
  pub soldier_id: String,
  pub name:       String,
  pub rank:       Option<String>,
  pub unit_id:    String,
  pub device_id:  Option<String>,
  pub status:     String,
  pub last_seen:  Option<String>,
}

impl RawSoldier {
  pub fn into_soldier(self) -> Result<Soldier> {
    Ok(Soldier {
      soldier_id: self.soldier_id,
      name:       self.name,
      rank:       self.rank.unwrap_or_default(),
      unit_id:    self.unit_id,
      device_id:  self.device_id,
      status:     SoldierStatus::parse(&self.status).map_err(Error::Core)?,
      last_seen:  decode_opt_dt(self.last_seen.as_deref())?,
    })
  }
}

/// Raw strings read directly from a `reports` row.
pub struct RawReport {
  pub report_id:       String,
  pub soldier_id:      String,
  pub unit_id:         String,
  pub timestamp:       String,
  pub report_type:     String,
  pub structured_json: String,
  pub confidence:      f64,
  pub source_input_id: Option<String>,
  pub status:          Option<String>,
  pub reviewed_by:     Option<String>,
  pub reviewed_at:     Option<String>,
}

impl RawReport {
  pub fn into_report(self) -> Result<Report> {
    let status = match self.status.as_deref() {
      // Rows written before the status column existed default to generated.
      None => ReportStatus::Generated,
      Some(s) => ReportStatus::parse(s).map_err(Error::Core)?,
    };

    Ok(Report {
      report_id: self.report_id,
      soldier_id: self.soldier_id,
      unit_id: self.unit_id,
      timestamp: decode_dt(&self.timestamp)?,
      report_type: self.report_type,
      structured_json: self.structured_json,
      confidence: self.confidence,
      source_input_id: self.source_input_id,
      status,
      reviewed_by: self.reviewed_by,
      reviewed_at: decode_opt_dt(self.reviewed_at.as_deref())?,
    })
  }
}

#[cfg(test)]
mod tests {
  use muster_core::report::InputType;

  use super::*;

  #[test]
  fn dt_round_trip() {
    let now = Utc::now();
    let decoded = decode_dt(&encode_dt(now)).unwrap();
    assert_eq!(decoded, now);
  }

  #[test]
  fn bad_dt_is_a_parse_error() {
    assert!(matches!(decode_dt("not a date"), Err(Error::DateParse(_))));
  }

  #[test]
  fn source_reports_round_trip() {
    let ids = vec!["REPORT_001".to_owned(), "REPORT_002".to_owned()];
    let encoded = encode_source_reports(&ids).unwrap();
    assert_eq!(decode_source_reports(&encoded).unwrap(), ids);
  }

  #[test]
  fn input_type_discriminants_match_schema_defaults() {
    // The schema's input_type default is 'voice'.
    assert_eq!(InputType::Voice.as_str(), "voice");
  }
}
