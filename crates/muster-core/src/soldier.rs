//! Soldier and device records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── SoldierStatus ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoldierStatus {
  #[default]
  Active,
  Inactive,
}

impl SoldierStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "active" => Ok(Self::Active),
      "inactive" => Ok(Self::Inactive),
      other => Err(Error::UnknownDiscriminant {
        kind:  "soldier status",
        value: other.to_owned(),
      }),
    }
  }
}

// ─── Soldier ─────────────────────────────────────────────────────────────────

/// An individual personnel record, assigned to exactly one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Soldier {
  pub soldier_id: String,
  pub name:       String,
  pub rank:       String,
  /// Must reference an existing unit.
  pub unit_id:    String,
  pub device_id:  Option<String>,
  pub status:     SoldierStatus,
  pub last_seen:  Option<DateTime<Utc>>,
}

// ─── DeviceStatus ────────────────────────────────────────────────────────────

/// Last known state of a soldier's field device. At most one row per device;
/// writes replace the previous state wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
  pub device_id:         String,
  pub soldier_id:        Option<String>,
  /// Free-text device state, e.g. `"active"`.
  pub status:            String,
  pub last_heartbeat:    Option<DateTime<Utc>>,
  /// Percentage, 0–100.
  pub battery_level:     Option<i64>,
  pub signal_strength:   Option<i64>,
  pub location_lat:      Option<f64>,
  pub location_lon:      Option<f64>,
  pub location_accuracy: Option<f64>,
}
