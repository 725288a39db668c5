//! Unit — a node in the hierarchical military organization.
//!
//! The parent/child relation over units must form a forest: root units have
//! no parent, every non-root unit's parent exists, and no chain of parent
//! links loops back on itself. [`validate_forest`] checks all three.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── UnitLevel ───────────────────────────────────────────────────────────────

/// Echelon of a unit. The database stores this as free text, so unknown
/// labels survive a round-trip via [`UnitLevel::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitLevel {
  Battalion,
  Company,
  Platoon,
  Squad,
  Other(String),
}

impl UnitLevel {
  /// The label stored in the `units.level` column.
  pub fn as_str(&self) -> &str {
    match self {
      Self::Battalion => "Battalion",
      Self::Company => "Company",
      Self::Platoon => "Platoon",
      Self::Squad => "Squad",
      Self::Other(s) => s,
    }
  }

  pub fn parse(s: &str) -> Self {
    match s {
      "Battalion" => Self::Battalion,
      "Company" => Self::Company,
      "Platoon" => Self::Platoon,
      "Squad" => Self::Squad,
      other => Self::Other(other.to_owned()),
    }
  }
}

// ─── Unit ────────────────────────────────────────────────────────────────────

/// An organizational unit. Identifiers are opaque strings chosen by the
/// writer (e.g. `"BAT_1"`), never database-generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
  pub unit_id:        String,
  pub name:           String,
  /// `None` marks a root unit.
  pub parent_unit_id: Option<String>,
  pub level:          UnitLevel,
}

// ─── Forest validation ───────────────────────────────────────────────────────

/// A way in which a set of units fails to form a forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyViolation {
  /// Two units share the same `unit_id`.
  DuplicateId { unit_id: String },
  /// A unit references a parent that is not in the set.
  MissingParent {
    unit_id:        String,
    parent_unit_id: String,
  },
  /// Following parent links from this unit loops back on itself.
  Cycle { unit_id: String },
}

impl std::fmt::Display for HierarchyViolation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::DuplicateId { unit_id } => {
        write!(f, "duplicate unit id {unit_id:?}")
      }
      Self::MissingParent { unit_id, parent_unit_id } => {
        write!(f, "unit {unit_id:?} references missing parent {parent_unit_id:?}")
      }
      Self::Cycle { unit_id } => {
        write!(f, "unit {unit_id:?} is part of a parent-link cycle")
      }
    }
  }
}

/// Check that `units` forms a forest.
///
/// Returns every violation found rather than stopping at the first, so an
/// audit can report the full damage in one pass.
pub fn validate_forest(units: &[Unit]) -> Vec<HierarchyViolation> {
  let mut violations = Vec::new();

  let mut parents: HashMap<&str, Option<&str>> = HashMap::new();
  for unit in units {
    let prev = parents.insert(
      unit.unit_id.as_str(),
      unit.parent_unit_id.as_deref(),
    );
    if prev.is_some() {
      violations.push(HierarchyViolation::DuplicateId {
        unit_id: unit.unit_id.clone(),
      });
    }
  }

  for unit in units {
    if let Some(parent) = unit.parent_unit_id.as_deref()
      && !parents.contains_key(parent)
    {
      violations.push(HierarchyViolation::MissingParent {
        unit_id:        unit.unit_id.clone(),
        parent_unit_id: parent.to_owned(),
      });
    }
  }

  // Walk parent links from each node. Nodes proven cycle-free in an earlier
  // walk are skipped, so the whole pass is linear in the number of units.
  let mut cleared: HashSet<&str> = HashSet::new();
  for unit in units {
    let mut path: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = unit.unit_id.as_str();

    loop {
      if cleared.contains(current) {
        break;
      }
      if !seen.insert(current) {
        violations.push(HierarchyViolation::Cycle {
          unit_id: current.to_owned(),
        });
        break;
      }
      path.push(current);

      match parents.get(current) {
        Some(Some(parent)) => current = parent,
        // Root reached, or parent missing (already reported above).
        _ => break,
      }
    }

    cleared.extend(path);
  }

  violations
}

/// Resolve the chain of ancestors for `unit_id`, nearest first.
///
/// Errors if the unit itself is unknown; silently stops at a missing parent
/// (that is a [`HierarchyViolation`], not a lookup failure).
pub fn ancestors(units: &[Unit], unit_id: &str) -> Result<Vec<Unit>> {
  let by_id: HashMap<&str, &Unit> =
    units.iter().map(|u| (u.unit_id.as_str(), u)).collect();

  let mut current = *by_id
    .get(unit_id)
    .ok_or_else(|| Error::UnitNotFound(unit_id.to_owned()))?;

  let mut chain = Vec::new();
  let mut seen: HashSet<&str> = HashSet::new();
  seen.insert(current.unit_id.as_str());

  while let Some(parent_id) = current.parent_unit_id.as_deref() {
    let Some(parent) = by_id.get(parent_id) else { break };
    if !seen.insert(parent_id) {
      // Cycle; stop rather than loop forever.
      break;
    }
    chain.push((*parent).clone());
    current = parent;
  }

  Ok(chain)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn unit(id: &str, parent: Option<&str>, level: UnitLevel) -> Unit {
    Unit {
      unit_id:        id.to_owned(),
      name:           id.to_owned(),
      parent_unit_id: parent.map(str::to_owned),
      level,
    }
  }

  fn sample_forest() -> Vec<Unit> {
    vec![
      unit("BAT_1", None, UnitLevel::Battalion),
      unit("CO_A", Some("BAT_1"), UnitLevel::Company),
      unit("PLT_1", Some("CO_A"), UnitLevel::Platoon),
      unit("SQD_1", Some("PLT_1"), UnitLevel::Squad),
    ]
  }

  #[test]
  fn valid_forest_has_no_violations() {
    assert!(validate_forest(&sample_forest()).is_empty());
  }

  #[test]
  fn missing_parent_is_reported() {
    let units = vec![unit("PLT_9", Some("CO_Z"), UnitLevel::Platoon)];
    let violations = validate_forest(&units);
    assert_eq!(violations.len(), 1);
    assert!(matches!(
      &violations[0],
      HierarchyViolation::MissingParent { unit_id, parent_unit_id }
        if unit_id == "PLT_9" && parent_unit_id == "CO_Z"
    ));
  }

  #[test]
  fn cycle_is_reported() {
    let units = vec![
      unit("A", Some("B"), UnitLevel::Company),
      unit("B", Some("A"), UnitLevel::Company),
    ];
    let violations = validate_forest(&units);
    assert!(
      violations
        .iter()
        .any(|v| matches!(v, HierarchyViolation::Cycle { .. }))
    );
  }

  #[test]
  fn self_parent_is_a_cycle() {
    let units = vec![unit("A", Some("A"), UnitLevel::Squad)];
    let violations = validate_forest(&units);
    assert!(matches!(&violations[0], HierarchyViolation::Cycle { unit_id } if unit_id == "A"));
  }

  #[test]
  fn duplicate_id_is_reported() {
    let units = vec![
      unit("A", None, UnitLevel::Battalion),
      unit("A", None, UnitLevel::Battalion),
    ];
    let violations = validate_forest(&units);
    assert!(matches!(&violations[0], HierarchyViolation::DuplicateId { unit_id } if unit_id == "A"));
  }

  #[test]
  fn ancestors_walks_to_root() {
    let units = sample_forest();
    let chain = ancestors(&units, "SQD_1").unwrap();
    let ids: Vec<_> = chain.iter().map(|u| u.unit_id.as_str()).collect();
    assert_eq!(ids, ["PLT_1", "CO_A", "BAT_1"]);
  }

  #[test]
  fn ancestors_unknown_unit_errors() {
    let err = ancestors(&sample_forest(), "SQD_9").unwrap_err();
    assert!(matches!(err, Error::UnitNotFound(_)));
  }

  #[test]
  fn level_round_trips_unknown_labels() {
    assert_eq!(UnitLevel::parse("Battalion"), UnitLevel::Battalion);
    let other = UnitLevel::parse("Fire Team");
    assert_eq!(other.as_str(), "Fire Team");
  }
}
