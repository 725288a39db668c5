//! The `TrackerStore` trait and the integrity-audit result types.
//!
//! The trait is implemented by storage backends (e.g. `muster-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  report::{CommEvent, Frago, RawInput, Report, Suggestion},
  sequence::SequenceKey,
  soldier::{DeviceStatus, Soldier},
  unit::{HierarchyViolation, Unit},
};

// ─── Integrity audit ─────────────────────────────────────────────────────────

/// A referential-integrity or hierarchy defect found by
/// [`TrackerStore::audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
  /// A non-null foreign-key value with no matching parent row.
  DanglingReference {
    table:  &'static str,
    column: &'static str,
    /// Primary key of the offending row.
    row_id: String,
    /// The value that failed to resolve.
    target: String,
  },
  /// The unit graph is not a forest.
  Hierarchy(HierarchyViolation),
}

impl std::fmt::Display for IntegrityViolation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::DanglingReference { table, column, row_id, target } => write!(
        f,
        "{table}.{column} = {target:?} on row {row_id:?} resolves to nothing"
      ),
      Self::Hierarchy(v) => write!(f, "{v}"),
    }
  }
}

/// Outcome of a full integrity audit. Empty means the database satisfies
/// every referential and hierarchy invariant.
#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
  pub violations: Vec<IntegrityViolation>,
}

impl IntegrityReport {
  pub fn is_clean(&self) -> bool { self.violations.is_empty() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a report-tracking store backend.
///
/// Entity rows are written with caller-chosen opaque string ids; the store
/// never invents identifiers. All methods return `Send` futures so the trait
/// can be used from multi-threaded async runtimes.
pub trait TrackerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Units ─────────────────────────────────────────────────────────────

  /// Persist a unit. The parent, if any, must already exist.
  fn add_unit(
    &self,
    unit: Unit,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a unit by id. Returns `None` if not found.
  fn get_unit<'a>(
    &'a self,
    unit_id: &'a str,
  ) -> impl Future<Output = Result<Option<Unit>, Self::Error>> + Send + 'a;

  /// List every unit — the flat form of the organizational hierarchy, as
  /// served by the external API's `GET /hierarchy`.
  fn list_units(
    &self,
  ) -> impl Future<Output = Result<Vec<Unit>, Self::Error>> + Send + '_;

  // ── Personnel ─────────────────────────────────────────────────────────

  /// Persist a soldier. `unit_id` must reference an existing unit.
  fn add_soldier(
    &self,
    soldier: Soldier,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List soldiers, optionally restricted to one unit.
  fn list_soldiers<'a>(
    &'a self,
    unit_id: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Soldier>, Self::Error>> + Send + 'a;

  /// Insert-or-replace the status row for a device.
  fn upsert_device_status(
    &self,
    status: DeviceStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Inputs and reports ────────────────────────────────────────────────

  /// Append a raw voice/text input to the history.
  fn add_raw_input(
    &self,
    input: RawInput,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist a structured report.
  fn add_report(
    &self,
    report: Report,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a report by id. Returns `None` if not found.
  fn get_report<'a>(
    &'a self,
    report_id: &'a str,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + 'a;

  // ── Orders, suggestions, comm log ─────────────────────────────────────

  /// Persist a fragmentary order.
  fn add_frago(
    &self,
    frago: Frago,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist an AI-proposed suggestion.
  fn add_suggestion(
    &self,
    suggestion: Suggestion,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append an entry to the communication log.
  fn log_comm_event(
    &self,
    event: CommEvent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Sequence allocator ────────────────────────────────────────────────

  /// Allocate the next number in a counter stream.
  ///
  /// Strictly increasing per key, starting at 1, with no gaps under
  /// single-writer use. A previously unseen key initializes at 1. The
  /// increment must be atomic: two concurrent callers must never be handed
  /// the same number.
  fn next_sequence(
    &self,
    key: SequenceKey,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Audit ─────────────────────────────────────────────────────────────

  /// Verify referential integrity and the unit-forest invariant, collecting
  /// every violation rather than failing at the first.
  fn audit(
    &self,
  ) -> impl Future<Output = Result<IntegrityReport, Self::Error>> + Send + '_;
}
