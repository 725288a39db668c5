//! Sequence streams — human-readable monotonic numbering.
//!
//! Each report type gets its own counter (`report_sequences`), and FRAGO
//! numbering has a single dedicated stream (`frago_sequence`). These numbers
//! are presentation identifiers ("FRAGO #7"), independent of primary keys.

use serde::{Deserialize, Serialize};

/// Identifies a counter stream in the sequence allocator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "stream", content = "report_type", rename_all = "snake_case")]
pub enum SequenceKey {
  /// Per-report-type counter, keyed by the free-text category label.
  Report(String),
  /// The singleton FRAGO numbering stream.
  Frago,
}

impl SequenceKey {
  pub fn report(report_type: impl Into<String>) -> Self {
    Self::Report(report_type.into())
  }
}

impl std::fmt::Display for SequenceKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Report(report_type) => write!(f, "report:{report_type}"),
      Self::Frago => write!(f, "frago"),
    }
  }
}
