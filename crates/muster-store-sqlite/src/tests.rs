//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use muster_core::{
  report::{
    CommEvent, Frago, FragoPriority, FragoStatus, InputType, RawInput, Report,
    ReportStatus, Suggestion, Urgency,
  },
  sequence::SequenceKey,
  soldier::{DeviceStatus, Soldier, SoldierStatus},
  store::{IntegrityViolation, TrackerStore},
  unit::{self, HierarchyViolation, Unit, UnitLevel},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory().await.expect("in-memory store");
  s.provision().await.expect("provision");
  s
}

fn test_unit(id: &str, parent: Option<&str>, level: UnitLevel) -> Unit {
  Unit {
    unit_id:        id.to_owned(),
    name:           format!("{id} test unit"),
    parent_unit_id: parent.map(str::to_owned),
    level,
  }
}

fn test_soldier(id: &str, unit_id: &str) -> Soldier {
  Soldier {
    soldier_id: id.to_owned(),
    name:       format!("Pvt. {id}"),
    rank:       "Private".to_owned(),
    unit_id:    unit_id.to_owned(),
    device_id:  None,
    status:     SoldierStatus::Active,
    last_seen:  Some(Utc::now()),
  }
}

fn test_report(id: &str, soldier_id: &str, unit_id: &str) -> Report {
  Report {
    report_id:       id.to_owned(),
    soldier_id:      soldier_id.to_owned(),
    unit_id:         unit_id.to_owned(),
    timestamp:       Utc::now(),
    report_type:     "SITREP".to_owned(),
    structured_json: r#"{"situation": "quiet"}"#.to_owned(),
    confidence:      0.9,
    source_input_id: None,
    status:          ReportStatus::Generated,
    reviewed_by:     None,
    reviewed_at:     None,
  }
}

// ─── Provisioning ────────────────────────────────────────────────────────────

#[tokio::test]
async fn provision_is_idempotent() {
  let s = store().await;
  s.provision().await.unwrap();
  s.provision().await.unwrap();

  // Schema still usable after repeated runs.
  s.add_unit(test_unit("BAT_9", None, UnitLevel::Battalion))
    .await
    .unwrap();
  assert!(s.get_unit("BAT_9").await.unwrap().is_some());
}

#[tokio::test]
async fn provision_adds_missing_columns_to_older_tables() {
  let s = SqliteStore::open_in_memory().await.unwrap();

  // A reports table from before the review workflow existed.
  s.raw_batch(
    "CREATE TABLE reports (
       report_id       TEXT PRIMARY KEY,
       soldier_id      TEXT NOT NULL,
       unit_id         TEXT NOT NULL,
       timestamp       TEXT NOT NULL,
       report_type     TEXT NOT NULL,
       structured_json TEXT NOT NULL,
       confidence      REAL NOT NULL,
       created_at      TEXT DEFAULT CURRENT_TIMESTAMP
     );",
  )
  .await
  .unwrap();

  s.provision().await.unwrap();

  s.add_unit(test_unit("BAT_1", None, UnitLevel::Battalion))
    .await
    .unwrap();
  s.add_soldier(test_soldier("S_1", "BAT_1")).await.unwrap();

  // Columns added by migration are writable and readable.
  let mut report = test_report("R_1", "S_1", "BAT_1");
  report.status = ReportStatus::Reviewed;
  report.reviewed_by = Some("S_1".to_owned());
  report.reviewed_at = Some(Utc::now());
  s.add_report(report).await.unwrap();

  let fetched = s.get_report("R_1").await.unwrap().unwrap();
  assert_eq!(fetched.status, ReportStatus::Reviewed);
  assert_eq!(fetched.reviewed_by.as_deref(), Some("S_1"));
}

#[tokio::test]
async fn reset_leaves_only_freshly_seeded_rows() {
  let s = store().await;
  s.seed_sample_data().await.unwrap();
  s.add_unit(test_unit("ZZ_1", None, UnitLevel::Battalion))
    .await
    .unwrap();

  s.reset().await.unwrap();
  assert_eq!(s.count_rows("units").await.unwrap(), 0);
  assert_eq!(s.count_rows("reports").await.unwrap(), 0);

  s.seed_sample_data().await.unwrap();
  assert_eq!(s.count_rows("units").await.unwrap(), 9);
  assert_eq!(s.count_rows("reports").await.unwrap(), 5);
  assert!(s.get_unit("ZZ_1").await.unwrap().is_none());
}

#[tokio::test]
async fn seed_is_idempotent() {
  let s = store().await;
  s.seed_sample_data().await.unwrap();
  s.seed_sample_data().await.unwrap();

  assert_eq!(s.count_rows("units").await.unwrap(), 9);
  assert_eq!(s.count_rows("soldiers").await.unwrap(), 5);
  assert_eq!(s.count_rows("soldier_raw_inputs").await.unwrap(), 5);
  assert_eq!(s.count_rows("reports").await.unwrap(), 5);
}

// ─── Seed fixture invariants ─────────────────────────────────────────────────

#[tokio::test]
async fn seeded_hierarchy_has_expected_chain() {
  let s = store().await;
  s.seed_sample_data().await.unwrap();

  let units = s.list_units().await.unwrap();
  assert!(units.len() >= 4);

  let chain = unit::ancestors(&units, "SQD_1").unwrap();
  let ids: Vec<_> = chain.iter().map(|u| u.unit_id.as_str()).collect();
  assert_eq!(ids, ["PLT_1", "CO_A", "BAT_1"]);
}

#[tokio::test]
async fn seeded_database_passes_audit() {
  let s = store().await;
  s.seed_sample_data().await.unwrap();

  let report = s.audit().await.unwrap();
  assert!(report.is_clean(), "unexpected violations: {:?}", report.violations);
}

#[tokio::test]
async fn seeded_counters_start_at_one() {
  let s = store().await;
  s.seed_sample_data().await.unwrap();

  // The seed writes initializer rows at next_number = 1; the first
  // allocation after seeding must still hand out 1.
  let n = s
    .next_sequence(SequenceKey::report("CASEVAC"))
    .await
    .unwrap();
  assert_eq!(n, 1);
}

// ─── Sequence allocator ──────────────────────────────────────────────────────

#[tokio::test]
async fn sequence_is_strictly_increasing_per_key() {
  let s = store().await;

  let key = SequenceKey::report("CASEVAC");
  assert_eq!(s.next_sequence(key.clone()).await.unwrap(), 1);
  assert_eq!(s.next_sequence(key.clone()).await.unwrap(), 2);
  assert_eq!(s.next_sequence(key).await.unwrap(), 3);
}

#[tokio::test]
async fn unseen_key_initializes_at_one() {
  let s = store().await;
  assert_eq!(
    s.next_sequence(SequenceKey::report("SPOTREP")).await.unwrap(),
    1
  );
}

#[tokio::test]
async fn streams_are_independent() {
  let s = store().await;

  assert_eq!(s.next_sequence(SequenceKey::report("CASEVAC")).await.unwrap(), 1);
  assert_eq!(s.next_sequence(SequenceKey::report("CASEVAC")).await.unwrap(), 2);
  assert_eq!(s.next_sequence(SequenceKey::report("SITREP")).await.unwrap(), 1);
  assert_eq!(s.next_sequence(SequenceKey::Frago).await.unwrap(), 1);
  assert_eq!(s.next_sequence(SequenceKey::Frago).await.unwrap(), 2);
}

// ─── Units and personnel ─────────────────────────────────────────────────────

#[tokio::test]
async fn unit_round_trips_including_free_text_level() {
  let s = store().await;
  s.add_unit(test_unit("BAT_1", None, UnitLevel::Battalion))
    .await
    .unwrap();
  s.add_unit(test_unit(
    "FT_1",
    Some("BAT_1"),
    UnitLevel::Other("Fire Team".to_owned()),
  ))
  .await
  .unwrap();

  let fetched = s.get_unit("FT_1").await.unwrap().unwrap();
  assert_eq!(fetched.parent_unit_id.as_deref(), Some("BAT_1"));
  assert_eq!(fetched.level, UnitLevel::Other("Fire Team".to_owned()));
}

#[tokio::test]
async fn get_unit_missing_returns_none() {
  let s = store().await;
  assert!(s.get_unit("NOPE").await.unwrap().is_none());
}

#[tokio::test]
async fn list_soldiers_filtered_by_unit() {
  let s = store().await;
  s.add_unit(test_unit("BAT_1", None, UnitLevel::Battalion))
    .await
    .unwrap();
  s.add_unit(test_unit("CO_A", Some("BAT_1"), UnitLevel::Company))
    .await
    .unwrap();
  s.add_soldier(test_soldier("S_1", "BAT_1")).await.unwrap();
  s.add_soldier(test_soldier("S_2", "CO_A")).await.unwrap();
  s.add_soldier(test_soldier("S_3", "CO_A")).await.unwrap();

  let all = s.list_soldiers(None).await.unwrap();
  assert_eq!(all.len(), 3);

  let co_a = s.list_soldiers(Some("CO_A")).await.unwrap();
  assert_eq!(co_a.len(), 2);
  assert!(co_a.iter().all(|soldier| soldier.unit_id == "CO_A"));
}

#[tokio::test]
async fn soldier_with_unknown_unit_is_rejected() {
  let s = store().await;
  let err = s.add_soldier(test_soldier("S_1", "NO_SUCH_UNIT")).await;
  assert!(err.is_err());
}

#[tokio::test]
async fn device_status_keeps_one_row_per_device() {
  let s = store().await;
  s.add_unit(test_unit("BAT_1", None, UnitLevel::Battalion))
    .await
    .unwrap();
  s.add_soldier(test_soldier("S_1", "BAT_1")).await.unwrap();

  let mut status = DeviceStatus {
    device_id:         "DEVICE_001".to_owned(),
    soldier_id:        Some("S_1".to_owned()),
    status:            "active".to_owned(),
    last_heartbeat:    Some(Utc::now()),
    battery_level:     Some(90),
    signal_strength:   Some(70),
    location_lat:      Some(60.1699),
    location_lon:      Some(24.9384),
    location_accuracy: None,
  };
  s.upsert_device_status(status.clone()).await.unwrap();

  status.battery_level = Some(42);
  s.upsert_device_status(status).await.unwrap();

  assert_eq!(s.count_rows("device_status").await.unwrap(), 1);
}

// ─── Reports, orders, suggestions ────────────────────────────────────────────

#[tokio::test]
async fn report_round_trips_with_source_input() {
  let s = store().await;
  s.add_unit(test_unit("BAT_1", None, UnitLevel::Battalion))
    .await
    .unwrap();
  s.add_soldier(test_soldier("S_1", "BAT_1")).await.unwrap();
  s.add_raw_input(RawInput {
    input_id:      "IN_1".to_owned(),
    soldier_id:    "S_1".to_owned(),
    timestamp:     Utc::now(),
    raw_text:      "contact north".to_owned(),
    raw_audio_ref: None,
    input_type:    InputType::Voice,
    confidence:    0.93,
    location_ref:  None,
  })
  .await
  .unwrap();

  let mut report = test_report("R_1", "S_1", "BAT_1");
  report.source_input_id = Some("IN_1".to_owned());
  s.add_report(report).await.unwrap();

  let fetched = s.get_report("R_1").await.unwrap().unwrap();
  assert_eq!(fetched.source_input_id.as_deref(), Some("IN_1"));
  assert_eq!(fetched.report_type, "SITREP");
  assert_eq!(fetched.status, ReportStatus::Generated);
}

#[tokio::test]
async fn frago_takes_number_from_allocator() {
  let s = store().await;
  s.add_unit(test_unit("BAT_1", None, UnitLevel::Battalion))
    .await
    .unwrap();

  let number = s.next_sequence(SequenceKey::Frago).await.unwrap();
  s.add_frago(Frago {
    frago_id:           "FRAGO_9".to_owned(),
    unit_id:            "BAT_1".to_owned(),
    task:               "Hold the line".to_owned(),
    assigned_by:        Some("HQ".to_owned()),
    assigned_at:        Some(Utc::now()),
    status:             FragoStatus::Pending,
    priority:           FragoPriority::High,
    deadline:           None,
    frago_number:       Some(number),
    suggested_fields:   None,
    final_fields:       None,
    formatted_document: None,
    source_reports:     None,
  })
  .await
  .unwrap();

  assert_eq!(number, 1);
  assert_eq!(s.count_rows("fragos").await.unwrap(), 1);
}

#[tokio::test]
async fn suggestion_and_comm_event_insert_cleanly() {
  let s = store().await;
  s.add_unit(test_unit("BAT_1", None, UnitLevel::Battalion))
    .await
    .unwrap();
  s.add_soldier(test_soldier("S_1", "BAT_1")).await.unwrap();
  s.add_report(test_report("R_1", "S_1", "BAT_1")).await.unwrap();

  s.add_suggestion(Suggestion {
    suggestion_id:   "SUGG_9".to_owned(),
    suggestion_type: "CASEVAC".to_owned(),
    status:          "pending".to_owned(),
    unit_id:         Some("BAT_1".to_owned()),
    urgency:         Urgency::High,
    reason:          "Casualty reported".to_owned(),
    confidence:      0.91,
    source_reports:  vec!["R_1".to_owned()],
    reviewed_at:     None,
    reviewed_by:     None,
  })
  .await
  .unwrap();

  s.log_comm_event(CommEvent {
    log_id:        "LOG_1".to_owned(),
    device_id:     Some("DEVICE_001".to_owned()),
    soldier_id:    Some("S_1".to_owned()),
    topic:         "soldier/S_1/reports".to_owned(),
    message_type:  "report".to_owned(),
    message_size:  Some(512),
    timestamp:     Utc::now(),
    success:       true,
    error_message: None,
  })
  .await
  .unwrap();

  assert_eq!(s.count_rows("suggestions").await.unwrap(), 1);
  assert_eq!(s.count_rows("comm_log").await.unwrap(), 1);

  let audit = s.audit().await.unwrap();
  assert!(audit.is_clean(), "unexpected violations: {:?}", audit.violations);
}

// ─── Audit ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn audit_flags_dangling_foreign_key() {
  let s = store().await;

  // Bypass enforcement to fabricate the kind of damage the audit exists to
  // find in externally-written databases.
  s.raw_batch(
    "PRAGMA foreign_keys = OFF;
     INSERT INTO units (unit_id, name, level) VALUES ('BAT_1', 'Bat', 'Battalion');
     INSERT INTO soldiers (soldier_id, name, rank, unit_id)
       VALUES ('GHOST', 'Ghost', 'Private', 'NO_SUCH_UNIT');
     PRAGMA foreign_keys = ON;",
  )
  .await
  .unwrap();

  let report = s.audit().await.unwrap();
  assert!(report.violations.iter().any(|v| matches!(
    v,
    IntegrityViolation::DanglingReference { table: "soldiers", column: "unit_id", row_id, target }
      if row_id == "GHOST" && target == "NO_SUCH_UNIT"
  )));
}

#[tokio::test]
async fn audit_flags_unit_cycle() {
  let s = store().await;

  s.raw_batch(
    "PRAGMA foreign_keys = OFF;
     INSERT INTO units (unit_id, name, parent_unit_id, level)
       VALUES ('A', 'A', 'B', 'Company'), ('B', 'B', 'A', 'Company');
     PRAGMA foreign_keys = ON;",
  )
  .await
  .unwrap();

  let report = s.audit().await.unwrap();
  assert!(report.violations.iter().any(|v| matches!(
    v,
    IntegrityViolation::Hierarchy(HierarchyViolation::Cycle { .. })
  )));
}

#[tokio::test]
async fn audit_is_clean_on_empty_database() {
  let s = store().await;
  assert!(s.audit().await.unwrap().is_clean());
}
