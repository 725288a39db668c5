//! [`SqliteStore`] — the SQLite implementation of [`TrackerStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use muster_core::{
  report::{CommEvent, Frago, RawInput, Report, Suggestion},
  sequence::SequenceKey,
  soldier::{DeviceStatus, Soldier},
  store::{IntegrityReport, IntegrityViolation, TrackerStore},
  unit::{self, Unit},
};

use crate::{
  encode::{
    encode_dt, encode_opt_dt, encode_source_reports, RawReport, RawSoldier,
    RawUnit,
  },
  schema, seed, Result,
};

/// Anti-join checks for every foreign-key column the audit verifies.
/// `(table, pk column, fk column, parent table, parent pk column)`.
/// units.parent_unit_id is covered by the forest validation instead.
const FK_CHECKS: &[(&str, &str, &str, &str, &str)] = &[
  ("soldiers", "soldier_id", "unit_id", "units", "unit_id"),
  ("soldier_raw_inputs", "input_id", "soldier_id", "soldiers", "soldier_id"),
  ("reports", "report_id", "soldier_id", "soldiers", "soldier_id"),
  ("reports", "report_id", "unit_id", "units", "unit_id"),
  ("device_status", "device_id", "soldier_id", "soldiers", "soldier_id"),
  ("comm_log", "log_id", "soldier_id", "soldiers", "soldier_id"),
  ("fragos", "frago_id", "unit_id", "units", "unit_id"),
  ("suggestions", "suggestion_id", "unit_id", "units", "unit_id"),
];

// ─── Store ───────────────────────────────────────────────────────────────────

/// A report-tracking store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Opening a
/// store sets pragmas only; run [`SqliteStore::provision`] (additive) or
/// [`SqliteStore::reset`] (destructive) to bring the schema up to date.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_pragmas().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_pragmas().await?;
    Ok(store)
  }

  async fn init_pragmas(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(
          "PRAGMA journal_mode = WAL;
           PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Provisioning ──────────────────────────────────────────────────────────

  /// Additive provisioning: create any missing tables and indexes, then add
  /// any missing columns. Idempotent; safe to run repeatedly against a live
  /// database holding data.
  ///
  /// Runs in one transaction — a failing step rolls everything back, so no
  /// partial schema is ever committed.
  pub async fn provision(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        for step in schema::CREATE_STEPS {
          tx.execute_batch(step.sql)?;
        }
        for migration in schema::COLUMN_MIGRATIONS {
          if !column_exists(&tx, migration.table, migration.column)? {
            tx.execute(migration.ddl, [])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Destructive provisioning: drop every table and recreate the schema from
  /// scratch. All data is lost. Only for fresh or throwaway environments —
  /// callers must gate this behind an explicit confirmation.
  pub async fn reset(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        for table in schema::DROP_ORDER {
          tx.execute_batch(&format!("DROP TABLE IF EXISTS {table}"))?;
        }
        for step in schema::CREATE_STEPS {
          tx.execute_batch(step.sql)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert the demonstration fixture (sample hierarchy, soldiers, reports,
  /// sequence initializers). Idempotent; see [`crate::seed`].
  pub async fn seed_sample_data(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        seed::apply(&tx)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// True if `pragma_table_info` lists `column` for `table`.
fn column_exists(
  conn: &rusqlite::Connection,
  table: &str,
  column: &str,
) -> rusqlite::Result<bool> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
    rusqlite::params![table, column],
    |row| row.get(0),
  )?;
  Ok(count > 0)
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for SqliteStore {
  type Error = crate::Error;

  // ── Units ─────────────────────────────────────────────────────────────────

  async fn add_unit(&self, unit: Unit) -> Result<()> {
    let level = unit.level.as_str().to_owned();
    let created_at = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO units (unit_id, name, parent_unit_id, level, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            unit.unit_id,
            unit.name,
            unit.parent_unit_id,
            level,
            created_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_unit(&self, unit_id: &str) -> Result<Option<Unit>> {
    let id = unit_id.to_owned();

    let raw: Option<RawUnit> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT unit_id, name, parent_unit_id, level
               FROM units WHERE unit_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawUnit {
                  unit_id:        row.get(0)?,
                  name:           row.get(1)?,
                  parent_unit_id: row.get(2)?,
                  level:          row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawUnit::into_unit))
  }

  async fn list_units(&self) -> Result<Vec<Unit>> {
    let raws: Vec<RawUnit> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT unit_id, name, parent_unit_id, level FROM units
           ORDER BY unit_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawUnit {
              unit_id:        row.get(0)?,
              name:           row.get(1)?,
              parent_unit_id: row.get(2)?,
              level:          row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawUnit::into_unit).collect())
  }

  // ── Personnel ─────────────────────────────────────────────────────────────

  async fn add_soldier(&self, soldier: Soldier) -> Result<()> {
    let status = soldier.status.as_str();
    let last_seen = encode_opt_dt(soldier.last_seen);
    let created_at = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO soldiers
             (soldier_id, name, rank, unit_id, device_id, status, created_at, last_seen)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            soldier.soldier_id,
            soldier.name,
            soldier.rank,
            soldier.unit_id,
            soldier.device_id,
            status,
            created_at,
            last_seen,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_soldiers(&self, unit_id: Option<&str>) -> Result<Vec<Soldier>> {
    let unit_filter = unit_id.map(str::to_owned);

    let raws: Vec<RawSoldier> = self
      .conn
      .call(move |conn| {
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok(RawSoldier {
            soldier_id: row.get(0)?,
            name:       row.get(1)?,
            rank:       row.get(2)?,
            unit_id:    row.get(3)?,
            device_id:  row.get(4)?,
            status:     row.get(5)?,
            last_seen:  row.get(6)?,
          })
        };

        let rows = if let Some(unit) = unit_filter {
          let mut stmt = conn.prepare(
            "SELECT soldier_id, name, rank, unit_id, device_id, status, last_seen
             FROM soldiers WHERE unit_id = ?1 ORDER BY soldier_id",
          )?;
          stmt
            .query_map(rusqlite::params![unit], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT soldier_id, name, rank, unit_id, device_id, status, last_seen
             FROM soldiers ORDER BY soldier_id",
          )?;
          stmt
            .query_map([], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSoldier::into_soldier).collect()
  }

  async fn upsert_device_status(&self, status: DeviceStatus) -> Result<()> {
    let last_heartbeat = encode_opt_dt(status.last_heartbeat);
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO device_status
             (device_id, soldier_id, status, last_heartbeat, battery_level,
              signal_strength, location_lat, location_lon, location_accuracy,
              updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            status.device_id,
            status.soldier_id,
            status.status,
            last_heartbeat,
            status.battery_level,
            status.signal_strength,
            status.location_lat,
            status.location_lon,
            status.location_accuracy,
            now,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Inputs and reports ────────────────────────────────────────────────────

  async fn add_raw_input(&self, input: RawInput) -> Result<()> {
    let timestamp = encode_dt(input.timestamp);
    let input_type = input.input_type.as_str();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO soldier_raw_inputs
             (input_id, soldier_id, timestamp, raw_text, raw_audio_ref,
              input_type, confidence, location_ref)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            input.input_id,
            input.soldier_id,
            timestamp,
            input.raw_text,
            input.raw_audio_ref,
            input_type,
            input.confidence,
            input.location_ref,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_report(&self, report: Report) -> Result<()> {
    let timestamp = encode_dt(report.timestamp);
    let status = report.status.as_str();
    let reviewed_at = encode_opt_dt(report.reviewed_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reports
             (report_id, soldier_id, unit_id, timestamp, report_type,
              structured_json, confidence, source_input_id, status,
              reviewed_by, reviewed_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            report.report_id,
            report.soldier_id,
            report.unit_id,
            timestamp,
            report.report_type,
            report.structured_json,
            report.confidence,
            report.source_input_id,
            status,
            report.reviewed_by,
            reviewed_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_report(&self, report_id: &str) -> Result<Option<Report>> {
    let id = report_id.to_owned();

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT report_id, soldier_id, unit_id, timestamp, report_type,
                      structured_json, confidence, source_input_id, status,
                      reviewed_by, reviewed_at
               FROM reports WHERE report_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawReport {
                  report_id:       row.get(0)?,
                  soldier_id:      row.get(1)?,
                  unit_id:         row.get(2)?,
                  timestamp:       row.get(3)?,
                  report_type:     row.get(4)?,
                  structured_json: row.get(5)?,
                  confidence:      row.get(6)?,
                  source_input_id: row.get(7)?,
                  status:          row.get(8)?,
                  reviewed_by:     row.get(9)?,
                  reviewed_at:     row.get(10)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReport::into_report).transpose()
  }

  // ── Orders, suggestions, comm log ─────────────────────────────────────────

  async fn add_frago(&self, frago: Frago) -> Result<()> {
    let assigned_at = encode_opt_dt(frago.assigned_at);
    let status = frago.status.as_str();
    let priority = frago.priority.as_str();
    let deadline = encode_opt_dt(frago.deadline);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fragos
             (frago_id, unit_id, task, assigned_by, assigned_at, status,
              priority, deadline, frago_number, suggested_fields,
              final_fields, formatted_document, source_reports)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            frago.frago_id,
            frago.unit_id,
            frago.task,
            frago.assigned_by,
            assigned_at,
            status,
            priority,
            deadline,
            frago.frago_number,
            frago.suggested_fields,
            frago.final_fields,
            frago.formatted_document,
            frago.source_reports,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_suggestion(&self, suggestion: Suggestion) -> Result<()> {
    let urgency = suggestion.urgency.as_str();
    let source_reports = encode_source_reports(&suggestion.source_reports)?;
    let reviewed_at = encode_opt_dt(suggestion.reviewed_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO suggestions
             (suggestion_id, suggestion_type, status, unit_id, urgency,
              reason, confidence, source_reports, reviewed_at, reviewed_by)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            suggestion.suggestion_id,
            suggestion.suggestion_type,
            suggestion.status,
            suggestion.unit_id,
            urgency,
            suggestion.reason,
            suggestion.confidence,
            source_reports,
            reviewed_at,
            suggestion.reviewed_by,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn log_comm_event(&self, event: CommEvent) -> Result<()> {
    let timestamp = encode_dt(event.timestamp);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comm_log
             (log_id, device_id, soldier_id, topic, message_type,
              message_size, timestamp, success, error_message)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            event.log_id,
            event.device_id,
            event.soldier_id,
            event.topic,
            event.message_type,
            event.message_size,
            timestamp,
            event.success,
            event.error_message,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Sequence allocator ────────────────────────────────────────────────────

  async fn next_sequence(&self, key: SequenceKey) -> Result<i64> {
    // Initialize-then-increment in one transaction. The UPDATE both bumps
    // the counter and hands back the allocated number, so two concurrent
    // callers can never observe the same value.
    let number = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let number: i64 = match &key {
          SequenceKey::Report(report_type) => {
            tx.execute(
              "INSERT OR IGNORE INTO report_sequences (report_type, next_number)
               VALUES (?1, 1)",
              rusqlite::params![report_type],
            )?;
            tx.query_row(
              "UPDATE report_sequences SET next_number = next_number + 1
               WHERE report_type = ?1
               RETURNING next_number - 1",
              rusqlite::params![report_type],
              |row| row.get(0),
            )?
          }
          SequenceKey::Frago => {
            tx.execute(
              "INSERT OR IGNORE INTO frago_sequence (id, next_number)
               VALUES (1, 1)",
              [],
            )?;
            tx.query_row(
              "UPDATE frago_sequence SET next_number = next_number + 1
               WHERE id = 1
               RETURNING next_number - 1",
              [],
              |row| row.get(0),
            )?
          }
        };
        tx.commit()?;
        Ok(number)
      })
      .await?;

    Ok(number)
  }

  // ── Audit ─────────────────────────────────────────────────────────────────

  async fn audit(&self) -> Result<IntegrityReport> {
    let units = self.list_units().await?;
    let mut violations: Vec<IntegrityViolation> = unit::validate_forest(&units)
      .into_iter()
      .map(IntegrityViolation::Hierarchy)
      .collect();

    let dangling: Vec<(usize, String, String)> = self
      .conn
      .call(|conn| {
        let mut out = Vec::new();
        for (index, (table, pk, column, parent_table, parent_pk)) in
          FK_CHECKS.iter().enumerate()
        {
          let sql = format!(
            "SELECT t.{pk}, t.{column}
             FROM {table} t
             LEFT JOIN {parent_table} p ON p.{parent_pk} = t.{column}
             WHERE t.{column} IS NOT NULL AND p.{parent_pk} IS NULL"
          );
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map([], |row| {
              Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          out.extend(
            rows
              .into_iter()
              .map(|(row_id, target)| (index, row_id, target)),
          );
        }
        Ok(out)
      })
      .await?;

    for (index, row_id, target) in dangling {
      let (table, _, column, _, _) = FK_CHECKS[index];
      violations.push(IntegrityViolation::DanglingReference {
        table,
        column,
        row_id,
        target,
      });
    }

    Ok(IntegrityReport { violations })
  }
}

// ─── Test helpers ────────────────────────────────────────────────────────────

#[cfg(test)]
impl SqliteStore {
  /// Run arbitrary SQL — used by tests to fabricate pre-migration schemas
  /// and constraint-violating rows.
  pub(crate) async fn raw_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub(crate) async fn count_rows(&self, table: &'static str) -> Result<i64> {
    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM {table}"),
          [],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count)
  }
}
