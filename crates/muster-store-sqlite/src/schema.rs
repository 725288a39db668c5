//! The target schema, expressed as ordered provisioning steps.
//!
//! Rather than one opaque DDL blob, the schema is a list of named, idempotent
//! steps ([`CREATE_STEPS`]) plus a list of additive column migrations
//! ([`COLUMN_MIGRATIONS`]) that heal older deployments whose tables predate
//! later columns. The destructive path drops tables in [`DROP_ORDER`] —
//! children before parents, so foreign keys never block a drop.
//!
//! All timestamps are TEXT holding RFC 3339 strings; `created_at` columns
//! default to `CURRENT_TIMESTAMP` so rows written by external tooling still
//! get a value.

/// One named, idempotent DDL operation. Steps run in declaration order.
pub struct MigrationStep {
  pub name: &'static str,
  pub sql:  &'static str,
}

/// A column added after the table first shipped. Applied only when
/// `pragma_table_info` shows the column absent, so the additive path is safe
/// against both fresh and pre-migration databases.
pub struct ColumnMigration {
  pub table:  &'static str,
  pub column: &'static str,
  pub ddl:    &'static str,
}

pub const CREATE_STEPS: &[MigrationStep] = &[
  MigrationStep {
    name: "create_units",
    sql:  "
      CREATE TABLE IF NOT EXISTS units (
          unit_id        TEXT PRIMARY KEY,
          name           TEXT NOT NULL,
          parent_unit_id TEXT REFERENCES units(unit_id),
          level          TEXT NOT NULL,  -- 'Battalion' | 'Company' | 'Platoon' | 'Squad'
          created_at     TEXT DEFAULT CURRENT_TIMESTAMP
      );
      CREATE INDEX IF NOT EXISTS idx_units_parent ON units(parent_unit_id);
      CREATE INDEX IF NOT EXISTS idx_units_level  ON units(level);
    ",
  },
  MigrationStep {
    name: "create_soldiers",
    sql:  "
      CREATE TABLE IF NOT EXISTS soldiers (
          soldier_id TEXT PRIMARY KEY,
          name       TEXT NOT NULL,
          rank       TEXT,
          unit_id    TEXT NOT NULL REFERENCES units(unit_id),
          device_id  TEXT,
          status     TEXT DEFAULT 'active',
          created_at TEXT DEFAULT CURRENT_TIMESTAMP,
          last_seen  TEXT
      );
      CREATE INDEX IF NOT EXISTS idx_soldiers_unit   ON soldiers(unit_id);
      CREATE INDEX IF NOT EXISTS idx_soldiers_device ON soldiers(device_id);
      CREATE INDEX IF NOT EXISTS idx_soldiers_status ON soldiers(status);
    ",
  },
  MigrationStep {
    name: "create_soldier_raw_inputs",
    sql:  "
      CREATE TABLE IF NOT EXISTS soldier_raw_inputs (
          input_id      TEXT PRIMARY KEY,
          soldier_id    TEXT NOT NULL REFERENCES soldiers(soldier_id),
          timestamp     TEXT NOT NULL,
          raw_text      TEXT NOT NULL,
          raw_audio_ref TEXT,
          input_type    TEXT DEFAULT 'voice',
          confidence    REAL DEFAULT 0.0,
          location_ref  TEXT,
          created_at    TEXT DEFAULT CURRENT_TIMESTAMP
      );
      CREATE INDEX IF NOT EXISTS idx_raw_inputs_soldier   ON soldier_raw_inputs(soldier_id);
      CREATE INDEX IF NOT EXISTS idx_raw_inputs_timestamp ON soldier_raw_inputs(timestamp);
    ",
  },
  MigrationStep {
    name: "create_reports",
    sql:  "
      CREATE TABLE IF NOT EXISTS reports (
          report_id       TEXT PRIMARY KEY,
          soldier_id      TEXT NOT NULL REFERENCES soldiers(soldier_id),
          unit_id         TEXT NOT NULL REFERENCES units(unit_id),
          timestamp       TEXT NOT NULL,
          report_type     TEXT NOT NULL,   -- free-text category: CASEVAC, SITREP, ...
          structured_json TEXT NOT NULL,   -- opaque payload; schema owned by the API
          confidence      REAL NOT NULL,
          created_at      TEXT DEFAULT CURRENT_TIMESTAMP,
          source_input_id TEXT,
          status          TEXT DEFAULT 'generated',
          reviewed_by     TEXT,
          reviewed_at     TEXT
      );
      CREATE INDEX IF NOT EXISTS idx_reports_soldier   ON reports(soldier_id);
      CREATE INDEX IF NOT EXISTS idx_reports_unit      ON reports(unit_id);
      CREATE INDEX IF NOT EXISTS idx_reports_type      ON reports(report_type);
      CREATE INDEX IF NOT EXISTS idx_reports_timestamp ON reports(timestamp);
    ",
  },
  MigrationStep {
    name: "create_device_status",
    sql:  "
      CREATE TABLE IF NOT EXISTS device_status (
          device_id         TEXT PRIMARY KEY,
          soldier_id        TEXT REFERENCES soldiers(soldier_id),
          status            TEXT DEFAULT 'active',
          last_heartbeat    TEXT,
          battery_level     INTEGER,
          signal_strength   INTEGER,
          location_lat      REAL,
          location_lon      REAL,
          location_accuracy REAL,
          created_at        TEXT DEFAULT CURRENT_TIMESTAMP,
          updated_at        TEXT DEFAULT CURRENT_TIMESTAMP
      );
      CREATE INDEX IF NOT EXISTS idx_device_status_soldier ON device_status(soldier_id);
    ",
  },
  MigrationStep {
    name: "create_comm_log",
    sql:  "
      CREATE TABLE IF NOT EXISTS comm_log (
          log_id        TEXT PRIMARY KEY,
          device_id     TEXT,
          soldier_id    TEXT REFERENCES soldiers(soldier_id),
          topic         TEXT NOT NULL,
          message_type  TEXT NOT NULL,
          message_size  INTEGER,
          timestamp     TEXT NOT NULL,
          success       BOOLEAN DEFAULT TRUE,
          error_message TEXT,
          created_at    TEXT DEFAULT CURRENT_TIMESTAMP
      );
      CREATE INDEX IF NOT EXISTS idx_comm_log_timestamp ON comm_log(timestamp);
    ",
  },
  MigrationStep {
    name: "create_fragos",
    sql:  "
      CREATE TABLE IF NOT EXISTS fragos (
          frago_id           TEXT PRIMARY KEY,
          unit_id            TEXT NOT NULL REFERENCES units(unit_id),
          task               TEXT,
          assigned_by        TEXT,
          assigned_at        TEXT,
          status             TEXT DEFAULT 'pending',   -- 'pending' | 'in_progress' | 'completed'
          priority           TEXT DEFAULT 'medium',
          deadline           TEXT,
          created_at         TEXT DEFAULT CURRENT_TIMESTAMP,
          frago_number       INTEGER,
          suggested_fields   TEXT,
          final_fields       TEXT,
          formatted_document TEXT,
          source_reports     TEXT
      );
      CREATE INDEX IF NOT EXISTS idx_fragos_unit   ON fragos(unit_id);
      CREATE INDEX IF NOT EXISTS idx_fragos_status ON fragos(status);
      CREATE INDEX IF NOT EXISTS idx_fragos_number ON fragos(frago_number);
    ",
  },
  MigrationStep {
    name: "create_suggestions",
    sql:  "
      CREATE TABLE IF NOT EXISTS suggestions (
          suggestion_id   TEXT PRIMARY KEY,
          suggestion_type TEXT NOT NULL,
          status          TEXT DEFAULT 'pending',
          unit_id         TEXT REFERENCES units(unit_id),
          created_at      TEXT DEFAULT CURRENT_TIMESTAMP,
          urgency         TEXT NOT NULL DEFAULT 'MEDIUM',
          reason          TEXT NOT NULL DEFAULT 'Automated suggestion',
          confidence      REAL NOT NULL DEFAULT 0.8,
          source_reports  TEXT NOT NULL DEFAULT '[]',  -- JSON array of report ids
          reviewed_at     TEXT,
          reviewed_by     TEXT
      );
      CREATE INDEX IF NOT EXISTS idx_suggestions_unit    ON suggestions(unit_id);
      CREATE INDEX IF NOT EXISTS idx_suggestions_status  ON suggestions(status);
      CREATE INDEX IF NOT EXISTS idx_suggestions_urgency ON suggestions(urgency);
      CREATE INDEX IF NOT EXISTS idx_suggestions_type    ON suggestions(suggestion_type);
    ",
  },
  MigrationStep {
    name: "create_report_sequences",
    sql:  "
      CREATE TABLE IF NOT EXISTS report_sequences (
          report_type TEXT PRIMARY KEY,
          next_number INTEGER NOT NULL DEFAULT 1
      );
    ",
  },
  MigrationStep {
    name: "create_frago_sequence",
    sql:  "
      CREATE TABLE IF NOT EXISTS frago_sequence (
          id          INTEGER PRIMARY KEY DEFAULT 1,
          next_number INTEGER NOT NULL DEFAULT 1
      );
    ",
  },
];

/// Columns that older deployments may lack. `ALTER TABLE ADD COLUMN` only;
/// never a type change or a drop.
pub const COLUMN_MIGRATIONS: &[ColumnMigration] = &[
  ColumnMigration {
    table:  "reports",
    column: "source_input_id",
    ddl:    "ALTER TABLE reports ADD COLUMN source_input_id TEXT",
  },
  ColumnMigration {
    table:  "reports",
    column: "status",
    ddl:    "ALTER TABLE reports ADD COLUMN status TEXT DEFAULT 'generated'",
  },
  ColumnMigration {
    table:  "reports",
    column: "reviewed_by",
    ddl:    "ALTER TABLE reports ADD COLUMN reviewed_by TEXT",
  },
  ColumnMigration {
    table:  "reports",
    column: "reviewed_at",
    ddl:    "ALTER TABLE reports ADD COLUMN reviewed_at TEXT",
  },
  ColumnMigration {
    table:  "device_status",
    column: "location_accuracy",
    ddl:    "ALTER TABLE device_status ADD COLUMN location_accuracy REAL",
  },
  ColumnMigration {
    table:  "fragos",
    column: "frago_number",
    ddl:    "ALTER TABLE fragos ADD COLUMN frago_number INTEGER",
  },
  ColumnMigration {
    table:  "fragos",
    column: "suggested_fields",
    ddl:    "ALTER TABLE fragos ADD COLUMN suggested_fields TEXT",
  },
  ColumnMigration {
    table:  "fragos",
    column: "final_fields",
    ddl:    "ALTER TABLE fragos ADD COLUMN final_fields TEXT",
  },
  ColumnMigration {
    table:  "fragos",
    column: "formatted_document",
    ddl:    "ALTER TABLE fragos ADD COLUMN formatted_document TEXT",
  },
  ColumnMigration {
    table:  "fragos",
    column: "source_reports",
    ddl:    "ALTER TABLE fragos ADD COLUMN source_reports TEXT",
  },
  ColumnMigration {
    table:  "suggestions",
    column: "urgency",
    ddl:    "ALTER TABLE suggestions ADD COLUMN urgency TEXT NOT NULL DEFAULT 'MEDIUM'",
  },
  ColumnMigration {
    table:  "suggestions",
    column: "reason",
    ddl:    "ALTER TABLE suggestions ADD COLUMN reason TEXT NOT NULL DEFAULT 'Automated suggestion'",
  },
  ColumnMigration {
    table:  "suggestions",
    column: "confidence",
    ddl:    "ALTER TABLE suggestions ADD COLUMN confidence REAL NOT NULL DEFAULT 0.8",
  },
  ColumnMigration {
    table:  "suggestions",
    column: "source_reports",
    ddl:    "ALTER TABLE suggestions ADD COLUMN source_reports TEXT NOT NULL DEFAULT '[]'",
  },
  ColumnMigration {
    table:  "suggestions",
    column: "reviewed_at",
    ddl:    "ALTER TABLE suggestions ADD COLUMN reviewed_at TEXT",
  },
  ColumnMigration {
    table:  "suggestions",
    column: "reviewed_by",
    ddl:    "ALTER TABLE suggestions ADD COLUMN reviewed_by TEXT",
  },
];

/// Drop order for the destructive path: referencing tables first.
pub const DROP_ORDER: &[&str] = &[
  "suggestions",
  "fragos",
  "frago_sequence",
  "report_sequences",
  "comm_log",
  "device_status",
  "reports",
  "soldier_raw_inputs",
  "soldiers",
  "units",
];
