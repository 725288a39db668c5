//! Fixed demonstration fixture: a small battalion hierarchy with soldiers,
//! inputs, reports, device rows, orders, and suggestions.
//!
//! Every insert is `INSERT OR IGNORE`, so seeding an already-seeded database
//! changes nothing. Rows are written in foreign-key dependency order. This
//! data exists purely for demonstration and smoke testing; production
//! deployments skip it via configuration.

use chrono::{Duration, Utc};
use rusqlite::params;

use crate::encode::encode_dt;

pub(crate) fn apply(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  let now = Utc::now();
  let ago = |minutes: i64| encode_dt(now - Duration::minutes(minutes));

  // Sequence initializers.
  conn.execute(
    "INSERT OR IGNORE INTO frago_sequence (id, next_number) VALUES (1, 1)",
    [],
  )?;
  for report_type in ["CASEVAC", "EOINCREP", "FRAGO", "OPORD"] {
    conn.execute(
      "INSERT OR IGNORE INTO report_sequences (report_type, next_number) VALUES (?1, 1)",
      params![report_type],
    )?;
  }

  // Units: Battalion -> Company -> Platoon -> Squad.
  let units: &[(&str, &str, Option<&str>, &str)] = &[
    ("BAT_1", "1st Infantry Battalion", None, "Battalion"),
    ("CO_A", "Alpha Company", Some("BAT_1"), "Company"),
    ("CO_B", "Bravo Company", Some("BAT_1"), "Company"),
    ("PLT_1", "1st Platoon", Some("CO_A"), "Platoon"),
    ("PLT_2", "2nd Platoon", Some("CO_A"), "Platoon"),
    ("PLT_3", "3rd Platoon", Some("CO_B"), "Platoon"),
    ("SQD_1", "1st Squad", Some("PLT_1"), "Squad"),
    ("SQD_2", "2nd Squad", Some("PLT_1"), "Squad"),
    ("SQD_3", "3rd Squad", Some("PLT_2"), "Squad"),
  ];
  for (unit_id, name, parent, level) in units {
    conn.execute(
      "INSERT OR IGNORE INTO units (unit_id, name, parent_unit_id, level)
       VALUES (?1, ?2, ?3, ?4)",
      params![unit_id, name, parent, level],
    )?;
  }

  // Soldiers.
  let soldiers: &[(&str, &str, &str, &str, &str, i64)] = &[
    ("ALPHA_01", "Lt. John Smith", "Lieutenant", "PLT_1", "DEVICE_001", 5),
    ("ALPHA_02", "Sgt. Mike Johnson", "Sergeant", "SQD_1", "DEVICE_002", 2),
    ("ALPHA_03", "Pvt. David Wilson", "Private", "SQD_1", "DEVICE_003", 1),
    ("ALPHA_04", "Cpl. Sarah Brown", "Corporal", "SQD_2", "DEVICE_004", 3),
    ("BRAVO_01", "Capt. Tom Davis", "Captain", "CO_B", "DEVICE_005", 10),
  ];
  for (soldier_id, name, rank, unit_id, device_id, seen_min) in soldiers {
    conn.execute(
      "INSERT OR IGNORE INTO soldiers
         (soldier_id, name, rank, unit_id, device_id, status, last_seen)
       VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6)",
      params![soldier_id, name, rank, unit_id, device_id, ago(*seen_min)],
    )?;
  }

  // Raw inputs.
  let inputs: &[(&str, &str, i64, &str, f64)] = &[
    (
      "INPUT_001",
      "ALPHA_02",
      30,
      "We have a soldier down with gunshot wound to the leg. Need immediate \
       CASEVAC at grid 38SMB 123 456.",
      0.95,
    ),
    (
      "INPUT_002",
      "ALPHA_04",
      45,
      "Found suspicious device buried by roadside. Appears to be IED. \
       Requesting EOD team.",
      0.92,
    ),
    (
      "INPUT_003",
      "ALPHA_01",
      60,
      "Patrol complete. All personnel accounted for. Returning to base.",
      0.98,
    ),
    (
      "INPUT_004",
      "BRAVO_01",
      120,
      "Enemy contact at grid 38SMB 789 012. 8-10 personnel with small arms. \
       Engaging.",
      0.89,
    ),
    (
      "INPUT_005",
      "ALPHA_03",
      15,
      "Vehicle checkpoint established. Light civilian traffic observed.",
      0.94,
    ),
  ];
  for (input_id, soldier_id, min, text, confidence) in inputs {
    conn.execute(
      "INSERT OR IGNORE INTO soldier_raw_inputs
         (input_id, soldier_id, timestamp, raw_text, input_type, confidence)
       VALUES (?1, ?2, ?3, ?4, 'voice', ?5)",
      params![input_id, soldier_id, ago(*min), text, confidence],
    )?;
  }

  // Structured reports derived from the raw inputs above.
  let reports: &[(&str, &str, &str, i64, &str, &str, f64, &str)] = &[
    (
      "REPORT_001",
      "ALPHA_02",
      "SQD_1",
      30,
      "CASEVAC",
      r#"{"casualties": [{"name": "Pvt. Williams", "injury": "Gunshot wound to left leg", "severity": "URGENT", "status": "Stable"}], "location": "Grid 38SMB 123 456", "evacuation_point": "LZ Alpha", "urgency": "URGENT"}"#,
      0.95,
      "INPUT_001",
    ),
    (
      "REPORT_002",
      "ALPHA_04",
      "SQD_2",
      45,
      "EOINCREP",
      r#"{"incident_type": "IED Discovery", "location": "Grid 38SMB 456 789", "threat_level": "HIGH", "action_taken": "Area cordoned off, EOD team requested", "casualties": "None"}"#,
      0.92,
      "INPUT_002",
    ),
    (
      "REPORT_003",
      "ALPHA_01",
      "PLT_1",
      60,
      "SITREP",
      r#"{"unit": "1st Platoon", "location": "Patrol Route Alpha", "situation": "Patrol completed successfully", "enemy_activity": "None observed", "next_action": "Return to base for debrief"}"#,
      0.98,
      "INPUT_003",
    ),
    (
      "REPORT_004",
      "BRAVO_01",
      "CO_B",
      120,
      "SPOTREP",
      r#"{"what": "Enemy patrol, 8-10 personnel with small arms", "where": "Grid 38SMB 789 012", "activity": "Moving north along ridgeline", "action_taken": "Engaging enemy forces"}"#,
      0.89,
      "INPUT_004",
    ),
    (
      "REPORT_005",
      "ALPHA_03",
      "SQD_1",
      15,
      "SITREP",
      r#"{"unit": "1st Squad", "location": "Checkpoint Delta", "situation": "Maintaining checkpoint security", "enemy_activity": "None observed", "next_action": "Continue checkpoint operations"}"#,
      0.94,
      "INPUT_005",
    ),
  ];
  for (report_id, soldier_id, unit_id, min, report_type, json, confidence, source) in reports {
    conn.execute(
      "INSERT OR IGNORE INTO reports
         (report_id, soldier_id, unit_id, timestamp, report_type,
          structured_json, confidence, source_input_id, status)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'generated')",
      params![report_id, soldier_id, unit_id, ago(*min), report_type, json, confidence, source],
    )?;
  }

  // Device status, one row per device.
  let devices: &[(&str, &str, i64, i64, i64, f64, f64)] = &[
    ("DEVICE_001", "ALPHA_01", 5, 85, 75, 60.1699, 24.9384),
    ("DEVICE_002", "ALPHA_02", 2, 92, 82, 60.1705, 24.9390),
    ("DEVICE_003", "ALPHA_03", 1, 78, 68, 60.1695, 24.9388),
    ("DEVICE_004", "ALPHA_04", 3, 88, 79, 60.1701, 24.9385),
    ("DEVICE_005", "BRAVO_01", 10, 65, 71, 60.1710, 24.9395),
  ];
  for (device_id, soldier_id, min, battery, signal, lat, lon) in devices {
    conn.execute(
      "INSERT OR IGNORE INTO device_status
         (device_id, soldier_id, status, last_heartbeat, battery_level,
          signal_strength, location_lat, location_lon)
       VALUES (?1, ?2, 'active', ?3, ?4, ?5, ?6, ?7)",
      params![device_id, soldier_id, ago(*min), battery, signal, lat, lon],
    )?;
  }

  // Fragmentary orders.
  let fragos: &[(&str, &str, &str, &str, i64, &str, &str, i64)] = &[
    (
      "FRAGO_001",
      "PLT_1",
      "Establish checkpoint at Grid 38SMB 234 567 from 0600 to 1800",
      "CO_A",
      360,
      "completed",
      "high",
      -720,
    ),
    (
      "FRAGO_002",
      "SQD_1",
      "Patrol Route Bravo and report any suspicious activity",
      "PLT_1",
      180,
      "in_progress",
      "medium",
      -360,
    ),
    (
      "FRAGO_003",
      "CO_B",
      "Conduct area reconnaissance of sector 7",
      "BAT_1",
      60,
      "pending",
      "high",
      -1440,
    ),
  ];
  for (frago_id, unit_id, task, assigned_by, assigned_min, status, priority, deadline_min) in
    fragos
  {
    conn.execute(
      "INSERT OR IGNORE INTO fragos
         (frago_id, unit_id, task, assigned_by, assigned_at, status, priority, deadline)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      params![
        frago_id,
        unit_id,
        task,
        assigned_by,
        ago(*assigned_min),
        status,
        priority,
        ago(*deadline_min),
      ],
    )?;
  }

  // AI suggestions referencing the seeded reports.
  let suggestions: &[(&str, &str, &str, &str, &str, f64, &str)] = &[
    (
      "SUGG_001",
      "CASEVAC",
      "PLT_1",
      "HIGH",
      "Critical casualties detected requiring immediate evacuation",
      0.95,
      r#"["REPORT_001"]"#,
    ),
    (
      "SUGG_002",
      "EOINCREP",
      "SQD_2",
      "HIGH",
      "Explosive ordnance detected - EOD team required",
      0.92,
      r#"["REPORT_002"]"#,
    ),
    (
      "SUGG_003",
      "EOINCREP",
      "CO_B",
      "MEDIUM",
      "Enemy contact reported - tactical assessment needed",
      0.89,
      r#"["REPORT_004"]"#,
    ),
  ];
  for (suggestion_id, suggestion_type, unit_id, urgency, reason, confidence, sources) in
    suggestions
  {
    conn.execute(
      "INSERT OR IGNORE INTO suggestions
         (suggestion_id, suggestion_type, status, unit_id, urgency, reason,
          confidence, source_reports)
       VALUES (?1, ?2, 'pending', ?3, ?4, ?5, ?6, ?7)",
      params![suggestion_id, suggestion_type, unit_id, urgency, reason, confidence, sources],
    )?;
  }

  Ok(())
}
