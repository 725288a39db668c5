//! Async HTTP client wrapping the deployed backend's JSON API.
//!
//! The backend is an external collaborator; the request and response shapes
//! here document the contract this repository depends on, nothing more.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Connection settings for the backend under test.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// Async HTTP client for the backend's JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

// ─── Wire types ───────────────────────────────────────────────────────────────

/// `GET /hierarchy` response envelope.
#[derive(Debug, Deserialize)]
pub struct HierarchyResponse {
  pub units: Vec<HierarchyUnit>,
}

/// One unit as served by the backend. Fields beyond the id and name are
/// tolerated as absent so schema additions don't break the probe.
#[derive(Debug, Deserialize)]
pub struct HierarchyUnit {
  pub unit_id:        String,
  pub name:           String,
  #[serde(default)]
  pub parent_unit_id: Option<String>,
  #[serde(default)]
  pub level:          Option<String>,
}

/// `POST /soldiers/{id}/raw_inputs` request body.
#[derive(Debug, Serialize)]
pub struct NewRawInput {
  pub soldier_id: String,
  pub raw_text:   String,
  pub input_type: String,
  pub confidence: f64,
  pub timestamp:  String,
}

#[derive(Debug, Deserialize)]
pub struct RawInputCreated {
  pub input_id: String,
}

/// `POST /soldiers/{id}/reports` request body.
#[derive(Debug, Serialize)]
pub struct NewReport {
  pub soldier_id:      String,
  pub unit_id:         String,
  pub report_type:     String,
  /// JSON-encoded payload, double-serialized per the backend's contract.
  pub structured_json: String,
  pub confidence:      f64,
  pub timestamp:       String,
  pub source_input_id: Option<String>,
  pub status:          String,
}

#[derive(Debug, Deserialize)]
pub struct ReportCreated {
  pub report_id: String,
}

/// `POST /ai/chat` request body.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
  pub message: String,
  pub context: ChatContext,
}

#[derive(Debug, Serialize)]
pub struct ChatContext {
  pub node:    ChatNode,
  pub reports: Vec<ReportContext>,
}

/// The hierarchy node the operator has selected.
#[derive(Debug, Serialize)]
pub struct ChatNode {
  pub name:    String,
  pub unit_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub level:   Option<i64>,
}

/// A report passed as chat context. The backend accepts two shapes: its own
/// storage shape and the transformed shape the frontend sends. Serialized
/// untagged, so each variant produces exactly the field set the backend
/// expects for that shape.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportContext {
  Backend {
    report_type:     String,
    timestamp:       String,
    soldier_name:    String,
    /// JSON-encoded payload string, as stored.
    structured_json: String,
  },
  Frontend {
    #[serde(rename = "type")]
    kind: String,
    time: String,
    from: String,
    /// Decoded payload object, not a string.
    data: serde_json::Value,
  },
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
  pub timestamp:        String,
  pub reports_analyzed: i64,
  pub response:         String,
}

// ─── Client ───────────────────────────────────────────────────────────────────

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `GET /hierarchy`
  pub async fn hierarchy(&self) -> Result<HierarchyResponse> {
    let resp = self
      .client
      .get(self.url("/hierarchy"))
      .send()
      .await
      .context("GET /hierarchy failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /hierarchy -> {}", resp.status()));
    }
    resp.json().await.context("deserialising hierarchy")
  }

  /// `POST /soldiers/{id}/raw_inputs`
  pub async fn create_raw_input(&self, input: &NewRawInput) -> Result<RawInputCreated> {
    let path = format!("/soldiers/{}/raw_inputs", input.soldier_id);
    let resp = self
      .client
      .post(self.url(&path))
      .json(input)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("POST {path} -> {}", resp.status()));
    }
    resp.json().await.context("deserialising raw-input response")
  }

  /// `POST /soldiers/{id}/reports`
  pub async fn create_report(&self, report: &NewReport) -> Result<ReportCreated> {
    let path = format!("/soldiers/{}/reports", report.soldier_id);
    let resp = self
      .client
      .post(self.url(&path))
      .json(report)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("POST {path} -> {}", resp.status()));
    }
    resp.json().await.context("deserialising report response")
  }

  /// `POST /ai/chat`
  pub async fn ai_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
    let resp = self
      .client
      .post(self.url("/ai/chat"))
      .json(request)
      .send()
      .await
      .context("POST /ai/chat failed")?;

    if !resp.status().is_success() {
      let status = resp.status();
      let body = resp.text().await.unwrap_or_default();
      return Err(anyhow!("POST /ai/chat -> {status}: {body}"));
    }
    resp.json().await.context("deserialising chat response")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn backend_report_context_uses_storage_field_names() {
    let report = ReportContext::Backend {
      report_type:     "CONTACT".to_owned(),
      timestamp:       "2025-10-04T22:47:17".to_owned(),
      soldier_name:    "Cpl. Smith".to_owned(),
      structured_json: r#"{"enemy_count": 15}"#.to_owned(),
    };

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["report_type"], "CONTACT");
    assert_eq!(value["soldier_name"], "Cpl. Smith");
    // The payload stays a string, exactly as stored.
    assert!(value["structured_json"].is_string());
  }

  #[test]
  fn frontend_report_context_uses_transformed_field_names() {
    let report = ReportContext::Frontend {
      kind: "CONTACT".to_owned(),
      time: "2025-10-04T22:47:17".to_owned(),
      from: "Cpl. Smith".to_owned(),
      data: serde_json::json!({ "enemy_count": 15 }),
    };

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["type"], "CONTACT");
    assert_eq!(value["from"], "Cpl. Smith");
    // The payload is a decoded object in this shape.
    assert_eq!(value["data"]["enemy_count"], 15);
  }

  #[test]
  fn chat_request_omits_absent_node_level() {
    let request = ChatRequest {
      message: "status?".to_owned(),
      context: ChatContext {
        node:    ChatNode {
          name:    "1st Infantry Battalion".to_owned(),
          unit_id: "BAT_1".to_owned(),
          level:   None,
        },
        reports: vec![],
      },
    };

    let value = serde_json::to_value(&request).unwrap();
    assert!(value["context"]["node"].get("level").is_none());
    assert!(value["context"]["reports"].as_array().unwrap().is_empty());
  }

  #[test]
  fn new_report_serializes_optional_source_input() {
    let report = NewReport {
      soldier_id:      "ALPHA_01".to_owned(),
      unit_id:         "PLT_1".to_owned(),
      report_type:     "CASEVAC".to_owned(),
      structured_json: r#"{"urgency": "URGENT"}"#.to_owned(),
      confidence:      0.9,
      timestamp:       "2025-10-04T22:47:17Z".to_owned(),
      source_input_id: None,
      status:          "generated".to_owned(),
    };

    let value = serde_json::to_value(&report).unwrap();
    assert!(value["source_input_id"].is_null());
    assert_eq!(value["status"], "generated");
  }
}
