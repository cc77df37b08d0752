//! Request/response types for the incident API.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Query string of `GET /incidents`. Every value is raw and unvalidated;
/// unrecognized keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentQuery {
  pub start_date: Option<String>,
  pub end_date: Option<String>,
  pub code: Option<String>,
  pub grid: Option<String>,
  pub neighborhood: Option<String>,
  pub limit: Option<String>,
}

/// Query string of `GET /codes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeQuery {
  pub code: Option<String>,
}

/// Query string of `GET /neighborhoods`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NeighborhoodQuery {
  pub id: Option<String>,
}

/// A case number as sent by clients, either a JSON string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CaseNumber {
  Text(String),
  Number(i64),
}

impl CaseNumber {
  /// Canonical text form used as the lookup key.
  pub fn as_key(&self) -> String {
    match self {
      Self::Text(s) => s.clone(),
      Self::Number(n) => n.to_string(),
    }
  }
}

/// Body of `DELETE /remove-incident`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveIncidentRequest {
  #[serde(default)]
  pub case_number: Option<CaseNumber>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentResponse {
  pub case_number: String,
  pub date: String,
  pub time: String,
  pub code: Option<i64>,
  pub incident: String,
  pub police_grid: Option<i64>,
  pub neighborhood_number: Option<i64>,
  pub block: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeResponse {
  pub code: i64,
  #[serde(rename = "type")]
  pub incident_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodResponse {
  pub id: i64,
  pub name: String,
}
