//! Query service: incident listings and reference-data lookups.

use std::sync::Arc;

use tracing::debug;

use crate::date;
use crate::error::ApiError;
use crate::filter::IncidentFilter;
use crate::storage::{Row, SqlValue, StorageError, StorageGateway};
use crate::types::{CodeResponse, IncidentResponse, NeighborhoodResponse};

const SELECT_CODES: &str = "SELECT code, incident_type FROM Codes ORDER BY code";
const SELECT_NEIGHBORHOODS: &str =
  "SELECT neighborhood_number, neighborhood_name FROM Neighborhoods ORDER BY neighborhood_number";

#[derive(Clone)]
pub struct QueryService {
  gateway: Arc<dyn StorageGateway>,
}

impl QueryService {
  pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
    Self { gateway }
  }

  /// Incidents matching `filter`, in store order (ascending `date_time`).
  /// No match is an empty list, not an error.
  pub async fn list_incidents(
    &self,
    filter: &IncidentFilter,
  ) -> Result<Vec<IncidentResponse>, ApiError> {
    let compiled = filter.to_query();
    let rows = self.gateway.read_rows(&compiled.sql, &compiled.params).await?;
    debug!(rows = rows.len(), "list_incidents");
    let incidents = rows
      .iter()
      .map(incident_from_row)
      .collect::<Result<Vec<_>, _>>()?;
    Ok(incidents)
  }

  /// Incident-type codes, optionally narrowed to a comma list.
  ///
  /// Membership compares the code's decimal text against the raw list
  /// elements; there is no integer parsing here. An empty result is
  /// `NotFound`.
  pub async fn list_codes(&self, code_filter: Option<&str>) -> Result<Vec<CodeResponse>, ApiError> {
    let rows = self.gateway.read_rows(SELECT_CODES, &[]).await?;
    let mut codes = Vec::with_capacity(rows.len());
    for row in &rows {
      codes.push(CodeResponse {
        code: row.get_i64("code")?,
        incident_type: text_or_empty(row, "incident_type")?,
      });
    }
    let codes = retain_listed(codes, code_filter, |c| c.code);
    if codes.is_empty() {
      return Err(ApiError::not_found("codes"));
    }
    Ok(codes)
  }

  /// Neighborhoods, optionally narrowed to a comma list of ids. Same contract
  /// as [`QueryService::list_codes`].
  pub async fn list_neighborhoods(
    &self,
    id_filter: Option<&str>,
  ) -> Result<Vec<NeighborhoodResponse>, ApiError> {
    let rows = self.gateway.read_rows(SELECT_NEIGHBORHOODS, &[]).await?;
    let mut neighborhoods = Vec::with_capacity(rows.len());
    for row in &rows {
      neighborhoods.push(NeighborhoodResponse {
        id: row.get_i64("neighborhood_number")?,
        name: text_or_empty(row, "neighborhood_name")?,
      });
    }
    let neighborhoods = retain_listed(neighborhoods, id_filter, |n| n.id);
    if neighborhoods.is_empty() {
      return Err(ApiError::not_found("neighborhoods"));
    }
    Ok(neighborhoods)
  }
}

/// Keep entries whose key, as decimal text, appears in the comma list. An
/// absent or empty list keeps everything.
fn retain_listed<T>(entries: Vec<T>, list: Option<&str>, key: impl Fn(&T) -> i64) -> Vec<T> {
  let wanted: Vec<&str> = match list {
    Some(l) if !l.is_empty() => l.split(',').collect(),
    _ => return entries,
  };
  entries
    .into_iter()
    .filter(|e| wanted.contains(&key(e).to_string().as_str()))
    .collect()
}

fn text_or_empty(row: &Row, column: &str) -> Result<String, StorageError> {
  match row.get(column) {
    Some(SqlValue::Null) => Ok(String::new()),
    _ => row.get_display(column),
  }
}

fn incident_from_row(row: &Row) -> Result<IncidentResponse, StorageError> {
  let raw_ts = row.get_str("date_time")?;
  let ts = date::parse_timestamp(raw_ts)
    .ok_or_else(|| StorageError::decode("date_time", format!("unparseable timestamp {:?}", raw_ts)))?;
  Ok(IncidentResponse {
    case_number: row.get_display("case_number")?,
    date: date::format_date(&ts),
    time: date::format_time(&ts),
    code: row.opt_i64("code")?,
    incident: text_or_empty(row, "incident")?,
    police_grid: row.opt_i64("police_grid")?,
    neighborhood_number: row.opt_i64("neighborhood_number")?,
    block: text_or_empty(row, "block")?,
  })
}
