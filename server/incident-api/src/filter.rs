//! Filter compiler: turns raw `/incidents` parameters into one parameterized
//! SELECT over `Incidents`.
//!
//! Each recognized key contributes exactly one predicate fragment. Fragments
//! are AND-joined, ordered by key, and every literal travels as a bound
//! [`Param`]; nothing from the request is spliced into the SQL text.

use chrono::NaiveDate;

use crate::date;
use crate::error::ApiError;
use crate::storage::Param;
use crate::types::IncidentQuery;

/// Row cap when the request does not supply `limit`.
pub const DEFAULT_LIMIT: u32 = 1000;

const SELECT_INCIDENTS: &str = "SELECT case_number, date_time, code, incident, police_grid, \
   neighborhood_number, block FROM Incidents";

/// One bound predicate contributed by a single query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
  StartDate(NaiveDate),
  EndDate(NaiveDate),
  CodeIn(Vec<i64>),
  GridIn(Vec<i64>),
  NeighborhoodIn(Vec<i64>),
}

impl Predicate {
  /// Append this fragment's values to `params` and return its SQL text.
  fn render(&self, params: &mut Vec<Param>) -> String {
    match self {
      Self::StartDate(d) => {
        params.push(Param::Text(d.format("%Y-%m-%d").to_string()));
        "DATE(date_time) >= DATE(?)".to_string()
      }
      Self::EndDate(d) => {
        params.push(Param::Text(d.format("%Y-%m-%d").to_string()));
        "DATE(date_time) <= DATE(?)".to_string()
      }
      Self::CodeIn(values) => in_list("code", values, params),
      Self::GridIn(values) => in_list("police_grid", values, params),
      Self::NeighborhoodIn(values) => in_list("neighborhood_number", values, params),
    }
  }
}

fn in_list(column: &str, values: &[i64], params: &mut Vec<Param>) -> String {
  let placeholders = vec!["?"; values.len()].join(", ");
  params.extend(values.iter().copied().map(Param::Integer));
  format!("{} IN ({})", column, placeholders)
}

/// A compiled statement and its bound values, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
  pub sql: String,
  pub params: Vec<Param>,
}

/// Validated, request-scoped incident filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentFilter {
  predicates: Vec<Predicate>,
  limit: u32,
}

impl Default for IncidentFilter {
  fn default() -> Self {
    Self {
      predicates: Vec::new(),
      limit: DEFAULT_LIMIT,
    }
  }
}

impl IncidentFilter {
  /// Validate the raw parameters. Any malformed value fails the whole filter.
  pub fn compile(query: &IncidentQuery) -> Result<Self, ApiError> {
    let mut filter = Self::default();

    if let Some(raw) = &query.start_date {
      filter.predicates.push(Predicate::StartDate(parse_date("start_date", raw)?));
    }
    if let Some(raw) = &query.end_date {
      filter.predicates.push(Predicate::EndDate(parse_date("end_date", raw)?));
    }
    if let Some(raw) = &query.code {
      filter.predicates.push(Predicate::CodeIn(parse_int_list("code", raw)?));
    }
    if let Some(raw) = &query.grid {
      filter.predicates.push(Predicate::GridIn(parse_int_list("grid", raw)?));
    }
    if let Some(raw) = &query.neighborhood {
      filter
        .predicates
        .push(Predicate::NeighborhoodIn(parse_int_list("neighborhood", raw)?));
    }
    if let Some(raw) = &query.limit {
      filter.limit = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("limit", "expected a non-negative integer"))?;
    }

    Ok(filter)
  }

  pub fn predicates(&self) -> &[Predicate] {
    &self.predicates
  }

  pub fn limit(&self) -> u32 {
    self.limit
  }

  /// The AND-joined WHERE body and its params, or `None` with no predicates.
  pub fn where_clause(&self) -> Option<(String, Vec<Param>)> {
    if self.predicates.is_empty() {
      return None;
    }
    let mut params = Vec::new();
    let fragments: Vec<String> = self
      .predicates
      .iter()
      .map(|p| p.render(&mut params))
      .collect();
    Some((fragments.join(" AND "), params))
  }

  /// Full SELECT with ascending `date_time` order and a bound LIMIT.
  pub fn to_query(&self) -> CompiledQuery {
    let mut sql = String::from(SELECT_INCIDENTS);
    let mut params = Vec::new();
    if let Some((clause, where_params)) = self.where_clause() {
      sql.push_str(" WHERE ");
      sql.push_str(&clause);
      params = where_params;
    }
    sql.push_str(" ORDER BY date_time ASC LIMIT ?");
    params.push(Param::Integer(i64::from(self.limit)));
    CompiledQuery { sql, params }
  }
}

/// Split a comma list and parse every element as an integer. Empty or
/// non-numeric elements are rejected rather than coerced.
fn parse_int_list(field: &str, raw: &str) -> Result<Vec<i64>, ApiError> {
  raw
    .split(',')
    .map(|token| {
      let token = token.trim();
      token.parse::<i64>().map_err(|_| {
        ApiError::validation(field, &format!("expected comma-separated integers, got {:?}", token))
      })
    })
    .collect()
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
  let raw = raw.trim();
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .or_else(|| date::parse_timestamp(raw).map(|dt| dt.date()))
    .ok_or_else(|| ApiError::validation(field, "expected a date as YYYY-MM-DD"))
}
