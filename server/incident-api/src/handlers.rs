//! HTTP handlers for the incident API.
//!
//! Status mapping is per endpoint: listings answer an empty lookup with 404,
//! `/incidents` answers every failure with 400, and `/remove-incident`
//! answers every failure with 500.

use axum::{
  extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::filter::IncidentFilter;
use crate::state::AppState;
use crate::types::{CodeQuery, IncidentQuery, NeighborhoodQuery, RemoveIncidentRequest};

const NOT_FOUND: &str = "404 Not Found";
const INTERNAL_ERROR: &str = "500 Internal Server Error";
const INVALID_REQUEST: &str = "Invalid request";
const INVALID_CASE: &str = "Invalid case number";

pub async fn health() -> &'static str {
  "ok"
}

pub async fn list_codes(
  State(state): State<Arc<AppState>>,
  query: Result<Query<CodeQuery>, QueryRejection>,
) -> Response {
  let Query(query) = match query {
    Ok(q) => q,
    Err(e) => {
      warn!("codes: bad query string: {}", e);
      return (StatusCode::BAD_REQUEST, INVALID_REQUEST).into_response();
    }
  };
  lookup_response("codes", state.queries.list_codes(query.code.as_deref()).await)
}

pub async fn list_neighborhoods(
  State(state): State<Arc<AppState>>,
  query: Result<Query<NeighborhoodQuery>, QueryRejection>,
) -> Response {
  let Query(query) = match query {
    Ok(q) => q,
    Err(e) => {
      warn!("neighborhoods: bad query string: {}", e);
      return (StatusCode::BAD_REQUEST, INVALID_REQUEST).into_response();
    }
  };
  lookup_response(
    "neighborhoods",
    state.queries.list_neighborhoods(query.id.as_deref()).await,
  )
}

fn lookup_response<T: serde::Serialize>(what: &str, result: Result<Vec<T>, ApiError>) -> Response {
  match result {
    Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
    Err(e) if e.is_not_found() => (StatusCode::NOT_FOUND, NOT_FOUND).into_response(),
    Err(e) => {
      error!("{}: {}", what, e);
      (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
    }
  }
}

pub async fn list_incidents(
  State(state): State<Arc<AppState>>,
  query: Result<Query<IncidentQuery>, QueryRejection>,
) -> Response {
  let Query(query) = match query {
    Ok(q) => q,
    Err(e) => {
      warn!("incidents: bad query string: {}", e);
      return (StatusCode::BAD_REQUEST, INVALID_REQUEST).into_response();
    }
  };

  let filter = match IncidentFilter::compile(&query) {
    Ok(f) => f,
    Err(e) => {
      warn!("incidents: {}", e);
      return (StatusCode::BAD_REQUEST, INVALID_REQUEST).into_response();
    }
  };

  match state.queries.list_incidents(&filter).await {
    Ok(incidents) => (StatusCode::OK, Json(incidents)).into_response(),
    Err(e) => {
      error!("incidents: {}", e);
      (StatusCode::BAD_REQUEST, INVALID_REQUEST).into_response()
    }
  }
}

/// Accepts any JSON body and acknowledges it; nothing is persisted.
pub async fn new_incident(body: Result<Json<serde_json::Value>, JsonRejection>) -> Response {
  match body {
    Ok(Json(body)) => {
      info!(%body, "new-incident received");
      (StatusCode::OK, "OK").into_response()
    }
    Err(e) => {
      warn!("new-incident: {}", e);
      (StatusCode::BAD_REQUEST, INVALID_REQUEST).into_response()
    }
  }
}

pub async fn remove_incident(
  State(state): State<Arc<AppState>>,
  body: Result<Json<RemoveIncidentRequest>, JsonRejection>,
) -> Response {
  let case_number = match body {
    Ok(Json(RemoveIncidentRequest {
      case_number: Some(cn),
    })) => cn.as_key(),
    Ok(_) => {
      warn!("remove-incident: missing case_number");
      return (StatusCode::BAD_REQUEST, INVALID_REQUEST).into_response();
    }
    Err(e) => {
      warn!("remove-incident: {}", e);
      return (StatusCode::BAD_REQUEST, INVALID_REQUEST).into_response();
    }
  };

  match state.mutations.remove_incident(&case_number).await {
    Ok(()) => (StatusCode::OK, "OK").into_response(),
    Err(e) if e.is_not_found() => (StatusCode::INTERNAL_SERVER_ERROR, INVALID_CASE).into_response(),
    Err(e) => {
      error!("remove-incident: {}", e);
      (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
    }
  }
}
