//! Incident Query API
//!
//! HTTP service over a SQLite crime database: filtered incident listings,
//! code and neighborhood lookups, and existence-checked incident removal.
//! Bind to 127.0.0.1 by default (internal only).

pub mod config;
pub mod date;
pub mod error;
pub mod filter;
mod handlers;
pub mod mutation;
pub mod query;
mod state;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_support;

use axum::{
  routing::{delete, get, put},
  Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use handlers::{health, list_codes, list_incidents, list_neighborhoods, new_incident, remove_incident};
pub use state::AppState;
pub use storage::{SqliteGateway, StorageGateway};

/// Build the router with every endpoint mounted.
pub fn app(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/codes", get(list_codes))
    .route("/neighborhoods", get(list_neighborhoods))
    .route("/incidents", get(list_incidents))
    .route("/new-incident", put(new_incident))
    .route("/remove-incident", delete(remove_incident))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
