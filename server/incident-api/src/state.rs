//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::mutation::MutationService;
use crate::query::QueryService;
use crate::storage::StorageGateway;

pub struct AppState {
  pub queries: QueryService,
  pub mutations: MutationService,
}

impl AppState {
  pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
    Self {
      queries: QueryService::new(gateway.clone()),
      mutations: MutationService::new(gateway),
    }
  }
}
