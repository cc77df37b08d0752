//! Mutation service: existence-checked incident removal.
//!
//! Removal is two statements, a lookup then a delete, without a wrapping
//! transaction. A concurrent delete landing between them shows up as zero
//! rows affected and is reported as `NotFound` as well.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ApiError;
use crate::storage::{Param, StorageGateway};

const SELECT_CASE: &str = "SELECT case_number FROM Incidents WHERE case_number = ?";
const DELETE_CASE: &str = "DELETE FROM Incidents WHERE case_number = ?";

#[derive(Clone)]
pub struct MutationService {
  gateway: Arc<dyn StorageGateway>,
}

impl MutationService {
  pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
    Self { gateway }
  }

  /// Delete one incident by case number. Unknown case numbers fail with
  /// `NotFound` and never reach the DELETE.
  pub async fn remove_incident(&self, case_number: &str) -> Result<(), ApiError> {
    let params = [Param::from(case_number)];

    let found = self.gateway.read_rows(SELECT_CASE, &params).await?;
    if found.is_empty() {
      warn!(case_number, "remove_incident: no such case");
      return Err(ApiError::not_found(format!("case {}", case_number)));
    }

    let deleted = self.gateway.execute(DELETE_CASE, &params).await?;
    if deleted == 0 {
      warn!(case_number, "remove_incident: case vanished before delete");
      return Err(ApiError::not_found(format!("case {}", case_number)));
    }

    info!(case_number, "incident removed");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::{empty_gateway, seeded_gateway, RecordingGateway, VanishingGateway};

  #[tokio::test]
  async fn removes_existing_case() {
    let gw = Arc::new(RecordingGateway::new(seeded_gateway().await));
    let svc = MutationService::new(gw.clone());

    svc.remove_incident("22-000003").await.unwrap();
    assert_eq!(gw.read(), vec![SELECT_CASE.to_string()]);
    assert_eq!(gw.executed(), vec![DELETE_CASE.to_string()]);

    let left = gw
      .inner
      .read_rows(SELECT_CASE, &[Param::from("22-000003")])
      .await
      .unwrap();
    assert!(left.is_empty());
  }

  #[tokio::test]
  async fn unknown_case_never_issues_delete() {
    let gw = Arc::new(RecordingGateway::new(empty_gateway().await));
    let svc = MutationService::new(gw.clone());

    let err = svc.remove_incident("99-000").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(gw.executed().is_empty());
  }

  #[tokio::test]
  async fn case_deleted_between_check_and_delete_is_not_found() {
    let gw = Arc::new(RecordingGateway::new(VanishingGateway {
      inner: seeded_gateway().await,
    }));
    let svc = MutationService::new(gw.clone());

    let err = svc.remove_incident("22-000002").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(gw.read(), vec![SELECT_CASE.to_string()]);
    assert_eq!(gw.executed(), vec![DELETE_CASE.to_string()]);
  }

  #[tokio::test]
  async fn second_removal_is_not_found() {
    let gw: Arc<dyn StorageGateway> = Arc::new(seeded_gateway().await);
    let svc = MutationService::new(gw.clone());

    svc.remove_incident("22-000001").await.unwrap();
    let err = svc.remove_incident("22-000001").await.unwrap_err();
    assert!(err.is_not_found());

    let remaining = gw.read_rows("SELECT * FROM Incidents", &[]).await.unwrap();
    assert_eq!(remaining.len(), 4);
  }

  #[tokio::test]
  async fn injection_shaped_key_deletes_nothing() {
    let gw: Arc<dyn StorageGateway> = Arc::new(seeded_gateway().await);
    let svc = MutationService::new(gw.clone());

    let err = svc.remove_incident("x' OR '1'='1").await.unwrap_err();
    assert!(err.is_not_found());
    let remaining = gw.read_rows("SELECT * FROM Incidents", &[]).await.unwrap();
    assert_eq!(remaining.len(), 5);
  }
}
