//! Shared fixtures for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::storage::{Param, Row, SqliteGateway, StorageError, StorageGateway};

pub const SCHEMA: &str = "
  CREATE TABLE Codes (code INTEGER PRIMARY KEY, incident_type TEXT);
  CREATE TABLE Neighborhoods (neighborhood_number INTEGER PRIMARY KEY, neighborhood_name TEXT);
  CREATE TABLE Incidents (
    case_number TEXT PRIMARY KEY,
    date_time DATETIME,
    code INTEGER,
    incident TEXT,
    police_grid INTEGER,
    neighborhood_number INTEGER,
    block TEXT
  );
";

/// Rows are inserted out of date order on purpose.
pub const SEED: &str = "
  INSERT INTO Codes VALUES (110, 'Arson'), (120, 'Burglary'), (700, 'Auto Theft');
  INSERT INTO Neighborhoods VALUES (1, 'Conway/Battlecreek/Highwood'), (2, 'Greater East Side');
  INSERT INTO Incidents VALUES
    ('22-000004', '2022-05-04T12:00:00', 110, 'Arson', 95, 2, '20X ELM AVE'),
    ('22-000002', '2022-05-02T10:00:00', 700, 'Auto Theft', 88, 2, '4XX OAK ST'),
    ('22-000005', '2022-05-05T08:30:00', 120, 'Burglary', 95, 2, '7XX PINE ST'),
    ('22-000001', '2022-05-01T01:02:03', 110, 'Arson', 87, 1, '10X MAIN ST'),
    ('22-000003', '2022-05-03T23:59:59', 110, 'Arson', 87, 1, '10X MAIN ST');
";

pub async fn empty_gateway() -> SqliteGateway {
  let gw = SqliteGateway::in_memory().await.unwrap();
  run_script(&gw, SCHEMA).await;
  gw
}

pub async fn seeded_gateway() -> SqliteGateway {
  let gw = empty_gateway().await;
  run_script(&gw, SEED).await;
  gw
}

async fn run_script(gw: &SqliteGateway, script: &str) {
  for stmt in script.split(';').map(str::trim).filter(|s| !s.is_empty()) {
    gw.execute(stmt, &[]).await.unwrap();
  }
}

/// Wraps a gateway and records every statement it sees.
pub struct RecordingGateway<G> {
  pub inner: G,
  pub reads: Mutex<Vec<String>>,
  pub executes: Mutex<Vec<String>>,
}

impl<G> RecordingGateway<G> {
  pub fn new(inner: G) -> Self {
    Self {
      inner,
      reads: Mutex::new(Vec::new()),
      executes: Mutex::new(Vec::new()),
    }
  }

  pub fn read(&self) -> Vec<String> {
    self.reads.lock().unwrap().clone()
  }

  pub fn executed(&self) -> Vec<String> {
    self.executes.lock().unwrap().clone()
  }
}

#[async_trait]
impl<G: StorageGateway> StorageGateway for RecordingGateway<G> {
  async fn read_rows(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>, StorageError> {
    self.reads.lock().unwrap().push(sql.to_string());
    self.inner.read_rows(sql, params).await
  }

  async fn execute(&self, sql: &str, params: &[Param]) -> Result<u64, StorageError> {
    self.executes.lock().unwrap().push(sql.to_string());
    self.inner.execute(sql, params).await
  }
}

/// Deletes every incident right after each read, as if a concurrent request
/// won the race between a lookup and the statement that follows it.
pub struct VanishingGateway<G> {
  pub inner: G,
}

#[async_trait]
impl<G: StorageGateway> StorageGateway for VanishingGateway<G> {
  async fn read_rows(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>, StorageError> {
    let rows = self.inner.read_rows(sql, params).await?;
    self.inner.execute("DELETE FROM Incidents", &[]).await?;
    Ok(rows)
  }

  async fn execute(&self, sql: &str, params: &[Param]) -> Result<u64, StorageError> {
    self.inner.execute(sql, params).await
  }
}
