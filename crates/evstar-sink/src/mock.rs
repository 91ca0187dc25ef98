//! Mock table sink for testing
//!
//! Keeps replaced tables in memory instead of writing them anywhere.
//! It's useful for:
//! - Testing the load sequence without a database
//! - Simulating a failure on a specific table mid-run
//! - Simulating connection failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use evstar_sink::{MockSink, TableSink, LoadError};
//!
//! let sink = MockSink::new();
//! sink.fail_table("dim_district", LoadError::write("dim_district", "disk full")).await;
//!
//! // Tables before dim_district land; dim_district and later ones don't
//! let result = load_tables(&sink, &tables).await;
//! ```

use crate::adapter::{LoadError, TableSink};
use evstar_core::Table;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory table sink
///
/// Clones share storage, so a test can hand a clone to the loader and
/// inspect the original afterwards.
#[derive(Clone)]
pub struct MockSink {
    /// Current tables by name
    tables: Arc<RwLock<HashMap<String, Table>>>,

    /// Names in the order `replace_table` succeeded
    history: Arc<RwLock<Vec<String>>>,

    /// Errors to return for specific tables
    errors: Arc<RwLock<HashMap<String, LoadError>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate write latency (milliseconds)
    latency_ms: u64,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(Vec::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Configure an error to be returned when `table` is replaced
    pub async fn fail_table(&self, table: &str, error: LoadError) {
        self.errors.write().await.insert(table.to_string(), error);
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure simulated latency for every write
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Seed a table as if a previous run had loaded it
    pub async fn insert_existing(&self, table: Table) {
        self.tables.write().await.insert(table.name.clone(), table);
    }

    pub async fn table(&self, name: &str) -> Option<Table> {
        self.tables.read().await.get(name).cloned()
    }

    pub async fn table_count(&self) -> usize {
        self.tables.read().await.len()
    }

    /// Table names in the order they were replaced
    pub async fn history(&self) -> Vec<String> {
        self.history.read().await.clone()
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TableSink for MockSink {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn replace_table(&self, table: &Table) -> Result<(), LoadError> {
        self.simulate_latency().await;

        if let Some(error) = self.errors.read().await.get(&table.name) {
            return Err(error.clone());
        }

        self.tables.write().await.insert(table.name.clone(), table.clone());
        self.history.write().await.push(table.name.clone());
        Ok(())
    }

    async fn test_connection(&self) -> Result<(), LoadError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(LoadError::ConnectionError("Simulated connection failure".to_string()))
        } else {
            Ok(())
        }
    }
}
