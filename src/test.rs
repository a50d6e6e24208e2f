//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::Expense;
use crate::store::Backend;
use crate::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with a ledger home directory and an initialized store. Holds the TempDir to
/// keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment backed by a CSV file.
    pub async fn new() -> Self {
        Self::with_backend(Backend::Csv).await
    }

    /// Creates a test environment backed by the given kind of store.
    pub async fn with_backend(backend: Backend) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ledger");
        let config = Config::create(&root, backend).await.unwrap();
        Self { temp_dir, config }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A path for an output file inside the temporary directory.
    pub fn output(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Appends `(date, category, amount, description)` records to the store.
    pub async fn seed(&self, records: &[(&str, &str, &str, &str)]) {
        for (date, category, amount, description) in records {
            let expense = Expense::parse(date, category, amount, description).unwrap();
            self.config.store().append(&expense).await.unwrap();
        }
    }

    /// The three records used throughout the tests, across three categories.
    pub async fn seed_scenario_b(&self) {
        self.seed(&[
            ("2025-10-14", "Food", "250.00", "Lunch with friends"),
            ("2025-10-13", "Travel", "120.50", "Cab to office"),
            ("2025-10-12", "Shopping", "950.00", "New shoes"),
        ])
        .await
    }
}
